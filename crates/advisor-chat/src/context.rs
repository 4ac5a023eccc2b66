//! Bounded per-session conversation memory.
//!
//! Each session keeps the most recent utterances (oldest first) up to a
//! fixed limit. Recording an utterance returns the trailing context window
//! together with the topic lock detected over that window. Sessions idle for
//! longer than the configured timeout are dropped.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use advisor_core::config::SessionConfig;

use crate::topic::detect_topic_lock;
use crate::types::SessionContext;

type Handle = Arc<Mutex<Session>>;

struct Session {
    entries: VecDeque<String>,
    last_active: Instant,
}

impl Session {
    fn new(capacity: usize, now: Instant) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            last_active: now,
        }
    }
}

// =============================================================================
// SessionStore
// =============================================================================

/// Concurrent map of session id to bounded utterance history.
///
/// The map lock is held only to look up, insert or remove a session handle;
/// the append-and-trim step runs under that session's own lock, so different
/// sessions never contend with each other.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Handle>>,
    history_limit: usize,
    context_window: usize,
    idle_timeout: Option<Duration>,
}

impl SessionStore {
    /// Create a store keeping `history_limit` utterances per session and
    /// returning the last `context_window` of them. Sessions never expire.
    ///
    /// Both values are clamped to at least 1, and the window to at most the
    /// history limit.
    pub fn new(history_limit: usize, context_window: usize) -> Self {
        let history_limit = history_limit.max(1);
        Self {
            sessions: Mutex::new(HashMap::new()),
            history_limit,
            context_window: context_window.clamp(1, history_limit),
            idle_timeout: None,
        }
    }

    /// Drop sessions that have been idle for longer than `timeout`.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        let store = Self::new(config.history_limit, config.context_window);
        match config.idle_timeout_minutes {
            0 => store,
            minutes => store.with_idle_timeout(Duration::from_secs(u64::from(minutes) * 60)),
        }
    }

    /// Append `utterance` to the session, trim it to the history limit, and
    /// return the trailing window with its topic lock.
    ///
    /// An unseen or expired id starts a fresh session.
    pub fn record_and_get_context(&self, session_id: &str, utterance: &str) -> SessionContext {
        self.record_at(session_id, utterance, Instant::now())
    }

    fn record_at(&self, session_id: &str, utterance: &str, now: Instant) -> SessionContext {
        let handle = self.handle(session_id, now);
        let history: Vec<String> = {
            let mut session = lock(&handle);
            if self.is_expired(&session, now) {
                tracing::debug!(session_id, "Session expired; starting fresh");
                session.entries.clear();
            }
            session.last_active = now;
            session.entries.push_back(utterance.to_string());
            while session.entries.len() > self.history_limit {
                session.entries.pop_front();
            }
            let skip = session.entries.len().saturating_sub(self.context_window);
            session.entries.iter().skip(skip).cloned().collect()
        };

        let topic_lock = detect_topic_lock(&history);
        tracing::debug!(
            session_id,
            window = history.len(),
            topic_lock = ?topic_lock,
            "Session context updated"
        );
        SessionContext {
            history,
            topic_lock,
        }
    }

    /// Full bounded history of a session, oldest first. Empty for unknown ids.
    pub fn history(&self, session_id: &str) -> Vec<String> {
        let handle = lock(&self.sessions).get(session_id).cloned();
        match handle {
            Some(handle) => lock(&handle).entries.iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Forget a session. Unknown ids are a no-op.
    pub fn reset(&self, session_id: &str) {
        if lock(&self.sessions).remove(session_id).is_some() {
            tracing::info!(session_id, "Session reset");
        }
    }

    /// Drop every session.
    pub fn clear(&self) {
        let mut sessions = lock(&self.sessions);
        let count = sessions.len();
        sessions.clear();
        tracing::info!(count, "Session store cleared");
    }

    /// Remove sessions idle for longer than the timeout and return how many
    /// were dropped. Always 0 when no timeout is set.
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    fn evict_idle_at(&self, now: Instant) -> usize {
        if self.idle_timeout.is_none() {
            return 0;
        }
        let mut sessions = lock(&self.sessions);
        let before = sessions.len();
        sessions.retain(|_, handle| !self.is_expired(&lock(handle), now));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Idle sessions evicted");
        }
        evicted
    }

    /// Number of known sessions.
    pub fn len(&self) -> usize {
        lock(&self.sessions).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub fn context_window(&self) -> usize {
        self.context_window
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    fn is_expired(&self, session: &Session, now: Instant) -> bool {
        match self.idle_timeout {
            Some(timeout) => now.saturating_duration_since(session.last_active) > timeout,
            None => false,
        }
    }

    fn handle(&self, session_id: &str, now: Instant) -> Handle {
        let mut sessions = lock(&self.sessions);
        Arc::clone(
            sessions
                .entry(session_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(Session::new(self.history_limit, now)))),
        )
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

/// Acquire a lock, recovering the data if a previous holder panicked.
///
/// Every mutation leaves the guarded value consistent, so a poisoned lock
/// still holds valid state.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e: PoisonError<_>| {
        tracing::error!("Session lock poisoned; recovering");
        e.into_inner()
    })
}

// =============================================================================
// Tests
// =============================================================================
