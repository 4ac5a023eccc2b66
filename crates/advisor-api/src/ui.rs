//! Embedded browser chat page.

/// Self-contained chat page served at `/`.
///
/// Talks to `/chat` and `/chat/reset` and keeps the session id in
/// `localStorage`. Embedded at compile time so the binary needs no asset
/// directory at runtime.
pub const CHAT_HTML: &str = include_str!("../assets/index.html");
