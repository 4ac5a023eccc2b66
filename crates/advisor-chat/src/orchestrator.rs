//! Advisor orchestrator: wires session memory, intent classification, and
//! the generation service together for each turn.

use std::sync::Arc;

use advisor_core::config::{AdvisorConfig, ChatConfig};

use crate::context::SessionStore;
use crate::error::{ChatError, GenerationError};
use crate::intent::{ClassifierParams, IntentClassifier};
use crate::llm::TextGenerator;
use crate::prompts;
use crate::types::{AdvisorReply, AssistantReply, GenerationRequest, ImageInput, ReplyOutcome};

/// Largest quiz that can be requested.
pub const MAX_QUIZ_QUESTIONS: u8 = 20;

const QUIZ_DIFFICULTIES: [&str; 3] = ["easy", "medium", "hard"];
const IMAGE_MEDIA_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Central coordinator for advisor turns and the single-shot assistants.
pub struct AdvisorOrchestrator {
    classifier: Arc<IntentClassifier>,
    sessions: Arc<SessionStore>,
    generator: Arc<dyn TextGenerator>,
    limits: ChatConfig,
}

impl AdvisorOrchestrator {
    pub fn new(
        classifier: Arc<IntentClassifier>,
        sessions: Arc<SessionStore>,
        generator: Arc<dyn TextGenerator>,
        limits: ChatConfig,
    ) -> Self {
        Self {
            classifier,
            sessions,
            generator,
            limits,
        }
    }

    /// Validate `config`, train the classifier on the reference corpus, and
    /// build an empty session store.
    pub fn from_config(
        config: &AdvisorConfig,
        generator: Arc<dyn TextGenerator>,
    ) -> Result<Self, ChatError> {
        config.validate()?;
        let classifier =
            IntentClassifier::with_reference_corpus(ClassifierParams::from(&config.classifier))?;
        let sessions = SessionStore::from_config(&config.session);
        tracing::info!(
            generator = generator.name(),
            history_limit = sessions.history_limit(),
            context_window = sessions.context_window(),
            "Advisor ready"
        );
        Ok(Self::new(
            Arc::new(classifier),
            Arc::new(sessions),
            generator,
            config.chat.clone(),
        ))
    }

    /// Record the utterance, classify it, and assemble the generation request.
    pub fn advise(&self, utterance: &str, session_id: &str) -> GenerationRequest {
        let context = self.sessions.record_and_get_context(session_id, utterance);
        let intent = self.classifier.classify(utterance);
        tracing::debug!(session_id, %intent, topic_lock = ?context.topic_lock, "Turn classified");
        GenerationRequest {
            session_id: session_id.to_string(),
            utterance: utterance.to_string(),
            intent,
            topic_lock: context.topic_lock,
            history: context.history,
        }
    }

    /// Run a full advisor turn and return the reply text.
    ///
    /// Generation failures do not surface as errors: they become a fixed
    /// user-facing message tagged with the matching [`ReplyOutcome`].
    pub async fn reply(&self, utterance: &str, session_id: &str) -> Result<AdvisorReply, ChatError> {
        self.check_message(utterance)?;
        let request = self.advise(utterance, session_id);
        let payload = prompts::render_advice_payload(&request);

        let result = self
            .generator
            .generate(prompts::ADVISOR_SYSTEM_PROMPT, &payload)
            .await;
        let (response, outcome) = resolve_generation(result, "advice");

        Ok(AdvisorReply {
            response,
            intent: request.intent,
            topic_lock: request.topic_lock,
            outcome,
        })
    }

    /// Forget a session's history.
    pub fn reset(&self, session_id: &str) {
        self.sessions.reset(session_id);
    }

    /// Review a resume, optionally against a target role.
    pub async fn review_resume(
        &self,
        resume_text: &str,
        target_role: Option<&str>,
    ) -> Result<AssistantReply, ChatError> {
        if resume_text.trim().is_empty() {
            return Err(ChatError::InvalidInput("resume text cannot be empty".to_string()));
        }
        if resume_text.chars().count() > self.limits.max_resume_chars {
            return Err(ChatError::InvalidInput(format!(
                "resume exceeds maximum length of {} characters",
                self.limits.max_resume_chars
            )));
        }
        if let Some(role) = target_role {
            self.check_length(role, "target role")?;
        }

        let payload = prompts::render_resume_payload(resume_text, target_role);
        let result = self
            .generator
            .generate(prompts::RESUME_SYSTEM_PROMPT, &payload)
            .await;
        Ok(assistant_reply(result, "resume review"))
    }

    /// Generate a multiple-choice quiz of `question_count` questions.
    pub async fn generate_quiz(
        &self,
        topic: &str,
        question_count: u8,
        difficulty: Option<&str>,
    ) -> Result<AssistantReply, ChatError> {
        if topic.trim().is_empty() {
            return Err(ChatError::InvalidInput("quiz topic cannot be empty".to_string()));
        }
        self.check_length(topic, "quiz topic")?;
        if !(1..=MAX_QUIZ_QUESTIONS).contains(&question_count) {
            return Err(ChatError::InvalidInput(format!(
                "question count must be between 1 and {}",
                MAX_QUIZ_QUESTIONS
            )));
        }
        let difficulty = match difficulty.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => {
                let d = d.to_lowercase();
                if !QUIZ_DIFFICULTIES.contains(&d.as_str()) {
                    return Err(ChatError::InvalidInput(format!(
                        "difficulty must be one of: {}",
                        QUIZ_DIFFICULTIES.join(", ")
                    )));
                }
                Some(d)
            }
            None => None,
        };

        let payload = prompts::render_quiz_payload(topic, question_count, difficulty.as_deref());
        let result = self
            .generator
            .generate(prompts::QUIZ_SYSTEM_PROMPT, &payload)
            .await;
        Ok(assistant_reply(result, "quiz"))
    }

    /// Answer a question about an uploaded image.
    pub async fn analyze_image(
        &self,
        image: &ImageInput,
        question: Option<&str>,
    ) -> Result<AssistantReply, ChatError> {
        let media_type = image.media_type.trim().to_lowercase();
        if !IMAGE_MEDIA_TYPES.contains(&media_type.as_str()) {
            return Err(ChatError::InvalidInput(format!(
                "unsupported image type '{}'",
                image.media_type
            )));
        }
        let data = image.data_base64.trim();
        if data.is_empty() {
            return Err(ChatError::InvalidInput("image data cannot be empty".to_string()));
        }
        if data.len() > self.limits.max_image_bytes {
            return Err(ChatError::InvalidInput(format!(
                "image exceeds maximum size of {} bytes",
                self.limits.max_image_bytes
            )));
        }
        if !is_base64(data) {
            return Err(ChatError::InvalidInput("image data is not valid base64".to_string()));
        }
        if let Some(q) = question {
            self.check_length(q, "question")?;
        }

        let image = ImageInput {
            media_type,
            data_base64: data.to_string(),
        };
        let payload = prompts::render_image_payload(question);
        let result = self
            .generator
            .generate_with_image(prompts::IMAGE_SYSTEM_PROMPT, &payload, &image)
            .await;
        Ok(assistant_reply(result, "image analysis"))
    }

    /// Reject blank or oversized chat messages.
    pub fn check_message(&self, message: &str) -> Result<(), ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.limits.max_message_chars {
            return Err(ChatError::MessageTooLong(self.limits.max_message_chars));
        }
        Ok(())
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn classifier(&self) -> &IntentClassifier {
        &self.classifier
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Drop all session state.
    pub fn shutdown(&self) {
        self.sessions.clear();
    }

    fn check_length(&self, text: &str, field: &str) -> Result<(), ChatError> {
        if text.chars().count() > self.limits.max_message_chars {
            return Err(ChatError::InvalidInput(format!(
                "{} exceeds maximum length of {} characters",
                field, self.limits.max_message_chars
            )));
        }
        Ok(())
    }
}

/// User-facing message and outcome for a failed generation.
pub fn failure_message(err: &GenerationError) -> (String, ReplyOutcome) {
    match err {
        GenerationError::Configuration(_) => (
            "The advisor is not configured correctly. Please check that a valid API key \
             is set for the generation service."
                .to_string(),
            ReplyOutcome::ConfigurationError,
        ),
        GenerationError::RateLimited(_) => (
            "The advisor is receiving too many requests right now. Please wait a moment \
             and try again."
                .to_string(),
            ReplyOutcome::RateLimited,
        ),
        GenerationError::Request(detail) => (
            format!("Sorry, something went wrong while generating a reply ({}).", detail),
            ReplyOutcome::Failed,
        ),
    }
}

fn resolve_generation(
    result: Result<String, GenerationError>,
    task: &str,
) -> (String, ReplyOutcome) {
    match result {
        Ok(text) => (text, ReplyOutcome::Generated),
        Err(e) => {
            match e {
                GenerationError::Request(_) => tracing::error!(task, error = %e, "Generation failed"),
                _ => tracing::warn!(task, error = %e, "Generation failed"),
            }
            failure_message(&e)
        }
    }
}

fn assistant_reply(result: Result<String, GenerationError>, task: &str) -> AssistantReply {
    let (response, outcome) = resolve_generation(result, task);
    AssistantReply { response, outcome }
}

/// Standard padded base64: whole 4-char groups, `=` only as 1-2 trailing chars.
fn is_base64(data: &str) -> bool {
    let trimmed = data.trim_end_matches('=');
    data.len() % 4 == 0
        && data.len() - trimmed.len() <= 2
        && trimmed
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'+' || b == b'/')
}

// =============================================================================
// Tests
// =============================================================================
