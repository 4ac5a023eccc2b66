//! Conversational core of the student advisor.
//!
//! Provides intent classification, bounded per-session conversation memory
//! with topic-lock detection, prompt assembly, and the port to the external
//! text generation service.

pub mod context;
pub mod error;
pub mod intent;
pub mod llm;
pub mod orchestrator;
pub mod prompts;
pub mod topic;
pub mod types;

pub use context::SessionStore;
pub use error::{ChatError, ClassifierError, GenerationError};
pub use intent::{resolve_intent, ClassifierParams, IntentClassifier, Prediction};
pub use llm::{OpenAiGenerator, TextGenerator};
pub use orchestrator::AdvisorOrchestrator;
pub use topic::detect_topic_lock;
pub use types::{
    AdvisorReply, AssistantReply, GenerationRequest, ImageInput, IntentCategory, ReplyOutcome,
    SessionContext, TopicTag, TrainingExample,
};
