//! Shared types for the advisor pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// IntentCategory
// =============================================================================

/// What the student is asking for.
///
/// Declaration order is the canonical order used to break probability ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    StudyGuidance,
    CareerGuidance,
    ConceptExplanation,
    SkillRecommendation,
    ProjectGuidance,
    /// Fallback for low-confidence predictions. Never a training label.
    GeneralQuery,
}

impl IntentCategory {
    /// Categories a classifier can be trained on, in canonical order.
    pub const TRAINABLE: [IntentCategory; 5] = [
        IntentCategory::StudyGuidance,
        IntentCategory::CareerGuidance,
        IntentCategory::ConceptExplanation,
        IntentCategory::SkillRecommendation,
        IntentCategory::ProjectGuidance,
    ];

    /// The reserved fallback category.
    pub const FALLBACK: IntentCategory = IntentCategory::GeneralQuery;

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::StudyGuidance => "study_guidance",
            IntentCategory::CareerGuidance => "career_guidance",
            IntentCategory::ConceptExplanation => "concept_explanation",
            IntentCategory::SkillRecommendation => "skill_recommendation",
            IntentCategory::ProjectGuidance => "project_guidance",
            IntentCategory::GeneralQuery => "general_query",
        }
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::FALLBACK
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "study_guidance" => Ok(IntentCategory::StudyGuidance),
            "career_guidance" => Ok(IntentCategory::CareerGuidance),
            "concept_explanation" => Ok(IntentCategory::ConceptExplanation),
            "skill_recommendation" => Ok(IntentCategory::SkillRecommendation),
            "project_guidance" => Ok(IntentCategory::ProjectGuidance),
            "general_query" => Ok(IntentCategory::GeneralQuery),
            other => Err(format!("unknown intent category: {}", other)),
        }
    }
}

// =============================================================================
// TopicTag
// =============================================================================

/// Topic the recent conversation keeps returning to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicTag {
    AiVsDataScience,
    CareerFocus,
    ExamPreparation,
    ProgrammingSkills,
    ProjectWork,
}

impl TopicTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopicTag::AiVsDataScience => "ai_vs_data_science",
            TopicTag::CareerFocus => "career_focus",
            TopicTag::ExamPreparation => "exam_preparation",
            TopicTag::ProgrammingSkills => "programming_skills",
            TopicTag::ProjectWork => "project_work",
        }
    }
}

impl fmt::Display for TopicTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Training data
// =============================================================================

/// A labeled utterance used to fit the intent classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub utterance: String,
    pub label: IntentCategory,
}

impl TrainingExample {
    pub fn new(utterance: impl Into<String>, label: IntentCategory) -> Self {
        Self {
            utterance: utterance.into(),
            label,
        }
    }
}

// =============================================================================
// Session context and generation requests
// =============================================================================

/// Result of recording an utterance in a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Trailing window of the session history, oldest first.
    pub history: Vec<String>,
    /// Topic detected over `history`, if any.
    pub topic_lock: Option<TopicTag>,
}

/// Everything the generation service needs to answer one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub session_id: String,
    /// The current utterance, unmodified.
    pub utterance: String,
    pub intent: IntentCategory,
    pub topic_lock: Option<TopicTag>,
    /// Recent utterances in chronological order, including the current one.
    pub history: Vec<String>,
}

/// How a reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOutcome {
    /// Text came from the generation service.
    Generated,
    /// Credentials are missing or rejected; retrying will not help.
    ConfigurationError,
    /// The service is throttling; the user may retry later.
    RateLimited,
    /// Any other failure.
    Failed,
}

/// Text returned to the caller for a chat turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorReply {
    pub response: String,
    pub intent: IntentCategory,
    pub topic_lock: Option<TopicTag>,
    pub outcome: ReplyOutcome,
}

/// Text returned by one of the single-shot assistants (resume, quiz, image).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub response: String,
    pub outcome: ReplyOutcome,
}

/// An image submitted for analysis, as base64 data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInput {
    /// MIME type such as `image/png`.
    pub media_type: String,
    /// Base64-encoded image bytes.
    pub data_base64: String,
}

impl ImageInput {
    /// Render as a `data:` URL understood by vision-capable chat APIs.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data_base64)
    }
}
