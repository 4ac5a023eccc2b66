//! System instructions and user payloads sent to the generation service.

use crate::types::GenerationRequest;

/// Persona for conversational advice.
pub const ADVISOR_SYSTEM_PROMPT: &str = "\
You are a professional AI Student Advisor.

Your role:
- Help students with career decisions, studies, and AI concepts
- Be honest, calm, and practical
- Do NOT overpromise
- Ask for clarification if the question is vague
- Keep explanations simple but insightful";

pub const RESUME_SYSTEM_PROMPT: &str = "\
You are an experienced campus recruiter reviewing student resumes.
Be specific and constructive. Point out concrete strengths, gaps, and
wording that could be sharper. Never invent experience the student does
not list.";

pub const QUIZ_SYSTEM_PROMPT: &str = "\
You write short multiple-choice quizzes for students.
Each question has four options labelled A to D, exactly one correct answer,
and a one-line explanation. List the answer key after all questions.";

pub const IMAGE_SYSTEM_PROMPT: &str = "\
You are a patient tutor helping a student understand an image they shared,
such as a diagram, a screenshot of code, or handwritten notes.
Describe what matters for learning and answer their question plainly.";

/// Question used when an image arrives without one.
pub const DEFAULT_IMAGE_QUESTION: &str = "Explain what this image shows.";

/// Render the user payload for an advisor turn.
pub fn render_advice_payload(request: &GenerationRequest) -> String {
    let topic = request
        .topic_lock
        .map(|t| t.as_str())
        .unwrap_or("none");
    format!(
        "Conversation context:\n{context}\n\n\
         Detected intent: {intent}\n\
         Locked topic: {topic}\n\n\
         Current user question:\n{question}\n\n\
         Guidelines:\n\
         - If topic is locked, stay within it\n\
         - Give structured answers (bullets when helpful)\n\
         - Personalize advice for a student audience",
        context = request.history.join("\n"),
        intent = request.intent,
        topic = topic,
        question = request.utterance,
    )
}

pub fn render_resume_payload(resume_text: &str, target_role: Option<&str>) -> String {
    let role = match target_role.map(str::trim).filter(|r| !r.is_empty()) {
        Some(role) => format!("Target role: {}\n\n", role),
        None => String::new(),
    };
    format!(
        "{role}Resume:\n{resume}\n\n\
         Respond with:\n\
         - Overall impression (two sentences)\n\
         - Strengths\n\
         - Improvements, most important first\n\
         - One rewritten bullet point as an example",
        role = role,
        resume = resume_text.trim(),
    )
}

pub fn render_quiz_payload(topic: &str, question_count: u8, difficulty: Option<&str>) -> String {
    let difficulty = difficulty
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("medium");
    format!(
        "Write a {difficulty} quiz of {count} question{plural} on: {topic}",
        difficulty = difficulty,
        count = question_count,
        plural = if question_count == 1 { "" } else { "s" },
        topic = topic.trim(),
    )
}

pub fn render_image_payload(question: Option<&str>) -> String {
    question
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or(DEFAULT_IMAGE_QUESTION)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IntentCategory, TopicTag};

    fn request(topic_lock: Option<TopicTag>) -> GenerationRequest {
        GenerationRequest {
            session_id: "s1".to_string(),
            utterance: "Which career should I pick?".to_string(),
            intent: IntentCategory::CareerGuidance,
            topic_lock,
            history: vec![
                "I like maths".to_string(),
                "Which career should I pick?".to_string(),
            ],
        }
    }

    #[test]
    fn test_advice_payload_sections() {
        let payload = render_advice_payload(&request(Some(TopicTag::CareerFocus)));
        assert!(payload.contains("Conversation context:\nI like maths\nWhich career should I pick?"));
        assert!(payload.contains("Detected intent: career_guidance"));
        assert!(payload.contains("Locked topic: career_focus"));
        assert!(payload.contains("Current user question:\nWhich career should I pick?"));
        assert!(payload.contains("stay within it"));
    }

    #[test]
    fn test_advice_payload_without_lock() {
        let payload = render_advice_payload(&request(None));
        assert!(payload.contains("Locked topic: none"));
    }

    #[test]
    fn test_resume_payload_with_role() {
        let payload = render_resume_payload("  Python, SQL  ", Some("Data Analyst"));
        assert!(payload.starts_with("Target role: Data Analyst"));
        assert!(payload.contains("Resume:\nPython, SQL\n"));
    }

    #[test]
    fn test_resume_payload_blank_role_omitted() {
        let payload = render_resume_payload("Python", Some("   "));
        assert!(payload.starts_with("Resume:"));
    }

    #[test]
    fn test_quiz_payload() {
        assert_eq!(
            render_quiz_payload("recursion", 5, Some("hard")),
            "Write a hard quiz of 5 questions on: recursion"
        );
        assert_eq!(
            render_quiz_payload(" SQL joins ", 1, None),
            "Write a medium quiz of 1 question on: SQL joins"
        );
    }

    #[test]
    fn test_image_payload_default_question() {
        assert_eq!(render_image_payload(None), DEFAULT_IMAGE_QUESTION);
        assert_eq!(render_image_payload(Some("  ")), DEFAULT_IMAGE_QUESTION);
        assert_eq!(render_image_payload(Some("What is this graph?")), "What is this graph?");
    }

    #[test]
    fn test_system_prompts_not_empty() {
        for prompt in [
            ADVISOR_SYSTEM_PROMPT,
            RESUME_SYSTEM_PROMPT,
            QUIZ_SYSTEM_PROMPT,
            IMAGE_SYSTEM_PROMPT,
        ] {
            assert!(!prompt.trim().is_empty());
        }
    }
}
