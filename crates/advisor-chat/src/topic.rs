//! Topic-lock detection over a window of recent utterances.
//!
//! Rules are evaluated in priority order; the first whose keyword count
//! reaches its threshold wins. Keywords match as whole words,
//! case-insensitively, and multi-word keywords tolerate any whitespace run.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::TopicTag;

struct TopicRule {
    tag: TopicTag,
    keywords: Vec<Regex>,
    min_mentions: usize,
}

impl TopicRule {
    fn new(tag: TopicTag, keywords: &[&str], min_mentions: usize) -> Self {
        let keywords = keywords
            .iter()
            .map(|kw| {
                let pattern = format!(r"\b{}\b", regex::escape(kw).replace(' ', r"\s+"));
                Regex::new(&pattern).expect("Invalid topic keyword regex")
            })
            .collect();
        Self {
            tag,
            keywords,
            min_mentions,
        }
    }

    fn mentions(&self, text: &str) -> usize {
        self.keywords
            .iter()
            .map(|re| re.find_iter(text).count())
            .sum()
    }
}

static TOPIC_RULES: LazyLock<Vec<TopicRule>> = LazyLock::new(|| {
    vec![
        TopicRule::new(TopicTag::AiVsDataScience, &["ai", "data science"], 3),
        TopicRule::new(TopicTag::CareerFocus, &["career", "careers"], 2),
        TopicRule::new(TopicTag::ExamPreparation, &["exam", "exams"], 2),
        TopicRule::new(
            TopicTag::ProgrammingSkills,
            &["python", "coding", "programming"],
            2,
        ),
        TopicRule::new(TopicTag::ProjectWork, &["project", "projects"], 2),
    ]
});

/// Detect the dominant topic of `window`, if any.
pub fn detect_topic_lock(window: &[String]) -> Option<TopicTag> {
    if window.is_empty() {
        return None;
    }
    let text = window.join(" ").to_lowercase();
    TOPIC_RULES
        .iter()
        .find(|rule| rule.mentions(&text) >= rule.min_mentions)
        .map(|rule| rule.tag)
}
