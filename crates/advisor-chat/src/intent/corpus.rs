//! Built-in labeled utterances the intent classifier is fitted on at startup.

use crate::types::{IntentCategory, TrainingExample};

use IntentCategory::*;

/// Balanced reference corpus: the same number of examples per category keeps
/// the fitted intercepts close, so unseen text lands near a uniform prior.
static REFERENCE_EXAMPLES: &[(&str, IntentCategory)] = &[
    // Study guidance
    ("How can I prepare for exams?", StudyGuidance),
    ("How do I study better?", StudyGuidance),
    ("How should I plan my study schedule", StudyGuidance),
    ("Tips to stay focused while studying", StudyGuidance),
    ("How to manage time during exam preparation", StudyGuidance),
    ("How do I revise before my exams", StudyGuidance),
    ("I cannot concentrate on my studies", StudyGuidance),
    ("What is the best way to take notes in class", StudyGuidance),
    ("How many hours should I study every day", StudyGuidance),
    ("How do I stop procrastinating on homework", StudyGuidance),
    ("How to remember what I study", StudyGuidance),
    ("How can I improve my grades this semester", StudyGuidance),
    // Career guidance
    ("I am confused about my career", CareerGuidance),
    ("AI or Data Science which is better", CareerGuidance),
    ("Which career should I choose", CareerGuidance),
    ("What career options do I have after engineering", CareerGuidance),
    ("Should I do a masters or get a job", CareerGuidance),
    ("Is data science a good career", CareerGuidance),
    ("How do I choose between two job offers", CareerGuidance),
    ("What job can I get with a computer science degree", CareerGuidance),
    ("Should I switch my career to software", CareerGuidance),
    ("What are the career paths in artificial intelligence", CareerGuidance),
    ("Is it a good time to start a career in cloud computing", CareerGuidance),
    ("Which field has better job opportunities", CareerGuidance),
    // Concept explanation
    ("Explain machine learning", ConceptExplanation),
    ("What is artificial intelligence", ConceptExplanation),
    ("Difference between ML and DL", ConceptExplanation),
    ("What is a neural network", ConceptExplanation),
    ("Explain overfitting in simple words", ConceptExplanation),
    ("What does gradient descent mean", ConceptExplanation),
    ("Can you explain recursion", ConceptExplanation),
    ("What is the difference between supervised and unsupervised learning", ConceptExplanation),
    ("Explain how a database index works", ConceptExplanation),
    ("What is cloud computing", ConceptExplanation),
    ("Explain object oriented programming", ConceptExplanation),
    ("What is natural language processing", ConceptExplanation),
    // Skill recommendation
    ("How to learn Python", SkillRecommendation),
    ("Skills needed for AI jobs", SkillRecommendation),
    ("What skills should I learn for data science", SkillRecommendation),
    ("Which programming language should I learn first", SkillRecommendation),
    ("What skills do companies want from freshers", SkillRecommendation),
    ("How can I improve my coding skills", SkillRecommendation),
    ("What tools should a data analyst know", SkillRecommendation),
    ("Which certifications are useful for cloud jobs", SkillRecommendation),
    ("How do I get better at problem solving", SkillRecommendation),
    ("What soft skills are important for interviews", SkillRecommendation),
    ("Should I learn SQL or Excel first", SkillRecommendation),
    ("Recommend skills for a web developer", SkillRecommendation),
    // Project guidance
    ("Suggest a project for my final year", ProjectGuidance),
    ("What projects should I build for my resume", ProjectGuidance),
    ("Give me a machine learning project idea", ProjectGuidance),
    ("How do I start a project in data science", ProjectGuidance),
    ("Ideas for a beginner Python project", ProjectGuidance),
    ("How should I structure my capstone project", ProjectGuidance),
    ("What is a good mini project for college", ProjectGuidance),
    ("Can you suggest a web development project", ProjectGuidance),
    ("How do I choose a topic for my project", ProjectGuidance),
    ("Project ideas using artificial intelligence", ProjectGuidance),
    ("How do I present my project in a viva", ProjectGuidance),
    ("Which project will impress recruiters", ProjectGuidance),
];

/// The reference training corpus as owned examples.
pub fn reference_corpus() -> Vec<TrainingExample> {
    REFERENCE_EXAMPLES
        .iter()
        .map(|(utterance, label)| TrainingExample::new(*utterance, *label))
        .collect()
}
