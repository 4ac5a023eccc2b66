//! Intent classification: TF-IDF features fed to a softmax regression.
//!
//! The classifier is fitted once from labeled utterances and is immutable
//! afterwards, so a single instance can be shared across request handlers.
//! Predictions whose top probability falls below the configured confidence
//! threshold resolve to [`IntentCategory::GeneralQuery`].

mod corpus;
mod softmax;
mod tfidf;

pub use corpus::reference_corpus;
pub use softmax::{SoftmaxRegression, SolverParams};
pub use tfidf::{SparseVector, TfIdfVectorizer};

use advisor_core::config::ClassifierConfig;
use tracing::{info, warn};

use crate::error::ClassifierError;
use crate::types::{IntentCategory, TrainingExample};

/// Training and decision parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierParams {
    pub confidence_threshold: f64,
    pub regularization: f64,
    pub learning_rate: f64,
    pub max_iter: usize,
    pub tolerance: f64,
    pub max_ngram: usize,
    pub max_features: Option<usize>,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self::from(&ClassifierConfig::default())
    }
}

impl From<&ClassifierConfig> for ClassifierParams {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            confidence_threshold: config.confidence_threshold,
            regularization: config.regularization,
            learning_rate: config.learning_rate,
            max_iter: config.max_iter,
            tolerance: config.tolerance,
            max_ngram: config.max_ngram,
            max_features: config.max_features,
        }
    }
}

impl ClassifierParams {
    fn solver(&self) -> SolverParams {
        SolverParams {
            regularization: self.regularization,
            learning_rate: self.learning_rate,
            max_iter: self.max_iter,
            tolerance: self.tolerance,
        }
    }
}

/// Full output of a single prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Decided intent after the confidence threshold is applied.
    pub intent: IntentCategory,
    /// Arg-max training label, before thresholding.
    pub top_label: IntentCategory,
    /// Probability of `top_label`.
    pub confidence: f64,
    /// Distribution over the training labels, in canonical order.
    pub probabilities: Vec<(IntentCategory, f64)>,
}

/// Trained intent classifier.
#[derive(Debug)]
pub struct IntentClassifier {
    vectorizer: TfIdfVectorizer,
    model: SoftmaxRegression,
    /// Training labels in canonical order; index matches model class index.
    labels: Vec<IntentCategory>,
    confidence_threshold: f64,
}

impl IntentClassifier {
    /// Fit a classifier on `examples`.
    ///
    /// Fails when an utterance is blank, when an example carries the fallback
    /// label, or when fewer than two distinct labels are present.
    pub fn train(
        examples: &[TrainingExample],
        params: ClassifierParams,
    ) -> Result<Self, ClassifierError> {
        if let Some(index) = examples.iter().position(|e| e.utterance.trim().is_empty()) {
            return Err(ClassifierError::EmptyExample { index });
        }

        let labels: Vec<IntentCategory> = IntentCategory::TRAINABLE
            .into_iter()
            .filter(|category| examples.iter().any(|e| e.label == *category))
            .collect();

        let targets = examples
            .iter()
            .enumerate()
            .map(|(index, e)| {
                labels
                    .iter()
                    .position(|l| *l == e.label)
                    .ok_or(ClassifierError::ReservedLabel { index })
            })
            .collect::<Result<Vec<usize>, _>>()?;

        if labels.len() < 2 {
            return Err(ClassifierError::TooFewLabels {
                found: labels.len(),
            });
        }

        let documents: Vec<&str> = examples.iter().map(|e| e.utterance.as_str()).collect();
        let vectorizer = TfIdfVectorizer::fit(&documents, params.max_ngram, params.max_features);
        let samples: Vec<SparseVector> = documents.iter().map(|d| vectorizer.transform(d)).collect();

        let model = SoftmaxRegression::fit(
            &samples,
            &targets,
            labels.len(),
            vectorizer.vocabulary_size(),
            &params.solver(),
        );

        if !model.converged() {
            warn!(
                iterations = model.iterations(),
                "Intent classifier hit the iteration cap before converging"
            );
        }
        info!(
            examples = examples.len(),
            labels = labels.len(),
            vocabulary = vectorizer.vocabulary_size(),
            iterations = model.iterations(),
            "Intent classifier trained"
        );

        Ok(Self {
            vectorizer,
            model,
            labels,
            confidence_threshold: params.confidence_threshold,
        })
    }

    /// Fit on the built-in reference corpus.
    pub fn with_reference_corpus(params: ClassifierParams) -> Result<Self, ClassifierError> {
        Self::train(&reference_corpus(), params)
    }

    /// Map an utterance to an intent. Never fails.
    ///
    /// Blank input and low-confidence predictions both resolve to
    /// `general_query`. Numerical or shape failures are logged and also
    /// resolve to `general_query`.
    pub fn classify(&self, utterance: &str) -> IntentCategory {
        if utterance.trim().is_empty() {
            return IntentCategory::FALLBACK;
        }
        match self.predict(utterance) {
            Ok(prediction) => prediction.intent,
            Err(e) => {
                warn!(error = %e, "Intent classification failed; using fallback");
                IntentCategory::FALLBACK
            }
        }
    }

    /// Score an utterance and return the full distribution.
    pub fn predict(&self, utterance: &str) -> Result<Prediction, ClassifierError> {
        let features = self.vectorizer.transform(utterance);
        let probs = self.model.predict_proba(&features)?;
        let probabilities: Vec<(IntentCategory, f64)> =
            self.labels.iter().copied().zip(probs).collect();

        let (top_label, confidence) =
            arg_max(&probabilities).ok_or(ClassifierError::NonFinite)?;
        let intent = if confidence < self.confidence_threshold {
            IntentCategory::FALLBACK
        } else {
            top_label
        };

        Ok(Prediction {
            intent,
            top_label,
            confidence,
            probabilities,
        })
    }

    /// Training labels in canonical order.
    pub fn labels(&self) -> &[IntentCategory] {
        &self.labels
    }

    pub fn confidence_threshold(&self) -> f64 {
        self.confidence_threshold
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }
}

/// Apply the confidence rule to a probability distribution.
///
/// Returns the most probable label unless its probability is strictly below
/// `threshold` (or no finite probability exists), in which case the fallback
/// category is returned.
pub fn resolve_intent(probabilities: &[(IntentCategory, f64)], threshold: f64) -> IntentCategory {
    match arg_max(probabilities) {
        Some((label, p)) if p >= threshold => label,
        _ => IntentCategory::FALLBACK,
    }
}

/// Highest finite probability; ties go to the earliest category in
/// canonical order regardless of slice order.
fn arg_max(probabilities: &[(IntentCategory, f64)]) -> Option<(IntentCategory, f64)> {
    let mut best: Option<(IntentCategory, f64)> = None;
    for &(label, p) in probabilities {
        if !p.is_finite() {
            continue;
        }
        best = match best {
            Some((best_label, best_p))
                if p < best_p || (p == best_p && best_label < label) =>
            {
                Some((best_label, best_p))
            }
            _ => Some((label, p)),
        };
    }
    best
}
