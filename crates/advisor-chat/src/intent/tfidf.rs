//! TF-IDF vectorizer over word n-grams.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

/// Tokens are runs of two or more word characters.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("Invalid token regex"));

/// Sparse feature vector: `(feature index, value)` pairs sorted by index.
pub type SparseVector = Vec<(usize, f64)>;

/// TF-IDF vectorizer with a fixed vocabulary learned at fit time.
pub struct TfIdfVectorizer {
    /// N-gram -> column index. Indices follow lexicographic n-gram order.
    vocabulary: HashMap<String, usize>,
    /// Smoothed inverse document frequency per column.
    idf: Vec<f64>,
    /// Number of documents seen during fitting.
    n_documents: usize,
    /// Longest n-gram extracted.
    max_ngram: usize,
}

impl std::fmt::Debug for TfIdfVectorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TfIdfVectorizer")
            .field("vocabulary_size", &self.vocabulary.len())
            .field("n_documents", &self.n_documents)
            .field("max_ngram", &self.max_ngram)
            .finish()
    }
}

impl TfIdfVectorizer {
    /// Fit the vocabulary and IDF weights on `documents`.
    ///
    /// With `max_features` set, only the most frequent n-grams across the
    /// corpus are kept (ties broken lexicographically).
    pub fn fit(documents: &[&str], max_ngram: usize, max_features: Option<usize>) -> Self {
        let max_ngram = max_ngram.max(1);
        let analyzed: Vec<Vec<String>> = documents.iter().map(|d| analyze(d, max_ngram)).collect();

        let mut term_counts: HashMap<&str, usize> = HashMap::new();
        let mut document_frequency: HashMap<&str, usize> = HashMap::new();
        for terms in &analyzed {
            let mut seen = HashSet::new();
            for term in terms {
                *term_counts.entry(term.as_str()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.as_str()).or_insert(0) += 1;
                }
            }
        }

        let mut kept: Vec<&str> = term_counts.keys().copied().collect();
        if let Some(limit) = max_features {
            if kept.len() > limit {
                kept.sort_by(|a, b| term_counts[b].cmp(&term_counts[a]).then_with(|| a.cmp(b)));
                kept.truncate(limit);
            }
        }
        kept.sort_unstable();

        // IDF = ln((1 + N) / (1 + df)) + 1
        let n = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(kept.len());
        let mut idf = Vec::with_capacity(kept.len());
        for (idx, term) in kept.iter().enumerate() {
            let df = document_frequency.get(term).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + n) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert((*term).to_string(), idx);
        }

        Self {
            vocabulary,
            idf,
            n_documents: documents.len(),
            max_ngram,
        }
    }

    /// Transform a document into an L2-normalised TF-IDF vector.
    ///
    /// Out-of-vocabulary n-grams are ignored; a document with none of the
    /// vocabulary yields an empty vector.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(document, self.max_ngram) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut features: SparseVector = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();

        let norm = features.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, v) in &mut features {
                *v /= norm;
            }
        }
        features
    }

    /// Number of columns in the produced vectors.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Whether an n-gram made it into the vocabulary.
    pub fn contains(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }
}

/// Lower-case, tokenize, and expand into n-grams of length `1..=max_ngram`.
fn analyze(text: &str, max_ngram: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = TOKEN_RE.find_iter(&lowered).map(|m| m.as_str()).collect();

    let mut terms = Vec::with_capacity(tokens.len() * max_ngram);
    for n in 1..=max_ngram {
        for window in tokens.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<&'static str> {
        vec![
            "what is machine learning",
            "how to learn python",
            "how to prepare for exams",
        ]
    }

    #[test]
    fn test_analyze_unigrams_and_bigrams() {
        let terms = analyze("How do I study?", 2);
        // "i" is a single character and is dropped.
        assert_eq!(terms, vec!["how", "do", "study", "how do", "do study"]);
    }

    #[test]
    fn test_analyze_unigrams_only() {
        let terms = analyze("Explain Machine Learning", 1);
        assert_eq!(terms, vec!["explain", "machine", "learning"]);
    }

    #[test]
    fn test_analyze_empty() {
        assert!(analyze("   ", 2).is_empty());
        assert!(analyze("a ? !", 2).is_empty());
    }

    #[test]
    fn test_fit_builds_vocabulary() {
        let v = TfIdfVectorizer::fit(&docs(), 2, None);
        assert!(v.contains("python"));
        assert!(v.contains("machine learning"));
        assert!(v.contains("how to"));
        assert!(!v.contains("is python"));
        assert_eq!(v.n_documents(), 3);
    }

    #[test]
    fn test_transform_is_l2_normalised() {
        let v = TfIdfVectorizer::fit(&docs(), 2, None);
        let features = v.transform("how to learn machine learning");
        let norm: f64 = features.iter().map(|(_, x)| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_transform_sorted_and_in_range() {
        let v = TfIdfVectorizer::fit(&docs(), 2, None);
        let features = v.transform("learn python for exams");
        assert!(features.windows(2).all(|w| w[0].0 < w[1].0));
        assert!(features.iter().all(|(idx, _)| *idx < v.vocabulary_size()));
    }

    #[test]
    fn test_transform_unknown_terms_empty() {
        let v = TfIdfVectorizer::fit(&docs(), 2, None);
        assert!(v.transform("xylophone").is_empty());
        assert!(v.transform("").is_empty());
    }

    #[test]
    fn test_rare_terms_weigh_more() {
        let v = TfIdfVectorizer::fit(&docs(), 1, None);
        // "how" and "to" appear in two documents, "python" in one.
        let features = v.transform("how python");
        let python = v.vocabulary["python"];
        let how = v.vocabulary["how"];
        let weight = |idx| features.iter().find(|(i, _)| *i == idx).unwrap().1;
        assert!(weight(python) > weight(how));
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let v = TfIdfVectorizer::fit(&docs(), 1, Some(2));
        assert_eq!(v.vocabulary_size(), 2);
        // "how" and "to" are the only unigrams occurring twice.
        assert!(v.contains("how"));
        assert!(v.contains("to"));
    }

    #[test]
    fn test_fit_is_deterministic() {
        let a = TfIdfVectorizer::fit(&docs(), 2, None);
        let b = TfIdfVectorizer::fit(&docs(), 2, None);
        assert_eq!(
            a.transform("how to learn python"),
            b.transform("how to learn python")
        );
    }

    #[test]
    fn test_debug_output() {
        let v = TfIdfVectorizer::fit(&docs(), 2, None);
        let dbg = format!("{:?}", v);
        assert!(dbg.contains("vocabulary_size"));
    }
}
