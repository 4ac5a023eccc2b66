//! Benchmarks for the per-turn hot path: intent classification and session
//! context assembly.
//!
//! Training runs once at startup and is measured separately.

use std::time::Duration;

use advisor_chat::intent::{reference_corpus, ClassifierParams, IntentClassifier};
use advisor_chat::SessionStore;
use criterion::{criterion_group, criterion_main, Criterion};

const UTTERANCES: [&str; 8] = [
    "How do I study better?",
    "Which career should I choose after my degree",
    "Explain gradient descent in simple words",
    "What skills do I need for a data science job",
    "Suggest a final year project using Python",
    "AI or data science, which one has a better future?",
    "I keep failing my exams, what should I do",
    "xylophone",
];

fn bench_training(c: &mut Criterion) {
    let corpus = reference_corpus();

    let mut group = c.benchmark_group("intent_training");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("reference_corpus", |b| {
        b.iter(|| IntentClassifier::train(&corpus, ClassifierParams::default()))
    });

    group.finish();
}

fn bench_classification(c: &mut Criterion) {
    let Ok(classifier) = IntentClassifier::with_reference_corpus(ClassifierParams::default())
    else {
        eprintln!("reference corpus failed to train; skipping classification benchmarks");
        return;
    };

    let mut group = c.benchmark_group("intent_classification");
    group.sample_size(200);

    group.bench_function("classify_single", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let intent = classifier.classify(UTTERANCES[idx % UTTERANCES.len()]);
            idx += 1;
            intent
        });
    });

    group.bench_function("predict_distribution", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let prediction = classifier.predict(UTTERANCES[idx % UTTERANCES.len()]);
            idx += 1;
            prediction
        });
    });

    group.finish();
}

fn bench_session_context(c: &mut Criterion) {
    let store = SessionStore::new(6, 4);

    let mut group = c.benchmark_group("session_context");
    group.sample_size(200);

    group.bench_function("record_and_get_context", |b| {
        let mut idx = 0usize;
        b.iter(|| {
            let sid = format!("session-{}", idx % 64);
            let ctx = store.record_and_get_context(&sid, UTTERANCES[idx % UTTERANCES.len()]);
            idx += 1;
            ctx
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_training,
    bench_classification,
    bench_session_context
);
criterion_main!(benches);
