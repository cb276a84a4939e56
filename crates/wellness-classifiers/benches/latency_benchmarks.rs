//! Latency benchmarks for the lexicon classifiers
//!
//! Classification runs inline on pipeline workers, so its cost bounds the
//! pipeline's cancellation latency.
//!
//! Run with: cargo bench -p wellness-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tokio::runtime::Runtime;

use wellness_classifiers::{Classifier, SentimentClassifier, TopicClassifier};

const TEST_CASES: &[(&str, &str)] = &[
    ("empty", ""),
    ("short_positive", "I really enjoyed this product, it's amazing!"),
    ("short_negative", "This product is terrible, I hate it!"),
    (
        "medium_topics",
        "I've been feeling stressed and need to exercise more. Meditation helps with mindfulness.",
    ),
    (
        "long_mixed",
        "My family and friends have been a wonderful support during recovery. Sleep and diet \
         are improving, therapy helps with anxiety, and gratitude journaling gives my days \
         more meaning. Some evenings are still sad and the stress is awful, but overall I \
         would recommend this routine to anyone looking for balance and purpose.",
    ),
];

/// Benchmark the sentiment scorer
fn benchmark_sentiment_classifier(c: &mut Criterion) {
    let classifier = SentimentClassifier::new();

    let mut group = c.benchmark_group("Sentiment_Classifier");
    group.significance_level(0.05);
    group.sample_size(100);

    for (name, text) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("analyze", name), text, |b, text| {
            b.iter(|| classifier.analyze(black_box(text)));
        });
    }

    group.finish();
}

/// Benchmark the topic tagger
fn benchmark_topic_classifier(c: &mut Criterion) {
    let classifier = TopicClassifier::new().expect("Failed to create topic classifier");

    let mut group = c.benchmark_group("Topic_Classifier");
    group.significance_level(0.05);
    group.sample_size(100);

    for (name, text) in TEST_CASES {
        group.bench_with_input(BenchmarkId::new("analyze", name), text, |b, text| {
            b.iter(|| classifier.analyze(black_box(text)));
        });
    }

    group.finish();
}

/// Benchmark the async trait path used by pipeline workers
fn benchmark_trait_dispatch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let classifier = SentimentClassifier::new();
    let text = TEST_CASES[4].1;

    c.bench_function("Sentiment_Classifier/classify_async", |b| {
        b.iter(|| rt.block_on(async { classifier.classify(black_box(text)).await.unwrap() }));
    });
}

criterion_group!(
    benches,
    benchmark_sentiment_classifier,
    benchmark_topic_classifier,
    benchmark_trait_dispatch
);
criterion_main!(benches);
