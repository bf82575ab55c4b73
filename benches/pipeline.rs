/// Normalization and inference throughput over the test fixtures.
use std::path::Path;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use moodbot::classification::{
    DecisionPipeline, InferenceContext, LanguagePair, ModelState, OverridePolicy, TextNormalizer,
};

const MESSAGES: [&str; 4] = [
    "I am so happy today, everything is wonderful",
    "I am not happy, nothing feels good anymore",
    "Worried and anxious about tomorrow's exams, can't stop thinking about it",
    "Feeling tired and sad, my friends' messages don't help https://example.com @someone",
];

fn fixture_context() -> InferenceContext {
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
    InferenceContext::load(
        &fixtures.join("vectorizer.json"),
        &fixtures.join("classifier.json"),
    )
    .expect("fixture artifacts")
}

fn bench_normalize(c: &mut Criterion) {
    let normalizer = TextNormalizer::new();
    c.bench_function("normalize_messages", |b| {
        b.iter(|| {
            for message in MESSAGES {
                black_box(normalizer.normalize(black_box(message)));
            }
        });
    });
}

fn bench_infer(c: &mut Criterion) {
    let context = fixture_context();
    let normalizer = TextNormalizer::new();
    let normalized: Vec<String> = MESSAGES.iter().map(|m| normalizer.normalize(m)).collect();
    c.bench_function("infer_normalized_messages", |b| {
        b.iter(|| {
            for text in &normalized {
                black_box(context.infer(text).expect("inference"));
            }
        });
    });
}

fn bench_classify(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");
    let pipeline = DecisionPipeline::new(
        ModelState::from(fixture_context()),
        None,
        OverridePolicy::default(),
        LanguagePair::new("en", "en"),
        4999,
    );
    c.bench_function("classify_without_translation", |b| {
        b.iter(|| {
            for message in MESSAGES {
                black_box(runtime.block_on(pipeline.classify(message)).expect("decision"));
            }
        });
    });
}

criterion_group!(benches, bench_normalize, bench_infer, bench_classify);
criterion_main!(benches);
