// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Rhetoric Analysis Benchmarks
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for the synchronous analysis path and the
//! feedback update.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rhetoric_core::{PolicyGate, RhetoricAnalyzer, ThresholdPolicyGate};
use rhetoric_types::{FeedbackRequest, GuardConfig, MatchMode, StakesLevel};

const CLEAN: &str = "The committee met on Tuesday to review the quarterly budget and \
                     agreed to publish the minutes next week.";

const LOADED: &str = "Act now before it's too late! Experts say studies show the deep \
                      state is hiding the truth. Isn't it strange? Wake up, only an idiot \
                      would wait. Everyone knows disaster is coming.";

// ── RhetoricAnalyzer.analyze() ──────────────────────────────────────

fn bench_analyze_clean(c: &mut Criterion) {
    let analyzer = RhetoricAnalyzer::new(GuardConfig::default()).unwrap();
    c.bench_function("analyze_clean", |b| {
        b.iter(|| analyzer.analyze(black_box(CLEAN)))
    });
}

fn bench_analyze_loaded(c: &mut Criterion) {
    let analyzer = RhetoricAnalyzer::new(GuardConfig::default()).unwrap();
    c.bench_function("analyze_loaded", |b| {
        b.iter(|| analyzer.analyze(black_box(LOADED)))
    });
}

fn bench_analyze_loaded_parallel(c: &mut Criterion) {
    let analyzer = RhetoricAnalyzer::new(GuardConfig {
        parallel_detectors: true,
        ..Default::default()
    })
    .unwrap();
    c.bench_function("analyze_loaded_parallel", |b| {
        b.iter(|| analyzer.analyze(black_box(LOADED)))
    });
}

fn bench_analyze_legacy_substring(c: &mut Criterion) {
    let analyzer = RhetoricAnalyzer::new(GuardConfig {
        match_mode: MatchMode::LegacySubstring,
        ..Default::default()
    })
    .unwrap();
    c.bench_function("analyze_loaded_substring", |b| {
        b.iter(|| analyzer.analyze(black_box(LOADED)))
    });
}

fn bench_analyze_long(c: &mut Criterion) {
    let analyzer = RhetoricAnalyzer::new(GuardConfig::default()).unwrap();
    let text = [CLEAN, LOADED].repeat(50).join(" ");
    c.bench_function("analyze_long_10k", |b| {
        b.iter(|| analyzer.analyze(black_box(&text)))
    });
}

// ── Gated analysis ──────────────────────────────────────────────────

fn bench_analyze_gated(c: &mut Criterion) {
    let analyzer = RhetoricAnalyzer::new(GuardConfig::default()).unwrap();
    let gate: Arc<dyn PolicyGate> = Arc::new(ThresholdPolicyGate::default());
    c.bench_function("analyze_gated_high", |b| {
        b.iter(|| analyzer.analyze_gated(black_box(LOADED), StakesLevel::High, gate.as_ref()))
    });
}

// ── Feedback ────────────────────────────────────────────────────────

fn bench_submit_feedback(c: &mut Criterion) {
    let analyzer = RhetoricAnalyzer::new(GuardConfig::default()).unwrap();
    let request = FeedbackRequest {
        pattern_id: "authority-anonymous".into(),
        original_confidence: 0.7,
        feedback_text: "somewhat wrong".into(),
        context_snippet: "Experts say so.".into(),
    };
    c.bench_function("submit_feedback", |b| {
        b.iter(|| analyzer.submit_feedback(black_box(&request)))
    });
}

criterion_group!(
    benches,
    bench_analyze_clean,
    bench_analyze_loaded,
    bench_analyze_loaded_parallel,
    bench_analyze_legacy_substring,
    bench_analyze_long,
    bench_analyze_gated,
    bench_submit_feedback,
);
criterion_main!(benches);
