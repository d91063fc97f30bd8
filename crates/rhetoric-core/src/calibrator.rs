// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Adaptive Confidence Calibrator
// ─────────────────────────────────────────────────────────────────────
//! Learns a bounded per-pattern confidence nudge from user feedback.
//!
//! Feedback text is classified by keyword lookup, scaled by an
//! intensity read from its phrasing, and folded into the pattern's
//! cumulative adjustment factor. The factor never leaves
//! `±max_adjustment`: a delta that would cross it is capped so the
//! total lands exactly on the bound.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use rhetoric_types::{
    clamp_confidence, AdjustmentRecord, CalibrationConfig, FeedbackEvent, FeedbackKind,
    FeedbackRequest, Finding, GuardResult, MatchMode,
};

use crate::matcher::PhraseSet;
use crate::persistence::{PersistenceBackend, PersistenceWriter};
use crate::store::{AdjustmentStore, InMemoryAdjustmentStore};

const FALSE_POSITIVE_CUES: &[&str] = &[
    "not manipulative",
    "not manipulation",
    "shouldn't flag",
    "should not flag",
    "shouldn't be flagged",
    "over-flagged",
    "overflagged",
    "too sensitive",
    "not correct",
    "not accurate",
    "not right",
    "legitimate",
    "wrong",
    "incorrect",
    "inaccurate",
];

const FALSE_NEGATIVE_CUES: &[&str] = &[
    "missed",
    "should have flagged",
    "should have been flagged",
    "not caught",
    "didn't catch",
    "did not catch",
    "underestimated",
    "too low",
    "more manipulative",
];

const CORRECT_CUES: &[&str] = &[
    "correct",
    "accurate",
    "good catch",
    "spot on",
    "agree",
    "right",
    "helpful",
];

/// Cue catalogs compiled once, matched on word boundaries so that
/// "disagree" does not read as "agree".
struct FeedbackCues {
    false_positive: PhraseSet,
    false_negative: PhraseSet,
    correct: PhraseSet,
}

impl FeedbackCues {
    fn compile() -> GuardResult<Self> {
        Ok(Self {
            false_positive: PhraseSet::new(FALSE_POSITIVE_CUES, MatchMode::WordBoundary)?,
            false_negative: PhraseSet::new(FALSE_NEGATIVE_CUES, MatchMode::WordBoundary)?,
            correct: PhraseSet::new(CORRECT_CUES, MatchMode::WordBoundary)?,
        })
    }
}

fn feedback_cues() -> Option<&'static FeedbackCues> {
    static CUES: OnceLock<Option<FeedbackCues>> = OnceLock::new();
    CUES.get_or_init(|| match FeedbackCues::compile() {
        Ok(cues) => Some(cues),
        Err(e) => {
            log::error!("Feedback cue catalog failed to compile: {e}");
            None
        }
    })
    .as_ref()
}

/// Classify free-form feedback. Never fails; unmatched text is
/// `Disputed`.
pub fn classify_feedback(feedback_text: &str) -> FeedbackKind {
    let text = feedback_text.to_lowercase();
    if text.contains("false positive") {
        return FeedbackKind::FalsePositive;
    }
    if text.contains("false negative") {
        return FeedbackKind::FalseNegative;
    }
    let Some(cues) = feedback_cues() else {
        return FeedbackKind::Disputed;
    };
    // Negated forms ("not correct") live in the false-positive list,
    // which is checked before the correct list.
    if cues.false_negative.any_match(&text) {
        return FeedbackKind::FalseNegative;
    }
    if cues.false_positive.any_match(&text) {
        return FeedbackKind::FalsePositive;
    }
    if cues.correct.any_match(&text) {
        return FeedbackKind::Correct;
    }
    FeedbackKind::Disputed
}

/// Multiplier read from how strongly the feedback is phrased.
pub fn feedback_intensity(feedback_text: &str) -> f64 {
    let text = feedback_text.to_lowercase();
    let has = |cues: &[&str]| cues.iter().any(|c| text.contains(c));
    if has(&["completely wrong", "totally incorrect", "absolutely wrong"]) {
        2.0
    } else if has(&["very wrong", "clearly incorrect"]) {
        1.5
    } else if has(&["somewhat", "maybe", "slightly"]) {
        0.5
    } else {
        1.0
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Aggregate view over all records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationStats {
    pub patterns_tracked: usize,
    pub events_by_kind: HashMap<FeedbackKind, usize>,
    pub mean_adjustment: f64,
    pub saturated_patterns: Vec<String>,
}

/// Feedback-driven confidence calibrator.
///
/// Thread-safe: all record mutation goes through
/// [`AdjustmentStore::atomic_update`].
pub struct AdaptiveCalibrator {
    config: CalibrationConfig,
    store: Arc<dyn AdjustmentStore>,
    writer: Option<PersistenceWriter>,
}

impl AdaptiveCalibrator {
    /// In-memory calibrator with no durable backend.
    pub fn new(config: CalibrationConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryAdjustmentStore::new()))
    }

    pub fn with_store(config: CalibrationConfig, store: Arc<dyn AdjustmentStore>) -> Self {
        Self {
            config,
            store,
            writer: None,
        }
    }

    /// Load previously persisted records into `store` and mirror future
    /// changes to `backend`. An unreadable backend is logged and the
    /// calibrator continues in memory.
    pub fn with_persistence(
        config: CalibrationConfig,
        store: Arc<dyn AdjustmentStore>,
        backend: Arc<dyn PersistenceBackend>,
    ) -> GuardResult<Self> {
        match backend.load_all() {
            Ok(records) => {
                let n = records.len();
                for mut record in records {
                    record.sanitize(config.max_adjustment, config.history_cap);
                    store.restore(record);
                }
                log::info!("Loaded {n} adjustment record(s) from durable storage");
            }
            Err(e) => {
                log::warn!("Adjustment storage unavailable, continuing in memory: {e}");
            }
        }
        let writer = PersistenceWriter::spawn(backend)?;
        Ok(Self {
            config,
            store,
            writer: Some(writer),
        })
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Fold one piece of feedback into the pattern's record and return
    /// `original_confidence` moved by the applied delta, clamped to
    /// [0.05, 0.95].
    pub fn adjust_confidence(
        &self,
        pattern_id: &str,
        original_confidence: f64,
        feedback_text: &str,
        context_snippet: &str,
    ) -> f64 {
        let kind = classify_feedback(feedback_text);
        let intensity = feedback_intensity(feedback_text);
        let raw_delta = kind.base_delta() * intensity;
        let max_adjustment = self.config.max_adjustment;
        let cap = self.config.history_cap;
        let snippet = truncate_chars(context_snippet, self.config.snippet_max_chars);

        let mut applied_delta = 0.0;
        let record = self.store.atomic_update(pattern_id, &mut |record| {
            applied_delta = record.apply_delta(raw_delta, max_adjustment);
            record.push_event(
                FeedbackEvent {
                    kind,
                    intensity,
                    raw_delta,
                    applied_delta,
                    feedback_text: feedback_text.to_string(),
                    context_snippet: snippet.clone(),
                    recorded_at: Utc::now(),
                },
                cap,
            );
            // Enqueue under the record lock so disk sees updates in
            // the same order as memory.
            if let Some(writer) = &self.writer {
                writer.save(record.clone());
            }
        });

        log::debug!(
            "Feedback on '{pattern_id}': {} x{intensity} -> applied {applied_delta:+.3}, factor {:+.3}",
            kind.as_str(),
            record.adjustment_factor()
        );

        let base = if original_confidence.is_finite() {
            original_confidence
        } else {
            0.0
        };
        clamp_confidence(base + applied_delta)
    }

    /// Convenience wrapper for the feedback call's request shape.
    pub fn submit(&self, request: &FeedbackRequest) -> f64 {
        self.adjust_confidence(
            &request.pattern_id,
            request.original_confidence,
            &request.feedback_text,
            &request.context_snippet,
        )
    }

    /// Current cumulative factor for the pattern, 0 if none recorded.
    pub fn pattern_adjustment(&self, pattern_id: &str) -> f64 {
        self.store
            .get(pattern_id)
            .map(|r| r.adjustment_factor())
            .unwrap_or(0.0)
    }

    /// Add each finding's pattern factor to its confidence, re-clamped.
    pub fn apply(&self, findings: &mut [Finding]) {
        for finding in findings.iter_mut() {
            let adj = self.pattern_adjustment(&finding.pattern_id);
            if adj != 0.0 {
                finding.confidence = clamp_confidence(finding.effective_confidence() + adj);
                finding.tag("calibrated");
            }
        }
    }

    /// Delete the pattern's record and history. Irreversible.
    pub fn reset_pattern(&self, pattern_id: &str) -> bool {
        let existed = self.store.reset(pattern_id);
        if existed {
            log::info!("Calibration reset for '{pattern_id}'");
        }
        if let Some(writer) = &self.writer {
            writer.remove(pattern_id);
        }
        existed
    }

    pub fn record(&self, pattern_id: &str) -> Option<AdjustmentRecord> {
        self.store.get(pattern_id)
    }

    pub fn stats(&self) -> CalibrationStats {
        let records = self.store.snapshot();
        let mut stats = CalibrationStats {
            patterns_tracked: records.len(),
            ..Default::default()
        };
        let mut sum = 0.0;
        for record in &records {
            sum += record.adjustment_factor();
            if record.adjustment_factor().abs() >= self.config.max_adjustment {
                stats.saturated_patterns.push(record.pattern_id().to_string());
            }
            for event in record.learning_history() {
                *stats.events_by_kind.entry(event.kind).or_insert(0) += 1;
            }
        }
        if !records.is_empty() {
            stats.mean_adjustment = sum / records.len() as f64;
        }
        stats
    }

    /// Wait for queued persistence writes. True when there is no
    /// durable backend.
    pub fn flush(&self, timeout: Duration) -> bool {
        match &self.writer {
            Some(writer) => writer.flush(timeout),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::PhraseSet;
use crate::persistence::JsonFilePersistence;
    use rhetoric_types::Category;

    fn calibrator() -> AdaptiveCalibrator {
        AdaptiveCalibrator::new(CalibrationConfig::default())
    }

    #[test]
    fn test_classification() {
        assert_eq!(
            classify_feedback("false positive, completely wrong"),
            FeedbackKind::FalsePositive
        );
        assert_eq!(classify_feedback("You missed this one"), FeedbackKind::FalseNegative);
        assert_eq!(classify_feedback("This is incorrect"), FeedbackKind::FalsePositive);
        assert_eq!(classify_feedback("Good catch"), FeedbackKind::Correct);
        assert_eq!(classify_feedback("hmm"), FeedbackKind::Disputed);
        assert_eq!(classify_feedback(""), FeedbackKind::Disputed);
    }

    #[test]
    fn test_cue_catalogs_compile() {
        assert!(FeedbackCues::compile().is_ok());
        assert!(feedback_cues().is_some());
    }

    #[test]
    fn test_cues_need_whole_words() {
        assert_eq!(classify_feedback("I disagree with this"), FeedbackKind::Disputed);
        assert_eq!(classify_feedback("unhelpful flag"), FeedbackKind::Disputed);
        assert_eq!(
            classify_feedback("this is outright manipulation"),
            FeedbackKind::Disputed
        );
        assert_eq!(classify_feedback("I agree"), FeedbackKind::Correct);
        assert_eq!(classify_feedback("That's right."), FeedbackKind::Correct);
    }

    #[test]
    fn test_negated_correct_is_false_positive() {
        assert_eq!(classify_feedback("not correct"), FeedbackKind::FalsePositive);
        assert_eq!(classify_feedback("This is not right"), FeedbackKind::FalsePositive);
    }

    #[test]
    fn test_disagreement_applies_disputed_delta() {
        let cal = calibrator();
        cal.adjust_confidence("P", 0.6, "I disagree with this", "");
        assert!((cal.pattern_adjustment("P") + 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_intensity() {
        assert_eq!(feedback_intensity("completely wrong"), 2.0);
        assert_eq!(feedback_intensity("Totally incorrect!"), 2.0);
        assert_eq!(feedback_intensity("very wrong"), 1.5);
        assert_eq!(feedback_intensity("clearly incorrect"), 1.5);
        assert_eq!(feedback_intensity("maybe a false positive"), 0.5);
        assert_eq!(feedback_intensity("missed"), 1.0);
    }

    #[test]
    fn test_completely_wrong_false_positive() {
        let cal = calibrator();
        let adjusted =
            cal.adjust_confidence("P", 0.8, "false positive, completely wrong", "ctx");
        assert!((adjusted - 0.7).abs() < 1e-9);
        assert!((cal.pattern_adjustment("P") + 0.1).abs() < 1e-12);
        let record = cal.record("P").unwrap();
        let event = &record.learning_history()[0];
        assert_eq!(event.kind, FeedbackKind::FalsePositive);
        assert_eq!(event.intensity, 2.0);
    }

    #[test]
    fn test_ten_missed_caps_at_bound() {
        let cal = calibrator();
        for _ in 0..10 {
            cal.adjust_confidence("P", 0.5, "missed", "");
        }
        assert_eq!(cal.pattern_adjustment("P"), 0.3);
        let last = cal.record("P").unwrap().learning_history().back().cloned().unwrap();
        assert_eq!(last.applied_delta, 0.0);
        assert!((last.raw_delta - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_correct_is_neutral() {
        let cal = calibrator();
        let adjusted = cal.adjust_confidence("P", 0.6, "correct", "");
        assert!((adjusted - 0.6).abs() < 1e-12);
        assert_eq!(cal.pattern_adjustment("P"), 0.0);
        assert!(cal.record("P").is_some());
    }

    #[test]
    fn test_disputed_delta() {
        let cal = calibrator();
        cal.adjust_confidence("P", 0.6, "not sure about this", "");
        assert!((cal.pattern_adjustment("P") + 0.025).abs() < 1e-12);
    }

    #[test]
    fn test_returned_confidence_clamped() {
        let cal = calibrator();
        assert_eq!(cal.adjust_confidence("P", 0.94, "false negative, missed", ""), 0.95);
        assert_eq!(cal.adjust_confidence("Q", 0.06, "completely wrong", ""), 0.05);
    }

    #[test]
    fn test_unknown_pattern_adjustment_zero() {
        assert_eq!(calibrator().pattern_adjustment("nobody"), 0.0);
    }

    #[test]
    fn test_history_capped() {
        let cal = AdaptiveCalibrator::new(CalibrationConfig {
            history_cap: 3,
            ..Default::default()
        });
        for _ in 0..7 {
            cal.adjust_confidence("P", 0.5, "correct", "");
        }
        assert_eq!(cal.record("P").unwrap().learning_history().len(), 3);
    }

    #[test]
    fn test_snippet_truncated() {
        let cal = AdaptiveCalibrator::new(CalibrationConfig {
            snippet_max_chars: 4,
            ..Default::default()
        });
        cal.adjust_confidence("P", 0.5, "correct", "ééééééé");
        let record = cal.record("P").unwrap();
        assert_eq!(record.learning_history()[0].context_snippet, "éééé");
    }

    #[test]
    fn test_reset_pattern() {
        let cal = calibrator();
        cal.adjust_confidence("P", 0.5, "missed", "");
        assert!(cal.reset_pattern("P"));
        assert!(cal.record("P").is_none());
        assert_eq!(cal.pattern_adjustment("P"), 0.0);
        assert!(!cal.reset_pattern("P"));
    }

    #[test]
    fn test_apply_to_findings() {
        let cal = calibrator();
        cal.adjust_confidence("p", 0.5, "false positive, completely wrong", "");
        let mut findings = vec![
            Finding::new("p", Category::Bandwagon, "l", 0.65, "r", 2),
            Finding::new("q", Category::Bandwagon, "l", 0.65, "r", 2),
        ];
        cal.apply(&mut findings);
        assert!((findings[0].confidence - 0.55).abs() < 1e-9);
        assert!(findings[0].has_tag("calibrated"));
        assert_eq!(findings[1].confidence, 0.65);
    }

    #[test]
    fn test_stats() {
        let cal = calibrator();
        for _ in 0..7 {
            cal.adjust_confidence("a", 0.5, "missed", "");
        }
        cal.adjust_confidence("b", 0.5, "wrong", "");
        let stats = cal.stats();
        assert_eq!(stats.patterns_tracked, 2);
        assert_eq!(stats.events_by_kind[&FeedbackKind::FalseNegative], 7);
        assert_eq!(stats.events_by_kind[&FeedbackKind::FalsePositive], 1);
        assert_eq!(stats.saturated_patterns, vec!["a".to_string()]);
        assert!((stats.mean_adjustment - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_concurrent_feedback_respects_bound() {
        let cal = Arc::new(calibrator());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cal = Arc::clone(&cal);
                std::thread::spawn(move || {
                    let text = if i % 2 == 0 { "missed" } else { "completely wrong" };
                    for _ in 0..50 {
                        cal.adjust_confidence("P", 0.5, text, "");
                        assert!(cal.pattern_adjustment("P").abs() <= 0.3);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(cal.pattern_adjustment("P").abs() <= 0.3);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        {
            let backend = Arc::new(JsonFilePersistence::open(dir.path()).unwrap());
            let cal = AdaptiveCalibrator::with_persistence(
                CalibrationConfig::default(),
                Arc::new(InMemoryAdjustmentStore::new()),
                backend,
            )
            .unwrap();
            cal.adjust_confidence("P", 0.8, "false positive, completely wrong", "");
            assert!(cal.flush(Duration::from_secs(5)));
        }
        let backend = Arc::new(JsonFilePersistence::open(dir.path()).unwrap());
        let cal = AdaptiveCalibrator::with_persistence(
            CalibrationConfig::default(),
            Arc::new(InMemoryAdjustmentStore::new()),
            backend,
        )
        .unwrap();
        assert!((cal.pattern_adjustment("P") + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_concurrent_feedback_persists_latest_factor() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(JsonFilePersistence::open(dir.path()).unwrap());
        let cal = Arc::new(
            AdaptiveCalibrator::with_persistence(
                CalibrationConfig::default(),
                Arc::new(InMemoryAdjustmentStore::new()),
                backend.clone(),
            )
            .unwrap(),
        );
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cal = Arc::clone(&cal);
                std::thread::spawn(move || {
                    let text = if i % 2 == 0 { "missed" } else { "wrong" };
                    for _ in 0..25 {
                        cal.adjust_confidence("P", 0.5, text, "");
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(cal.flush(Duration::from_secs(5)));
        let on_disk = backend.load_all().unwrap();
        assert_eq!(on_disk.len(), 1);
        let in_memory = cal.record("P").unwrap();
        assert!((on_disk[0].adjustment_factor() - in_memory.adjustment_factor()).abs() < 1e-12);
        assert_eq!(
            on_disk[0].learning_history().len(),
            in_memory.learning_history().len()
        );
    }

    #[test]
    fn test_unavailable_backend_falls_back_to_memory() {
        struct Down;
        impl PersistenceBackend for Down {
            fn save(&self, _: &AdjustmentRecord) -> GuardResult<()> {
                Err(rhetoric_types::GuardError::Persistence("down".into()))
            }
            fn remove(&self, _: &str) -> GuardResult<()> {
                Err(rhetoric_types::GuardError::Persistence("down".into()))
            }
            fn load_all(&self) -> GuardResult<Vec<AdjustmentRecord>> {
                Err(rhetoric_types::GuardError::Persistence("down".into()))
            }
        }
        let cal = AdaptiveCalibrator::with_persistence(
            CalibrationConfig::default(),
            Arc::new(InMemoryAdjustmentStore::new()),
            Arc::new(Down),
        )
        .unwrap();
        let adjusted = cal.adjust_confidence("P", 0.8, "false positive, completely wrong", "");
        assert!((adjusted - 0.7).abs() < 1e-9);
        assert!((cal.pattern_adjustment("P") + 0.1).abs() < 1e-12);
    }
}
