// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Rhetoric Kernel Feedback & Adjustment Records
// ─────────────────────────────────────────────────────────────────────

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Classified user feedback on a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    FalsePositive,
    FalseNegative,
    Correct,
    Disputed,
}

impl FeedbackKind {
    /// Confidence nudge before the intensity multiplier.
    pub fn base_delta(&self) -> f64 {
        match self {
            FeedbackKind::FalsePositive => -0.05,
            FeedbackKind::FalseNegative => 0.05,
            FeedbackKind::Correct => 0.0,
            FeedbackKind::Disputed => -0.025,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackKind::FalsePositive => "false_positive",
            FeedbackKind::FalseNegative => "false_negative",
            FeedbackKind::Correct => "correct",
            FeedbackKind::Disputed => "disputed",
        }
    }
}

/// Input of the feedback call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub pattern_id: String,
    pub original_confidence: f64,
    pub feedback_text: String,
    #[serde(default)]
    pub context_snippet: String,
}

/// One learning event in a record's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub kind: FeedbackKind,
    pub intensity: f64,
    pub raw_delta: f64,
    /// What actually moved the cumulative factor (after the ± bound).
    pub applied_delta: f64,
    pub feedback_text: String,
    pub context_snippet: String,
    pub recorded_at: DateTime<Utc>,
}

/// Persistent per-pattern confidence nudge learned from feedback.
///
/// The factor is bounded at write time: a delta that would push it past
/// `±max_adjustment` is capped so the total lands exactly on the bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentRecord {
    pattern_id: String,
    adjustment_factor: f64,
    learning_history: VecDeque<FeedbackEvent>,
    last_updated: DateTime<Utc>,
}

impl AdjustmentRecord {
    pub fn new(pattern_id: impl Into<String>) -> Self {
        Self {
            pattern_id: pattern_id.into(),
            adjustment_factor: 0.0,
            learning_history: VecDeque::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn pattern_id(&self) -> &str {
        &self.pattern_id
    }

    pub fn adjustment_factor(&self) -> f64 {
        self.adjustment_factor
    }

    pub fn learning_history(&self) -> &VecDeque<FeedbackEvent> {
        &self.learning_history
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Add `raw_delta` to the cumulative factor, bounded to
    /// `[-max_adjustment, max_adjustment]`. Returns the delta applied.
    pub fn apply_delta(&mut self, raw_delta: f64, max_adjustment: f64) -> f64 {
        if !raw_delta.is_finite() {
            log::warn!(
                "apply_delta: non-finite delta for '{}', ignoring",
                self.pattern_id
            );
            return 0.0;
        }
        let bound = max_adjustment.abs();
        let current = self.adjustment_factor;
        let next = (current + raw_delta).clamp(-bound, bound);
        self.adjustment_factor = next;
        self.last_updated = Utc::now();
        next - current
    }

    /// Append an event, evicting the oldest entries beyond `cap`.
    pub fn push_event(&mut self, event: FeedbackEvent, cap: usize) {
        self.learning_history.push_back(event);
        while self.learning_history.len() > cap {
            self.learning_history.pop_front();
        }
        self.last_updated = Utc::now();
    }

    /// Re-establish invariants on a record loaded from outside the
    /// process (durable storage, hand-edited files).
    pub fn sanitize(&mut self, max_adjustment: f64, cap: usize) {
        let bound = max_adjustment.abs();
        if !self.adjustment_factor.is_finite() {
            self.adjustment_factor = 0.0;
        }
        self.adjustment_factor = self.adjustment_factor.clamp(-bound, bound);
        while self.learning_history.len() > cap {
            self.learning_history.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: FeedbackKind) -> FeedbackEvent {
        FeedbackEvent {
            kind,
            intensity: 1.0,
            raw_delta: kind.base_delta(),
            applied_delta: kind.base_delta(),
            feedback_text: String::new(),
            context_snippet: String::new(),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_delta_within_bound() {
        let mut r = AdjustmentRecord::new("p");
        let applied = r.apply_delta(-0.1, 0.3);
        assert!((applied + 0.1).abs() < 1e-12);
        assert!((r.adjustment_factor() + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_apply_delta_caps_at_bound() {
        let mut r = AdjustmentRecord::new("p");
        r.apply_delta(0.25, 0.3);
        let applied = r.apply_delta(0.2, 0.3);
        assert_eq!(r.adjustment_factor(), 0.3);
        assert!((applied - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_apply_delta_at_bound_applies_zero() {
        let mut r = AdjustmentRecord::new("p");
        r.apply_delta(-0.5, 0.3);
        assert_eq!(r.adjustment_factor(), -0.3);
        assert_eq!(r.apply_delta(-0.05, 0.3), 0.0);
    }

    #[test]
    fn test_apply_delta_ignores_nan() {
        let mut r = AdjustmentRecord::new("p");
        assert_eq!(r.apply_delta(f64::NAN, 0.3), 0.0);
        assert_eq!(r.adjustment_factor(), 0.0);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut r = AdjustmentRecord::new("p");
        r.push_event(event(FeedbackKind::Correct), 2);
        r.push_event(event(FeedbackKind::Disputed), 2);
        r.push_event(event(FeedbackKind::FalsePositive), 2);
        assert_eq!(r.learning_history().len(), 2);
        assert_eq!(r.learning_history()[0].kind, FeedbackKind::Disputed);
    }

    #[test]
    fn test_sanitize_restores_bound() {
        let json = r#"{
            "pattern_id": "p",
            "adjustment_factor": 0.9,
            "learning_history": [],
            "last_updated": "2026-01-01T00:00:00Z"
        }"#;
        let mut r: AdjustmentRecord = serde_json::from_str(json).unwrap();
        r.sanitize(0.3, 10);
        assert_eq!(r.adjustment_factor(), 0.3);
    }

    #[test]
    fn test_feedback_kind_wire_format() {
        let json = serde_json::to_string(&FeedbackKind::FalsePositive).unwrap();
        assert_eq!(json, "\"false_positive\"");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn factor_never_leaves_bound(deltas in proptest::collection::vec(-0.5f64..0.5, 0..64)) {
                let mut r = AdjustmentRecord::new("p");
                for d in deltas {
                    r.apply_delta(d, 0.3);
                    prop_assert!(r.adjustment_factor().abs() <= 0.3);
                }
            }
        }
    }
}
