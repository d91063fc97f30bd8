// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Rhetoric Kernel Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, GuardResult};
use crate::finding::{CONFIDENCE_CEILING, CONFIDENCE_FLOOR};

/// Upper limit for `CalibrationConfig::max_adjustment`.
pub const MAX_ADJUSTMENT_LIMIT: f64 = 0.3;

/// How indicator phrases are located in lower-cased text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Phrase edges must sit on word boundaries ("act now" does not
    /// match inside "react nowhere").
    #[default]
    WordBoundary,
    /// Plain case-insensitive substring containment, kept for
    /// compatibility testing against older detection runs.
    LegacySubstring,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::WordBoundary => "word_boundary",
            MatchMode::LegacySubstring => "legacy_substring",
        }
    }
}

/// Feedback-driven calibration parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Bound on the cumulative per-pattern adjustment factor.
    /// Default: 0.3. Must not exceed [`MAX_ADJUSTMENT_LIMIT`].
    pub max_adjustment: f64,

    /// Learning events kept per pattern before the oldest is evicted.
    /// Default: 50.
    pub history_cap: usize,

    /// Context snippets are truncated to this many characters.
    /// Default: 200.
    pub snippet_max_chars: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            max_adjustment: 0.3,
            history_cap: 50,
            snippet_max_chars: 200,
        }
    }
}

/// Count thresholds for one cluster mode; any one met fires the alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterThresholds {
    pub high_count: usize,
    pub medium_count: usize,
    pub total: usize,
}

/// Co-occurrence alert parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Confidence at or above which a finding counts as high.
    /// Default: 0.75.
    pub high_threshold: f64,

    /// Confidence at or above which a finding counts as medium and
    /// joins the cluster. Default: 0.55.
    pub medium_threshold: f64,

    /// Thresholds when no scientific hedging is present.
    /// Default: 2 high / 3 medium / 4 total.
    pub strict: ClusterThresholds,

    /// Thresholds when the text hedges like legitimate research.
    /// Default: 3 high / 4 medium / 5 total.
    pub relaxed: ClusterThresholds,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.75,
            medium_threshold: 0.55,
            strict: ClusterThresholds {
                high_count: 2,
                medium_count: 3,
                total: 4,
            },
            relaxed: ClusterThresholds {
                high_count: 3,
                medium_count: 4,
                total: 5,
            },
        }
    }
}

/// Runtime configuration for the Rhetoric Kernel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Inputs with fewer trimmed characters return no findings.
    /// Default: 3.
    pub min_input_chars: usize,

    /// Phrase matching strategy. Default: word boundary.
    pub match_mode: MatchMode,

    /// Added when a context clue co-occurs with an indicator.
    /// Default: 0.1.
    pub context_clue_boost: f64,

    /// Added when more than one indicator of a pattern matched.
    /// Default: 0.05.
    pub multi_indicator_boost: f64,

    /// Run detectors on the rayon pool. Output order is unchanged.
    /// Default: false.
    pub parallel_detectors: bool,

    pub calibration: CalibrationConfig,

    pub cluster: ClusterConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            min_input_chars: 3,
            match_mode: MatchMode::WordBoundary,
            context_clue_boost: 0.1,
            multi_indicator_boost: 0.05,
            parallel_detectors: false,
            calibration: CalibrationConfig::default(),
            cluster: ClusterConfig::default(),
        }
    }
}

impl GuardConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> GuardResult<()> {
        for (name, value) in [
            ("context_clue_boost", self.context_clue_boost),
            ("multi_indicator_boost", self.multi_indicator_boost),
            ("calibration.max_adjustment", self.calibration.max_adjustment),
            ("cluster.high_threshold", self.cluster.high_threshold),
            ("cluster.medium_threshold", self.cluster.medium_threshold),
        ] {
            if !value.is_finite() {
                return Err(GuardError::Numerical(format!("{name} is {value}")));
            }
        }
        for (name, value) in [
            ("context_clue_boost", self.context_clue_boost),
            ("multi_indicator_boost", self.multi_indicator_boost),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GuardError::Config(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }
        let cal = &self.calibration;
        if !(0.0..=MAX_ADJUSTMENT_LIMIT).contains(&cal.max_adjustment) {
            return Err(GuardError::Config(format!(
                "calibration.max_adjustment must be in [0, {MAX_ADJUSTMENT_LIMIT}], got {}",
                cal.max_adjustment
            )));
        }
        if cal.history_cap < 1 {
            return Err(GuardError::Config(format!(
                "calibration.history_cap must be >= 1, got {}",
                cal.history_cap
            )));
        }
        let cl = &self.cluster;
        for (name, value) in [
            ("cluster.high_threshold", cl.high_threshold),
            ("cluster.medium_threshold", cl.medium_threshold),
        ] {
            if !(CONFIDENCE_FLOOR..=CONFIDENCE_CEILING).contains(&value) {
                return Err(GuardError::Config(format!(
                    "{name} must be in [{CONFIDENCE_FLOOR}, {CONFIDENCE_CEILING}], got {value}"
                )));
            }
        }
        if cl.medium_threshold > cl.high_threshold {
            return Err(GuardError::Config(format!(
                "cluster.medium_threshold ({}) must not exceed cluster.high_threshold ({})",
                cl.medium_threshold, cl.high_threshold
            )));
        }
        for (name, t) in [("strict", cl.strict), ("relaxed", cl.relaxed)] {
            if t.high_count == 0 || t.medium_count == 0 || t.total == 0 {
                return Err(GuardError::Config(format!(
                    "cluster.{name} thresholds must all be >= 1, got {t:?}"
                )));
            }
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> GuardResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| GuardError::Config(format!("JSON parse error: {e}")))
    }
}
