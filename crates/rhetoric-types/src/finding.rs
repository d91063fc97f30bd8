// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Rhetoric Kernel Finding Types
// ─────────────────────────────────────────────────────────────────────

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lowest confidence any finding may carry when it leaves the pipeline.
pub const CONFIDENCE_FLOOR: f64 = 0.05;
/// Highest confidence any finding may carry when it leaves the pipeline.
pub const CONFIDENCE_CEILING: f64 = 0.95;

/// Clamp a confidence to [0.05, 0.95], mapping NaN to the floor and
/// Inf to the nearest bound.
#[inline]
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        log::warn!("clamp_confidence: NaN detected, clamping to {CONFIDENCE_FLOOR:.2}");
        return CONFIDENCE_FLOOR;
    }
    if value.is_infinite() {
        let boundary = if value > 0.0 {
            CONFIDENCE_CEILING
        } else {
            CONFIDENCE_FLOOR
        };
        log::warn!("clamp_confidence: Inf detected, clamping to {boundary:.2}");
        return boundary;
    }
    value.clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
}

/// Manipulation category. Attached explicitly to every finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    FalseUrgency,
    Scarcity,
    VagueAuthority,
    DataLessClaim,
    Hallucination,
    EmotionalPressure,
    FearMongering,
    SpeculativeClaim,
    Bandwagon,
    FalseDichotomy,
    Absolutism,
    ConspiracyFraming,
    AdHominem,
    LoadedLanguage,
    PseudoInquiry,
    ClusterAlert,
}

impl Category {
    /// Wire slug, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FalseUrgency => "false-urgency",
            Category::Scarcity => "scarcity",
            Category::VagueAuthority => "vague-authority",
            Category::DataLessClaim => "data-less-claim",
            Category::Hallucination => "hallucination",
            Category::EmotionalPressure => "emotional-pressure",
            Category::FearMongering => "fear-mongering",
            Category::SpeculativeClaim => "speculative-claim",
            Category::Bandwagon => "bandwagon",
            Category::FalseDichotomy => "false-dichotomy",
            Category::Absolutism => "absolutism",
            Category::ConspiracyFraming => "conspiracy-framing",
            Category::AdHominem => "ad-hominem",
            Category::LoadedLanguage => "loaded-language",
            Category::PseudoInquiry => "pseudo-inquiry",
            Category::ClusterAlert => "cluster-alert",
        }
    }

    /// Human-readable name used in finding labels.
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::FalseUrgency => "False Urgency",
            Category::Scarcity => "Artificial Scarcity",
            Category::VagueAuthority => "Vague Authority",
            Category::DataLessClaim => "Data-less Claim",
            Category::Hallucination => "False Claim",
            Category::EmotionalPressure => "Emotional Pressure",
            Category::FearMongering => "Fear Mongering",
            Category::SpeculativeClaim => "Speculative Claim",
            Category::Bandwagon => "Bandwagon Appeal",
            Category::FalseDichotomy => "False Dichotomy",
            Category::Absolutism => "Absolutist Language",
            Category::ConspiracyFraming => "Conspiracy Framing",
            Category::AdHominem => "Ad Hominem",
            Category::LoadedLanguage => "Loaded Language",
            Category::PseudoInquiry => "Pseudo-Inquiry",
            Category::ClusterAlert => "Cluster Alert",
        }
    }

    /// Categories whose confidence reacts to the inquiry context
    /// (methodology, humility, process vs. agenda, conspiracy, rhetoric).
    pub fn is_inquiry_sensitive(&self) -> bool {
        matches!(
            self,
            Category::VagueAuthority | Category::DataLessClaim | Category::SpeculativeClaim
        )
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity tier of a pattern definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Default display priority for a fresh finding of this tier.
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }
}

/// Byte offsets of the first matched phrase in the input text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSpan {
    pub start: usize,
    pub end: usize,
}

/// One scored detection instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub pattern_id: String,
    pub category: Category,
    pub label: String,
    /// Always within [0.05, 0.95] once the finding leaves the pipeline.
    pub confidence: f64,
    pub rationale: String,
    /// Ordered, duplicate-free.
    pub tags: Vec<String>,
    /// 1 (informational) to 4 (cluster alert).
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_span: Option<TextSpan>,
}

impl Finding {
    pub fn new(
        pattern_id: impl Into<String>,
        category: Category,
        label: impl Into<String>,
        confidence: f64,
        rationale: impl Into<String>,
        priority: u8,
    ) -> Self {
        Self {
            pattern_id: pattern_id.into(),
            category,
            label: label.into(),
            confidence: clamp_confidence(confidence),
            rationale: rationale.into(),
            tags: Vec::new(),
            priority: priority.clamp(1, 4),
            text_span: None,
        }
    }

    /// Add a tag unless already present.
    pub fn tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn with_span(mut self, span: Option<TextSpan>) -> Self {
        self.text_span = span;
        self
    }

    /// Confidence for threshold comparisons; non-finite counts as 0.
    pub fn effective_confidence(&self) -> f64 {
        if self.confidence.is_finite() {
            self.confidence
        } else {
            0.0
        }
    }
}
