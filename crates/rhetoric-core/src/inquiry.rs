// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Inquiry-Context Classifier
// ─────────────────────────────────────────────────────────────────────
//! Separates legitimate scientific discourse from pseudo-inquiry.
//!
//! Two disjoint phrase catalogs feed six booleans. The context damps
//! or boosts inquiry-sensitive findings and gates the dedicated
//! pseudo-inquiry finding.

use serde::{Deserialize, Serialize};

use rhetoric_types::{clamp_confidence, Category, Finding, GuardResult, MatchMode};

use crate::matcher::PhraseSet;

const METHODOLOGY: &[&str] = &[
    "methodology",
    "peer-reviewed",
    "peer reviewed",
    "randomized",
    "controlled trial",
    "control group",
    "double-blind",
    "sample size",
    "meta-analysis",
    "replicated",
    "statistically significant",
    "confidence interval",
];

const HUMILITY: &[&str] = &[
    "requires further study",
    "more research is needed",
    "further research",
    "i could be wrong",
    "we don't know",
    "it's unclear",
    "remains uncertain",
    "limited evidence",
    "not yet known",
    "preliminary",
];

const PROCESS: &[&str] = &[
    "let's examine",
    "let us examine",
    "step by step",
    "evaluate the evidence",
    "weigh the evidence",
    "consider the alternatives",
    "how do we know",
    "test the hypothesis",
    "review the data",
];

const HIDDEN_AGENDA: &[&str] = &[
    "don't want you to know",
    "hidden agenda",
    "the real reason",
    "behind closed doors",
    "secretly",
];

const IMPLIED_CONSPIRACY: &[&str] = &[
    "cover-up",
    "cover up",
    "wake up",
    "do your own research",
    "connect the dots",
    "the truth is out there",
    "they are hiding",
];

const RHETORICAL_MANIPULATION: &[&str] = &[
    "just asking questions",
    "isn't it strange",
    "isn't it interesting",
    "makes you wonder",
    "ask yourself why",
    "coincidence?",
    "why won't they",
];

/// Per-call classification of the input's discourse markers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquiryContext {
    pub has_methodology_language: bool,
    pub has_intellectual_humility: bool,
    pub has_process_orientation: bool,
    pub has_hidden_agenda: bool,
    pub has_implied_conspiracy: bool,
    pub has_rhetorical_manipulation: bool,
}

impl InquiryContext {
    pub fn has_legitimate_marker(&self) -> bool {
        self.has_methodology_language
            || self.has_intellectual_humility
            || self.has_process_orientation
    }

    pub fn has_manipulative_marker(&self) -> bool {
        self.has_hidden_agenda || self.has_implied_conspiracy || self.has_rhetorical_manipulation
    }

    /// Net confidence shift for a finding of `category`.
    pub fn confidence_shift(&self, category: Category) -> f64 {
        if !category.is_inquiry_sensitive() {
            return 0.0;
        }
        let mut shift = 0.0;
        if self.has_methodology_language {
            shift -= 0.4;
        }
        if self.has_intellectual_humility {
            shift -= 0.3;
        }
        if self.has_process_orientation {
            shift -= 0.2;
        }
        if self.has_hidden_agenda {
            shift += 0.3;
        }
        if self.has_implied_conspiracy {
            shift += 0.4;
        }
        if self.has_rhetorical_manipulation {
            shift += 0.2;
        }
        // Scientific hedging must not read as vague authority.
        if category == Category::VagueAuthority
            && (self.has_methodology_language || self.has_process_orientation)
        {
            shift -= 0.5;
        }
        shift
    }

    /// Apply the shift and clamp to [0.05, 0.95].
    pub fn adjust(&self, category: Category, confidence: f64) -> f64 {
        clamp_confidence(confidence + self.confidence_shift(category))
    }

    /// The pseudo-inquiry finding, if manipulative markers appear with
    /// no legitimate marker alongside them.
    pub fn pseudo_inquiry_finding(&self) -> Option<Finding> {
        if !self.has_manipulative_marker() || self.has_legitimate_marker() {
            return None;
        }
        let (marker, confidence, rationale) = if self.has_implied_conspiracy {
            (
                "implied-conspiracy",
                0.85,
                "Questions are framed to imply a concealed conspiracy rather than to seek an answer.",
            )
        } else if self.has_hidden_agenda {
            (
                "hidden-agenda",
                0.8,
                "Questions presuppose a hidden agenda without evidence for one.",
            )
        } else {
            (
                "rhetorical-manipulation",
                0.75,
                "Rhetorical questions insinuate a conclusion while avoiding a claim.",
            )
        };
        let mut finding = Finding::new(
            "pseudo-inquiry",
            Category::PseudoInquiry,
            format!("{}: {}", Category::PseudoInquiry.display_name(), marker.replace('-', " ")),
            confidence,
            rationale,
            3,
        );
        finding.tag(Category::PseudoInquiry.as_str());
        finding.tag(marker);
        Some(finding)
    }
}

/// Compiled marker catalogs.
#[derive(Debug, Clone)]
pub struct InquiryClassifier {
    methodology: PhraseSet,
    humility: PhraseSet,
    process: PhraseSet,
    hidden_agenda: PhraseSet,
    implied_conspiracy: PhraseSet,
    rhetorical_manipulation: PhraseSet,
}

impl InquiryClassifier {
    pub fn new(mode: MatchMode) -> GuardResult<Self> {
        Ok(Self {
            methodology: PhraseSet::new(METHODOLOGY, mode)?,
            humility: PhraseSet::new(HUMILITY, mode)?,
            process: PhraseSet::new(PROCESS, mode)?,
            hidden_agenda: PhraseSet::new(HIDDEN_AGENDA, mode)?,
            implied_conspiracy: PhraseSet::new(IMPLIED_CONSPIRACY, mode)?,
            rhetorical_manipulation: PhraseSet::new(RHETORICAL_MANIPULATION, mode)?,
        })
    }

    /// Classify already lower-cased text.
    pub fn classify(&self, lowered: &str) -> InquiryContext {
        InquiryContext {
            has_methodology_language: self.methodology.any_match(lowered),
            has_intellectual_humility: self.humility.any_match(lowered),
            has_process_orientation: self.process.any_match(lowered),
            has_hidden_agenda: self.hidden_agenda.any_match(lowered),
            has_implied_conspiracy: self.implied_conspiracy.any_match(lowered),
            has_rhetorical_manipulation: self.rhetorical_manipulation.any_match(lowered),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> InquiryContext {
        InquiryClassifier::new(MatchMode::WordBoundary)
            .unwrap()
            .classify(&text.to_lowercase())
    }

    #[test]
    fn test_catalogs_are_disjoint() {
        let legit: Vec<&str> = [METHODOLOGY, HUMILITY, PROCESS].concat();
        let manip: Vec<&str> = [HIDDEN_AGENDA, IMPLIED_CONSPIRACY, RHETORICAL_MANIPULATION].concat();
        for p in &legit {
            assert!(!manip.contains(p), "{p} in both catalogs");
        }
    }

    #[test]
    fn test_plain_text_has_no_markers() {
        let ctx = classify("The weather is mild today.");
        assert_eq!(ctx, InquiryContext::default());
    }

    #[test]
    fn test_humility_detected() {
        let ctx = classify("This requires further study.");
        assert!(ctx.has_intellectual_humility);
        assert!(ctx.has_legitimate_marker());
    }

    #[test]
    fn test_damping_stacks() {
        let ctx = InquiryContext {
            has_methodology_language: true,
            has_intellectual_humility: true,
            ..Default::default()
        };
        let shift = ctx.confidence_shift(Category::DataLessClaim);
        assert!((shift + 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_vague_authority_extra_penalty() {
        let ctx = InquiryContext {
            has_process_orientation: true,
            ..Default::default()
        };
        assert!((ctx.confidence_shift(Category::VagueAuthority) + 0.7).abs() < 1e-9);
        assert!((ctx.confidence_shift(Category::SpeculativeClaim) + 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_boosting() {
        let ctx = InquiryContext {
            has_hidden_agenda: true,
            has_implied_conspiracy: true,
            has_rhetorical_manipulation: true,
            ..Default::default()
        };
        assert!((ctx.confidence_shift(Category::VagueAuthority) - 0.9).abs() < 1e-9);
        assert_eq!(ctx.adjust(Category::VagueAuthority, 0.7), 0.95);
    }

    #[test]
    fn test_insensitive_category_unchanged() {
        let ctx = InquiryContext {
            has_methodology_language: true,
            ..Default::default()
        };
        assert_eq!(ctx.adjust(Category::FalseUrgency, 0.85), 0.85);
    }

    #[test]
    fn test_adjust_clamps_floor() {
        let ctx = InquiryContext {
            has_methodology_language: true,
            has_intellectual_humility: true,
            has_process_orientation: true,
            ..Default::default()
        };
        assert_eq!(ctx.adjust(Category::VagueAuthority, 0.55), 0.05);
    }

    #[test]
    fn test_pseudo_inquiry_priority_order() {
        let ctx = classify("Isn't it strange? Wake up. They don't want you to know.");
        let f = ctx.pseudo_inquiry_finding().unwrap();
        assert_eq!(f.confidence, 0.85);
        assert!(f.has_tag("implied-conspiracy"));

        let ctx = classify("Behind closed doors, isn't it strange?");
        let f = ctx.pseudo_inquiry_finding().unwrap();
        assert_eq!(f.confidence, 0.8);

        let ctx = classify("Makes you wonder.");
        let f = ctx.pseudo_inquiry_finding().unwrap();
        assert_eq!(f.confidence, 0.75);
    }

    #[test]
    fn test_pseudo_inquiry_suppressed_by_legitimate_marker() {
        let ctx = classify("Makes you wonder, but more research is needed.");
        assert!(ctx.has_rhetorical_manipulation);
        assert!(ctx.pseudo_inquiry_finding().is_none());
    }

    #[test]
    fn test_no_pseudo_inquiry_without_markers() {
        assert!(InquiryContext::default().pseudo_inquiry_finding().is_none());
    }
}
