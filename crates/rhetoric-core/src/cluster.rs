// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Cluster Alert Synthesizer
// ─────────────────────────────────────────────────────────────────────
//! Injects a synthetic alert when independent signals co-fire.
//!
//! Expects the calibrated list ranked by confidence. Text that hedges
//! like legitimate research gets the relaxed thresholds.

use serde::{Deserialize, Serialize};

use rhetoric_types::{Category, ClusterConfig, Finding, GuardResult, MatchMode};

use crate::matcher::PhraseSet;

pub const CLUSTER_ALERT_ID: &str = "cluster-alert";

const SCIENTIFIC_HEDGING: &[&str] = &[
    "requires further study",
    "more research is needed",
    "further research",
    "preliminary findings",
    "early evidence suggests",
    "peer-reviewed",
    "we don't yet know",
    "limited data",
];

/// Which threshold fired, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClusterTier {
    High,
    Medium,
    Volume,
}

impl ClusterTier {
    pub fn label(&self) -> &'static str {
        match self {
            ClusterTier::High => "HIGH",
            ClusterTier::Medium => "MEDIUM",
            ClusterTier::Volume => "VOLUME",
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ClusterTier::High => "cluster-high",
            ClusterTier::Medium => "cluster-medium",
            ClusterTier::Volume => "cluster-volume",
        }
    }
}

/// Counts the decision was based on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub high_count: usize,
    pub medium_count: usize,
    pub total: usize,
    pub relaxed_context: bool,
    pub tier: Option<ClusterTier>,
}

pub struct ClusterSynthesizer {
    config: ClusterConfig,
    hedging: PhraseSet,
}

impl ClusterSynthesizer {
    pub fn new(config: ClusterConfig, mode: MatchMode) -> GuardResult<Self> {
        Ok(Self {
            config,
            hedging: PhraseSet::new(SCIENTIFIC_HEDGING, mode)?,
        })
    }

    /// Count signals and pick the tier, without touching the list.
    pub fn evaluate(&self, findings: &[Finding], text: &str) -> ClusterSummary {
        let high_count = findings
            .iter()
            .filter(|f| f.effective_confidence() >= self.config.high_threshold)
            .count();
        let medium_count = findings
            .iter()
            .filter(|f| f.effective_confidence() >= self.config.medium_threshold)
            .count();
        let total = findings.len();
        let relaxed_context = self.hedging.any_match(&text.to_lowercase());
        let t = if relaxed_context {
            self.config.relaxed
        } else {
            self.config.strict
        };

        let tier = if total == 0 {
            None
        } else if high_count >= t.high_count {
            Some(ClusterTier::High)
        } else if medium_count >= t.medium_count {
            Some(ClusterTier::Medium)
        } else if total >= t.total {
            Some(ClusterTier::Volume)
        } else {
            None
        };

        ClusterSummary {
            high_count,
            medium_count,
            total,
            relaxed_context,
            tier,
        }
    }

    /// Tag cluster members and prepend the alert if a threshold is met.
    pub fn synthesize(&self, findings: &mut Vec<Finding>, text: &str) -> ClusterSummary {
        let summary = self.evaluate(findings, text);
        let Some(tier) = summary.tier else {
            return summary;
        };

        let max_confidence = findings
            .iter()
            .map(|f| f.effective_confidence())
            .fold(0.0, f64::max);

        for finding in findings.iter_mut() {
            if finding.effective_confidence() >= self.config.medium_threshold {
                finding.tag(CLUSTER_ALERT_ID);
                finding.priority = finding.priority.max(3);
            }
        }

        let mut alert = Finding::new(
            CLUSTER_ALERT_ID,
            Category::ClusterAlert,
            format!("Manipulation Cluster ({})", tier.label()),
            max_confidence,
            format!(
                "{} co-occurring manipulation signals ({} high-confidence, {} medium-confidence){}.",
                summary.total,
                summary.high_count,
                summary.medium_count,
                if summary.relaxed_context {
                    " despite research hedging"
                } else {
                    ""
                }
            ),
            4,
        );
        alert.tag(CLUSTER_ALERT_ID);
        alert.tag(tier.tag());

        log::info!(
            "Cluster alert {}: {} findings ({} high, {} medium)",
            tier.label(),
            summary.total,
            summary.high_count,
            summary.medium_count
        );
        findings.insert(0, alert);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synth() -> ClusterSynthesizer {
        ClusterSynthesizer::new(ClusterConfig::default(), MatchMode::WordBoundary).unwrap()
    }

    fn findings(confs: &[f64]) -> Vec<Finding> {
        confs
            .iter()
            .enumerate()
            .map(|(i, c)| Finding::new(format!("p{i}"), Category::Bandwagon, "l", *c, "r", 1))
            .collect()
    }

    #[test]
    fn test_empty_never_fires() {
        let mut list = Vec::new();
        let s = synth().synthesize(&mut list, "anything at all");
        assert!(s.tier.is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_two_high_fires_strict() {
        let mut list = findings(&[0.9, 0.85]);
        let s = synth().synthesize(&mut list, "plain text");
        assert_eq!(s.tier, Some(ClusterTier::High));
        assert_eq!(list.len(), 3);
        let alert = &list[0];
        assert_eq!(alert.pattern_id, CLUSTER_ALERT_ID);
        assert_eq!(alert.confidence, 0.9);
        assert_eq!(alert.priority, 4);
        assert!(alert.has_tag("cluster-high"));
        assert!(list[1].has_tag(CLUSTER_ALERT_ID));
        assert_eq!(list[1].priority, 3);
    }

    #[test]
    fn test_relaxed_requires_more() {
        let mut list = findings(&[0.9, 0.85]);
        let s = synth().synthesize(&mut list, "this requires further study");
        assert!(s.relaxed_context);
        assert!(s.tier.is_none());
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_medium_tier() {
        let mut list = findings(&[0.7, 0.6, 0.55]);
        let s = synth().synthesize(&mut list, "plain");
        assert_eq!(s.tier, Some(ClusterTier::Medium));
        assert!(list[0].label.contains("MEDIUM"));
    }

    #[test]
    fn test_volume_tier_only_tags_medium_members() {
        let mut list = findings(&[0.6, 0.4, 0.3, 0.2]);
        let s = synth().synthesize(&mut list, "plain");
        assert_eq!(s.tier, Some(ClusterTier::Volume));
        assert!(list[1].has_tag(CLUSTER_ALERT_ID));
        assert!(!list[2].has_tag(CLUSTER_ALERT_ID));
        assert_eq!(list[2].priority, 1);
    }

    #[test]
    fn test_below_thresholds() {
        let mut list = findings(&[0.8, 0.6, 0.3]);
        let s = synth().synthesize(&mut list, "plain");
        assert!(s.tier.is_none());
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_non_finite_counts_as_zero() {
        let mut list = findings(&[0.9]);
        let mut extra = findings(&[0.9]);
        extra[0].confidence = f64::NAN;
        list.extend(extra);
        let s = synth().evaluate(&list, "plain");
        assert_eq!(s.high_count, 1);
    }
}
