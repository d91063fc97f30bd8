// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Policy Gate Interface
// ─────────────────────────────────────────────────────────────────────
//! Post-processing filter owned by policy configuration.
//!
//! The pipeline never consults the gate itself. Callers that want
//! gating run [`apply_policy_gate`] on the final list: triggered
//! findings are recorded, and the first `block` keeps that finding and
//! drops everything after it.

use serde::{Deserialize, Serialize};

use rhetoric_types::{Category, Finding, PolicyDecision, StakesLevel};

/// Trait for policy gates.
pub trait PolicyGate: Send + Sync {
    fn evaluate(&self, category: Category, confidence: f64, stakes: StakesLevel) -> PolicyDecision;
}

/// Trigger/block confidence thresholds for one stakes level.
/// `block = None` never blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakesThresholds {
    pub trigger: f64,
    pub block: Option<f64>,
}

/// Threshold gate: higher stakes trigger and block earlier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdPolicyGate {
    pub low: StakesThresholds,
    pub medium: StakesThresholds,
    pub high: StakesThresholds,
    /// Categories that may trigger but never block.
    #[serde(default)]
    pub advisory_only: Vec<Category>,
}

impl Default for ThresholdPolicyGate {
    fn default() -> Self {
        Self {
            low: StakesThresholds {
                trigger: 0.75,
                block: None,
            },
            medium: StakesThresholds {
                trigger: 0.6,
                block: Some(0.9),
            },
            high: StakesThresholds {
                trigger: 0.45,
                block: Some(0.8),
            },
            advisory_only: vec![Category::LoadedLanguage, Category::Absolutism],
        }
    }
}

impl ThresholdPolicyGate {
    fn thresholds(&self, stakes: StakesLevel) -> StakesThresholds {
        match stakes {
            StakesLevel::Low => self.low,
            StakesLevel::Medium => self.medium,
            StakesLevel::High => self.high,
        }
    }
}

impl PolicyGate for ThresholdPolicyGate {
    fn evaluate(&self, category: Category, confidence: f64, stakes: StakesLevel) -> PolicyDecision {
        let t = self.thresholds(stakes);
        let trigger = confidence >= t.trigger;
        let block = trigger
            && !self.advisory_only.contains(&category)
            && t.block.is_some_and(|b| confidence >= b);
        PolicyDecision { trigger, block }
    }
}

/// Gate backed by a host-provided function.
type GateFn = Box<dyn Fn(Category, f64, StakesLevel) -> PolicyDecision + Send + Sync>;

pub struct ExternalPolicyGate {
    gate_fn: GateFn,
}

impl ExternalPolicyGate {
    pub fn new(
        gate_fn: impl Fn(Category, f64, StakesLevel) -> PolicyDecision + Send + Sync + 'static,
    ) -> Self {
        Self {
            gate_fn: Box::new(gate_fn),
        }
    }
}

impl PolicyGate for ExternalPolicyGate {
    fn evaluate(&self, category: Category, confidence: f64, stakes: StakesLevel) -> PolicyDecision {
        (self.gate_fn)(category, confidence, stakes)
    }
}

/// Result of running the gate over a finding list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateOutcome {
    pub findings: Vec<Finding>,
    pub triggered_pattern_ids: Vec<String>,
    /// Pattern id of the finding that blocked, if any.
    pub blocked_by: Option<String>,
}

pub fn apply_policy_gate(
    findings: Vec<Finding>,
    stakes: StakesLevel,
    gate: &dyn PolicyGate,
) -> GateOutcome {
    let mut kept = Vec::with_capacity(findings.len());
    let mut triggered = Vec::new();
    let mut blocked_by = None;

    for mut finding in findings {
        let decision = gate.evaluate(finding.category, finding.effective_confidence(), stakes);
        if decision.trigger {
            finding.tag("policy-trigger");
            if !triggered.contains(&finding.pattern_id) {
                triggered.push(finding.pattern_id.clone());
            }
        }
        if decision.block {
            finding.tag("policy-block");
            blocked_by = Some(finding.pattern_id.clone());
            kept.push(finding);
            break;
        }
        kept.push(finding);
    }

    if let Some(id) = &blocked_by {
        log::info!("Policy gate blocked at '{id}' ({stakes} stakes)");
    }

    GateOutcome {
        findings: kept,
        triggered_pattern_ids: triggered,
        blocked_by,
    }
}
