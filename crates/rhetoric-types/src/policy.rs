// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Rhetoric Kernel Policy & Telemetry Types
// ─────────────────────────────────────────────────────────────────────

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GuardError;

/// External severity tier used by the policy gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakesLevel {
    Low,
    Medium,
    High,
}

impl StakesLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StakesLevel::Low => "low",
            StakesLevel::Medium => "medium",
            StakesLevel::High => "high",
        }
    }
}

impl fmt::Display for StakesLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StakesLevel {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(StakesLevel::Low),
            "medium" => Ok(StakesLevel::Medium),
            "high" => Ok(StakesLevel::High),
            other => Err(GuardError::Validation(format!(
                "unknown stakes level '{other}' (expected low, medium, high)"
            ))),
        }
    }
}

/// Outcome of a policy gate evaluation for one finding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub trigger: bool,
    pub block: bool,
}

/// Summary emitted to telemetry sinks after each analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub triggered_pattern_ids: Vec<String>,
    pub stakes_level: Option<StakesLevel>,
    pub mode: String,
}
