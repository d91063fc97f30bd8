// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Rhetoric Kernel Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Data model, configuration, and error hierarchy for the Rhetoric
//! Kernel, the manipulation-pattern detector for Director-Class AI.

pub mod config;
pub mod error;
pub mod feedback;
pub mod finding;
pub mod policy;

pub use config::{
    CalibrationConfig, ClusterConfig, ClusterThresholds, GuardConfig, MatchMode,
    MAX_ADJUSTMENT_LIMIT,
};
pub use error::{GuardError, GuardResult};
pub use feedback::{AdjustmentRecord, FeedbackEvent, FeedbackKind, FeedbackRequest};
pub use finding::{
    clamp_confidence, Category, Finding, Severity, TextSpan, CONFIDENCE_CEILING,
    CONFIDENCE_FLOOR,
};
pub use policy::{PolicyDecision, StakesLevel, TelemetryEvent};
