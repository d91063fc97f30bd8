// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Rhetoric Kernel Core Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Manipulation pattern detection and feedback-calibrated confidence
//! scoring for text.
//!
//! The analysis path (detection + calibration + cluster synthesis) is
//! synchronous and in memory. Feedback updates a bounded per-pattern
//! adjustment that later analyses read.
//!
//! # Invariants
//!
//! 1. **Confidence band**: every finding that leaves the pipeline has
//!    confidence in `[0.05, 0.95]`. Non-finite values are clamped, never
//!    propagated.
//!
//! 2. **Ranking**: detector output is ranked by confidence after
//!    calibration. Only the cluster alert may precede a higher-ranked
//!    finding, and it always sits at index 0.
//!
//! 3. **Bounded learning**: a pattern's cumulative adjustment factor
//!    never leaves `±max_adjustment`. Concurrent feedback on the same
//!    pattern is serialized per record; no update is lost.
//!
//! 4. **Fault isolation**: a detector or telemetry sink that errors or
//!    panics contributes nothing. The rest of the batch survives.

pub mod aggregator;
pub mod analyzer;
pub mod calibrator;
pub mod cluster;
pub mod detector;
pub mod inquiry;
pub mod matcher;
pub mod patterns;
pub mod persistence;
pub mod policy;
pub mod store;
pub mod telemetry;

pub use aggregator::Aggregator;
pub use analyzer::{AnalysisReport, RhetoricAnalyzer};
pub use calibrator::{classify_feedback, feedback_intensity, AdaptiveCalibrator, CalibrationStats};
pub use cluster::{ClusterSummary, ClusterSynthesizer, ClusterTier, CLUSTER_ALERT_ID};
pub use detector::{Boosts, DetectionInput, Detector, ExternalDetector, PatternDetector};
pub use inquiry::{InquiryClassifier, InquiryContext};
pub use patterns::{ConfidenceBands, PatternDefinition, PatternTable};
pub use persistence::{JsonFilePersistence, PersistenceBackend, PersistenceWriter};
pub use policy::{apply_policy_gate, ExternalPolicyGate, GateOutcome, PolicyGate, ThresholdPolicyGate};
pub use store::{AdjustmentStore, InMemoryAdjustmentStore};
pub use telemetry::{LogTelemetrySink, TelemetryDispatcher, TelemetrySink};
