// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Rhetoric Analyzer (Detection Pipeline)
// ─────────────────────────────────────────────────────────────────────
//! End-to-end manipulation analysis.
//!
//! text → inquiry context → detectors → merge + rank → calibration
//! → re-rank → cluster synthesis → findings.
//!
//! Everything up to the returned list is synchronous and in memory.
//! Feedback mutates the calibrator; persistence and telemetry are
//! fire-and-forget.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use rhetoric_types::{
    FeedbackRequest, Finding, GuardConfig, GuardResult, StakesLevel, TelemetryEvent,
};

use crate::aggregator::{is_ranked, sort_by_confidence, Aggregator};
use crate::calibrator::AdaptiveCalibrator;
use crate::cluster::{ClusterSummary, ClusterSynthesizer};
use crate::detector::{Boosts, DetectionInput, Detector, PatternDetector, PseudoInquiryDetector};
use crate::inquiry::{InquiryClassifier, InquiryContext};
use crate::patterns::PatternTable;
use crate::policy::{apply_policy_gate, PolicyGate};
use crate::telemetry::{TelemetryDispatcher, TelemetrySink};

/// Full result of a gated analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub findings: Vec<Finding>,
    pub context: InquiryContext,
    pub cluster: Option<ClusterSummary>,
    pub triggered_pattern_ids: Vec<String>,
    pub blocked_by: Option<String>,
}

pub struct RhetoricAnalyzer {
    config: GuardConfig,
    table: Arc<PatternTable>,
    classifier: InquiryClassifier,
    aggregator: Aggregator,
    calibrator: Arc<AdaptiveCalibrator>,
    cluster: ClusterSynthesizer,
    telemetry: TelemetryDispatcher,
}

impl RhetoricAnalyzer {
    /// Built-in pattern table and an in-memory calibrator.
    pub fn new(config: GuardConfig) -> GuardResult<Self> {
        let table = Arc::new(PatternTable::builtin(config.match_mode)?);
        let calibrator = Arc::new(AdaptiveCalibrator::new(config.calibration.clone()));
        Self::with_components(config, table, calibrator)
    }

    pub fn with_components(
        config: GuardConfig,
        table: Arc<PatternTable>,
        calibrator: Arc<AdaptiveCalibrator>,
    ) -> GuardResult<Self> {
        config.validate()?;
        let boosts = Boosts {
            context_clue: config.context_clue_boost,
            multi_indicator: config.multi_indicator_boost,
        };
        let mut detectors = PatternDetector::from_table(&table, boosts);
        detectors.push(Arc::new(PseudoInquiryDetector));

        Ok(Self {
            classifier: InquiryClassifier::new(config.match_mode)?,
            aggregator: Aggregator::new(detectors, config.parallel_detectors),
            cluster: ClusterSynthesizer::new(config.cluster.clone(), config.match_mode)?,
            telemetry: TelemetryDispatcher::new(),
            config,
            table,
            calibrator,
        })
    }

    /// Register an additional detector; it runs after the built-ins.
    pub fn add_detector(&mut self, detector: Arc<dyn Detector>) {
        self.aggregator.add(detector);
    }

    pub fn register_telemetry(&self, sink: Arc<dyn TelemetrySink>) {
        self.telemetry.register(sink);
    }

    fn is_too_short(&self, text: &str) -> bool {
        text.trim().chars().count() < self.config.min_input_chars
    }

    /// Core pipeline, no telemetry.
    fn run(&self, text: &str) -> (Vec<Finding>, InquiryContext, Option<ClusterSummary>) {
        if self.is_too_short(text) {
            return (Vec::new(), InquiryContext::default(), None);
        }
        let lowered = text.to_lowercase();
        let context = self.classifier.classify(&lowered);
        let input = DetectionInput {
            text,
            lowered: &lowered,
            context: &context,
        };

        let mut findings = self.aggregator.run(&input);
        self.calibrator.apply(&mut findings);
        sort_by_confidence(&mut findings);
        debug_assert!(is_ranked(&findings));

        let summary = self.cluster.synthesize(&mut findings, text);
        log::debug!(
            "Analyzed {} chars: {} finding(s), cluster={:?}",
            text.len(),
            findings.len(),
            summary.tier
        );
        (findings, context, Some(summary))
    }

    /// Analyze text and return ranked findings.
    ///
    /// Inputs shorter than `min_input_chars` (after trimming) return an
    /// empty list.
    pub fn analyze(&self, text: &str) -> Vec<Finding> {
        let (findings, _, _) = self.run(text);
        self.emit_telemetry(
            findings.iter().map(|f| f.pattern_id.clone()).collect(),
            None,
        );
        findings
    }

    /// Analyze, then pass the result through a policy gate.
    pub fn analyze_gated(
        &self,
        text: &str,
        stakes: StakesLevel,
        gate: &dyn PolicyGate,
    ) -> AnalysisReport {
        let (findings, context, cluster) = self.run(text);
        let outcome = apply_policy_gate(findings, stakes, gate);
        self.emit_telemetry(outcome.triggered_pattern_ids.clone(), Some(stakes));
        AnalysisReport {
            findings: outcome.findings,
            context,
            cluster,
            triggered_pattern_ids: outcome.triggered_pattern_ids,
            blocked_by: outcome.blocked_by,
        }
    }

    fn emit_telemetry(&self, mut ids: Vec<String>, stakes: Option<StakesLevel>) {
        if self.telemetry.sink_count() == 0 {
            return;
        }
        ids.dedup();
        self.telemetry.emit(&TelemetryEvent {
            triggered_pattern_ids: ids,
            stakes_level: stakes,
            mode: self.config.match_mode.as_str().to_string(),
        });
    }

    /// Apply user feedback; returns the adjusted confidence.
    pub fn submit_feedback(&self, request: &FeedbackRequest) -> f64 {
        self.calibrator.submit(request)
    }

    pub fn pattern_adjustment(&self, pattern_id: &str) -> f64 {
        self.calibrator.pattern_adjustment(pattern_id)
    }

    pub fn reset_pattern(&self, pattern_id: &str) -> bool {
        self.calibrator.reset_pattern(pattern_id)
    }

    pub fn calibrator(&self) -> &Arc<AdaptiveCalibrator> {
        &self.calibrator
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }
}
