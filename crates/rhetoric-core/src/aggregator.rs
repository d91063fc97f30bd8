// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Finding Aggregator
// ─────────────────────────────────────────────────────────────────────
//! Runs every detector, merges their findings, ranks by confidence.
//!
//! Each detector is isolated: an `Err` or a panic is logged and
//! replaced by an empty contribution. The rest of the batch survives.
//! Every finding is re-clamped on the way in, since detectors may be
//! host-provided and `Finding` fields are public.

use std::cmp::Ordering;
use std::sync::Arc;

use rayon::prelude::*;

use rhetoric_types::{clamp_confidence, Finding};

use crate::detector::{DetectionInput, Detector};

pub struct Aggregator {
    detectors: Vec<Arc<dyn Detector>>,
    parallel: bool,
}

impl Aggregator {
    pub fn new(detectors: Vec<Arc<dyn Detector>>, parallel: bool) -> Self {
        Self {
            detectors,
            parallel,
        }
    }

    pub fn add(&mut self, detector: Arc<dyn Detector>) {
        self.detectors.push(detector);
    }

    pub fn detector_ids(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    /// Run all detectors and return findings ranked by confidence.
    ///
    /// Concatenation follows registration order in both sequential and
    /// parallel mode, so the stable sort is deterministic.
    pub fn run(&self, input: &DetectionInput<'_>) -> Vec<Finding> {
        let per_detector: Vec<Vec<Finding>> = if self.parallel {
            self.detectors
                .par_iter()
                .map(|d| run_isolated(d.as_ref(), input))
                .collect()
        } else {
            self.detectors
                .iter()
                .map(|d| run_isolated(d.as_ref(), input))
                .collect()
        };
        let mut findings: Vec<Finding> = per_detector.into_iter().flatten().collect();
        findings.iter_mut().for_each(normalize);
        sort_by_confidence(&mut findings);
        findings
    }
}

fn run_isolated(detector: &dyn Detector, input: &DetectionInput<'_>) -> Vec<Finding> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| detector.detect(input))) {
        Ok(Ok(findings)) => findings,
        Ok(Err(e)) => {
            log::warn!("Detector '{}' failed, skipping: {e}", detector.id());
            Vec::new()
        }
        Err(_) => {
            log::error!("Detector '{}' panicked, skipping", detector.id());
            Vec::new()
        }
    }
}

/// Pull confidence into [0.05, 0.95] and priority into 1..=4.
fn normalize(finding: &mut Finding) {
    let clamped = clamp_confidence(finding.confidence);
    if clamped != finding.confidence {
        log::warn!(
            "Finding '{}' confidence {} outside band, clamped to {clamped}",
            finding.pattern_id,
            finding.confidence
        );
        finding.confidence = clamped;
    }
    finding.priority = finding.priority.clamp(1, 4);
}

/// Stable sort, highest confidence first. Non-finite values sort last.
pub fn sort_by_confidence(findings: &mut [Finding]) {
    findings.sort_by(|a, b| {
        b.effective_confidence()
            .partial_cmp(&a.effective_confidence())
            .unwrap_or(Ordering::Equal)
    });
}

/// True when confidences never increase along the list.
pub fn is_ranked(findings: &[Finding]) -> bool {
    findings
        .windows(2)
        .all(|w| w[0].effective_confidence() >= w[1].effective_confidence())
}
