// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Pattern Detectors
// ─────────────────────────────────────────────────────────────────────
//! Detector trait plus the generic table-driven implementation.
//!
//! Detectors are pure functions of their input: no shared mutable
//! state, no I/O. They may run in any order or in parallel.

use std::sync::Arc;

use rhetoric_types::{clamp_confidence, Finding, GuardResult, CONFIDENCE_CEILING};

use crate::inquiry::InquiryContext;
use crate::patterns::{CompiledPattern, PatternTable};

/// Everything a detector sees for one analysis call.
#[derive(Debug, Clone, Copy)]
pub struct DetectionInput<'a> {
    pub text: &'a str,
    pub lowered: &'a str,
    pub context: &'a InquiryContext,
}

impl<'a> DetectionInput<'a> {
    /// Spans are reported only when lower-casing kept byte offsets
    /// aligned with the original text.
    pub fn spans_aligned(&self) -> bool {
        self.text.len() == self.lowered.len()
    }
}

/// Trait for detectors.
pub trait Detector: Send + Sync {
    fn id(&self) -> &str;
    fn detect(&self, input: &DetectionInput<'_>) -> GuardResult<Vec<Finding>>;
}

/// Boost parameters applied on top of a pattern's base confidence.
#[derive(Debug, Clone, Copy)]
pub struct Boosts {
    pub context_clue: f64,
    pub multi_indicator: f64,
}

impl Default for Boosts {
    fn default() -> Self {
        Self {
            context_clue: 0.1,
            multi_indicator: 0.05,
        }
    }
}

/// Generic matcher over one pattern definition.
pub struct PatternDetector {
    pattern: CompiledPattern,
    boosts: Boosts,
}

impl PatternDetector {
    pub fn new(pattern: CompiledPattern, boosts: Boosts) -> Self {
        Self { pattern, boosts }
    }

    /// One detector per table row, in table order.
    pub fn from_table(table: &PatternTable, boosts: Boosts) -> Vec<Arc<dyn Detector>> {
        table
            .patterns()
            .iter()
            .cloned()
            .map(|p| Arc::new(PatternDetector::new(p, boosts)) as Arc<dyn Detector>)
            .collect()
    }
}

impl Detector for PatternDetector {
    fn id(&self) -> &str {
        &self.pattern.definition.id
    }

    fn detect(&self, input: &DetectionInput<'_>) -> GuardResult<Vec<Finding>> {
        let def = &self.pattern.definition;

        let mut first = None;
        let mut hits = 0usize;
        for m in &self.pattern.indicators {
            if let Some(span) = m.find(input.lowered) {
                hits += 1;
                if first.is_none() {
                    first = Some((m.phrase(), span));
                }
            }
        }
        let Some((phrase, span)) = first else {
            return Ok(Vec::new());
        };

        let mut confidence = def.base_confidence();
        let clue_hit = self.pattern.clues.iter().any(|c| c.is_match(input.lowered));
        if clue_hit {
            confidence = (confidence + self.boosts.context_clue).min(CONFIDENCE_CEILING);
        }
        if hits > 1 {
            confidence = (confidence + self.boosts.multi_indicator).min(CONFIDENCE_CEILING);
        }
        let confidence = clamp_confidence(input.context.adjust(def.category, confidence));

        let mut finding = Finding::new(
            def.id.clone(),
            def.category,
            format!("{}: \"{}\"", def.category.display_name(), phrase),
            confidence,
            def.render_rationale(phrase, hits),
            def.severity.priority(),
        )
        .with_span(input.spans_aligned().then_some(span));
        finding.tag(def.category.as_str());
        finding.tag(format!("severity-{}", def.severity.as_str()));
        if clue_hit {
            finding.tag("context-clue");
        }
        if hits > 1 {
            finding.tag("multi-indicator");
        }
        Ok(vec![finding])
    }
}

/// Emits the pseudo-inquiry finding when the context gate opens.
pub struct PseudoInquiryDetector;

impl Detector for PseudoInquiryDetector {
    fn id(&self) -> &str {
        "pseudo-inquiry"
    }

    fn detect(&self, input: &DetectionInput<'_>) -> GuardResult<Vec<Finding>> {
        Ok(input.context.pseudo_inquiry_finding().into_iter().collect())
    }
}

/// Detector that calls a host-provided function.
///
/// Lets embedding applications add detectors without implementing
/// the trait, e.g. from the Python bindings.
type DetectFn = Box<dyn Fn(&DetectionInput<'_>) -> GuardResult<Vec<Finding>> + Send + Sync>;

pub struct ExternalDetector {
    id: String,
    detect_fn: DetectFn,
}

impl ExternalDetector {
    pub fn new(
        id: impl Into<String>,
        detect_fn: impl Fn(&DetectionInput<'_>) -> GuardResult<Vec<Finding>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            detect_fn: Box::new(detect_fn),
        }
    }
}

impl Detector for ExternalDetector {
    fn id(&self) -> &str {
        &self.id
    }

    fn detect(&self, input: &DetectionInput<'_>) -> GuardResult<Vec<Finding>> {
        (self.detect_fn)(input)
    }
}
