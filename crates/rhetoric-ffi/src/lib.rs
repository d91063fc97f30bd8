// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Rhetoric Kernel PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied; PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the Rust rhetoric analyzer.
//!
//! Exposes `RustRhetoricAnalyzer`, `RhetoricConfig`, `Finding`, and
//! `AnalysisReport` to Python via PyO3.
//!
//! # FFI Safety
//!
//! - Analysis runs with the GIL released; Python callbacks re-acquire it
//!   via `Python::with_gil`, so parallel detectors cannot deadlock.
//! - Python exceptions in callbacks become detector errors (skipped) or
//!   dropped telemetry events. They never abort an analysis.
//! - All config validated before storage (`GuardConfig::validate()`).
//!
//! Install: `pip install -e crates/rhetoric-ffi` (requires maturin).
//!
//! Usage from Python:
//! ```python
//! from rhetoric_kernel import RustRhetoricAnalyzer
//!
//! analyzer = RustRhetoricAnalyzer()
//! for f in analyzer.analyze("Scientists claim the earth is flat."):
//!     print(f.pattern_id, f.confidence)
//! ```

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use rhetoric_core::{
    classify_feedback, AdaptiveCalibrator, AnalysisReport, ExternalDetector, InMemoryAdjustmentStore,
    JsonFilePersistence, PatternTable, RhetoricAnalyzer, TelemetrySink, ThresholdPolicyGate,
};
use rhetoric_types::{
    Category, FeedbackRequest, Finding, GuardConfig, GuardError, MatchMode, StakesLevel,
    TelemetryEvent,
};

fn value_err(e: GuardError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_match_mode(mode: &str) -> PyResult<MatchMode> {
    serde_json::from_value(serde_json::Value::String(mode.to_string())).map_err(|_| {
        PyValueError::new_err(format!(
            "match_mode must be 'word_boundary' or 'legacy_substring', got '{mode}'"
        ))
    })
}

fn parse_category(category: &str) -> PyResult<Category> {
    serde_json::from_value(serde_json::Value::String(category.to_string()))
        .map_err(|_| PyValueError::new_err(format!("unknown category '{category}'")))
}

// ─── PyGuardConfig ──────────────────────────────────────────────────

/// Python-visible analyzer configuration.
#[pyclass(name = "RhetoricConfig")]
#[derive(Clone)]
struct PyGuardConfig {
    inner: GuardConfig,
}

#[pymethods]
impl PyGuardConfig {
    #[new]
    #[pyo3(signature = (
        min_input_chars = 3,
        match_mode = "word_boundary",
        context_clue_boost = 0.1,
        multi_indicator_boost = 0.05,
        parallel_detectors = false,
        max_adjustment = 0.3,
        history_cap = 50,
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        min_input_chars: usize,
        match_mode: &str,
        context_clue_boost: f64,
        multi_indicator_boost: f64,
        parallel_detectors: bool,
        max_adjustment: f64,
        history_cap: usize,
    ) -> PyResult<Self> {
        let mut config = GuardConfig {
            min_input_chars,
            match_mode: parse_match_mode(match_mode)?,
            context_clue_boost,
            multi_indicator_boost,
            parallel_detectors,
            ..Default::default()
        };
        config.calibration.max_adjustment = max_adjustment;
        config.calibration.history_cap = history_cap;
        config.validate().map_err(value_err)?;
        Ok(Self { inner: config })
    }

    /// Construct from JSON string.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config = GuardConfig::from_json(json).map_err(value_err)?;
        config.validate().map_err(value_err)?;
        Ok(Self { inner: config })
    }

    fn __repr__(&self) -> String {
        format!(
            "RhetoricConfig(match_mode={}, min_input_chars={}, max_adjustment={})",
            self.inner.match_mode.as_str(),
            self.inner.min_input_chars,
            self.inner.calibration.max_adjustment
        )
    }
}

// ─── PyFinding ──────────────────────────────────────────────────────

/// Python-visible finding.
#[pyclass(name = "Finding")]
#[derive(Clone)]
struct PyFinding {
    inner: Finding,
}

#[pymethods]
impl PyFinding {
    #[getter]
    fn pattern_id(&self) -> &str {
        &self.inner.pattern_id
    }

    #[getter]
    fn category(&self) -> &str {
        self.inner.category.as_str()
    }

    #[getter]
    fn label(&self) -> &str {
        &self.inner.label
    }

    #[getter]
    fn confidence(&self) -> f64 {
        self.inner.confidence
    }

    #[getter]
    fn rationale(&self) -> &str {
        &self.inner.rationale
    }

    #[getter]
    fn tags(&self) -> Vec<String> {
        self.inner.tags.clone()
    }

    #[getter]
    fn priority(&self) -> u8 {
        self.inner.priority
    }

    /// Byte offsets `(start, end)` of the first indicator, if known.
    #[getter]
    fn text_span(&self) -> Option<(usize, usize)> {
        self.inner.text_span.map(|s| (s.start, s.end))
    }

    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        finding_dict(py, &self.inner)
    }

    fn __repr__(&self) -> String {
        format!(
            "Finding(pattern_id={}, category={}, confidence={:.4}, priority={})",
            self.inner.pattern_id,
            self.inner.category.as_str(),
            self.inner.confidence,
            self.inner.priority
        )
    }
}

fn finding_dict<'py>(py: Python<'py>, f: &Finding) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("pattern_id", &f.pattern_id)?;
    dict.set_item("category", f.category.as_str())?;
    dict.set_item("label", &f.label)?;
    dict.set_item("confidence", f.confidence)?;
    dict.set_item("rationale", &f.rationale)?;
    dict.set_item("tags", f.tags.clone())?;
    dict.set_item("priority", f.priority)?;
    dict.set_item("text_span", f.text_span.map(|s| (s.start, s.end)))?;
    Ok(dict)
}

fn wrap_findings(findings: Vec<Finding>) -> Vec<PyFinding> {
    findings.into_iter().map(|inner| PyFinding { inner }).collect()
}

// ─── PyAnalysisReport ───────────────────────────────────────────────

/// Result of a gated analysis.
#[pyclass(name = "AnalysisReport")]
#[derive(Clone)]
struct PyAnalysisReport {
    inner: AnalysisReport,
}

#[pymethods]
impl PyAnalysisReport {
    #[getter]
    fn findings(&self) -> Vec<PyFinding> {
        wrap_findings(self.inner.findings.clone())
    }

    #[getter]
    fn triggered_pattern_ids(&self) -> Vec<String> {
        self.inner.triggered_pattern_ids.clone()
    }

    #[getter]
    fn blocked_by(&self) -> Option<String> {
        self.inner.blocked_by.clone()
    }

    #[getter]
    fn blocked(&self) -> bool {
        self.inner.blocked_by.is_some()
    }

    /// "HIGH", "MEDIUM", "VOLUME", or None.
    #[getter]
    fn cluster_tier(&self) -> Option<&'static str> {
        self.inner.cluster.and_then(|c| c.tier).map(|t| t.label())
    }

    fn to_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        let findings = self
            .inner
            .findings
            .iter()
            .map(|f| finding_dict(py, f))
            .collect::<PyResult<Vec<_>>>()?;
        dict.set_item("findings", findings)?;
        dict.set_item("triggered_pattern_ids", self.inner.triggered_pattern_ids.clone())?;
        dict.set_item("blocked_by", self.inner.blocked_by.clone())?;
        dict.set_item("cluster_tier", self.cluster_tier())?;
        Ok(dict)
    }

    fn __repr__(&self) -> String {
        format!(
            "AnalysisReport(findings={}, triggered={}, blocked_by={:?})",
            self.inner.findings.len(),
            self.inner.triggered_pattern_ids.len(),
            self.inner.blocked_by
        )
    }
}

// ─── Python telemetry sink ──────────────────────────────────────────

struct PyTelemetrySink {
    callback: PyObject,
}

impl TelemetrySink for PyTelemetrySink {
    fn record(&self, event: &TelemetryEvent) {
        Python::with_gil(|py| {
            let dict = PyDict::new(py);
            let built = dict
                .set_item("triggered_pattern_ids", event.triggered_pattern_ids.clone())
                .and_then(|_| {
                    dict.set_item("stakes_level", event.stakes_level.map(|s| s.as_str()))
                })
                .and_then(|_| dict.set_item("mode", &event.mode));
            if let Err(e) = built.and_then(|_| self.callback.call1(py, (dict,)).map(|_| ())) {
                log::warn!("Python telemetry callback failed: {e}");
            }
        });
    }
}

// ─── RustRhetoricAnalyzer ───────────────────────────────────────────

/// Manipulation analyzer with feedback-driven calibration.
///
/// `storage_dir` enables durable adjustment records (one JSON file per
/// pattern). `policy_json` overrides the default threshold gate used by
/// `analyze_gated`.
#[pyclass(name = "RustRhetoricAnalyzer")]
struct PyRhetoricAnalyzer {
    inner: RhetoricAnalyzer,
    gate: ThresholdPolicyGate,
}

#[pymethods]
impl PyRhetoricAnalyzer {
    #[new]
    #[pyo3(signature = (config = None, storage_dir = None, patterns_json = None, policy_json = None))]
    fn new(
        config: Option<PyGuardConfig>,
        storage_dir: Option<&str>,
        patterns_json: Option<&str>,
        policy_json: Option<&str>,
    ) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner).unwrap_or_default();
        let table = match patterns_json {
            Some(json) => PatternTable::from_json(json, cfg.match_mode),
            None => PatternTable::builtin(cfg.match_mode),
        }
        .map_err(value_err)?;
        let calibrator = match storage_dir {
            Some(dir) => {
                let backend = JsonFilePersistence::open(dir).map_err(value_err)?;
                AdaptiveCalibrator::with_persistence(
                    cfg.calibration.clone(),
                    Arc::new(InMemoryAdjustmentStore::new()),
                    Arc::new(backend),
                )
                .map_err(value_err)?
            }
            None => AdaptiveCalibrator::new(cfg.calibration.clone()),
        };
        let gate = match policy_json {
            Some(json) => serde_json::from_str(json)
                .map_err(|e| PyValueError::new_err(format!("policy JSON: {e}")))?,
            None => ThresholdPolicyGate::default(),
        };
        let inner = RhetoricAnalyzer::with_components(cfg, Arc::new(table), Arc::new(calibrator))
            .map_err(value_err)?;
        Ok(Self { inner, gate })
    }

    /// Analyze text.
    ///
    /// Returns:
    ///     Findings ranked by confidence; a cluster alert, if any, first.
    fn analyze(&self, py: Python<'_>, text: &str) -> Vec<PyFinding> {
        let inner = &self.inner;
        wrap_findings(py.allow_threads(|| inner.analyze(text)))
    }

    /// Analyze, then apply the policy gate at the given stakes level
    /// ("low", "medium", "high").
    #[pyo3(signature = (text, stakes = "medium"))]
    fn analyze_gated(&self, py: Python<'_>, text: &str, stakes: &str) -> PyResult<PyAnalysisReport> {
        let stakes = StakesLevel::from_str(stakes).map_err(value_err)?;
        let inner = &self.inner;
        let gate = &self.gate;
        let report = py.allow_threads(|| inner.analyze_gated(text, stakes, gate));
        Ok(PyAnalysisReport { inner: report })
    }

    /// Register a Python detector.
    ///
    /// Args:
    ///     detector_id: Pattern id reported on its findings.
    ///     category: Category slug, e.g. "loaded-language".
    ///     callback: Callable[[str], list[tuple[str, float, str]]]
    ///         returning (label, confidence, rationale) per hit.
    #[pyo3(signature = (detector_id, category, callback, priority = 2))]
    fn add_detector(
        &mut self,
        detector_id: String,
        category: &str,
        callback: PyObject,
        priority: u8,
    ) -> PyResult<()> {
        let category = parse_category(category)?;
        let id = detector_id.clone();
        let detector = ExternalDetector::new(detector_id, move |input| {
            let hits = Python::with_gil(|py| {
                callback
                    .call1(py, (input.text,))
                    .and_then(|r| r.extract::<Vec<(String, f64, String)>>(py))
            })
            .map_err(|e| GuardError::Detector {
                detector: id.clone(),
                reason: e.to_string(),
            })?;
            Ok(hits
                .into_iter()
                .map(|(label, confidence, rationale)| {
                    let mut f =
                        Finding::new(id.clone(), category, label, confidence, rationale, priority);
                    f.tag(category.as_str());
                    f.tag("external");
                    f
                })
                .collect())
        });
        self.inner.add_detector(Arc::new(detector));
        Ok(())
    }

    /// Register a callback receiving one dict per analysis call.
    fn add_telemetry_callback(&self, callback: PyObject) {
        self.inner
            .register_telemetry(Arc::new(PyTelemetrySink { callback }));
    }

    /// Apply feedback and return the adjusted confidence.
    #[pyo3(signature = (pattern_id, original_confidence, feedback_text, context_snippet = ""))]
    fn submit_feedback(
        &self,
        pattern_id: String,
        original_confidence: f64,
        feedback_text: String,
        context_snippet: &str,
    ) -> f64 {
        self.inner.submit_feedback(&FeedbackRequest {
            pattern_id,
            original_confidence,
            feedback_text,
            context_snippet: context_snippet.to_string(),
        })
    }

    fn pattern_adjustment(&self, pattern_id: &str) -> f64 {
        self.inner.pattern_adjustment(pattern_id)
    }

    /// Delete a pattern's learned adjustment. Returns True if one existed.
    fn reset_pattern(&self, pattern_id: &str) -> bool {
        self.inner.reset_pattern(pattern_id)
    }

    /// Learning history of one pattern as a JSON string, or None.
    fn pattern_record_json(&self, pattern_id: &str) -> PyResult<Option<String>> {
        self.inner
            .calibrator()
            .record(pattern_id)
            .map(|r| serde_json::to_string(&r))
            .transpose()
            .map_err(|e| PyValueError::new_err(e.to_string()))
    }

    fn stats<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let stats = self.inner.calibrator().stats();
        let dict = PyDict::new(py);
        dict.set_item("patterns_tracked", stats.patterns_tracked)?;
        dict.set_item("mean_adjustment", stats.mean_adjustment)?;
        dict.set_item("saturated_patterns", stats.saturated_patterns)?;
        let by_kind = PyDict::new(py);
        for (kind, n) in &stats.events_by_kind {
            by_kind.set_item(kind.as_str(), *n)?;
        }
        dict.set_item("events_by_kind", by_kind)?;
        Ok(dict)
    }

    /// Wait for pending durable writes. Returns False on timeout.
    #[pyo3(signature = (timeout_ms = 1000))]
    fn flush(&self, py: Python<'_>, timeout_ms: u64) -> bool {
        let calibrator = self.inner.calibrator();
        py.allow_threads(|| calibrator.flush(Duration::from_millis(timeout_ms)))
    }

    #[getter]
    fn pattern_ids(&self) -> Vec<String> {
        self.inner
            .table()
            .patterns()
            .iter()
            .map(|p| p.definition.id.clone())
            .collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "RustRhetoricAnalyzer(patterns={}, match_mode={})",
            self.inner.table().len(),
            self.inner.config().match_mode.as_str()
        )
    }
}

/// Classify free-form feedback text: "false_positive", "false_negative",
/// "correct", or "disputed".
#[pyfunction]
#[pyo3(name = "classify_feedback")]
fn py_classify_feedback(text: &str) -> &'static str {
    classify_feedback(text).as_str()
}

// ─── Module ─────────────────────────────────────────────────────────

#[pymodule]
fn rhetoric_kernel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_class::<PyGuardConfig>()?;
    m.add_class::<PyFinding>()?;
    m.add_class::<PyAnalysisReport>()?;
    m.add_class::<PyRhetoricAnalyzer>()?;
    m.add_function(wrap_pyfunction!(py_classify_feedback, m)?)?;
    Ok(())
}
