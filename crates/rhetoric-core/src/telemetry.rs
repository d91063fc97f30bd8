// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Telemetry Dispatch
// ─────────────────────────────────────────────────────────────────────
//! Fire-and-forget summary events after each analysis call.

use std::sync::Arc;

use parking_lot::RwLock;

use rhetoric_types::TelemetryEvent;

/// Trait for telemetry sinks. Must not block.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: &TelemetryEvent);
}

/// Writes each event through the `log` facade at debug level.
pub struct LogTelemetrySink;

impl TelemetrySink for LogTelemetrySink {
    fn record(&self, event: &TelemetryEvent) {
        log::debug!(
            "telemetry: mode={} stakes={} triggered={:?}",
            event.mode,
            event
                .stakes_level
                .map(|s| s.as_str())
                .unwrap_or("none"),
            event.triggered_pattern_ids
        );
    }
}

/// Fans events out to registered sinks. A panicking sink is logged
/// and does not affect the others or the caller.
#[derive(Default)]
pub struct TelemetryDispatcher {
    sinks: RwLock<Vec<Arc<dyn TelemetrySink>>>,
}

impl TelemetryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, sink: Arc<dyn TelemetrySink>) {
        self.sinks.write().push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    pub fn emit(&self, event: &TelemetryEvent) {
        let sinks = self.sinks.read();
        for sink in sinks.iter() {
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                sink.record(event);
            }));
            if result.is_err() {
                log::warn!("Telemetry sink panicked; event dropped for that sink");
            }
        }
    }
}
