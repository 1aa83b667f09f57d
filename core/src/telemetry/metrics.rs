use std::sync::Mutex;

/// Counters for one batch of trace analyses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub analyzed: usize,
    pub rejected: usize,
    /// Data rows excluded by the parser across all analyzed traces.
    pub dropped_rows: usize,
}

/// Batch counters shared across trace analyses.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    /// Counts a successful analysis together with the rows its parser dropped.
    pub fn record_analyzed(&self, dropped_rows: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.analyzed += 1;
            metrics.dropped_rows += dropped_rows;
        }
    }

    pub fn record_rejected(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rejected += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
