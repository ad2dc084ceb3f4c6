use std::sync::Mutex;

/// Counts analysis outcomes for status output.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub completed: usize,
    pub failed: usize,
    pub detections: usize,
}

#[derive(Default)]
struct Metrics {
    completed: usize,
    failed: usize,
    detections: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_completed(&self, detections: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.completed += 1;
            metrics.detections += detections;
        }
    }

    pub fn record_failed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failed += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            MetricsSnapshot {
                completed: metrics.completed,
                failed: metrics.failed,
                detections: metrics.detections,
            }
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
