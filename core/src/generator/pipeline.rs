use crate::model::DetectionMode;
use std::time::Duration;

/// A named stage of the (simulated) analysis pipeline shown during processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStep {
    pub label: &'static str,
    pub duration_ms: u64,
    pub accurate_only: bool,
}

pub const PIPELINE_STEPS: [PipelineStep; 5] = [
    PipelineStep {
        label: "Image Preprocessing",
        duration_ms: 500,
        accurate_only: false,
    },
    PipelineStep {
        label: "YOLOv11 Detection",
        duration_ms: 1000,
        accurate_only: false,
    },
    PipelineStep {
        label: "Faster R-CNN Refinement",
        duration_ms: 1500,
        accurate_only: true,
    },
    PipelineStep {
        label: "LDIR Spectroscopy Simulation",
        duration_ms: 800,
        accurate_only: false,
    },
    PipelineStep {
        label: "Result Aggregation",
        duration_ms: 400,
        accurate_only: false,
    },
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineProgress {
    pub step_index: usize,
    /// Percentage of the nominal timeline, capped at 100.
    pub percent: f64,
}

/// Steps active for a mode and the progress through them over time.
///
/// The timeline is cosmetic: it is driven by wall-clock time, not by the
/// simulator, so it can finish before or after the result arrives.
#[derive(Debug, Clone)]
pub struct ProcessingTimeline {
    steps: Vec<PipelineStep>,
}

impl ProcessingTimeline {
    pub fn for_mode(mode: DetectionMode) -> Self {
        let steps = PIPELINE_STEPS
            .iter()
            .copied()
            .filter(|step| !step.accurate_only || mode == DetectionMode::Accurate)
            .collect();
        Self { steps }
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn total_ms(&self) -> u64 {
        self.steps.iter().map(|s| s.duration_ms).sum()
    }

    pub fn progress_at(&self, elapsed: Duration) -> TimelineProgress {
        let elapsed_ms = elapsed.as_millis() as u64;
        let total = self.total_ms().max(1);
        let percent = (elapsed_ms as f64 / total as f64 * 100.0).min(100.0);

        let mut boundary = 0;
        let mut step_index = self.steps.len().saturating_sub(1);
        for (idx, step) in self.steps.iter().enumerate() {
            boundary += step.duration_ms;
            if elapsed_ms < boundary {
                step_index = idx;
                break;
            }
        }

        TimelineProgress {
            step_index,
            percent,
        }
    }
}
