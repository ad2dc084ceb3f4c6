use crate::model::DetectionMode;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Fixed frame that generated boxes live in, independent of the real image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

pub const CANONICAL_CANVAS: CanvasSize = CanvasSize {
    width: 640.0,
    height: 480.0,
};

impl Default for CanvasSize {
    fn default() -> Self {
        CANONICAL_CANVAS
    }
}

pub const BOX_WIDTH: Range<f64> = 30.0..110.0;
pub const BOX_HEIGHT: Range<f64> = 20.0..80.0;
pub const CONFIDENCE: Range<f64> = 0.70..0.95;
pub const LDIR_MATCH: Range<f64> = 0.75..0.95;

/// Latency and detection-count distributions for one mode.
///
/// Latency is uniform over `[min_latency_ms, max_latency_ms)`; the count is a
/// uniform integer over `[min_detections, max_detections]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeProfile {
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub min_detections: usize,
    pub max_detections: usize,
}

impl ModeProfile {
    pub const FAST: ModeProfile = ModeProfile {
        min_latency_ms: 1500.0,
        max_latency_ms: 2500.0,
        min_detections: 5,
        max_detections: 14,
    };

    pub const ACCURATE: ModeProfile = ModeProfile {
        min_latency_ms: 3000.0,
        max_latency_ms: 5000.0,
        min_detections: 8,
        max_detections: 22,
    };

    pub fn for_mode(mode: DetectionMode) -> Self {
        match mode {
            DetectionMode::Fast => Self::FAST,
            DetectionMode::Accurate => Self::ACCURATE,
        }
    }

    pub fn sample_latency_ms<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.min_latency_ms..self.max_latency_ms)
    }

    pub fn sample_detection_count<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(self.min_detections..=self.max_detections)
    }

    pub fn latency_contains(&self, latency_ms: f64) -> bool {
        (self.min_latency_ms..self.max_latency_ms).contains(&latency_ms)
    }

    pub fn count_contains(&self, count: usize) -> bool {
        (self.min_detections..=self.max_detections).contains(&count)
    }
}

/// Configuration for the synthetic detection generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Seed for reproducible runs; OS entropy when absent.
    pub seed: Option<u64>,
    pub canvas: CanvasSize,
}

impl GeneratorConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }
}
