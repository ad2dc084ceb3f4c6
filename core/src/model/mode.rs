use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality/latency trade-off chosen before an analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMode {
    #[default]
    Fast,
    Accurate,
}

impl DetectionMode {
    pub const ALL: [DetectionMode; 2] = [DetectionMode::Fast, DetectionMode::Accurate];

    pub fn as_str(self) -> &'static str {
        match self {
            DetectionMode::Fast => "fast",
            DetectionMode::Accurate => "accurate",
        }
    }

    /// Headline shown while a run is in progress.
    pub fn pipeline_description(self) -> &'static str {
        match self {
            DetectionMode::Fast => "Running YOLOv11 fast detection",
            DetectionMode::Accurate => "Running YOLOv11 + Faster R-CNN pipeline",
        }
    }

    /// One-line description for mode pickers.
    pub fn tagline(self) -> &'static str {
        match self {
            DetectionMode::Fast => "YOLOv11 only, quick results in ~2 seconds",
            DetectionMode::Accurate => "YOLOv11 + Faster R-CNN, better precision in ~5 seconds",
        }
    }
}

impl fmt::Display for DetectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown detection mode '{0}' (expected 'fast' or 'accurate')")]
pub struct ParseModeError(pub String);

impl FromStr for DetectionMode {
    type Err = ParseModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(DetectionMode::Fast),
            "accurate" => Ok(DetectionMode::Accurate),
            _ => Err(ParseModeError(value.to_string())),
        }
    }
}
