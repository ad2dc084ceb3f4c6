use crate::model::{DetectionMode, DetectionResult};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Input for a single analysis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub image_url: String,
    pub image_name: String,
    pub mode: DetectionMode,
}

impl AnalysisRequest {
    pub fn new(
        image_url: impl Into<String>,
        image_name: impl Into<String>,
        mode: DetectionMode,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            image_name: image_name.into(),
            mode,
        }
    }
}

/// Common error type for analysis runs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type SimulationResult<T> = Result<T, SimulationError>;

/// Anything that can turn an image into a detection result.
///
/// The returned future suspends for the engine's latency; dropping it
/// abandons the run.
pub trait DetectionEngine {
    fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> impl Future<Output = SimulationResult<DetectionResult>> + Send;
}
