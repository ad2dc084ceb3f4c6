use mpcore::model::DetectionResult;
use mpcore::presentation::ResultController;
use serde::{Deserialize, Serialize};

/// Payload served to the visualizer: the session's presentation state plus run counters.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VisualizationModel {
    pub current_result: Option<DetectionResult>,
    pub is_processing: bool,
    pub selected_detection_id: Option<String>,
    pub last_error: Option<String>,
    pub completed_runs: usize,
    pub failed_runs: usize,
}

impl VisualizationModel {
    pub fn from_controller(controller: &ResultController) -> Self {
        let snapshot = controller.snapshot();
        let metrics = controller.metrics().snapshot();
        Self {
            current_result: snapshot.current_result,
            is_processing: snapshot.is_processing,
            selected_detection_id: snapshot.selected_detection_id,
            last_error: snapshot.last_error,
            completed_runs: metrics.completed,
            failed_runs: metrics.failed,
        }
    }
}

/// Body of `POST /analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    pub image_name: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub mode: Option<mpcore::model::DetectionMode>,
}

/// Body of `POST /select`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectBody {
    pub id: String,
}
