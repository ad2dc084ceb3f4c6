use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use mpcore::generator::Simulator;
use mpcore::model::{DetectionMode, DetectionResult};
use mpcore::prelude::{AnalysisRequest, DetectionEngine, SimulationError, SimulationResult};
use mpcore::upload::{image_mime_type, ImageSource};
use std::future::Future;
use std::sync::Arc;

/// Drives the simulator for the CLI and the HTTP bridge.
#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    simulator: Arc<Simulator>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        let simulator = Arc::new(Simulator::new(&config.to_generator_config()));
        Self { config, simulator }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Analyzes `image` with `mode`, falling back to the configured mode.
    pub async fn execute(
        &self,
        image: &ImageSource,
        mode: Option<DetectionMode>,
    ) -> anyhow::Result<DetectionResult> {
        let mode = mode.unwrap_or(self.config.mode);
        let request = AnalysisRequest::new(image.url.clone(), image.name.clone(), mode);
        self.analyze(request)
            .await
            .with_context(|| format!("analyzing {} in {} mode", image.name, mode))
    }
}

impl DetectionEngine for Runner {
    fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> impl Future<Output = SimulationResult<DetectionResult>> + Send {
        let simulator = Arc::clone(&self.simulator);
        async move {
            if image_mime_type(&request.image_name).is_none() {
                return Err(SimulationError::InvalidInput(format!(
                    "'{}' is not an image",
                    request.image_name
                )));
            }
            simulator.simulate(request).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpcore::generator::ModeProfile;

    fn seeded_runner(mode: DetectionMode) -> Runner {
        Runner::new(WorkflowConfig {
            mode,
            seed: Some(5),
            ..Default::default()
        })
    }

    #[tokio::test(start_paused = true)]
    async fn runner_uses_configured_mode_by_default() {
        let runner = seeded_runner(DetectionMode::Accurate);
        let result = runner.execute(&ImageSource::sample(), None).await.unwrap();
        assert_eq!(result.mode, DetectionMode::Accurate);
        assert!(ModeProfile::ACCURATE.count_contains(result.total_count));
        assert_eq!(result.image_name, "sample-microscopy.jpg");
    }

    #[tokio::test(start_paused = true)]
    async fn runner_honours_explicit_mode() {
        let runner = seeded_runner(DetectionMode::Accurate);
        let result = runner
            .execute(&ImageSource::sample(), Some(DetectionMode::Fast))
            .await
            .unwrap();
        assert_eq!(result.mode, DetectionMode::Fast);
        assert!(ModeProfile::FAST.latency_contains(result.processing_time));
    }

    #[tokio::test]
    async fn runner_rejects_non_images() {
        let runner = seeded_runner(DetectionMode::Fast);
        let err = runner
            .analyze(AnalysisRequest::new("x", "notes.txt", DetectionMode::Fast))
            .await
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidInput(_)));
    }
}
