//! The single "current result" that every view renders from.
//!
//! State moves through three shapes: idle (no result), processing, and
//! has-result. Selection is layered on top of has-result and never changes
//! the result itself.

use crate::model::{Detection, DetectionResult};
use crate::prelude::{AnalysisRequest, DetectionEngine, SimulationResult};
use crate::telemetry::{LogManager, MetricsRecorder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PresentationError {
    #[error("an analysis is already running")]
    Busy,
    #[error("no analysis result to select from")]
    NoResult,
    #[error("detection '{0}' is not part of the current result")]
    UnknownDetection(String),
}

/// Read-only copy of the controller state, suitable for serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationSnapshot {
    pub current_result: Option<DetectionResult>,
    pub is_processing: bool,
    pub selected_detection_id: Option<String>,
    pub last_error: Option<String>,
}

#[derive(Default)]
pub struct ResultController {
    current: Option<DetectionResult>,
    processing: bool,
    selected: Option<String>,
    last_error: Option<String>,
    logger: LogManager,
    metrics: Arc<MetricsRecorder>,
}

impl ResultController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares a metrics recorder with the caller (e.g. for status output).
    pub fn with_metrics(metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }

    pub fn current_result(&self) -> Option<&DetectionResult> {
        self.current.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    pub fn selected_detection(&self) -> Option<&Detection> {
        let id = self.selected.as_deref()?;
        self.current.as_ref()?.detection(id)
    }

    pub fn snapshot(&self) -> PresentationSnapshot {
        PresentationSnapshot {
            current_result: self.current.clone(),
            is_processing: self.processing,
            selected_detection_id: self.selected.clone(),
            last_error: self.last_error.clone(),
        }
    }

    /// Marks a run as in flight. Only one run may be in flight at a time.
    pub fn begin_submit(&mut self) -> Result<(), PresentationError> {
        if self.processing {
            return Err(PresentationError::Busy);
        }
        self.processing = true;
        self.last_error = None;
        Ok(())
    }

    /// Applies the outcome of the in-flight run.
    ///
    /// A failure leaves the previous result untouched; nothing partial is
    /// ever exposed and no retry is attempted.
    pub fn complete(&mut self, outcome: SimulationResult<DetectionResult>) {
        self.processing = false;
        match outcome {
            Ok(result) => {
                self.logger.record(&format!(
                    "Analysis of {} finished: {} detections",
                    result.image_name, result.total_count
                ));
                self.metrics.record_completed(result.total_count);
                self.current = Some(result);
                self.selected = None;
            }
            Err(err) => {
                self.logger.record_failure(&format!("Detection failed: {err}"));
                self.metrics.record_failed();
                self.last_error = Some(err.to_string());
            }
        }
    }

    /// Runs one analysis through `engine` and applies its outcome.
    pub async fn submit<E: DetectionEngine>(
        &mut self,
        engine: &E,
        request: AnalysisRequest,
    ) -> Result<Option<&DetectionResult>, PresentationError> {
        self.begin_submit()?;
        let in_flight = InFlight {
            controller: Some(self),
        };
        let outcome = engine.analyze(request).await;
        let controller = in_flight.finish(outcome);
        Ok(controller.current.as_ref())
    }

    /// Clears the in-flight flag of a run whose outcome will never arrive.
    ///
    /// The previous result and selection are kept and nothing is recorded
    /// as a failure.
    pub fn abandon(&mut self) {
        if self.processing {
            self.processing = false;
            self.logger.record("Analysis abandoned before completion");
        }
    }

    /// Discards the current result and selection.
    pub fn reset(&mut self) {
        self.current = None;
        self.selected = None;
    }

    pub fn select(&mut self, id: &str) -> Result<(), PresentationError> {
        let result = self.current.as_ref().ok_or(PresentationError::NoResult)?;
        if result.detection(id).is_none() {
            return Err(PresentationError::UnknownDetection(id.to_string()));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Selects `id`, or clears the selection when `id` is already selected.
    pub fn toggle(&mut self, id: &str) -> Result<(), PresentationError> {
        if self.selected.as_deref() == Some(id) {
            self.deselect();
            Ok(())
        } else {
            self.select(id)
        }
    }
}

/// Releases the controller if a submission is dropped mid-run.
struct InFlight<'a> {
    controller: Option<&'a mut ResultController>,
}

impl<'a> InFlight<'a> {
    fn finish(mut self, outcome: SimulationResult<DetectionResult>) -> &'a mut ResultController {
        let controller = self
            .controller
            .take()
            .unwrap_or_else(|| unreachable!("in-flight guard finished twice"));
        controller.complete(outcome);
        controller
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Some(controller) = self.controller.take() {
            controller.abandon();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{GeneratorConfig, Simulator};
    use crate::model::DetectionMode;
    use crate::prelude::SimulationError;
    use std::future::Future;
    use std::time::Duration;

    struct FailingEngine;

    impl DetectionEngine for FailingEngine {
        fn analyze(
            &self,
            _request: AnalysisRequest,
        ) -> impl Future<Output = SimulationResult<DetectionResult>> + Send {
            async { Err(SimulationError::Internal("model crashed".into())) }
        }
    }

    fn request(mode: DetectionMode) -> AnalysisRequest {
        AnalysisRequest::new("file:///data/slide.png", "slide.png", mode)
    }

    async fn controller_with_result() -> ResultController {
        let simulator = Simulator::new(&GeneratorConfig::seeded(4));
        let mut controller = ResultController::new();
        controller
            .submit(&simulator, request(DetectionMode::Fast))
            .await
            .unwrap();
        controller
    }

    #[tokio::test(start_paused = true)]
    async fn submit_stores_result_and_clears_flags() {
        let controller = controller_with_result().await;
        assert!(!controller.is_processing());
        assert!(controller.selected_id().is_none());
        let result = controller.current_result().unwrap();
        assert!((5..=14).contains(&result.total_count));
        assert_eq!(controller.metrics().snapshot().completed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn select_then_deselect_returns_to_no_selection() {
        let mut controller = controller_with_result().await;
        let id = controller.current_result().unwrap().detections[0].id.clone();

        controller.select(&id).unwrap();
        assert_eq!(controller.selected_id(), Some(id.as_str()));
        assert_eq!(controller.selected_detection().unwrap().id, id);

        controller.deselect();
        assert!(controller.selected_id().is_none());
        assert!(controller.current_result().is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_flips_selection() {
        let mut controller = controller_with_result().await;
        let id = controller.current_result().unwrap().detections[0].id.clone();
        controller.toggle(&id).unwrap();
        assert_eq!(controller.selected_id(), Some(id.as_str()));
        controller.toggle(&id).unwrap();
        assert!(controller.selected_id().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_ids_are_rejected() {
        let mut controller = controller_with_result().await;
        assert_eq!(
            controller.select("det-missing00"),
            Err(PresentationError::UnknownDetection("det-missing00".into()))
        );
        assert!(controller.selected_id().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_discards_result_and_selection() {
        let mut controller = controller_with_result().await;
        let id = controller.current_result().unwrap().detections[0].id.clone();
        controller.select(&id).unwrap();

        controller.reset();
        assert!(controller.current_result().is_none());
        assert!(controller.selected_id().is_none());
        assert_eq!(controller.select(&id), Err(PresentationError::NoResult));
    }

    #[test]
    fn second_submission_is_refused_while_processing() {
        let mut controller = ResultController::new();
        controller.begin_submit().unwrap();
        assert_eq!(controller.begin_submit(), Err(PresentationError::Busy));
        assert!(controller.is_processing());
    }

    #[tokio::test]
    async fn failed_run_leaves_idle_state_and_records_error() {
        let mut controller = ResultController::new();
        let outcome = controller
            .submit(&FailingEngine, request(DetectionMode::Accurate))
            .await
            .unwrap();
        assert!(outcome.is_none());
        assert!(!controller.is_processing());
        assert!(controller.current_result().is_none());
        assert_eq!(
            controller.last_error(),
            Some("internal failure: model crashed")
        );
        assert_eq!(controller.metrics().snapshot().failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_submission_releases_controller() {
        let simulator = Simulator::new(&GeneratorConfig::seeded(8));
        let mut controller = controller_with_result().await;
        let previous = controller.current_result().map(|r| r.total_count);

        let run = controller.submit(&simulator, request(DetectionMode::Fast));
        let timed_out = tokio::time::timeout(Duration::from_millis(100), run).await;
        assert!(timed_out.is_err());

        assert!(!controller.is_processing());
        assert_eq!(controller.current_result().map(|r| r.total_count), previous);
        assert!(controller.last_error().is_none());
        assert_eq!(controller.metrics().snapshot().failed, 0);
        assert_eq!(controller.begin_submit(), Ok(()));
    }

    #[test]
    fn abandon_only_clears_processing() {
        let mut controller = ResultController::new();
        controller.begin_submit().unwrap();
        controller.abandon();
        assert!(!controller.is_processing());
        assert!(controller.current_result().is_none());
        assert_eq!(controller.metrics().snapshot().completed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_mirrors_state() {
        let mut controller = controller_with_result().await;
        let id = controller.current_result().unwrap().detections[0].id.clone();
        controller.select(&id).unwrap();
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.selected_detection_id.as_deref(), Some(id.as_str()));
        assert!(!snapshot.is_processing);
        assert_eq!(
            snapshot.current_result.map(|r| r.total_count),
            controller.current_result().map(|r| r.total_count)
        );
    }
}
