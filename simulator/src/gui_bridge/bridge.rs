use crate::gui_bridge::model::{AnalyzeBody, SelectBody, VisualizationModel};
use crate::workflow::runner::Runner;
use log::{info, warn};
use mpcore::export::ExportDocument;
use mpcore::model::DetectionResult;
use mpcore::prelude::{AnalysisRequest, DetectionEngine, SimulationError};
use mpcore::presentation::{PresentationError, ResultController};
use mpcore::upload::image_mime_type;
use serde_json::json;
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use warp::{
    http::StatusCode,
    reply::{self, Response},
    Filter, Rejection, Reply,
};

type SharedController = Arc<RwLock<ResultController>>;

fn read(state: &SharedController) -> RwLockReadGuard<'_, ResultController> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(state: &SharedController) -> RwLockWriteGuard<'_, ResultController> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

fn error_reply(status: StatusCode, message: impl std::fmt::Display) -> Response {
    reply::with_status(
        reply::json(&json!({ "error": message.to_string() })),
        status,
    )
    .into_response()
}

fn presentation_status(err: &PresentationError) -> StatusCode {
    match err {
        PresentationError::Busy => StatusCode::CONFLICT,
        PresentationError::NoResult | PresentationError::UnknownDetection(_) => {
            StatusCode::NOT_FOUND
        }
    }
}

/// Hosts one presentation session over HTTP for the visualizer.
pub struct GuiBridge {
    state: SharedController,
    runner: Arc<Runner>,
}

impl GuiBridge {
    pub fn new(runner: Arc<Runner>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ResultController::new())),
            runner,
        }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
        let state = self.state.clone();
        let state_filter = warp::any().map(move || state.clone());
        let runner = self.runner.clone();
        let runner_filter = warp::any().map(move || runner.clone());

        let payload_route = warp::path("payload")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: SharedController| {
                reply::json(&VisualizationModel::from_controller(&read(&state))).into_response()
            });

        let analyze_route = warp::path("analyze")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter.clone())
            .and(runner_filter)
            .and_then(analyze);

        let reset_route = warp::path("reset")
            .and(warp::path::end())
            .and(warp::post())
            .and(state_filter.clone())
            .map(|state: SharedController| {
                write(&state).reset();
                reply::json(&json!({ "status": "ok" })).into_response()
            });

        let select_route = warp::path("select")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::body::json())
            .and(state_filter.clone())
            .map(|body: SelectBody, state: SharedController| {
                match write(&state).select(&body.id) {
                    Ok(()) => reply::json(&json!({ "status": "ok", "selected": body.id }))
                        .into_response(),
                    Err(err) => error_reply(presentation_status(&err), err),
                }
            });

        let deselect_route = warp::path("deselect")
            .and(warp::path::end())
            .and(warp::post())
            .and(state_filter.clone())
            .map(|state: SharedController| {
                write(&state).deselect();
                reply::json(&json!({ "status": "ok" })).into_response()
            });

        let export_route = warp::path("export")
            .and(warp::path::end())
            .and(warp::get())
            .and(state_filter)
            .map(|state: SharedController| {
                let guard = read(&state);
                let response = match guard.current_result() {
                    Some(result) => {
                        reply::json(&ExportDocument::from_result(result)).into_response()
                    }
                    None => error_reply(StatusCode::NOT_FOUND, PresentationError::NoResult),
                };
                response
            });

        payload_route
            .or(analyze_route)
            .unify()
            .or(reset_route)
            .unify()
            .or(select_route)
            .unify()
            .or(deselect_route)
            .unify()
            .or(export_route)
            .unify()
            .recover(handle_rejection)
            .unify()
            .with(warp::log("mpsim::bridge"))
    }

    /// Serves the routes until the future is dropped.
    pub async fn serve(&self, addr: SocketAddr) {
        info!("HTTP bridge listening on http://{}", addr);
        warp::serve(self.routes()).run(addr).await;
    }

    /// Stores a result produced outside the HTTP routes (e.g. an offline run).
    pub fn publish(&self, result: DetectionResult) -> Result<(), PresentationError> {
        let mut guard = write(&self.state);
        guard.begin_submit()?;
        guard.complete(Ok(result));
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        info!("[GUI] {}", message);
    }

    pub fn snapshot(&self) -> VisualizationModel {
        VisualizationModel::from_controller(&read(&self.state))
    }
}

async fn analyze(
    body: AnalyzeBody,
    state: SharedController,
    runner: Arc<Runner>,
) -> Result<Response, Rejection> {
    if image_mime_type(&body.image_name).is_none() {
        return Ok(error_reply(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("'{}' is not an image", body.image_name),
        ));
    }

    let begun = write(&state).begin_submit();
    if let Err(err) = begun {
        return Ok(error_reply(presentation_status(&err), err));
    }

    let mode = body.mode.unwrap_or(runner.config().mode);
    let image_url = body
        .image_url
        .unwrap_or_else(|| format!("bridge://{}", body.image_name));
    let request = AnalysisRequest::new(image_url, body.image_name, mode);

    // The run outlives the request so a disconnecting client cannot leave
    // the session stuck in processing.
    let task_state = state.clone();
    let run = tokio::spawn(async move {
        let outcome = runner.analyze(request).await;
        let response = match &outcome {
            Ok(result) => reply::json(result).into_response(),
            Err(err) => error_reply(StatusCode::INTERNAL_SERVER_ERROR, err),
        };
        write(&task_state).complete(outcome);
        response
    });

    match run.await {
        Ok(response) => Ok(response),
        Err(err) => {
            warn!("analysis task failed: {}", err);
            write(&state).complete(Err(SimulationError::Internal(err.to_string())));
            Ok(error_reply(StatusCode::INTERNAL_SERVER_ERROR, err))
        }
    }
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "no such route".to_string())
    } else if let Some(body_err) = err.find::<warp::filters::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, body_err.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "method not allowed".to_string())
    } else {
        warn!("unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
    };
    Ok(error_reply(status, message))
}
