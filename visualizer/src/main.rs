use canvas::{DetectionOverlay, SpectrumChart};
use chrono::Utc;
use iced::{
    time,
    widget::{
        button, column, image, row, scrollable, text, text_input, Canvas, Column, Container,
    },
    Alignment, Element, Length, Subscription, Task, Theme,
};
use mpcore::export::ExportDocument;
use mpcore::generator::{wavenumber_at, ProcessingTimeline, SPECTRUM_LEN};
use mpcore::model::{Detection, DetectionMode, DetectionResult};
use mpcore::prelude::SimulationError;
use mpcore::presentation::ResultController;
use mpcore::summary::{percent, ResultSummary};
use mpcore::upload::ImageSource;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

mod canvas;

const DEFAULT_BRIDGE: &str = "http://127.0.0.1:9000";

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Microplastic Detection Visualizer".into()
}

fn application_subscription(state: &Visualizer) -> Subscription<Message> {
    if state.controller.is_processing() {
        time::every(Duration::from_millis(50)).map(|_| Message::Tick)
    } else {
        Subscription::none()
    }
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

fn bridge_url(route: &str) -> String {
    let base = std::env::var("MPVIZ_BRIDGE").unwrap_or_else(|_| DEFAULT_BRIDGE.to_string());
    format!("{}/{}", base.trim_end_matches('/'), route)
}

struct Visualizer {
    image_path: String,
    image: Option<ImageSource>,
    pending_image: Option<image::Handle>,
    result_image: Option<image::Handle>,
    mode: DetectionMode,
    controller: ResultController,
    processing_since: Option<Instant>,
    timeline: ProcessingTimeline,
    status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    ImagePathChanged(String),
    LoadImage,
    UseSample,
    ClearImage,
    ModeSelected(DetectionMode),
    Analyze,
    AnalysisFinished(Result<DetectionResult, String>),
    ToggleDetection(String),
    Deselect,
    Reset,
    BridgeReset(Result<(), String>),
    Export,
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        (
            Visualizer {
                image_path: String::new(),
                image: None,
                pending_image: None,
                result_image: None,
                mode: DetectionMode::Fast,
                controller: ResultController::new(),
                processing_since: None,
                timeline: ProcessingTimeline::for_mode(DetectionMode::Fast),
                status: "Select a microscopy image to analyze".into(),
                history: Vec::new(),
            },
            Task::none(),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::none(),
            Message::ImagePathChanged(value) => {
                state.image_path = value;
                Task::none()
            }
            Message::LoadImage => {
                match ImageSource::from_path(Path::new(state.image_path.trim())) {
                    Ok(image) => {
                        state.status = format!("{} ready ({})", image.name, image.mime_type);
                        state.image = Some(image);
                    }
                    // Non-images are dropped without a user-facing error.
                    Err(err) => log::warn!("ignoring selection: {err}"),
                }
                Task::none()
            }
            Message::UseSample => {
                let image = ImageSource::sample();
                state.status = format!("{} ready ({})", image.name, image.mime_type);
                state.image = Some(image);
                Task::none()
            }
            Message::ClearImage => {
                state.image = None;
                state.image_path.clear();
                Task::none()
            }
            Message::ModeSelected(mode) => {
                state.mode = mode;
                Task::none()
            }
            Message::Analyze => {
                let Some(source) = state.image.clone() else {
                    return Task::none();
                };
                if state.controller.begin_submit().is_err() {
                    return Task::none();
                }
                state.pending_image = source.local_path().map(image::Handle::from_path);
                state.processing_since = Some(Instant::now());
                state.timeline = ProcessingTimeline::for_mode(state.mode);
                state.status = state.mode.pipeline_description().into();
                state.push_history(format!("Submitted {} ({} mode)", source.name, state.mode));
                Task::perform(
                    post_analyze(AnalyzeRequest {
                        image_name: source.name,
                        image_url: source.url,
                        mode: state.mode,
                    }),
                    Message::AnalysisFinished,
                )
            }
            Message::AnalysisFinished(outcome) => {
                state.processing_since = None;
                match outcome {
                    Ok(result) => {
                        let summary = ResultSummary::from_result(&result);
                        state.status = summary.headline();
                        state.push_history(format!(
                            "{}: {}",
                            result.image_name,
                            summary.headline()
                        ));
                        state.controller.complete(Ok(result));
                        state.result_image = state.pending_image.take();
                    }
                    Err(err) => {
                        state.pending_image = None;
                        state.controller.complete(Err(SimulationError::Internal(err)));
                        state.status = "Ready".into();
                    }
                }
                Task::none()
            }
            Message::ToggleDetection(id) => {
                if let Err(err) = state.controller.toggle(&id) {
                    log::warn!("{err}");
                }
                Task::none()
            }
            Message::Deselect => {
                state.controller.deselect();
                Task::none()
            }
            Message::Reset => {
                state.controller.reset();
                state.result_image = None;
                state.status = "Select a microscopy image to analyze".into();
                Task::perform(post_reset(), Message::BridgeReset)
            }
            Message::BridgeReset(Ok(())) => Task::none(),
            Message::BridgeReset(Err(err)) => {
                log::warn!("bridge reset failed: {err}");
                Task::none()
            }
            Message::Export => {
                if let Some(result) = state.controller.current_result() {
                    let document = ExportDocument::from_result(result);
                    match document.write_to_dir(&PathBuf::from("exports"), Utc::now()) {
                        Ok(path) => {
                            state.status = format!("Exported to {}", path.display());
                            state.push_history(state.status.clone());
                        }
                        Err(err) => state.status = format!("Export failed: {err}"),
                    }
                }
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let left = Self::upload_column(state);
        let right: Element<'_, Message> = match state.controller.current_result() {
            _ if state.controller.is_processing() => Self::processing_column(state),
            Some(result) => Self::results_column(state, result),
            None => column![
                text("Analysis Results").size(26),
                text("No analysis yet. Choose an image and a mode, then start the analysis.")
                    .size(14),
            ]
            .spacing(10)
            .padding(16)
            .width(Length::Fill)
            .into(),
        };

        let layout = row![left, right]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(scrollable(layout))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn upload_column(state: &Self) -> Element<'_, Message> {
        let processing = state.controller.is_processing();
        let selected = match &state.image {
            Some(image) => text(format!("Selected: {} ({})", image.name, image.mime_type)).size(14),
            None => text("No image selected").size(14),
        };

        let mode_button = |mode: DetectionMode, title: &'static str| {
            let style: fn(&Theme, button::Status) -> button::Style = if state.mode == mode {
                button::primary
            } else {
                button::secondary
            };
            button(column![text(title).size(16), text(mode.tagline()).size(12)].spacing(2))
                .on_press(Message::ModeSelected(mode))
                .style(style)
                .width(Length::Fill)
                .padding(10)
        };

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        column![
            text("Upload Image").size(26),
            text("Select a microscopy image (JPG, PNG) to analyze for microplastic particles")
                .size(12),
            text_input("Path to image", &state.image_path)
                .on_input(Message::ImagePathChanged)
                .on_submit(Message::LoadImage)
                .padding(6),
            row![
                button("Load image").on_press(Message::LoadImage).padding(8),
                button("Try sample image").on_press(Message::UseSample).padding(8),
                button("Clear").on_press(Message::ClearImage).padding(8),
            ]
            .spacing(8),
            selected,
            text("Detection Mode").size(18),
            mode_button(DetectionMode::Fast, "Fast Mode"),
            mode_button(DetectionMode::Accurate, "Accurate Mode"),
            button(if processing { "Analyzing..." } else { "Start Analysis" })
                .on_press_maybe(
                    (state.image.is_some() && !processing).then_some(Message::Analyze)
                )
                .padding(10)
                .width(Length::Fill),
            text("Detection includes simulated LDIR spectroscopy for polymer identification")
                .size(11),
            text(&state.status).size(14),
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(120.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(360.0))
        .into()
    }

    fn processing_column(state: &Self) -> Element<'_, Message> {
        let elapsed = state
            .processing_since
            .map(|started| started.elapsed())
            .unwrap_or_default();
        let progress = state.timeline.progress_at(elapsed);

        let steps = state.timeline.steps().iter().enumerate().fold(
            Column::new().spacing(4),
            |col, (idx, step)| {
                let marker = if idx < progress.step_index {
                    "[x]".to_string()
                } else if idx == progress.step_index {
                    "[>]".to_string()
                } else {
                    format!("[{}]", idx + 1)
                };
                col.push(text(format!("{marker} {}", step.label)).size(14))
            },
        );

        column![
            text("Processing Image").size(26),
            text(state.mode.pipeline_description()).size(14),
            text(format!("{:.0}%", progress.percent)).size(18),
            steps,
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill)
        .into()
    }

    fn results_column<'a>(state: &'a Self, result: &'a DetectionResult) -> Element<'a, Message> {
        let summary = ResultSummary::from_result(result);
        let selected = state.controller.selected_detection();

        let distribution = summary.distribution.iter().fold(
            Column::new().spacing(2),
            |col, entry| {
                col.push(
                    text(format!(
                        "{}: {} ({:.1}%)",
                        entry.particle, entry.count, entry.share_percent
                    ))
                    .size(13),
                )
            },
        );

        let stats = column![
            row![
                text(format!("{} Particles Detected", summary.total_count)).size(16),
                text(format!("{:.2}s Processing Time", summary.processing_seconds)).size(16),
                text(format!("{} Detection Mode", summary.mode)).size(16),
                text(format!("{} Polymer Types", summary.polymer_types)).size(16),
            ]
            .spacing(24),
            text("Particle Distribution").size(16),
            distribution,
        ]
        .spacing(6);

        let overlay = Canvas::new(DetectionOverlay {
            image_name: result.image_name.clone(),
            image: state.result_image.clone(),
            detections: result.detections.clone(),
            selected: state.controller.selected_id().map(str::to_string),
        })
        .width(Length::Fill)
        .height(Length::Fixed(360.0));

        let spectrum_panel = match selected {
            Some(detection) => Self::spectrum_panel(detection),
            None => column![
                text("Select a Detection").size(18),
                text("Click a table row to view the simulated LDIR spectrum").size(12),
            ]
            .spacing(4)
            .into(),
        };

        let table = result.detections.iter().enumerate().fold(
            Column::new().spacing(2),
            |col, (idx, detection)| {
                let is_selected = selected.map(|d| d.id == detection.id).unwrap_or(false);
                let style: fn(&Theme, button::Status) -> button::Style = if is_selected {
                    button::primary
                } else {
                    button::text
                };
                col.push(
                    button(
                        text(format!(
                            "#{:<3} {:<9} {} ({})  conf {}  LDIR {}",
                            idx + 1,
                            detection.particle_type,
                            detection.polymer_type,
                            detection.polymer_type.short_name(),
                            percent(detection.confidence, 0),
                            percent(detection.ldir_match_score, 1)
                        ))
                        .size(12),
                    )
                    .on_press(Message::ToggleDetection(detection.id.clone()))
                    .style(style)
                    .width(Length::Fill),
                )
            },
        );

        column![
            row![
                column![
                    text("Analysis Results").size(26),
                    text(format!(
                        "{} - analyzed on {}",
                        result.image_name,
                        result.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
                    ))
                    .size(12),
                ]
                .width(Length::Fill),
                button("New Analysis").on_press(Message::Reset).padding(8),
                button("Export JSON").on_press(Message::Export).padding(8),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
            stats,
            text("Detection Visualization").size(18),
            overlay,
            text("LDIR Analysis").size(18),
            Container::new(spectrum_panel).padding(6),
            text("Detection Results").size(18),
            text(summary.headline()).size(12),
            Container::new(scrollable(table).height(Length::Fixed(260.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill)
        .into()
    }

    fn spectrum_panel(detection: &Detection) -> Element<'_, Message> {
        let chart = Canvas::new(SpectrumChart {
            data: detection.spectrum_data.clone(),
        })
        .width(Length::Fill)
        .height(Length::Fixed(140.0));

        column![
            row![
                text("Simulated LDIR Spectrum").size(16).width(Length::Fill),
                text(detection.polymer_type.code()).size(16),
            ],
            chart,
            row![
                text(format!("{:.0} cm-1", wavenumber_at(0))).size(11).width(Length::Fill),
                text("Wavenumber").size(11).width(Length::Fill),
                text(format!("{:.0} cm-1", wavenumber_at(SPECTRUM_LEN - 1))).size(11),
            ],
            row![
                text(format!("Polymer: {}", detection.polymer_type.full_name()))
                    .size(13)
                    .width(Length::Fill),
                text(format!("Match Score: {}", percent(detection.ldir_match_score, 1))).size(13),
            ],
            row![
                text(format!("Particle: {}", detection.particle_type))
                    .size(13)
                    .width(Length::Fill),
                text(format!("Confidence: {}", percent(detection.confidence, 1))).size(13),
            ],
            button("Close").on_press(Message::Deselect).padding(6),
            text("This spectrum is simulated for demonstration purposes.").size(11),
        ]
        .spacing(6)
        .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    image_name: String,
    image_url: String,
    mode: DetectionMode,
}

async fn post_analyze(request: AnalyzeRequest) -> Result<DetectionResult, String> {
    let client = reqwest::Client::new();
    let response = client
        .post(bridge_url("analyze"))
        .json(&request)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if response.status().is_success() {
        response
            .json::<DetectionResult>()
            .await
            .map_err(|e| e.to_string())
    } else {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        Err(format!("{}: {}", status, text))
    }
}

async fn post_reset() -> Result<(), String> {
    let client = reqwest::Client::new();
    let response = client
        .post(bridge_url("reset"))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    if response.status().is_success() {
        Ok(())
    } else {
        Err(response.status().to_string())
    }
}
