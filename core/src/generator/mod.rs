//! Synthetic detection generator standing in for the inference pipeline.

pub mod pipeline;
pub mod profile;
pub mod simulator;
pub mod spectrum;
pub mod synth;

pub use pipeline::{PipelineStep, ProcessingTimeline, TimelineProgress};
pub use profile::{CanvasSize, GeneratorConfig, ModeProfile, CANONICAL_CANVAS};
pub use simulator::{Simulator, SyntheticRun};
pub use spectrum::{generate_spectrum, wavenumber_at, SpectralPeak, SPECTRUM_LEN, SPECTRUM_PEAKS};
pub use synth::{generate_detection, generate_detections};
