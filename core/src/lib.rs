//! Core model and simulation engine for the microplastic detection demo.
//!
//! The modules cover the detection data model, the randomized detection
//! simulator, the presentation state that views render from, and the JSON
//! export consumed by downstream tooling.

pub mod export;
pub mod generator;
pub mod model;
pub mod prelude;
pub mod presentation;
pub mod summary;
pub mod telemetry;
pub mod upload;

pub use generator::Simulator;
pub use model::{Detection, DetectionMode, DetectionResult, ParticleType, PolymerType};
pub use prelude::{AnalysisRequest, DetectionEngine, SimulationError, SimulationResult};
pub use presentation::ResultController;
