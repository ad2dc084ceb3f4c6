pub mod detection;
pub mod mode;
pub mod particle;

pub use detection::{BoundingBox, CountByType, Detection, DetectionResult};
pub use mode::{DetectionMode, ParseModeError};
pub use particle::{Hsl, ParticleType, PolymerType};
