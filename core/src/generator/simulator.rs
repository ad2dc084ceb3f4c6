use crate::generator::profile::{CanvasSize, GeneratorConfig, ModeProfile};
use crate::generator::synth::generate_detections;
use crate::model::{Detection, DetectionMode, DetectionResult};
use crate::prelude::{AnalysisRequest, DetectionEngine, SimulationError, SimulationResult};
use crate::telemetry::log::LogManager;
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

/// Everything drawn for one run before the simulated latency elapses.
#[derive(Debug, Clone)]
pub struct SyntheticRun {
    pub latency_ms: f64,
    pub detections: Vec<Detection>,
}

/// Mock detector: waits a mode-dependent latency, then returns random detections.
pub struct Simulator {
    rng: Mutex<StdRng>,
    canvas: CanvasSize,
    logger: LogManager,
}

impl Simulator {
    pub fn new(config: &GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
            canvas: config.canvas,
            logger: LogManager::new(),
        }
    }

    /// Draws latency and detections for `mode` without waiting.
    pub fn draw(&self, mode: DetectionMode) -> SimulationResult<SyntheticRun> {
        let profile = ModeProfile::for_mode(mode);
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| SimulationError::Internal("generator state poisoned".into()))?;
        let latency_ms = profile.sample_latency_ms(&mut *rng);
        let detections = generate_detections(&mut *rng, &profile, self.canvas);
        Ok(SyntheticRun {
            latency_ms,
            detections,
        })
    }

    /// Runs one simulated analysis. The future sleeps for the drawn latency.
    pub async fn simulate(&self, request: AnalysisRequest) -> SimulationResult<DetectionResult> {
        let run = self.draw(request.mode)?;
        self.logger.record(&format!(
            "Simulating {} ({} mode): {} detections after {:.0} ms",
            request.image_name,
            request.mode,
            run.detections.len(),
            run.latency_ms
        ));

        tokio::time::sleep(Duration::from_secs_f64(run.latency_ms / 1000.0)).await;

        Ok(DetectionResult::assemble(
            request,
            Utc::now(),
            run.latency_ms,
            run.detections,
        ))
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(&GeneratorConfig::default())
    }
}

impl DetectionEngine for Simulator {
    fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> impl Future<Output = SimulationResult<DetectionResult>> + Send {
        self.simulate(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParticleType;
    use tokio::time::Instant;

    fn request(mode: DetectionMode) -> AnalysisRequest {
        AnalysisRequest::new("file:///data/sample.jpg", "sample.jpg", mode)
    }

    #[tokio::test(start_paused = true)]
    async fn fast_mode_resolves_within_latency_window() {
        let simulator = Simulator::new(&GeneratorConfig::seeded(1));
        let started = Instant::now();
        let result = simulator.simulate(request(DetectionMode::Fast)).await.unwrap();
        let elapsed = started.elapsed();

        assert!(ModeProfile::FAST.latency_contains(result.processing_time));
        assert!(elapsed >= Duration::from_millis(1500));
        assert!(elapsed <= Duration::from_millis(2500));
        assert!(ModeProfile::FAST.count_contains(result.total_count));
    }

    #[tokio::test(start_paused = true)]
    async fn accurate_mode_takes_longer_and_finds_more() {
        let simulator = Simulator::new(&GeneratorConfig::seeded(2));
        let started = Instant::now();
        let result = simulator
            .simulate(request(DetectionMode::Accurate))
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(3000));
        assert!(started.elapsed() <= Duration::from_millis(5000));
        assert!(ModeProfile::ACCURATE.count_contains(result.total_count));
        assert_eq!(result.mode, DetectionMode::Accurate);
        assert_eq!(result.image_name, "sample.jpg");
    }

    #[test]
    fn draws_respect_mode_profiles() {
        let simulator = Simulator::new(&GeneratorConfig::seeded(99));
        for mode in DetectionMode::ALL {
            let profile = ModeProfile::for_mode(mode);
            for _ in 0..1000 {
                let run = simulator.draw(mode).unwrap();
                assert!(profile.latency_contains(run.latency_ms));
                assert!(profile.count_contains(run.detections.len()));
            }
        }
    }

    #[test]
    fn seeded_simulators_replay_the_same_sequence() {
        let a = Simulator::new(&GeneratorConfig::seeded(12));
        let b = Simulator::new(&GeneratorConfig::seeded(12));
        for _ in 0..3 {
            let left = a.draw(DetectionMode::Fast).unwrap();
            let right = b.draw(DetectionMode::Fast).unwrap();
            assert_eq!(left.latency_ms, right.latency_ms);
            assert_eq!(left.detections, right.detections);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn result_counts_are_consistent() {
        let simulator = Simulator::default();
        let result = simulator.analyze(request(DetectionMode::Fast)).await.unwrap();
        assert_eq!(result.total_count, result.detections.len());
        assert_eq!(result.count_by_type.total(), result.total_count);
        let fibers = result
            .detections
            .iter()
            .filter(|d| d.particle_type == ParticleType::Fiber)
            .count();
        assert_eq!(result.count_by_type.fiber, fibers);
    }
}
