use crate::model::{DetectionMode, DetectionResult, ParticleType};

/// One non-empty slice of the particle distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistributionEntry {
    pub particle: ParticleType,
    pub count: usize,
    /// Share of the total count, 0-100.
    pub share_percent: f64,
}

/// Headline numbers shown above the results.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    pub total_count: usize,
    pub processing_seconds: f64,
    pub mode: DetectionMode,
    pub polymer_types: usize,
    pub distribution: Vec<DistributionEntry>,
}

impl ResultSummary {
    pub fn from_result(result: &DetectionResult) -> Self {
        let total = result.total_count;
        let distribution = result
            .count_by_type
            .iter()
            .filter(|&(_, count)| count > 0)
            .map(|(particle, count)| DistributionEntry {
                particle,
                count,
                share_percent: count as f64 / total as f64 * 100.0,
            })
            .collect();

        Self {
            total_count: total,
            processing_seconds: result.processing_time / 1000.0,
            mode: result.mode,
            polymer_types: result.distinct_polymers(),
            distribution,
        }
    }

    /// e.g. `12 particles detected in 2.14s`
    pub fn headline(&self) -> String {
        format!(
            "{} particles detected in {:.2}s",
            self.total_count, self.processing_seconds
        )
    }
}

/// Formats a `[0, 1]` score as a percentage with `decimals` places.
pub fn percent(score: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, score * 100.0)
}
