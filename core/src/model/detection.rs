use crate::model::{DetectionMode, ParticleType, PolymerType};
use crate::prelude::AnalysisRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Axis-aligned box in canonical canvas pixels, anchored at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the box is non-negative and lies entirely inside `width` x `height`.
    pub fn fits_within(&self, width: f64, height: f64) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.width >= 0.0
            && self.height >= 0.0
            && self.right() <= width
            && self.bottom() <= height
    }

    /// Maps the box onto a surface scaled by `sx` horizontally and `sy` vertically.
    pub fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self {
            x: self.x * sx,
            y: self.y * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }
}

/// One particle found in an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub id: String,
    pub particle_type: ParticleType,
    pub polymer_type: PolymerType,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
    pub ldir_match_score: f64,
    pub spectrum_data: Vec<f64>,
}

impl Detection {
    /// Overlay caption, e.g. `fiber 83%`.
    pub fn label(&self) -> String {
        format!("{} {:.0}%", self.particle_type, self.confidence * 100.0)
    }
}

/// Per-particle-type tally. Every type is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountByType {
    pub fiber: usize,
    pub fragment: usize,
    pub film: usize,
    pub pellet: usize,
    pub foam: usize,
}

impl CountByType {
    pub fn tally<'a>(detections: impl IntoIterator<Item = &'a Detection>) -> Self {
        let mut counts = Self::default();
        for detection in detections {
            counts.increment(detection.particle_type);
        }
        counts
    }

    pub fn get(&self, particle: ParticleType) -> usize {
        match particle {
            ParticleType::Fiber => self.fiber,
            ParticleType::Fragment => self.fragment,
            ParticleType::Film => self.film,
            ParticleType::Pellet => self.pellet,
            ParticleType::Foam => self.foam,
        }
    }

    pub fn increment(&mut self, particle: ParticleType) {
        let slot = match particle {
            ParticleType::Fiber => &mut self.fiber,
            ParticleType::Fragment => &mut self.fragment,
            ParticleType::Film => &mut self.film,
            ParticleType::Pellet => &mut self.pellet,
            ParticleType::Foam => &mut self.foam,
        };
        *slot += 1;
    }

    pub fn total(&self) -> usize {
        ParticleType::ALL.iter().map(|&p| self.get(p)).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ParticleType, usize)> + '_ {
        ParticleType::ALL.iter().map(move |&p| (p, self.get(p)))
    }
}

/// Outcome of one analysis run. Built once, never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    pub image_url: String,
    pub image_name: String,
    pub timestamp: DateTime<Utc>,
    pub mode: DetectionMode,
    pub processing_time: f64,
    pub detections: Vec<Detection>,
    pub total_count: usize,
    pub count_by_type: CountByType,
}

impl DetectionResult {
    /// Builds a result and derives the redundant count fields from `detections`.
    pub fn assemble(
        request: AnalysisRequest,
        timestamp: DateTime<Utc>,
        processing_time: f64,
        detections: Vec<Detection>,
    ) -> Self {
        let count_by_type = CountByType::tally(&detections);
        Self {
            image_url: request.image_url,
            image_name: request.image_name,
            timestamp,
            mode: request.mode,
            processing_time,
            total_count: detections.len(),
            detections,
            count_by_type,
        }
    }

    pub fn detection(&self, id: &str) -> Option<&Detection> {
        self.detections.iter().find(|d| d.id == id)
    }

    /// Number of different polymers present.
    pub fn distinct_polymers(&self) -> usize {
        self.detections
            .iter()
            .map(|d| d.polymer_type)
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(id: &str, particle: ParticleType, polymer: PolymerType) -> Detection {
        Detection {
            id: id.into(),
            particle_type: particle,
            polymer_type: polymer,
            confidence: 0.834,
            bounding_box: BoundingBox::new(10.0, 20.0, 40.0, 30.0),
            ldir_match_score: 0.8,
            spectrum_data: vec![0.0; 100],
        }
    }

    #[test]
    fn assemble_derives_counts() {
        let detections = vec![
            detection("det-a", ParticleType::Fiber, PolymerType::Pe),
            detection("det-b", ParticleType::Fiber, PolymerType::Pp),
            detection("det-c", ParticleType::Foam, PolymerType::Pe),
        ];
        let request = AnalysisRequest::new("file:///tmp/a.png", "a.png", DetectionMode::Fast);
        let result = DetectionResult::assemble(request, Utc::now(), 1800.0, detections);

        assert_eq!(result.total_count, 3);
        assert_eq!(result.count_by_type.fiber, 2);
        assert_eq!(result.count_by_type.foam, 1);
        assert_eq!(result.count_by_type.total(), result.total_count);
        assert_eq!(result.distinct_polymers(), 2);
        assert!(result.detection("det-c").is_some());
        assert!(result.detection("det-z").is_none());
    }

    #[test]
    fn count_by_type_always_serializes_every_key() {
        let json = serde_json::to_value(CountByType::default()).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 5);
        for particle in ParticleType::ALL {
            assert_eq!(json[particle.as_str()], 0);
        }
    }

    #[test]
    fn bounding_box_containment() {
        let inside = BoundingBox::new(600.0, 440.0, 40.0, 40.0);
        assert!(inside.fits_within(640.0, 480.0));
        let outside = BoundingBox::new(600.5, 0.0, 40.0, 40.0);
        assert!(!outside.fits_within(640.0, 480.0));
        let scaled = inside.scaled(0.5, 2.0);
        assert_eq!(scaled, BoundingBox::new(300.0, 880.0, 20.0, 80.0));
    }

    #[test]
    fn detection_label_rounds_confidence() {
        let det = detection("det-a", ParticleType::Film, PolymerType::Ps);
        assert_eq!(det.label(), "film 83%");
    }
}
