//! JSON export of an analysis result.
//!
//! The document layout is consumed by downstream tooling, so field names and
//! nesting are fixed. Spectrum data is intentionally left out.

use crate::model::{
    BoundingBox, CountByType, DetectionMode, DetectionResult, ParticleType, PolymerType,
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("failed to encode export document: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write export file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedDetection {
    pub id: String,
    pub particle_type: ParticleType,
    pub polymer_type: PolymerType,
    pub confidence: f64,
    pub ldir_match_score: f64,
    pub bounding_box: BoundingBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub image_name: String,
    /// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T10:20:30.123Z`.
    pub timestamp: String,
    pub mode: DetectionMode,
    pub processing_time: f64,
    pub total_count: usize,
    pub count_by_type: CountByType,
    pub detections: Vec<ExportedDetection>,
}

impl ExportDocument {
    pub fn from_result(result: &DetectionResult) -> Self {
        let detections = result
            .detections
            .iter()
            .map(|det| ExportedDetection {
                id: det.id.clone(),
                particle_type: det.particle_type,
                polymer_type: det.polymer_type,
                confidence: det.confidence,
                ldir_match_score: det.ldir_match_score,
                bounding_box: det.bounding_box,
            })
            .collect();

        Self {
            image_name: result.image_name.clone(),
            timestamp: result
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            mode: result.mode,
            processing_time: result.processing_time,
            total_count: result.total_count,
            count_by_type: result.count_by_type,
            detections,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the document into `dir` under [`file_name_for`] and returns the path.
    pub fn write_to_dir(&self, dir: &Path, now: DateTime<Utc>) -> Result<PathBuf, ExportError> {
        let path = dir.join(file_name_for(now));
        let json = self.to_json_pretty()?;
        fs::create_dir_all(dir).map_err(|source| ExportError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        fs::write(&path, json).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

pub fn file_name_for(now: DateTime<Utc>) -> String {
    format!("microplastic-analysis-{}.json", now.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{generate_detections, ModeProfile, CANONICAL_CANVAS};
    use crate::prelude::AnalysisRequest;
    use chrono::TimeZone;
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::Value;

    fn sample_result() -> DetectionResult {
        let mut rng = StdRng::seed_from_u64(31);
        let detections = generate_detections(&mut rng, &ModeProfile::ACCURATE, CANONICAL_CANVAS);
        let timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 30).unwrap();
        DetectionResult::assemble(
            AnalysisRequest::new("file:///data/river.jpg", "river.jpg", DetectionMode::Accurate),
            timestamp,
            3876.5,
            detections,
        )
    }

    #[test]
    fn export_has_exact_top_level_fields() {
        let text = ExportDocument::from_result(&sample_result())
            .to_json_pretty()
            .unwrap();
        let json: Value = serde_json::from_str(&text).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "countByType",
                "detections",
                "imageName",
                "mode",
                "processingTime",
                "timestamp",
                "totalCount",
            ]
        );
        assert_eq!(json["timestamp"], "2024-05-01T10:20:30.000Z");
        assert_eq!(json["mode"], "accurate");
        assert_eq!(json["countByType"].as_object().unwrap().len(), 5);
    }

    #[test]
    fn exported_detections_omit_spectrum() {
        let json: Value =
            serde_json::to_value(ExportDocument::from_result(&sample_result())).unwrap();
        for det in json["detections"].as_array().unwrap() {
            let mut keys: Vec<_> = det.as_object().unwrap().keys().cloned().collect();
            keys.sort();
            assert_eq!(
                keys,
                vec![
                    "boundingBox",
                    "confidence",
                    "id",
                    "ldirMatchScore",
                    "particleType",
                    "polymerType",
                ]
            );
            assert!(det.get("spectrumData").is_none());
            assert_eq!(det["boundingBox"].as_object().unwrap().len(), 4);
        }
    }

    #[test]
    fn parsed_export_matches_result() {
        let result = sample_result();
        let text = ExportDocument::from_result(&result).to_json_pretty().unwrap();
        let parsed: ExportDocument = serde_json::from_str(&text).unwrap();

        assert_eq!(parsed.total_count, result.total_count);
        assert_eq!(parsed.detections.len(), result.detections.len());
        assert_eq!(parsed.count_by_type, result.count_by_type);
        for (exported, original) in parsed.detections.iter().zip(&result.detections) {
            assert_eq!(exported.id, original.id);
            assert_eq!(exported.particle_type, original.particle_type);
            assert_eq!(exported.polymer_type, original.polymer_type);
            assert!((exported.confidence - original.confidence).abs() < 1e-12);
            assert!((exported.ldir_match_score - original.ldir_match_score).abs() < 1e-12);
            assert!((exported.bounding_box.x - original.bounding_box.x).abs() < 1e-9);
            assert!((exported.bounding_box.height - original.bounding_box.height).abs() < 1e-9);
        }
    }

    #[test]
    fn write_to_dir_uses_timestamped_name() {
        let dir = tempfile::tempdir().unwrap();
        let now = Utc.timestamp_millis_opt(1_714_558_830_123).unwrap();
        let path = ExportDocument::from_result(&sample_result())
            .write_to_dir(dir.path(), now)
            .unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "microplastic-analysis-1714558830123.json"
        );
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"imageName\": \"river.jpg\""));
    }
}
