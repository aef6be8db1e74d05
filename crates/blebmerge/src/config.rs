//! Reconciliation parameters and annotator sources.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::AnnotationError;

/// One annotator's labelled dataset directory.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnnotatorSource {
    /// Label stamped on this annotator's condensed points.
    pub label: String,
    /// Directory holding one sub-directory per mesh case.
    pub dataset_dir: PathBuf,
}

impl AnnotatorSource {
    pub fn new(label: impl Into<String>, dataset_dir: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            dataset_dir: dataset_dir.into(),
        }
    }
}

/// Parameters for condensing, comparing and filing mesh cases.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Points of one annotator closer than this collapse into one.
    pub distance_threshold: f64,
    /// Rank-paired points of two annotators must be closer than this to agree.
    pub agreement_threshold: f64,
    /// Annotators in merge order; later annotators win vertex collisions.
    pub annotators: Vec<AnnotatorSource>,
    /// Mesh file expected in every case directory.
    pub mesh_file_name: String,
    /// Annotation file expected in every case directory.
    pub annotation_file_name: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 0.9,
            agreement_threshold: 2.0,
            annotators: Vec::new(),
            mesh_file_name: "mesh.obj".to_string(),
            annotation_file_name: "annotation.json".to_string(),
        }
    }
}

impl ReconcileConfig {
    /// Parse a configuration from a JSON file without validating it.
    ///
    /// Use this when values are overridden afterwards; call [`Self::validate`]
    /// once the final values are in place.
    pub fn load_json_file(path: &Path) -> Result<Self, AnnotationError> {
        let data = std::fs::read_to_string(path).map_err(|e| AnnotationError::io(path, e))?;
        serde_json::from_str(&data).map_err(|source| AnnotationError::Json {
            path: Some(path.to_path_buf()),
            source,
        })
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, AnnotationError> {
        let config = Self::load_json_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check thresholds, annotator list and file names.
    pub fn validate(&self) -> Result<(), AnnotationError> {
        validate_threshold("distance_threshold", self.distance_threshold)?;
        validate_threshold("agreement_threshold", self.agreement_threshold)?;

        if self.annotators.len() < 2 {
            return Err(AnnotationError::InvalidConfig(format!(
                "at least two annotators are required, got {}",
                self.annotators.len()
            )));
        }

        let mut seen = HashSet::new();
        for source in &self.annotators {
            if source.label.trim().is_empty() {
                return Err(AnnotationError::InvalidConfig(
                    "annotator label must not be empty".to_string(),
                ));
            }
            if !seen.insert(source.label.as_str()) {
                return Err(AnnotationError::InvalidConfig(format!(
                    "duplicate annotator label '{}'",
                    source.label
                )));
            }
        }

        if self.mesh_file_name.trim().is_empty() {
            return Err(AnnotationError::InvalidConfig(
                "mesh_file_name must not be empty".to_string(),
            ));
        }
        if self.annotation_file_name.trim().is_empty() {
            return Err(AnnotationError::InvalidConfig(
                "annotation_file_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_threshold(name: &str, value: f64) -> Result<(), AnnotationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AnnotationError::InvalidConfig(format!(
            "{} must be finite and > 0, got {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_readers() -> ReconcileConfig {
        ReconcileConfig {
            annotators: vec![
                AnnotatorSource::new("reader_a", "/data/a"),
                AnnotatorSource::new("reader_b", "/data/b"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn defaults_match_batch_run() {
        let config = ReconcileConfig::default();
        assert_eq!(config.distance_threshold, 0.9);
        assert_eq!(config.agreement_threshold, 2.0);
        assert_eq!(config.mesh_file_name, "mesh.obj");
        assert_eq!(config.annotation_file_name, "annotation.json");
    }

    #[test]
    fn validate_accepts_two_readers() {
        assert!(two_readers().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_thresholds() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let mut config = two_readers();
            config.agreement_threshold = bad;
            let err = config.validate().expect_err("bad threshold");
            assert!(err.to_string().contains("agreement_threshold"));
        }
    }

    #[test]
    fn validate_rejects_single_or_duplicate_annotator() {
        let mut config = two_readers();
        config.annotators.truncate(1);
        assert!(config.validate().is_err());

        let mut config = two_readers();
        config.annotators[1].label = "reader_a".to_string();
        let err = config.validate().expect_err("duplicate");
        assert!(err.to_string().contains("duplicate annotator label"));
    }

    #[test]
    fn parses_partial_json_with_defaults() {
        let raw = r#"{
            "agreement_threshold": 1.5,
            "annotators": [
                {"label": "a", "dataset_dir": "/x"},
                {"label": "b", "dataset_dir": "/y"}
            ]
        }"#;
        let config: ReconcileConfig = serde_json::from_str(raw).expect("valid");
        assert_eq!(config.distance_threshold, 0.9);
        assert_eq!(config.agreement_threshold, 1.5);
        assert_eq!(config.annotators[1].dataset_dir, PathBuf::from("/y"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_json_file_loads_and_validates() {
        let dir = tempfile::tempdir().expect("tempdir");

        let good = dir.path().join("good.json");
        std::fs::write(
            &good,
            r#"{
                "distance_threshold": 0.5,
                "annotators": [
                    {"label": "a", "dataset_dir": "/x"},
                    {"label": "b", "dataset_dir": "/y"}
                ]
            }"#,
        )
        .expect("write");
        let config = ReconcileConfig::from_json_file(&good).expect("valid config");
        assert_eq!(config.distance_threshold, 0.5);
        assert_eq!(config.annotators.len(), 2);

        // Parses fine but has a single annotator.
        let lonely = dir.path().join("lonely.json");
        std::fs::write(
            &lonely,
            r#"{"annotators": [{"label": "a", "dataset_dir": "/x"}]}"#,
        )
        .expect("write");
        assert!(ReconcileConfig::load_json_file(&lonely).is_ok());
        assert!(matches!(
            ReconcileConfig::from_json_file(&lonely),
            Err(AnnotationError::InvalidConfig(_))
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").expect("write");
        match ReconcileConfig::from_json_file(&broken) {
            Err(AnnotationError::Json { path: Some(p), .. }) => assert_eq!(p, broken),
            other => panic!("unexpected result {other:?}"),
        }

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            ReconcileConfig::load_json_file(&missing),
            Err(AnnotationError::Io { .. })
        ));
    }

    #[test]
    fn rejects_unknown_fields() {
        let raw = r#"{"threshold": 0.9}"#;
        assert!(serde_json::from_str::<ReconcileConfig>(raw).is_err());
    }
}
