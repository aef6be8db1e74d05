//! JSON persistence of annotation sets.
//!
//! File layout:
//!
//! ```json
//! {
//!   "file_name": "A130_R_vessel",
//!   "annotations": {
//!     "1532": { "x": 1.0, "y": 2.0, "z": 3.0, "index": 1532, "annotated_by": "reader_a" }
//!   }
//! }
//! ```
//!
//! The map key repeats the embedded `index`; both must agree. Keys are written
//! in ascending numeric order. A file with any malformed record is rejected as
//! a whole, so a loaded set never silently misses points.

use std::collections::BTreeMap;
use std::path::Path;

use nalgebra::Point3;

use crate::annotation::{AnnotationSet, BlebAnnotation, VertexIndex};
use crate::error::AnnotationError;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct AnnotationRecord {
    x: f64,
    y: f64,
    z: f64,
    index: VertexIndex,
    annotated_by: String,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct AnnotationFile {
    file_name: String,
    annotations: BTreeMap<VertexIndex, AnnotationRecord>,
}

impl From<&BlebAnnotation> for AnnotationRecord {
    fn from(a: &BlebAnnotation) -> Self {
        let [x, y, z] = a.xyz();
        Self {
            x,
            y,
            z,
            index: a.index(),
            annotated_by: a.annotated_by().to_string(),
        }
    }
}

impl AnnotationRecord {
    fn into_annotation(self, key: VertexIndex) -> Result<BlebAnnotation, AnnotationError> {
        if key != self.index {
            return Err(AnnotationError::IndexMismatch {
                key,
                index: self.index,
            });
        }
        if !(self.x.is_finite() && self.y.is_finite() && self.z.is_finite()) {
            return Err(AnnotationError::NonFiniteCoordinate { index: self.index });
        }
        Ok(BlebAnnotation::new(
            Point3::new(self.x, self.y, self.z),
            self.index,
            self.annotated_by,
        ))
    }
}

impl AnnotationFile {
    fn into_set(self) -> Result<AnnotationSet, AnnotationError> {
        let mut set = AnnotationSet::new(self.file_name);
        for (key, record) in self.annotations {
            set.insert(record.into_annotation(key)?);
        }
        Ok(set)
    }

    fn from_set(set: &AnnotationSet) -> Self {
        Self {
            file_name: set.file_name().to_string(),
            annotations: set
                .iter()
                .map(|a| (a.index(), AnnotationRecord::from(a)))
                .collect(),
        }
    }
}

impl AnnotationSet {
    /// Parse a set from its JSON representation.
    pub fn from_json_str(data: &str) -> Result<Self, AnnotationError> {
        let file: AnnotationFile = serde_json::from_str(data)
            .map_err(|source| AnnotationError::Json { path: None, source })?;
        file.into_set()
    }

    /// Load a set from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, AnnotationError> {
        let data = std::fs::read_to_string(path).map_err(|e| AnnotationError::io(path, e))?;
        let file: AnnotationFile =
            serde_json::from_str(&data).map_err(|source| AnnotationError::Json {
                path: Some(path.to_path_buf()),
                source,
            })?;
        file.into_set()
    }

    /// Pretty-printed JSON representation.
    pub fn to_json_string(&self) -> Result<String, AnnotationError> {
        serde_json::to_string_pretty(&AnnotationFile::from_set(self))
            .map_err(|source| AnnotationError::Json { path: None, source })
    }

    /// Write the set as pretty-printed JSON, replacing any existing file.
    pub fn write_json_file(&self, path: &Path) -> Result<(), AnnotationError> {
        let json = self.to_json_string()?;
        std::fs::write(path, json).map_err(|e| AnnotationError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "file_name": "A130_R_vessel",
        "annotations": {
            "12": {"x": 1.0, "y": 2.0, "z": 3.0, "index": 12, "annotated_by": "reader_a"},
            "3": {"x": -1.5, "y": 0.0, "z": 7.25, "index": 3, "annotated_by": "reader_b"}
        }
    }"#;

    #[test]
    fn parses_sample_file() {
        let set = AnnotationSet::from_json_str(SAMPLE).expect("valid");
        assert_eq!(set.file_name(), "A130_R_vessel");
        assert_eq!(set.indices().collect::<Vec<_>>(), vec![3, 12]);
        let rec = set.get(3).expect("index 3");
        assert_eq!(rec.xyz(), [-1.5, 0.0, 7.25]);
        assert_eq!(rec.annotated_by(), "reader_b");
    }

    #[test]
    fn written_keys_match_indices_in_numeric_order() {
        let set = AnnotationSet::from_annotations(
            "case",
            [
                BlebAnnotation::from_xyz([0.0, 0.0, 0.0], 10, "a"),
                BlebAnnotation::from_xyz([1.0, 0.0, 0.0], 2, "a"),
            ],
        );
        let json = set.to_json_string().expect("serialize");
        let value: serde_json::Value = serde_json::from_str(&json).expect("json");
        let annotations = value["annotations"].as_object().expect("map");
        assert_eq!(annotations.len(), 2);
        for (key, record) in annotations {
            assert_eq!(key.parse::<u64>().ok(), record["index"].as_u64());
        }
        assert!(json.find("\"2\"").expect("key 2") < json.find("\"10\"").expect("key 10"));

        let reloaded = AnnotationSet::from_json_str(&json).expect("reload");
        assert_eq!(reloaded, set);
    }

    #[test]
    fn rejects_key_index_mismatch() {
        let raw = r#"{
            "file_name": "case",
            "annotations": {
                "4": {"x": 0.0, "y": 0.0, "z": 0.0, "index": 5, "annotated_by": "a"}
            }
        }"#;
        let err = AnnotationSet::from_json_str(raw).expect_err("mismatch");
        assert!(matches!(
            err,
            AnnotationError::IndexMismatch { key: 4, index: 5 }
        ));
    }

    #[test]
    fn rejects_record_with_missing_field() {
        let raw = r#"{
            "file_name": "case",
            "annotations": {
                "1": {"x": 0.0, "y": 0.0, "z": 0.0, "index": 1, "annotated_by": "a"},
                "2": {"x": 0.0, "y": 0.0, "index": 2, "annotated_by": "a"}
            }
        }"#;
        let err = AnnotationSet::from_json_str(raw).expect_err("missing z");
        assert!(matches!(err, AnnotationError::Json { path: None, .. }));
        assert!(err.to_string().contains("missing field `z`"));
    }

    #[test]
    fn rejects_missing_annotator_and_non_numeric_key() {
        let no_annotator = r#"{
            "file_name": "case",
            "annotations": {"1": {"x": 0.0, "y": 0.0, "z": 0.0, "index": 1}}
        }"#;
        assert!(AnnotationSet::from_json_str(no_annotator).is_err());

        let bad_key = r#"{
            "file_name": "case",
            "annotations": {
                "abc": {"x": 0.0, "y": 0.0, "z": 0.0, "index": 1, "annotated_by": "a"}
            }
        }"#;
        assert!(AnnotationSet::from_json_str(bad_key).is_err());
    }

    #[test]
    fn rejects_non_finite_coordinate() {
        let record = AnnotationRecord {
            x: f64::NAN,
            y: 0.0,
            z: 0.0,
            index: 8,
            annotated_by: "a".into(),
        };
        let err = record.into_annotation(8).expect_err("nan");
        assert!(matches!(err, AnnotationError::NonFiniteCoordinate { index: 8 }));
    }

    #[test]
    fn file_roundtrip_and_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("annotation.json");
        let set = AnnotationSet::from_json_str(SAMPLE).expect("valid");
        set.write_json_file(&path).expect("write");
        assert_eq!(AnnotationSet::from_json_file(&path).expect("read"), set);

        let missing = dir.path().join("nope.json");
        let err = AnnotationSet::from_json_file(&missing).expect_err("missing");
        assert!(matches!(err, AnnotationError::Io { .. }));
        assert!(err.to_string().contains("nope.json"));
    }
}
