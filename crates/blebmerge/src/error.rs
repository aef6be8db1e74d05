//! Error type shared by annotation loading, config validation and dataset runs.

use std::path::PathBuf;

use crate::annotation::VertexIndex;

#[derive(Debug)]
pub enum AnnotationError {
    /// Filesystem access failed for `path`.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// JSON could not be parsed or written. `path` is `None` for in-memory data.
    Json {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    /// A persisted map key does not match the record's embedded index.
    IndexMismatch { key: VertexIndex, index: VertexIndex },
    /// A persisted coordinate is NaN or infinite.
    NonFiniteCoordinate { index: VertexIndex },
    /// Reconciliation configuration failed validation.
    InvalidConfig(String),
    /// An annotator has no annotation file for a case.
    MissingInput {
        case: String,
        annotator: String,
        path: PathBuf,
    },
}

impl AnnotationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl std::fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            Self::Json {
                path: Some(path),
                source,
            } => write!(f, "{}: invalid annotation json: {}", path.display(), source),
            Self::Json { path: None, source } => {
                write!(f, "invalid annotation json: {}", source)
            }
            Self::IndexMismatch { key, index } => write!(
                f,
                "annotation key '{}' does not match embedded index {}",
                key, index
            ),
            Self::NonFiniteCoordinate { index } => {
                write!(f, "annotation {} has a non-finite coordinate", index)
            }
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            Self::MissingInput {
                case,
                annotator,
                path,
            } => write!(
                f,
                "case '{}': no annotation from '{}' at {}",
                case,
                annotator,
                path.display()
            ),
        }
    }
}

impl std::error::Error for AnnotationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}
