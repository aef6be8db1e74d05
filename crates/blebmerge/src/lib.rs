//! blebmerge — reconciliation of landmark annotations placed by several
//! annotators on the same 3D surface mesh.
//!
//! Each annotator marks landmarks ("blebs") on mesh vertices, often clicking
//! the same landmark several times. Reconciling a mesh case runs:
//!
//! 1. **Condense** – greedy proximity clustering per annotator, one
//!    representative per cluster ([`condense`]).
//! 2. **Compare** – equal point count plus rank-paired distance check under
//!    distance-to-origin ordering ([`is_similar`], [`compare`]).
//! 3. **Merge** – union of the condensed sets keyed by vertex index
//!    ([`merge`]), built regardless of the verdict.
//!
//! The engine functions are pure: they borrow their input sets and return new
//! ones. [`reconcile_case`] chains them for one case and [`process_dataset`]
//! drives whole annotator datasets on disk.
//!
//! # Example
//!
//! ```
//! use blebmerge::{condense, is_similar, merge, AnnotationSet, BlebAnnotation};
//!
//! let a = AnnotationSet::from_annotations(
//!     "case1",
//!     [
//!         BlebAnnotation::from_xyz([1.0, 0.0, 0.0], 0, "raw"),
//!         BlebAnnotation::from_xyz([1.1, 0.0, 0.0], 1, "raw"),
//!     ],
//! );
//! let b = AnnotationSet::from_annotations(
//!     "case1",
//!     [BlebAnnotation::from_xyz([1.05, 0.0, 0.0], 9, "raw")],
//! );
//!
//! let a = condense(&a, 0.5, "reader_a");
//! let b = condense(&b, 0.5, "reader_b");
//! assert!(is_similar(&a, &b, 0.5));
//!
//! let merged = merge([&a, &b], "case1");
//! assert_eq!(merged.len(), 2);
//! ```

mod agreement;
mod annotation;
mod case;
mod condense;
mod config;
mod dataset;
mod distance;
mod error;
mod io;
mod merge;

pub use agreement::{compare, is_similar, Agreement, AgreementReport, PairDistance};
pub use annotation::{AnnotationSet, BlebAnnotation, VertexIndex};
pub use case::{reconcile_case, CaseOutcome, CaseVerdict, PairwiseComparison};
pub use condense::{condense, condense_with_report, CondenseReport};
pub use config::{AnnotatorSource, ReconcileConfig};
pub use dataset::{
    discover_cases, load_case_inputs, process_case, process_dataset, DatasetLayout,
    DatasetSummary,
};
pub use distance::{distance, distance_to_origin, is_within};
pub use error::AnnotationError;
pub use merge::{merge, merge_with_report, MergeCollision};

pub use nalgebra::Point3;
