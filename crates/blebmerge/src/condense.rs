//! Intra-annotator de-duplication of near-duplicate clicks.

use crate::annotation::{AnnotationSet, BlebAnnotation, VertexIndex};
use crate::distance::distance;

/// Outcome of a condense run, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CondenseReport {
    /// Number of records in the input set.
    pub n_input: usize,
    /// Number of representatives kept.
    pub n_kept: usize,
    /// `(dropped, representative)` vertex-index pairs, in drop order.
    pub absorbed: Vec<(VertexIndex, VertexIndex)>,
}

impl CondenseReport {
    pub fn n_dropped(&self) -> usize {
        self.n_input - self.n_kept
    }
}

/// Greedy suppression in ascending vertex-index order: each surviving record
/// removes every later record closer than `threshold`.
fn suppress_by_proximity(
    annotations: &[BlebAnnotation],
    threshold: f64,
) -> (Vec<bool>, Vec<(VertexIndex, VertexIndex)>) {
    let mut keep = vec![true; annotations.len()];
    let mut absorbed = Vec::new();

    for i in 0..annotations.len() {
        if !keep[i] {
            continue;
        }

        for j in (i + 1)..annotations.len() {
            if !keep[j] {
                continue;
            }
            if distance(&annotations[i], &annotations[j]) < threshold {
                keep[j] = false;
                absorbed.push((annotations[j].index(), annotations[i].index()));
            }
        }
    }

    (keep, absorbed)
}

/// Collapse near-duplicate points of one annotator into representatives.
///
/// Records are visited in ascending vertex-index order. The first remaining
/// record becomes a representative and every remaining record strictly closer
/// than `distance_threshold` to it is dropped. Representatives keep their
/// coordinate and vertex index and are re-attributed to `annotated_by`.
/// The input set is not modified.
pub fn condense(
    set: &AnnotationSet,
    distance_threshold: f64,
    annotated_by: &str,
) -> AnnotationSet {
    condense_with_report(set, distance_threshold, annotated_by).0
}

/// Like [`condense`], also returning which records were absorbed by which
/// representative.
pub fn condense_with_report(
    set: &AnnotationSet,
    distance_threshold: f64,
    annotated_by: &str,
) -> (AnnotationSet, CondenseReport) {
    let annotations: Vec<BlebAnnotation> = set.annotations();
    let (keep, absorbed) = suppress_by_proximity(&annotations, distance_threshold);

    let condensed = AnnotationSet::from_annotations(
        set.file_name(),
        annotations
            .iter()
            .zip(&keep)
            .filter_map(|(a, &k)| k.then(|| a.with_annotator(annotated_by))),
    );

    for (dropped, representative) in &absorbed {
        tracing::trace!(
            "{}: vertex {} absorbed by vertex {}",
            set.file_name(),
            dropped,
            representative
        );
    }

    let report = CondenseReport {
        n_input: annotations.len(),
        n_kept: condensed.len(),
        absorbed,
    };

    tracing::debug!(
        "{}: condensed {} -> {} points for '{}' (threshold {})",
        set.file_name(),
        report.n_input,
        report.n_kept,
        annotated_by,
        distance_threshold
    );

    (condensed, report)
}
