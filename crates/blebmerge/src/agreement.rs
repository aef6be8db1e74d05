//! Cross-annotator agreement check for condensed annotation sets.
//!
//! Two sets agree when they hold the same number of points and, after sorting
//! each set by distance to the frame origin, every rank-paired couple of
//! points lies strictly closer than the tolerance.
//!
//! The rank pairing is not an optimal assignment. It matches correctly only
//! while landmarks are well separated relative to their spread in distance
//! from the origin; two landmarks at nearly equal origin distance can swap
//! ranks between annotators and produce a false disagreement.

use std::cmp::Ordering;

use crate::annotation::{AnnotationSet, BlebAnnotation, VertexIndex};
use crate::distance::{distance, distance_to_origin};

/// Distance between the i-th closest-to-origin points of both sets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairDistance {
    /// Rank under ascending distance to the origin.
    pub rank: usize,
    /// Vertex index of the point from the left set.
    pub left_index: VertexIndex,
    /// Vertex index of the point from the right set.
    pub right_index: VertexIndex,
    pub distance: f64,
}

/// Verdict of an agreement check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Agreement {
    /// Same cardinality and every rank pair within tolerance.
    Agreed,
    /// The sets hold a different number of points.
    CountMismatch { left: usize, right: usize },
    /// The pair at `rank` is at least the tolerance apart.
    PairExceeded { rank: usize, distance: f64 },
}

impl std::fmt::Display for Agreement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agreed => write!(f, "agreed"),
            Self::CountMismatch { left, right } => {
                write!(f, "point count mismatch: {} vs {}", left, right)
            }
            Self::PairExceeded { rank, distance } => {
                write!(f, "pair at rank {} is {:.4} apart", rank, distance)
            }
        }
    }
}

/// Full result of [`compare`].
#[derive(Debug, Clone, PartialEq)]
pub struct AgreementReport {
    pub verdict: Agreement,
    /// Tolerance the pairs were checked against.
    pub threshold: f64,
    /// Pairs evaluated before the verdict was reached. The last entry is the
    /// failing pair for [`Agreement::PairExceeded`]; empty on count mismatch.
    pub pairs: Vec<PairDistance>,
}

impl AgreementReport {
    pub fn is_agreed(&self) -> bool {
        matches!(self.verdict, Agreement::Agreed)
    }

    /// Largest pair distance evaluated, if any pair was evaluated.
    pub fn max_distance(&self) -> Option<f64> {
        self.pairs
            .iter()
            .map(|p| p.distance)
            .max_by(|a, b| a.total_cmp(b))
    }
}

/// Records sorted by ascending distance to the origin.
///
/// The sort is stable, so ties keep ascending vertex-index order.
fn sorted_by_origin_distance(set: &AnnotationSet) -> Vec<&BlebAnnotation> {
    let mut keyed: Vec<(f64, &BlebAnnotation)> =
        set.iter().map(|a| (distance_to_origin(a), a)).collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    keyed.into_iter().map(|(_, a)| a).collect()
}

/// Compare two condensed sets and report per-pair distances.
pub fn compare(left: &AnnotationSet, right: &AnnotationSet, threshold: f64) -> AgreementReport {
    if left.len() != right.len() {
        tracing::debug!(
            "{}: point count mismatch ({} vs {})",
            left.file_name(),
            left.len(),
            right.len()
        );
        return AgreementReport {
            verdict: Agreement::CountMismatch {
                left: left.len(),
                right: right.len(),
            },
            threshold,
            pairs: Vec::new(),
        };
    }

    let left_sorted = sorted_by_origin_distance(left);
    let right_sorted = sorted_by_origin_distance(right);

    let mut pairs = Vec::with_capacity(left_sorted.len());
    for (rank, (a, b)) in left_sorted.iter().zip(&right_sorted).enumerate() {
        let d = distance(a, b);
        tracing::debug!("comparing: {} | {} -> {:.4}", a, b, d);
        pairs.push(PairDistance {
            rank,
            left_index: a.index(),
            right_index: b.index(),
            distance: d,
        });

        // NaN on either side never agrees.
        if d.partial_cmp(&threshold) != Some(Ordering::Less) {
            return AgreementReport {
                verdict: Agreement::PairExceeded { rank, distance: d },
                threshold,
                pairs,
            };
        }
    }

    AgreementReport {
        verdict: Agreement::Agreed,
        threshold,
        pairs,
    }
}

/// True when both sets describe the same landmarks within `threshold`.
pub fn is_similar(left: &AnnotationSet, right: &AnnotationSet, threshold: f64) -> bool {
    compare(left, right, threshold).is_agreed()
}
