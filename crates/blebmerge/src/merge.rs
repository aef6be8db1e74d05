//! Union of condensed annotation sets into one deliverable set.

use crate::annotation::{AnnotationSet, VertexIndex};

/// Two annotators placed a point on the same vertex; the later set won.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeCollision {
    pub index: VertexIndex,
    /// Annotator whose record was displaced.
    pub displaced: String,
    /// Annotator whose record was kept.
    pub kept: String,
}

/// Merge `sets` in the given order into a new set named `file_name`.
///
/// Records keep their annotator and coordinate. When two sets hold the same
/// vertex index, the record from the later set replaces the earlier one.
pub fn merge<'a, I>(sets: I, file_name: &str) -> AnnotationSet
where
    I: IntoIterator<Item = &'a AnnotationSet>,
{
    merge_with_report(sets, file_name).0
}

/// Like [`merge`], also returning every vertex-index collision.
pub fn merge_with_report<'a, I>(sets: I, file_name: &str) -> (AnnotationSet, Vec<MergeCollision>)
where
    I: IntoIterator<Item = &'a AnnotationSet>,
{
    let mut merged = AnnotationSet::new(file_name);
    let mut collisions = Vec::new();

    for set in sets {
        for annotation in set {
            if let Some(prev) = merged.insert(annotation.clone()) {
                tracing::debug!(
                    "{}: vertex {} annotated by both '{}' and '{}'; keeping '{}'",
                    file_name,
                    prev.index(),
                    prev.annotated_by(),
                    annotation.annotated_by(),
                    annotation.annotated_by()
                );
                collisions.push(MergeCollision {
                    index: prev.index(),
                    displaced: prev.annotated_by().to_string(),
                    kept: annotation.annotated_by().to_string(),
                });
            }
        }
    }

    (merged, collisions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::BlebAnnotation;

    fn single(by: &str, idx: VertexIndex, xyz: [f64; 3]) -> AnnotationSet {
        AnnotationSet::from_annotations("src", [BlebAnnotation::from_xyz(xyz, idx, by)])
    }

    #[test]
    fn merge_keeps_all_distinct_indices() {
        let a = single("x", 0, [0.0, 0.0, 0.0]);
        let b = single("y", 5, [10.0, 10.0, 10.0]);
        let merged = merge([&a, &b], "case1");

        assert_eq!(merged.file_name(), "case1");
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.indices().collect::<Vec<_>>(), vec![0, 5]);
        assert_eq!(merged.get(0).map(BlebAnnotation::annotated_by), Some("x"));
        assert_eq!(merged.get(5).map(BlebAnnotation::annotated_by), Some("y"));
    }

    #[test]
    fn later_set_wins_on_collision() {
        let a = single("x", 3, [0.0, 0.0, 0.0]);
        let b = single("y", 3, [0.5, 0.0, 0.0]);

        let (merged, collisions) = merge_with_report([&a, &b], "case");
        assert_eq!(merged.len(), 1);
        let rec = merged.get(3).expect("index 3");
        assert_eq!(rec.annotated_by(), "y");
        assert_eq!(rec.xyz(), [0.5, 0.0, 0.0]);
        assert_eq!(
            collisions,
            vec![MergeCollision {
                index: 3,
                displaced: "x".into(),
                kept: "y".into(),
            }]
        );

        let reversed = merge([&b, &a], "case");
        assert_eq!(reversed.get(3).map(BlebAnnotation::annotated_by), Some("x"));
    }

    #[test]
    fn merge_contains_every_input_record() {
        let a = AnnotationSet::from_annotations(
            "a",
            (0..10).map(|i| BlebAnnotation::from_xyz([i as f64, 0.0, 0.0], i * 2, "x")),
        );
        let b = AnnotationSet::from_annotations(
            "b",
            (0..10).map(|i| BlebAnnotation::from_xyz([0.0, i as f64, 0.0], i * 3, "y")),
        );
        let merged = merge([&a, &b], "case");

        for rec in &b {
            assert_eq!(merged.get(rec.index()), Some(rec));
        }
        for rec in &a {
            if !b.contains_index(rec.index()) {
                assert_eq!(merged.get(rec.index()), Some(rec));
            }
        }
        let expected: std::collections::BTreeSet<_> = a.indices().chain(b.indices()).collect();
        assert_eq!(merged.len(), expected.len());
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        let merged = merge(std::iter::empty::<&AnnotationSet>(), "case");
        assert!(merged.is_empty());
        assert_eq!(merged.file_name(), "case");
    }
}
