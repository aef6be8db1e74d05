//! Annotation records and per-mesh annotation sets.

use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use nalgebra::Point3;

/// Index of a vertex in the source mesh.
pub type VertexIndex = usize;

/// A single landmark placed by one annotator on a mesh vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct BlebAnnotation {
    point: Point3<f64>,
    index: VertexIndex,
    annotated_by: String,
}

impl BlebAnnotation {
    pub fn new(point: Point3<f64>, index: VertexIndex, annotated_by: impl Into<String>) -> Self {
        Self {
            point,
            index,
            annotated_by: annotated_by.into(),
        }
    }

    /// Convenience constructor from raw `[x, y, z]` coordinates.
    pub fn from_xyz(xyz: [f64; 3], index: VertexIndex, annotated_by: impl Into<String>) -> Self {
        Self::new(Point3::from(xyz), index, annotated_by)
    }

    /// Coordinate in the mesh frame.
    pub fn point(&self) -> &Point3<f64> {
        &self.point
    }

    /// Coordinate as `[x, y, z]`.
    pub fn xyz(&self) -> [f64; 3] {
        [self.point.x, self.point.y, self.point.z]
    }

    /// Mesh vertex the coordinate was sampled from.
    pub fn index(&self) -> VertexIndex {
        self.index
    }

    pub fn annotated_by(&self) -> &str {
        &self.annotated_by
    }

    /// Copy of this record attributed to another annotator.
    ///
    /// Coordinate and vertex index are carried over unchanged.
    pub fn with_annotator(&self, annotated_by: impl Into<String>) -> Self {
        Self {
            point: self.point,
            index: self.index,
            annotated_by: annotated_by.into(),
        }
    }
}

impl std::fmt::Display for BlebAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "index: {} ({}, {}, {}) annotated_by: {}",
            self.index, self.point.x, self.point.y, self.point.z, self.annotated_by
        )
    }
}

/// All annotations placed on one mesh case, keyed by vertex index.
///
/// Iteration is always in ascending vertex-index order. Every algorithm in
/// this crate that depends on "first" or "earlier" records relies on that
/// order, so results never depend on how a set was built or loaded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnnotationSet {
    file_name: String,
    annotations: BTreeMap<VertexIndex, BlebAnnotation>,
}

impl AnnotationSet {
    /// Empty set for the mesh case `file_name`.
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            annotations: BTreeMap::new(),
        }
    }

    /// Build a set from records; later records overwrite earlier ones that
    /// share a vertex index.
    pub fn from_annotations<I>(file_name: impl Into<String>, annotations: I) -> Self
    where
        I: IntoIterator<Item = BlebAnnotation>,
    {
        let mut set = Self::new(file_name);
        for annotation in annotations {
            set.insert(annotation);
        }
        set
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Place a point on vertex `index`, replacing any record already there.
    pub fn add_point(
        &mut self,
        point: Point3<f64>,
        annotated_by: impl Into<String>,
        index: VertexIndex,
    ) {
        self.insert(BlebAnnotation::new(point, index, annotated_by));
    }

    /// Insert-or-overwrite by the record's own vertex index.
    ///
    /// Returns the displaced record, if any.
    pub fn insert(&mut self, annotation: BlebAnnotation) -> Option<BlebAnnotation> {
        self.annotations.insert(annotation.index, annotation)
    }

    /// Delete the record on vertex `index`. Missing indices are a no-op.
    pub fn remove_by_index(&mut self, index: VertexIndex) -> Option<BlebAnnotation> {
        self.annotations.remove(&index)
    }

    pub fn get(&self, index: VertexIndex) -> Option<&BlebAnnotation> {
        self.annotations.get(&index)
    }

    pub fn contains_index(&self, index: VertexIndex) -> bool {
        self.annotations.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Records in ascending vertex-index order.
    pub fn iter(&self) -> impl Iterator<Item = &BlebAnnotation> + '_ {
        self.annotations.values()
    }

    /// Owned snapshot of the records in ascending vertex-index order.
    pub fn annotations(&self) -> Vec<BlebAnnotation> {
        self.annotations.values().cloned().collect()
    }

    /// Vertex indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = VertexIndex> + '_ {
        self.annotations.keys().copied()
    }

    /// Distinct annotator labels present in the set.
    pub fn annotators(&self) -> BTreeSet<&str> {
        self.annotations
            .values()
            .map(|a| a.annotated_by.as_str())
            .collect()
    }
}

impl<'a> IntoIterator for &'a AnnotationSet {
    type Item = &'a BlebAnnotation;
    type IntoIter = btree_map::Values<'a, VertexIndex, BlebAnnotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.annotations.values()
    }
}
