//! Euclidean distance between annotation records.

use nalgebra::Point3;

use crate::annotation::BlebAnnotation;

/// Euclidean distance between the coordinates of two records.
#[inline]
pub fn distance(a: &BlebAnnotation, b: &BlebAnnotation) -> f64 {
    nalgebra::distance(a.point(), b.point())
}

/// Distance from a record to the frame origin `(0, 0, 0)`.
#[inline]
pub fn distance_to_origin(a: &BlebAnnotation) -> f64 {
    nalgebra::distance(&Point3::origin(), a.point())
}

/// True when two records lie strictly closer than `tolerance`.
#[inline]
pub fn is_within(a: &BlebAnnotation, b: &BlebAnnotation, tolerance: f64) -> bool {
    distance(a, b) < tolerance
}
