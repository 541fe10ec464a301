/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::Point3D;
use crate::errors::{BpcError, Result};
use std::collections::HashSet;

/// An unordered collection of 3-D points, e.g. the LiDAR returns of one building.
/// Points are kept in insertion order; every coordinate is finite.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiPoint {
    points: Vec<Point3D>,
}

impl MultiPoint {
    pub fn new(points: Vec<Point3D>) -> Result<MultiPoint> {
        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(BpcError::InvalidGeometry(format!(
                "multipoint contains a non-finite coordinate ({}, {}, {})",
                p.x, p.y, p.z
            )));
        }
        Ok(MultiPoint { points })
    }

    pub fn empty() -> MultiPoint {
        MultiPoint { points: vec![] }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point3D> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<Point3D> {
        self.points
    }

    /// Geometric union of two collections. Points with identical coordinates are
    /// collapsed into one; the first occurrence keeps its position.
    pub fn union(&self, other: &MultiPoint) -> MultiPoint {
        let mut seen: HashSet<[u64; 3]> = HashSet::with_capacity(self.len() + other.len());
        let mut points = Vec::with_capacity(self.len() + other.len());
        for p in self.points.iter().chain(other.points.iter()) {
            if seen.insert(p.coordinate_key()) {
                points.push(*p);
            }
        }
        MultiPoint { points }
    }

    /// Per-axis minimum and maximum, or None for an empty collection.
    pub fn extent(&self) -> Option<(Point3D, Point3D)> {
        let first = self.points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some((min, max))
    }

    pub fn min_z(&self) -> Option<f64> {
        self.extent().map(|(min, _)| min.z)
    }
}

#[cfg(test)]
mod test {
    use super::MultiPoint;
    use crate::structures::Point3D;

    #[test]
    fn test_rejects_non_finite() {
        assert!(MultiPoint::new(vec![Point3D::new(0.0, f64::INFINITY, 1.0)]).is_err());
        assert!(MultiPoint::new(vec![]).unwrap().is_empty());
    }

    #[test]
    fn test_union_collapses_duplicates() {
        let a = MultiPoint::new(vec![Point3D::new(1.0, 1.0, 1.0), Point3D::new(2.0, 2.0, 2.0)]).unwrap();
        let b = MultiPoint::new(vec![Point3D::new(2.0, 2.0, 2.0), Point3D::new(-0.0, 3.0, 0.0)]).unwrap();
        let c = MultiPoint::new(vec![Point3D::new(0.0, 3.0, 0.0)]).unwrap();
        let u = a.union(&b).union(&c);
        assert_eq!(u.len(), 3);
        assert_eq!(u.points()[0], Point3D::new(1.0, 1.0, 1.0));
        assert_eq!(u.union(&MultiPoint::empty()), u);
    }

    #[test]
    fn test_extent() {
        assert!(MultiPoint::empty().extent().is_none());
        let mp = MultiPoint::new(vec![
            Point3D::new(3.0, -1.0, 7.0),
            Point3D::new(-2.0, 4.0, 2.5),
        ])
        .unwrap();
        let (min, max) = mp.extent().unwrap();
        assert_eq!(min, Point3D::new(-2.0, -1.0, 2.5));
        assert_eq!(max, Point3D::new(3.0, 4.0, 7.0));
        assert_eq!(mp.min_z(), Some(2.5));
    }
}
