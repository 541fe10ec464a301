/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::{BoundingBox, Point2D};
use crate::algorithms::{
    point_in_poly, point_on_ring, point_segment_distance, polygon_centroid, segments_intersect,
    winding_number,
};
use crate::errors::{BpcError, Result};

/// A planar polygon with one exterior ring and zero or more hole rings.
///
/// Rings are stored closed (the first vertex is repeated at the end). Construction
/// closes open rings and rejects rings with fewer than three distinct positions or
/// with non-finite coordinates. A polygon may still be degenerate (zero area), e.g.
/// when all of its vertices are collinear.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    exterior: Vec<Point2D>,
    holes: Vec<Vec<Point2D>>,
}

fn close_ring(mut ring: Vec<Point2D>, label: &str) -> Result<Vec<Point2D>> {
    if ring.iter().any(|p| !p.is_finite()) {
        return Err(BpcError::InvalidGeometry(format!(
            "the {} ring contains a non-finite coordinate",
            label
        )));
    }
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }
    if ring.len() < 4 {
        return Err(BpcError::InvalidGeometry(format!(
            "the {} ring has {} vertices; at least three distinct vertices are required",
            label,
            ring.len().saturating_sub(1)
        )));
    }
    Ok(ring)
}

impl Polygon {
    pub fn new(exterior: Vec<Point2D>, holes: Vec<Vec<Point2D>>) -> Result<Polygon> {
        let exterior = close_ring(exterior, "exterior")?;
        let holes = holes
            .into_iter()
            .map(|h| close_ring(h, "hole"))
            .collect::<Result<Vec<_>>>()?;
        Ok(Polygon { exterior, holes })
    }

    /// Convenience constructor for an axis-aligned rectangle.
    pub fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Polygon> {
        Polygon::new(
            vec![
                Point2D::new(min_x, min_y),
                Point2D::new(max_x, min_y),
                Point2D::new(max_x, max_y),
                Point2D::new(min_x, max_y),
            ],
            vec![],
        )
    }

    pub fn exterior(&self) -> &[Point2D] {
        &self.exterior
    }

    pub fn holes(&self) -> &[Vec<Point2D>] {
        &self.holes
    }

    pub fn bounding_box(&self) -> BoundingBox {
        // a constructed polygon always has at least four vertices
        BoundingBox::from_points(&self.exterior)
            .unwrap_or_else(|| BoundingBox::new(0f64, 0f64, 0f64, 0f64))
    }

    pub fn area(&self) -> f64 {
        let (_, outer) = polygon_centroid(&self.exterior);
        let mut area = outer.abs();
        for hole in &self.holes {
            let (_, inner) = polygon_centroid(hole);
            area -= inner.abs();
        }
        area.max(0f64)
    }

    /// The area-weighted centroid, with hole areas subtracted. A zero-area polygon
    /// falls back to the mean of its exterior vertices.
    pub fn centroid(&self) -> Point2D {
        let (c, a) = polygon_centroid(&self.exterior);
        let a = a.abs();
        if a == 0f64 || self.holes.is_empty() {
            return c;
        }
        let mut sum_x = c.x * a;
        let mut sum_y = c.y * a;
        let mut total = a;
        for hole in &self.holes {
            let (hc, ha) = polygon_centroid(hole);
            let ha = ha.abs();
            sum_x -= hc.x * ha;
            sum_y -= hc.y * ha;
            total -= ha;
        }
        if total <= 0f64 {
            return c;
        }
        Point2D::new(sum_x / total, sum_y / total)
    }

    fn on_boundary(&self, p: &Point2D) -> bool {
        point_on_ring(p, &self.exterior) || self.holes.iter().any(|h| point_on_ring(p, h))
    }

    /// Strict containment: the point lies in the interior, not on any ring and not
    /// inside a hole.
    pub fn contains_point(&self, p: &Point2D) -> bool {
        if !self.bounding_box().is_point_in_box(p.x, p.y) {
            return false;
        }
        if !point_in_poly(p, &self.exterior) {
            return false;
        }
        !self
            .holes
            .iter()
            .any(|h| point_on_ring(p, h) || winding_number(p, h) != 0)
    }

    /// Boundary-inclusive test: the point is in the interior or on a ring.
    pub fn intersects_point(&self, p: &Point2D) -> bool {
        if !self.bounding_box().is_point_in_box(p.x, p.y) {
            return false;
        }
        self.on_boundary(p) || self.contains_point(p)
    }

    fn rings(&self) -> impl Iterator<Item = &[Point2D]> {
        std::iter::once(self.exterior.as_slice()).chain(self.holes.iter().map(|h| h.as_slice()))
    }

    /// Boundary-inclusive polygon/polygon intersection test.
    pub fn intersects_polygon(&self, other: &Polygon) -> bool {
        if !self.bounding_box().overlaps(other.bounding_box()) {
            return false;
        }
        if self.exterior.iter().any(|p| other.intersects_point(p))
            || other.exterior.iter().any(|p| self.intersects_point(p))
        {
            return true;
        }
        for ring_a in self.rings() {
            for ring_b in other.rings() {
                for a in ring_a.windows(2) {
                    for b in ring_b.windows(2) {
                        if segments_intersect(&a[0], &a[1], &b[0], &b[1]) {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Distance from the point to the nearest ring edge.
    pub fn distance_to_boundary(&self, p: &Point2D) -> f64 {
        let mut min_dist = f64::INFINITY;
        for ring in self.rings() {
            for edge in ring.windows(2) {
                let d = point_segment_distance(p, &edge[0], &edge[1]);
                if d < min_dist {
                    min_dist = d;
                }
            }
        }
        min_dist
    }

    /// Tests membership of the polygon buffered by `distance`, i.e. the point is in
    /// the polygon or within `distance` of its boundary.
    pub fn within_buffer(&self, p: &Point2D, distance: f64) -> bool {
        if distance <= 0f64 {
            return self.intersects_point(p);
        }
        let mut bb = self.bounding_box();
        bb.expand_by(distance);
        if !bb.is_point_in_box(p.x, p.y) {
            return false;
        }
        self.intersects_point(p) || self.distance_to_boundary(p) <= distance
    }
}

#[cfg(test)]
mod test {
    use super::Polygon;
    use crate::structures::Point2D;

    fn with_hole() -> Polygon {
        Polygon::new(
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(10.0, 0.0),
                Point2D::new(10.0, 10.0),
                Point2D::new(0.0, 10.0),
            ],
            vec![vec![
                Point2D::new(4.0, 4.0),
                Point2D::new(6.0, 4.0),
                Point2D::new(6.0, 6.0),
                Point2D::new(4.0, 6.0),
            ]],
        )
        .unwrap()
    }

    #[test]
    fn test_rings_are_closed() {
        let poly = Polygon::rectangle(0.0, 0.0, 2.0, 1.0).unwrap();
        assert_eq!(poly.exterior().len(), 5);
        assert_eq!(poly.exterior()[0], poly.exterior()[4]);
    }

    #[test]
    fn test_invalid_rings_rejected() {
        assert!(Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0)], vec![]).is_err());
        assert!(Polygon::new(
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(f64::NAN, 1.0),
                Point2D::new(1.0, 0.0)
            ],
            vec![]
        )
        .is_err());
    }

    #[test]
    fn test_area_and_centroid_with_hole() {
        let poly = with_hole();
        assert_eq!(poly.area(), 96.0);
        let c = poly.centroid();
        assert!((c.x - 5.0).abs() < 1e-12);
        assert!((c.y - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_contains_respects_holes_and_edges() {
        let poly = with_hole();
        assert!(poly.contains_point(&Point2D::new(1.0, 1.0)));
        assert!(!poly.contains_point(&Point2D::new(5.0, 5.0)));
        assert!(!poly.contains_point(&Point2D::new(4.0, 5.0)));
        assert!(!poly.contains_point(&Point2D::new(0.0, 5.0)));
        assert!(poly.intersects_point(&Point2D::new(0.0, 5.0)));
        assert!(poly.intersects_point(&Point2D::new(4.0, 5.0)));
        assert!(!poly.intersects_point(&Point2D::new(5.0, 5.0)));
    }

    #[test]
    fn test_within_buffer() {
        let poly = Polygon::rectangle(0.0, 0.0, 10.0, 10.0).unwrap();
        assert!(poly.within_buffer(&Point2D::new(-0.4, 5.0), 0.5));
        assert!(poly.within_buffer(&Point2D::new(10.5, 10.0), 0.5));
        assert!(!poly.within_buffer(&Point2D::new(-0.6, 5.0), 0.5));
        // corners are rounded
        assert!(!poly.within_buffer(&Point2D::new(10.45, 10.45), 0.5));
        assert!(poly.within_buffer(&Point2D::new(5.0, 5.0), 0.0));
    }

    #[test]
    fn test_polygon_intersection() {
        let poly = with_hole();
        // crossing edges, no vertex of either inside the other
        let cross = Polygon::rectangle(-1.0, 2.0, 11.0, 3.0).unwrap();
        assert!(poly.intersects_polygon(&cross));
        // touching along an edge
        let touching = Polygon::rectangle(10.0, 0.0, 12.0, 2.0).unwrap();
        assert!(poly.intersects_polygon(&touching));
        // entirely inside the hole
        let in_hole = Polygon::rectangle(4.5, 4.5, 5.5, 5.5).unwrap();
        assert!(!poly.intersects_polygon(&in_hole));
        let far = Polygon::rectangle(20.0, 20.0, 21.0, 21.0).unwrap();
        assert!(!poly.intersects_polygon(&far));
    }

    #[test]
    fn test_degenerate_polygon() {
        let poly = Polygon::new(
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(5.0, 0.0),
                Point2D::new(10.0, 0.0),
            ],
            vec![],
        )
        .unwrap();
        assert_eq!(poly.area(), 0.0);
        assert!(!poly.contains_point(&Point2D::new(5.0, 0.0)));
        assert_eq!(poly.centroid(), Point2D::new(5.0, 0.0));
    }
}
