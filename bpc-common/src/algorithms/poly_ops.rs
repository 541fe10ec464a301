/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use super::point_segment_distance;
use crate::structures::Point2D;

/// Points closer than this to a ring edge are considered to lie on the ring.
pub const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Tests if a point is Left|On|Right of an infinite line,
/// based on http://geomalgorithms.com/a03-_inclusion.html.
///
/// Return: > 0 for p2 left of the line through p0 and p1
///         = 0 for p2 on the line through p0 and p1
///         < 0 for p2 right of the line through p0 and p1
fn is_left(p0: &Point2D, p1: &Point2D, p2: &Point2D) -> f64 {
    (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y)
}

/// Calculates the winding number of a ring around a point. The ring may be
/// given either closed (first vertex repeated) or open.
pub fn winding_number(p: &Point2D, poly: &[Point2D]) -> i32 {
    let n = poly.len();
    if n < 3 {
        return 0;
    }
    let mut wn = 0i32;
    for i in 0..n {
        let a = &poly[i];
        let b = &poly[(i + 1) % n];
        if a.y <= p.y {
            if b.y > p.y && is_left(a, b, p) > 0f64 {
                // an upward crossing with p left of the edge
                wn += 1;
            }
        } else if b.y <= p.y && is_left(a, b, p) < 0f64 {
            // a downward crossing with p right of the edge
            wn -= 1;
        }
    }
    wn
}

/// Returns true if the point lies on one of the ring's edges.
pub fn point_on_ring(p: &Point2D, poly: &[Point2D]) -> bool {
    let n = poly.len();
    for i in 0..n {
        if point_segment_distance(p, &poly[i], &poly[(i + 1) % n]) <= BOUNDARY_TOLERANCE {
            return true;
        }
    }
    false
}

/// Tests whether a point is strictly within a ring. Points on an edge of the
/// ring are deemed outside.
pub fn point_in_poly(p: &Point2D, poly: &[Point2D]) -> bool {
    if point_on_ring(p, poly) {
        return false;
    }
    winding_number(p, poly) != 0
}

#[cfg(test)]
mod test {
    use super::*;

    fn square() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(0.0, 10.0),
            Point2D::new(0.0, 0.0),
        ]
    }

    #[test]
    fn test_point_in_poly() {
        let poly = square();
        assert!(point_in_poly(&Point2D::new(2.0, 2.0), &poly));
        assert_eq!(point_in_poly(&Point2D::new(12.0, 12.0), &poly), false);
    }

    #[test]
    fn test_edges_are_outside() {
        let poly = square();
        // every edge, including the bottom and left edges that the winding number alone would count
        assert_eq!(point_in_poly(&Point2D::new(5.0, 0.0), &poly), false);
        assert_eq!(point_in_poly(&Point2D::new(0.0, 5.0), &poly), false);
        assert_eq!(point_in_poly(&Point2D::new(10.0, 5.0), &poly), false);
        assert_eq!(point_in_poly(&Point2D::new(5.0, 10.0), &poly), false);
        assert_eq!(point_in_poly(&Point2D::new(0.0, 0.0), &poly), false);
        assert!(point_on_ring(&Point2D::new(5.0, 0.0), &poly));
    }

    #[test]
    fn test_winding_number_open_and_closed() {
        let closed = square();
        let open = &closed[..4];
        assert_eq!(winding_number(&Point2D::new(4.0, 2.0), &closed), 1);
        assert_eq!(winding_number(&Point2D::new(4.0, 2.0), open), 1);
        assert_eq!(winding_number(&Point2D::new(14.0, 2.0), open), 0);
        // clockwise rings wind the other way
        let reversed: Vec<Point2D> = closed.iter().rev().cloned().collect();
        assert_eq!(winding_number(&Point2D::new(4.0, 2.0), &reversed), -1);
        assert!(point_in_poly(&Point2D::new(4.0, 2.0), &reversed));
    }

    #[test]
    fn test_concave_ring() {
        // an L-shaped building
        let poly = [
            Point2D::new(0.0, 0.0),
            Point2D::new(6.0, 0.0),
            Point2D::new(6.0, 3.0),
            Point2D::new(3.0, 3.0),
            Point2D::new(3.0, 6.0),
            Point2D::new(0.0, 6.0),
            Point2D::new(0.0, 0.0),
        ];
        assert!(point_in_poly(&Point2D::new(1.0, 5.0), &poly));
        assert!(point_in_poly(&Point2D::new(5.0, 1.0), &poly));
        assert_eq!(point_in_poly(&Point2D::new(5.0, 5.0), &poly), false);
    }
}
