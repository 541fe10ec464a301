use super::BOUNDARY_TOLERANCE;
use crate::structures::Point2D;

/// Shortest distance from a point to the line segment between `start` and `end`.
/// Unlike a perpendicular point-line distance, the projection is clamped to the segment.
pub fn point_segment_distance(point: &Point2D, start: &Point2D, end: &Point2D) -> f64 {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len_sqr = dx * dx + dy * dy;
    if len_sqr == 0f64 {
        return point.distance(start);
    }
    let t = (((point.x - start.x) * dx + (point.y - start.y) * dy) / len_sqr).clamp(0f64, 1f64);
    let proj = Point2D::new(start.x + t * dx, start.y + t * dy);
    point.distance(&proj)
}

fn orientation(a: &Point2D, b: &Point2D, c: &Point2D) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Tests whether two closed line segments share at least one point. Touching
/// end points and collinear overlaps count as intersections.
pub fn segments_intersect(p1: &Point2D, p2: &Point2D, q1: &Point2D, q2: &Point2D) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);
    if ((d1 > 0f64 && d2 < 0f64) || (d1 < 0f64 && d2 > 0f64))
        && ((d3 > 0f64 && d4 < 0f64) || (d3 < 0f64 && d4 > 0f64))
    {
        return true;
    }
    point_segment_distance(p1, q1, q2) <= BOUNDARY_TOLERANCE
        || point_segment_distance(p2, q1, q2) <= BOUNDARY_TOLERANCE
        || point_segment_distance(q1, p1, p2) <= BOUNDARY_TOLERANCE
        || point_segment_distance(q2, p1, p2) <= BOUNDARY_TOLERANCE
}
