use crate::structures::Point2D;

/// Shoelace sum over the ring; positive for counter-clockwise rings. The ring
/// may be closed or open.
pub fn signed_polygon_area(vertices: &[Point2D]) -> f64 {
    let num_vertices = vertices.len();
    if num_vertices < 3 {
        return 0f64;
    }
    let mut area = 0f64;
    for i in 0..num_vertices {
        let j = (i + 1) % num_vertices;
        area += vertices[i].x * vertices[j].y - vertices[j].x * vertices[i].y;
    }
    area / 2f64
}

/// Calculates the area of a polygon defined by a series of vertices.
pub fn polygon_area(vertices: &[Point2D]) -> f64 {
    signed_polygon_area(vertices).abs()
}

/// Area-weighted centroid of a ring. Returns the signed area alongside the
/// centroid so that callers can combine rings (e.g. subtract holes).
/// A zero-area ring yields the mean of its vertices.
pub fn polygon_centroid(vertices: &[Point2D]) -> (Point2D, f64) {
    let num_vertices = vertices.len();
    if num_vertices == 0 {
        return (Point2D::new(0f64, 0f64), 0f64);
    }
    // shift to the first vertex to keep the products small for national grid coordinates
    let origin = vertices[0];
    let mut area2 = 0f64;
    let mut cx = 0f64;
    let mut cy = 0f64;
    for i in 0..num_vertices {
        let a = vertices[i] - origin;
        let b = vertices[(i + 1) % num_vertices] - origin;
        let cross = a.x * b.y - b.x * a.y;
        area2 += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    if area2 == 0f64 {
        let closed = num_vertices > 1 && vertices[0] == vertices[num_vertices - 1];
        let n = if closed { num_vertices - 1 } else { num_vertices };
        let mut x = 0f64;
        let mut y = 0f64;
        for p in &vertices[..n] {
            x += p.x;
            y += p.y;
        }
        return (Point2D::new(x / n as f64, y / n as f64), 0f64);
    }
    let centroid = Point2D::new(
        origin.x + cx / (3f64 * area2),
        origin.y + cy / (3f64 * area2),
    );
    (centroid, area2 / 2f64)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_closed_polygon_area() {
        let poly = [
            Point2D::new(0.0, 0.0),
            Point2D::new(5.0, 0.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(0.0, 5.0),
            Point2D::new(0.0, 0.0),
        ];
        assert_eq!(polygon_area(&poly), 25f64);
        assert_eq!(signed_polygon_area(&poly), 25f64);
    }

    #[test]
    fn test_open_polygon_area() {
        let poly = [
            Point2D::new(0.0, 0.0),
            Point2D::new(0.0, 5.0),
            Point2D::new(5.0, 5.0),
            Point2D::new(5.0, 0.0),
        ];
        assert_eq!(polygon_area(&poly), 25f64);
        assert_eq!(signed_polygon_area(&poly), -25f64);
    }

    #[test]
    fn test_centroid() {
        let poly = [
            Point2D::new(400000.0, 300000.0),
            Point2D::new(400010.0, 300000.0),
            Point2D::new(400010.0, 300004.0),
            Point2D::new(400000.0, 300004.0),
            Point2D::new(400000.0, 300000.0),
        ];
        let (c, area) = polygon_centroid(&poly);
        assert_eq!(c, Point2D::new(400005.0, 300002.0));
        assert_eq!(area, 40f64);
    }

    #[test]
    fn test_degenerate_centroid() {
        let line = [
            Point2D::new(0.0, 0.0),
            Point2D::new(4.0, 0.0),
            Point2D::new(0.0, 0.0),
        ];
        let (c, area) = polygon_centroid(&line);
        assert_eq!(area, 0f64);
        assert_eq!(c, Point2D::new(2.0, 0.0));
    }
}
