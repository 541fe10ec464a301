use super::Point2D;

/// An axis-aligned planar extent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> BoundingBox {
        let (x1, x2) = if min_x < max_x {
            (min_x, max_x)
        } else {
            (max_x, min_x)
        };
        let (y1, y2) = if min_y < max_y {
            (min_y, max_y)
        } else {
            (max_y, min_y)
        };
        BoundingBox {
            min_x: x1,
            min_y: y1,
            max_x: x2,
            max_y: y2,
        }
    }

    /// The smallest box enclosing all of the points. Returns None for an empty slice.
    pub fn from_points(points: &[Point2D]) -> Option<BoundingBox> {
        let first = points.first()?;
        let mut bb = BoundingBox::new(first.x, first.x, first.y, first.y);
        for p in &points[1..] {
            bb.min_x = bb.min_x.min(p.x);
            bb.max_x = bb.max_x.max(p.x);
            bb.min_y = bb.min_y.min(p.y);
            bb.max_y = bb.max_y.max(p.y);
        }
        Some(bb)
    }

    pub fn get_height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn get_width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn overlaps(&self, other: BoundingBox) -> bool {
        !(self.max_y < other.min_y
            || self.max_x < other.min_x
            || self.min_y > other.max_y
            || self.min_x > other.max_x)
    }

    pub fn is_point_in_box(&self, x: f64, y: f64) -> bool {
        !(self.max_y < y || self.max_x < x || self.min_y > y || self.min_x > x)
    }

    pub fn expand_to(&mut self, other: BoundingBox) {
        self.max_y = self.max_y.max(other.max_y);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.min_x = self.min_x.min(other.min_x);
    }

    pub fn expand_by(&mut self, value: f64) {
        self.max_y += value;
        self.max_x += value;
        self.min_y -= value;
        self.min_x -= value;
    }

    pub fn lower_corner(&self) -> [f64; 2] {
        [self.min_x, self.min_y]
    }

    pub fn upper_corner(&self) -> [f64; 2] {
        [self.max_x, self.max_y]
    }
}

#[cfg(test)]
mod test {
    use super::BoundingBox;
    use crate::structures::Point2D;

    #[test]
    fn test_new_orders_corners() {
        let bb = BoundingBox::new(10.0, 0.0, 5.0, -5.0);
        assert_eq!(bb.min_x, 0.0);
        assert_eq!(bb.max_x, 10.0);
        assert_eq!(bb.min_y, -5.0);
        assert_eq!(bb.max_y, 5.0);
    }

    #[test]
    fn test_overlaps_and_expand() {
        let mut a = BoundingBox::new(0.0, 1.0, 0.0, 1.0);
        let b = BoundingBox::new(1.2, 2.0, 0.0, 1.0);
        assert!(!a.overlaps(b));
        a.expand_by(0.5);
        assert!(a.overlaps(b));
        assert!(a.is_point_in_box(-0.5, 1.5));
    }

    #[test]
    fn test_from_points() {
        assert!(BoundingBox::from_points(&[]).is_none());
        let bb = BoundingBox::from_points(&[
            Point2D::new(3.0, -1.0),
            Point2D::new(-2.0, 4.0),
            Point2D::new(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(bb, BoundingBox::new(-2.0, 3.0, -1.0, 4.0));
        assert_eq!(bb.get_width(), 5.0);
        assert_eq!(bb.get_height(), 5.0);
    }
}
