use super::Point2D;

/// A 3-D point, with x, y, and z fields.
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    /// Creates a new Point3D,
    pub fn new(x: f64, y: f64, z: f64) -> Point3D {
        Point3D { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// The planar location of the point.
    pub fn to_2d(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Bit-level identity of the coordinates, with -0.0 folded onto 0.0.
    pub(crate) fn coordinate_key(&self) -> [u64; 3] {
        [
            (self.x + 0.0).to_bits(),
            (self.y + 0.0).to_bits(),
            (self.z + 0.0).to_bits(),
        ]
    }
}
