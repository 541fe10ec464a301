use super::BoundingBox;
use crate::rstar::primitives::Rectangle;
use crate::rstar::{RTreeObject, AABB};

type RectangleF64 = Rectangle<[f64; 2]>;

/// A planar envelope carrying a payload, for bulk loading into an `rstar::RTree`.
#[derive(Debug)]
pub struct RectangleWithData<T> {
    pub data: T,
    pub rectangle: RectangleF64,
}

impl<T> RectangleWithData<T> {
    pub fn new(data: T, corner1: [f64; 2], corner2: [f64; 2]) -> Self {
        let rectangle = Rectangle::from_corners(corner1, corner2);
        RectangleWithData { data, rectangle }
    }

    pub fn from_bounding_box(data: T, bb: &BoundingBox) -> Self {
        RectangleWithData::new(data, bb.lower_corner(), bb.upper_corner())
    }
}

impl<T> RTreeObject for RectangleWithData<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.rectangle.envelope()
    }
}

/// The envelope used to query an `RTree` of `RectangleWithData` items.
pub fn query_envelope(bb: &BoundingBox) -> AABB<[f64; 2]> {
    AABB::from_corners(bb.lower_corner(), bb.upper_corner())
}

#[cfg(test)]
mod test {
    use super::{query_envelope, RectangleWithData};
    use crate::rstar::RTree;
    use crate::structures::BoundingBox;

    #[test]
    fn test_locate_intersecting() {
        let tree = RTree::bulk_load(vec![
            RectangleWithData::new(1, [0.0, 0.0], [2.0, 2.0]),
            RectangleWithData::new(2, [1.0, 1.0], [3.0, 3.0]),
            RectangleWithData::new(3, [2.5, 2.5], [4.0, 4.0]),
        ]);
        let env = query_envelope(&BoundingBox::new(1.5, 1.6, 1.5, 1.6));
        let mut found: Vec<i32> = tree
            .locate_in_envelope_intersecting(&env)
            .map(|r| r.data)
            .collect();
        found.sort();
        assert_eq!(found, vec![1, 2]);
    }
}
