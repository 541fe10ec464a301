use bpc_common::structures::{BoundingBox, Point3D};

/// Maximum number of points stored in one patch.
pub const DEFAULT_PATCH_CAPACITY: usize = 400;

/// A spatially compact block of LiDAR points with its planar envelope.
#[derive(Clone, Debug)]
pub struct PointPatch {
    pub id: usize,
    points: Vec<Point3D>,
    envelope: BoundingBox,
}

fn planar_extent(points: &[Point3D]) -> BoundingBox {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    BoundingBox::new(min_x, max_x, min_y, max_y)
}

impl PointPatch {
    /// Returns None for an empty point list; a patch always has an envelope.
    pub fn new(id: usize, points: Vec<Point3D>) -> Option<PointPatch> {
        if points.is_empty() {
            return None;
        }
        let envelope = planar_extent(&points);
        Some(PointPatch {
            id,
            points,
            envelope,
        })
    }

    pub fn points(&self) -> &[Point3D] {
        &self.points
    }

    pub fn envelope(&self) -> BoundingBox {
        self.envelope
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn chip(mut points: Vec<Point3D>, capacity: usize, out: &mut Vec<Vec<Point3D>>) {
    if points.len() <= capacity {
        if !points.is_empty() {
            out.push(points);
        }
        return;
    }
    let bb = planar_extent(&points);
    if bb.get_width() >= bb.get_height() {
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
    } else {
        points.sort_by(|a, b| a.y.total_cmp(&b.y));
    }
    let upper = points.split_off(points.len() / 2);
    chip(points, capacity, out);
    chip(upper, capacity, out);
}

/// Splits a tile's points into patches of at most `capacity` points by
/// recursively halving along the wider planar axis. Patch ids are assigned
/// consecutively from `first_id`.
pub fn chip_points(points: Vec<Point3D>, capacity: usize, first_id: usize) -> Vec<PointPatch> {
    let mut blocks = vec![];
    chip(points, capacity.max(1), &mut blocks);
    blocks
        .into_iter()
        .enumerate()
        .filter_map(|(i, block)| PointPatch::new(first_id + i, block))
        .collect()
}
