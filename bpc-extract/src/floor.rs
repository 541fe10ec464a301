/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use bpc_common::structures::{MultiPoint, Point2D, Point3D, Polygon};

/// Default spacing of the synthetic floor grid, in map units.
pub const FLOOR_RESOLUTION: f64 = 0.5;

/// Most grid points generated for a single footprint.
pub const MAX_FLOOR_GRID_POINTS: usize = 10_000_000;

fn round4(v: f64) -> f64 {
    (v * 10_000f64).round() / 10_000f64
}

/// Grid values `min + i * resolution < max`, or None when the axis would need
/// more than `MAX_FLOOR_GRID_POINTS` steps.
fn axis_values(min: f64, max: f64, resolution: f64) -> Option<Vec<f64>> {
    let steps = ((max - min) / resolution).ceil();
    if !steps.is_finite() || steps > MAX_FLOOR_GRID_POINTS as f64 {
        return None;
    }
    // one extra step absorbs rounding in `min + i * resolution`
    let bound = steps.max(0f64) as usize + 2;
    Some(
        (0..bound)
            .map(|i| min + i as f64 * resolution)
            .take_while(|&v| v < max)
            .map(round4)
            .collect(),
    )
}

/// The regular grid over the footprint's bounding box, `min + i * resolution`
/// along each axis with the upper bound excluded, rounded to four decimals.
pub fn floor_grid(footprint: &Polygon, resolution: f64) -> Vec<Point2D> {
    if !(resolution > 0f64) {
        return vec![];
    }
    let bb = footprint.bounding_box();
    let (xs, ys) = match (
        axis_values(bb.min_x, bb.max_x, resolution),
        axis_values(bb.min_y, bb.max_y, resolution),
    ) {
        (Some(xs), Some(ys)) if xs.len().saturating_mul(ys.len()) <= MAX_FLOOR_GRID_POINTS => {
            (xs, ys)
        }
        _ => {
            log::warn!(
                "A floor grid at resolution {} over a {} x {} footprint exceeds {} points; no floor points added",
                resolution,
                bb.max_x - bb.min_x,
                bb.max_y - bb.min_y,
                MAX_FLOOR_GRID_POINTS
            );
            return vec![];
        }
    };
    let mut grid = Vec::with_capacity(xs.len() * ys.len());
    for &y in &ys {
        for &x in &xs {
            grid.push(Point2D::new(x, y));
        }
    }
    grid
}

/// The grid points lying strictly inside the footprint, lifted to `z_min`.
pub fn floor_points(footprint: &Polygon, z_min: f64, resolution: f64) -> Vec<Point3D> {
    floor_grid(footprint, resolution)
        .into_iter()
        .filter(|p| footprint.contains_point(p))
        .map(|p| Point3D::new(p.x, p.y, z_min))
        .collect()
}

/// Adds synthetic floor points at `z_min` to a building's point collection.
/// Points of the grid that coincide with existing points are merged. A
/// zero-area footprint yields no floor points and the input is returned as is.
pub fn add_floor(footprint: &Polygon, points: &MultiPoint, z_min: f64) -> MultiPoint {
    add_floor_with_resolution(footprint, points, z_min, FLOOR_RESOLUTION)
}

pub fn add_floor_with_resolution(
    footprint: &Polygon,
    points: &MultiPoint,
    z_min: f64,
    resolution: f64,
) -> MultiPoint {
    let floor = floor_points(footprint, z_min, resolution);
    if floor.is_empty() || !z_min.is_finite() {
        return points.clone();
    }
    match MultiPoint::new(floor) {
        Ok(floor) => points.union(&floor),
        Err(_) => points.clone(),
    }
}
