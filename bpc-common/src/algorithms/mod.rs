/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/
// private sub-module defined in other files
mod line_ops;
mod poly_area;
mod poly_ops;

// exports identifiers from private sub-modules in the current module namespace
pub use self::line_ops::{point_segment_distance, segments_intersect};
pub use self::poly_area::{polygon_area, polygon_centroid, signed_polygon_area};
pub use self::poly_ops::{point_in_poly, point_on_ring, winding_number, BOUNDARY_TOLERANCE};
