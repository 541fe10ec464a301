// private sub-module defined in other files
mod bounding_box;
mod multipoint;
mod point2d;
mod point3d;
mod point_array;
mod polygon;
mod rectangle_with_data;
mod shape;

// exports identifiers from private sub-modules in the current module namespace
pub use self::bounding_box::BoundingBox;
pub use self::multipoint::MultiPoint;
pub use self::point2d::Point2D;
pub use self::point3d::Point3D;
pub use self::point_array::PointArray;
pub use self::polygon::Polygon;
pub use self::rectangle_with_data::{query_envelope, RectangleWithData};
pub use self::shape::Shape;
