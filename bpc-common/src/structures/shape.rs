use super::{MultiPoint, Point2D, Polygon};

/// The geometry kinds exchanged with the spatial store.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Point(Point2D),
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
    MultiPoint(MultiPoint),
}

impl Shape {
    pub fn type_name(&self) -> &'static str {
        match self {
            Shape::Point(_) => "Point",
            Shape::Polygon(_) => "Polygon",
            Shape::MultiPolygon(_) => "MultiPolygon",
            Shape::MultiPoint(_) => "MultiPoint",
        }
    }

    /// The polygons of a polygonal shape; empty for points.
    pub fn polygons(&self) -> Vec<&Polygon> {
        match self {
            Shape::Polygon(p) => vec![p],
            Shape::MultiPolygon(v) => v.iter().collect(),
            _ => vec![],
        }
    }
}
