use bpc_common::structures::{BoundingBox, Point2D, Polygon};

/// A building outline with its stable numeric id.
#[derive(Clone, Debug, PartialEq)]
pub struct Footprint {
    pub id: i64,
    pub geometry: Polygon,
}

/// An addressable location (UPRN) as a point.
#[derive(Clone, Debug, PartialEq)]
pub struct AddressPoint {
    pub uprn: i64,
    pub location: Point2D,
}

/// An administrative area, e.g. a local authority district, keyed by its code.
#[derive(Clone, Debug, PartialEq)]
pub struct Boundary {
    pub code: String,
    pub polygons: Vec<Polygon>,
}

impl Boundary {
    pub fn intersects(&self, polygon: &Polygon) -> bool {
        self.polygons.iter().any(|p| p.intersects_polygon(polygon))
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut iter = self.polygons.iter();
        let mut bb = iter.next()?.bounding_box();
        for p in iter {
            bb.expand_to(p.bounding_box());
        }
        Some(bb)
    }
}

/// One energy performance certificate.
#[derive(Clone, Debug, PartialEq)]
pub struct EpcRecord {
    pub lmk_key: String,
    pub uprn: Option<i64>,
    pub local_authority: String,
    pub rating: Option<String>,
    pub efficiency: Option<i64>,
}
