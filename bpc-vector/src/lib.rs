/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

//! Vector geometry codecs and feature sources: WKB decoding, multipoint/array
//! conversion, GeoJSON feature collections and the EPC certificate export.

pub mod conversion;
pub mod epc_csv;
pub mod features;
pub mod geojson;
pub mod wkb;

pub use crate::conversion::{array_to_multipoint, multipoint_to_array};
pub use crate::features::{AddressPoint, Boundary, EpcRecord, Footprint};
pub use crate::wkb::{shape_to_wkb, wkb_to_shape};
