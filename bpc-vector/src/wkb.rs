/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

//! Well-known binary geometry codec.
//!
//! The decoder understands points, polygons, multipoints and multipolygons in
//! either byte order, 2D or with Z, and accepts both the ISO type codes
//! (e.g. 1003 for a Polygon Z) and the PostGIS extended flags (Z/M bits and an
//! embedded SRID). Measures are read and discarded. Any structural problem is
//! reported as `BpcError::Decode`.

use bpc_common::structures::{MultiPoint, Point2D, Point3D, Polygon, Shape};
use bpc_common::utils::{ByteOrderReader, ByteOrderWriter, Endianness};
use bpc_common::{BpcError, Result};
use std::io::{Cursor, Read, Seek};

const WKB_POINT: u32 = 1;
const WKB_POLYGON: u32 = 3;
const WKB_MULTIPOINT: u32 = 4;
const WKB_MULTIPOLYGON: u32 = 6;

const EWKB_Z_FLAG: u32 = 0x8000_0000;
const EWKB_M_FLAG: u32 = 0x4000_0000;
const EWKB_SRID_FLAG: u32 = 0x2000_0000;
const EWKB_FLAGS_MASK: u32 = 0x0FFF_FFFF;

#[derive(Clone, Copy, Debug)]
struct GeometryHeader {
    base_type: u32,
    has_z: bool,
    has_m: bool,
}

impl GeometryHeader {
    fn coordinate_bytes(&self) -> usize {
        8 * (2 + self.has_z as usize + self.has_m as usize)
    }
}

fn truncated(e: std::io::Error) -> BpcError {
    BpcError::Decode(format!("truncated payload ({})", e))
}

/// Decodes a WKB/EWKB payload into a shape.
pub fn wkb_to_shape(bytes: &[u8]) -> Result<Shape> {
    if bytes.is_empty() {
        return Err(BpcError::Decode("empty payload".to_string()));
    }
    let mut bor = ByteOrderReader::new(Cursor::new(bytes), Endianness::LittleEndian)?;
    let shape = read_geometry(&mut bor)?;
    if bor.remaining() > 0 {
        return Err(BpcError::Decode(format!(
            "{} unexpected trailing bytes after the geometry",
            bor.remaining()
        )));
    }
    Ok(shape)
}

fn read_header<R: Read + Seek>(bor: &mut ByteOrderReader<R>) -> Result<GeometryHeader> {
    let flag = bor.read_u8().map_err(truncated)?;
    let byte_order = Endianness::from_wkb_flag(flag)
        .ok_or_else(|| BpcError::Decode(format!("invalid byte-order flag {}", flag)))?;
    bor.set_byte_order(byte_order);
    let raw_type = bor.read_u32().map_err(truncated)?;
    let mut has_z = raw_type & EWKB_Z_FLAG != 0;
    let mut has_m = raw_type & EWKB_M_FLAG != 0;
    if raw_type & EWKB_SRID_FLAG != 0 {
        // the SRID is not carried by the in-memory shapes
        bor.read_u32().map_err(truncated)?;
    }
    let iso_type = raw_type & EWKB_FLAGS_MASK;
    match iso_type / 1000 {
        0 => {}
        1 => has_z = true,
        2 => has_m = true,
        3 => {
            has_z = true;
            has_m = true;
        }
        _ => {
            return Err(BpcError::Decode(format!(
                "unsupported geometry type code {}",
                raw_type
            )))
        }
    }
    Ok(GeometryHeader {
        base_type: iso_type % 1000,
        has_z,
        has_m,
    })
}

fn read_count<R: Read + Seek>(bor: &mut ByteOrderReader<R>, min_bytes_each: usize) -> Result<usize> {
    let n = bor.read_u32().map_err(truncated)? as usize;
    if n.saturating_mul(min_bytes_each) > bor.remaining() {
        return Err(BpcError::Decode(format!(
            "element count {} exceeds the {} bytes remaining in the payload",
            n,
            bor.remaining()
        )));
    }
    Ok(n)
}

fn read_coordinate<R: Read + Seek>(
    bor: &mut ByteOrderReader<R>,
    header: &GeometryHeader,
) -> Result<Point3D> {
    let x = bor.read_f64().map_err(truncated)?;
    let y = bor.read_f64().map_err(truncated)?;
    let z = if header.has_z {
        bor.read_f64().map_err(truncated)?
    } else {
        0f64
    };
    if header.has_m {
        bor.read_f64().map_err(truncated)?;
    }
    Ok(Point3D::new(x, y, z))
}

fn read_finite_coordinate<R: Read + Seek>(
    bor: &mut ByteOrderReader<R>,
    header: &GeometryHeader,
) -> Result<Point3D> {
    let p = read_coordinate(bor, header)?;
    if !p.is_finite() {
        return Err(BpcError::Decode(
            "empty point or non-finite coordinate".to_string(),
        ));
    }
    Ok(p)
}

fn read_polygon_body<R: Read + Seek>(
    bor: &mut ByteOrderReader<R>,
    header: &GeometryHeader,
) -> Result<Polygon> {
    let num_rings = read_count(bor, 4)?;
    if num_rings == 0 {
        return Err(BpcError::Decode("empty polygon".to_string()));
    }
    let mut rings: Vec<Vec<Point2D>> = Vec::with_capacity(num_rings);
    for _ in 0..num_rings {
        let num_points = read_count(bor, header.coordinate_bytes())?;
        let mut ring = Vec::with_capacity(num_points);
        for _ in 0..num_points {
            ring.push(read_finite_coordinate(bor, header)?.to_2d());
        }
        rings.push(ring);
    }
    let exterior = rings.remove(0);
    Polygon::new(exterior, rings).map_err(|e| BpcError::Decode(e.to_string()))
}

fn read_geometry<R: Read + Seek>(bor: &mut ByteOrderReader<R>) -> Result<Shape> {
    let header = read_header(bor)?;
    match header.base_type {
        WKB_POINT => Ok(Shape::Point(read_finite_coordinate(bor, &header)?.to_2d())),
        WKB_POLYGON => Ok(Shape::Polygon(read_polygon_body(bor, &header)?)),
        WKB_MULTIPOINT => {
            // every member is a complete point record: flag, type and coordinates
            let n = read_count(bor, 5 + 16)?;
            let mut points = Vec::with_capacity(n);
            for _ in 0..n {
                let member = read_header(bor)?;
                if member.base_type != WKB_POINT {
                    return Err(BpcError::Decode(format!(
                        "multipoint member has geometry type {}",
                        member.base_type
                    )));
                }
                points.push(read_finite_coordinate(bor, &member)?);
            }
            let mp = MultiPoint::new(points).map_err(|e| BpcError::Decode(e.to_string()))?;
            Ok(Shape::MultiPoint(mp))
        }
        WKB_MULTIPOLYGON => {
            let n = read_count(bor, 5 + 4)?;
            let mut polygons = Vec::with_capacity(n);
            for _ in 0..n {
                let member = read_header(bor)?;
                if member.base_type != WKB_POLYGON {
                    return Err(BpcError::Decode(format!(
                        "multipolygon member has geometry type {}",
                        member.base_type
                    )));
                }
                polygons.push(read_polygon_body(bor, &member)?);
            }
            Ok(Shape::MultiPolygon(polygons))
        }
        other => Err(BpcError::Decode(format!(
            "unsupported geometry type {}",
            other
        ))),
    }
}

fn write_header(
    bow: &mut ByteOrderWriter<Vec<u8>>,
    geometry_type: u32,
) -> std::io::Result<()> {
    let flag = match bow.get_byte_order() {
        Endianness::BigEndian => 0u8,
        Endianness::LittleEndian => 1u8,
    };
    bow.write_u8(flag)?;
    bow.write_u32(geometry_type)
}

fn write_polygon(bow: &mut ByteOrderWriter<Vec<u8>>, polygon: &Polygon) -> std::io::Result<()> {
    write_header(bow, WKB_POLYGON)?;
    bow.write_u32(1 + polygon.holes().len() as u32)?;
    for ring in std::iter::once(polygon.exterior()).chain(polygon.holes().iter().map(|h| h.as_slice())) {
        bow.write_u32(ring.len() as u32)?;
        for p in ring {
            bow.write_f64(p.x)?;
            bow.write_f64(p.y)?;
        }
    }
    Ok(())
}

/// Encodes a shape as ISO WKB. Points and polygons are written 2D; multipoints
/// are written with Z.
pub fn shape_to_wkb(shape: &Shape, byte_order: Endianness) -> Result<Vec<u8>> {
    let mut bow = ByteOrderWriter::new(Vec::new(), byte_order);
    match shape {
        Shape::Point(p) => {
            write_header(&mut bow, WKB_POINT)?;
            bow.write_f64(p.x)?;
            bow.write_f64(p.y)?;
        }
        Shape::Polygon(polygon) => write_polygon(&mut bow, polygon)?,
        Shape::MultiPolygon(polygons) => {
            write_header(&mut bow, WKB_MULTIPOLYGON)?;
            bow.write_u32(polygons.len() as u32)?;
            for polygon in polygons {
                write_polygon(&mut bow, polygon)?;
            }
        }
        Shape::MultiPoint(mp) => {
            write_header(&mut bow, 1000 + WKB_MULTIPOINT)?;
            bow.write_u32(mp.len() as u32)?;
            for p in mp.iter() {
                write_header(&mut bow, 1000 + WKB_POINT)?;
                bow.write_f64(p.x)?;
                bow.write_f64(p.y)?;
                bow.write_f64(p.z)?;
            }
        }
    }
    Ok(bow.into_inner())
}

#[cfg(test)]
mod test {
    use super::{shape_to_wkb, wkb_to_shape};
    use bpc_common::structures::{Point2D, Point3D, Polygon, Shape};
    use bpc_common::utils::Endianness;
    use bpc_common::BpcError;

    fn le_point_2d(x: f64, y: f64) -> Vec<u8> {
        let mut b = vec![1u8];
        b.extend_from_slice(&1u32.to_le_bytes());
        b.extend_from_slice(&x.to_le_bytes());
        b.extend_from_slice(&y.to_le_bytes());
        b
    }

    fn assert_decode_error(bytes: &[u8]) {
        match wkb_to_shape(bytes) {
            Err(BpcError::Decode(_)) => {}
            other => panic!("expected a decode error, found {:?}", other),
        }
    }

    #[test]
    fn test_point_both_byte_orders() {
        let shape = wkb_to_shape(&le_point_2d(412345.5, 87654.25)).unwrap();
        assert_eq!(shape, Shape::Point(Point2D::new(412345.5, 87654.25)));

        let mut be = vec![0u8];
        be.extend_from_slice(&1u32.to_be_bytes());
        be.extend_from_slice(&1.5f64.to_be_bytes());
        be.extend_from_slice(&(-2.0f64).to_be_bytes());
        assert_eq!(wkb_to_shape(&be).unwrap(), Shape::Point(Point2D::new(1.5, -2.0)));
    }

    #[test]
    fn test_ewkb_point_with_srid_and_z() {
        let mut b = vec![1u8];
        b.extend_from_slice(&(0x8000_0000u32 | 0x2000_0000 | 1).to_le_bytes());
        b.extend_from_slice(&27700u32.to_le_bytes());
        for v in [10.0f64, 20.0, 30.0] {
            b.extend_from_slice(&v.to_le_bytes());
        }
        assert_eq!(wkb_to_shape(&b).unwrap(), Shape::Point(Point2D::new(10.0, 20.0)));
    }

    #[test]
    fn test_iso_multipoint_z() {
        let mut b = vec![1u8];
        b.extend_from_slice(&1004u32.to_le_bytes());
        b.extend_from_slice(&2u32.to_le_bytes());
        for p in [[1.0f64, 2.0, 3.0], [4.0, 5.0, 6.5]] {
            b.push(1u8);
            b.extend_from_slice(&1001u32.to_le_bytes());
            for v in p {
                b.extend_from_slice(&v.to_le_bytes());
            }
        }
        match wkb_to_shape(&b).unwrap() {
            Shape::MultiPoint(mp) => {
                assert_eq!(mp.len(), 2);
                assert_eq!(mp.points()[1], Point3D::new(4.0, 5.0, 6.5));
            }
            other => panic!("expected a multipoint, found {:?}", other),
        }
    }

    #[test]
    fn test_polygon_with_measure_is_read() {
        // Polygon ZM: 3003
        let mut b = vec![1u8];
        b.extend_from_slice(&3003u32.to_le_bytes());
        b.extend_from_slice(&1u32.to_le_bytes());
        b.extend_from_slice(&4u32.to_le_bytes());
        for (x, y) in [(0.0f64, 0.0f64), (4.0, 0.0), (0.0, 4.0), (0.0, 0.0)] {
            for v in [x, y, 9.0, 1.0] {
                b.extend_from_slice(&v.to_le_bytes());
            }
        }
        match wkb_to_shape(&b).unwrap() {
            Shape::Polygon(poly) => assert_eq!(poly.area(), 8.0),
            other => panic!("expected a polygon, found {:?}", other),
        }
    }

    #[test]
    fn test_malformed_payloads() {
        assert_decode_error(&[]);
        let good = le_point_2d(1.0, 2.0);
        assert_decode_error(&good[..good.len() - 3]);
        let mut bad_flag = good.clone();
        bad_flag[0] = 7;
        assert_decode_error(&bad_flag);
        let mut unknown = good.clone();
        unknown[1] = 2; // linestring
        assert_decode_error(&unknown);
        let mut trailing = good;
        trailing.push(0);
        assert_decode_error(&trailing);
        assert_decode_error(&le_point_2d(f64::NAN, f64::NAN));

        // a huge declared ring count must not allocate
        let mut b = vec![1u8];
        b.extend_from_slice(&3u32.to_le_bytes());
        b.extend_from_slice(&u32::MAX.to_le_bytes());
        assert_decode_error(&b);
    }

    #[test]
    fn test_encoded_multipolygon_decodes() {
        let a = Polygon::rectangle(0.0, 0.0, 1.0, 1.0).unwrap();
        let b = Polygon::rectangle(5.0, 5.0, 7.0, 6.0).unwrap();
        let shape = Shape::MultiPolygon(vec![a, b]);
        let bytes = shape_to_wkb(&shape, Endianness::BigEndian).unwrap();
        assert_eq!(bytes[0], 0);
        assert_eq!(wkb_to_shape(&bytes).unwrap(), shape);
    }
}
