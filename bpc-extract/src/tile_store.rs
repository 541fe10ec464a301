/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

//! An in-memory `SpatialStore` over chipped LiDAR patches and vector feature
//! sources, indexed with R-trees.

use crate::store::{
    BuildingRecord, ChunkData, ChunkQuery, ChunkRange, PointCloudStats, SpatialStore,
};
use bpc_common::rstar::RTree;
use bpc_common::structures::{query_envelope, MultiPoint, Point3D, RectangleWithData};
use bpc_common::{BpcError, Result};
use bpc_lidar::PointPatch;
use bpc_vector::{AddressPoint, Boundary, EpcRecord, Footprint};
use std::collections::HashMap;

pub struct TileStore {
    footprints: Vec<Footprint>,
    addresses: Vec<AddressPoint>,
    epc_records: Vec<EpcRecord>,
    boundaries: Vec<Boundary>,
    patches: Vec<PointPatch>,
    patch_tree: RTree<RectangleWithData<usize>>,
    address_tree: RTree<RectangleWithData<usize>>,
    epc_by_uprn: HashMap<i64, Vec<usize>>,
    listings: HashMap<String, Vec<usize>>,
}

impl TileStore {
    pub fn new(
        footprints: Vec<Footprint>,
        addresses: Vec<AddressPoint>,
        epc_records: Vec<EpcRecord>,
        boundaries: Vec<Boundary>,
        patches: Vec<PointPatch>,
    ) -> TileStore {
        let patch_tree = RTree::bulk_load(
            patches
                .iter()
                .enumerate()
                .map(|(i, p)| RectangleWithData::from_bounding_box(i, &p.envelope()))
                .collect(),
        );
        let address_tree = RTree::bulk_load(
            addresses
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    let corner = [a.location.x, a.location.y];
                    RectangleWithData::new(i, corner, corner)
                })
                .collect(),
        );
        let mut epc_by_uprn: HashMap<i64, Vec<usize>> = HashMap::new();
        for (i, rec) in epc_records.iter().enumerate() {
            if let Some(uprn) = rec.uprn {
                epc_by_uprn.entry(uprn).or_default().push(i);
            }
        }
        TileStore {
            footprints,
            addresses,
            epc_records,
            boundaries,
            patches,
            patch_tree,
            address_tree,
            epc_by_uprn,
            listings: HashMap::new(),
        }
    }

    pub fn num_patches(&self) -> usize {
        self.patches.len()
    }

    /// Stages two and three for one footprint: buffer it and union the points
    /// of every intersecting patch that fall within the buffered outline.
    fn crop_points(&self, footprint: &Footprint, buffer: f64) -> Result<MultiPoint> {
        let mut bb = footprint.geometry.bounding_box();
        bb.expand_by(buffer);
        let mut points: Vec<Point3D> = vec![];
        let mut candidates: Vec<usize> = self
            .patch_tree
            .locate_in_envelope_intersecting(&query_envelope(&bb))
            .map(|r| r.data)
            .collect();
        candidates.sort_unstable();
        for idx in candidates {
            for p in self.patches[idx].points() {
                if bb.is_point_in_box(p.x, p.y)
                    && footprint.geometry.within_buffer(&p.to_2d(), buffer)
                {
                    points.push(*p);
                }
            }
        }
        // union: duplicates across overlapping patches collapse
        Ok(MultiPoint::empty().union(&MultiPoint::new(points)?))
    }

    fn addresses_in(&self, footprint: &Footprint) -> Vec<&AddressPoint> {
        let bb = footprint.geometry.bounding_box();
        let mut found: Vec<&AddressPoint> = self
            .address_tree
            .locate_in_envelope_intersecting(&query_envelope(&bb))
            .map(|r| &self.addresses[r.data])
            .filter(|a| footprint.geometry.intersects_point(&a.location))
            .collect();
        found.sort_by_key(|a| a.uprn);
        found
    }

    fn certificates_for(&self, uprn: i64, local_authority: &str) -> Vec<&EpcRecord> {
        self.epc_by_uprn
            .get(&uprn)
            .map(|ids| {
                ids.iter()
                    .map(|&i| &self.epc_records[i])
                    .filter(|r| r.local_authority == local_authority)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl SpatialStore for TileStore {
    fn prepare_listing(
        &mut self,
        area_code: &str,
        max_footprints: Option<usize>,
        refresh: bool,
    ) -> Result<usize> {
        if !refresh {
            if let Some(listing) = self.listings.get(area_code) {
                return Ok(listing.len());
            }
        }
        let boundary = self
            .boundaries
            .iter()
            .find(|b| b.code == area_code)
            .ok_or_else(|| {
                BpcError::InvalidParameter(format!("unknown area code '{}'", area_code))
            })?;
        let mut listing: Vec<usize> = (0..self.footprints.len())
            .filter(|&i| boundary.intersects(&self.footprints[i].geometry))
            .collect();
        listing.sort_by_key(|&i| self.footprints[i].id);
        if let Some(max) = max_footprints {
            listing.truncate(max);
        }
        let total = listing.len();
        self.listings.insert(area_code.to_string(), listing);
        Ok(total)
    }

    fn fetch_chunk(
        &mut self,
        area_code: &str,
        range: ChunkRange,
        query: &ChunkQuery,
    ) -> Result<ChunkData> {
        let listing = self.listings.get(area_code).ok_or_else(|| {
            BpcError::Store(format!(
                "no footprint listing has been prepared for area '{}'",
                area_code
            ))
        })?;
        let start = range.start.min(listing.len());
        let end = range.end.min(listing.len());
        let mut chunk = ChunkData::default();
        let mut id_query = 0u64;
        for &fp_idx in &listing[start..end] {
            let footprint = &self.footprints[fp_idx];
            let points = self.crop_points(footprint, query.buffer_meters)?;
            let stats = PointCloudStats::from_points(&points)
                .filter(|s| s.num_p_in_pc > query.point_count_threshold);
            if stats.is_some() {
                chunk.point_clouds.insert(footprint.id, points);
            }

            // (address, certificate) pairs of the left joins
            let mut pairs: Vec<(Option<&AddressPoint>, Option<&EpcRecord>)> = vec![];
            for address in self.addresses_in(footprint) {
                let certificates = self.certificates_for(address.uprn, area_code);
                if certificates.is_empty() {
                    pairs.push((Some(address), None));
                } else {
                    pairs.extend(certificates.into_iter().map(|c| (Some(address), Some(c))));
                }
            }
            if pairs.is_empty() {
                pairs.push((None, None));
            }
            for (address, certificate) in pairs {
                id_query += 1;
                chunk.records.push(BuildingRecord {
                    id_query,
                    id_fp: footprint.id,
                    footprint: footprint.geometry.clone(),
                    uprn: address.map(|a| a.uprn),
                    address_location: address.map(|a| a.location),
                    id_epc_lmk_key: certificate.map(|c| c.lmk_key.clone()),
                    energy_rating: certificate.and_then(|c| c.rating.clone()),
                    energy_efficiency: certificate.and_then(|c| c.efficiency),
                    point_cloud: stats,
                });
            }
        }
        chunk.distinct();
        Ok(chunk)
    }
}

#[cfg(test)]
mod test {
    use super::TileStore;
    use crate::store::{ChunkQuery, ChunkRange, SpatialStore};
    use bpc_common::structures::{Point2D, Point3D, Polygon};
    use bpc_lidar::chip_points;
    use bpc_vector::{AddressPoint, Boundary, EpcRecord, Footprint};

    fn store() -> TileStore {
        let footprints = vec![
            Footprint { id: 30, geometry: Polygon::rectangle(20.0, 0.0, 24.0, 4.0).unwrap() },
            Footprint { id: 10, geometry: Polygon::rectangle(0.0, 0.0, 4.0, 4.0).unwrap() },
            Footprint { id: 20, geometry: Polygon::rectangle(10.0, 0.0, 14.0, 4.0).unwrap() },
            Footprint { id: 99, geometry: Polygon::rectangle(500.0, 0.0, 504.0, 4.0).unwrap() },
        ];
        let boundaries = vec![Boundary {
            code: "E06000014".to_string(),
            polygons: vec![Polygon::rectangle(-10.0, -10.0, 100.0, 100.0).unwrap()],
        }];
        let addresses = vec![
            AddressPoint { uprn: 2, location: Point2D::new(2.0, 2.0) },
            AddressPoint { uprn: 1, location: Point2D::new(1.0, 1.0) },
            AddressPoint { uprn: 3, location: Point2D::new(4.3, 2.0) },
        ];
        let epc = vec![
            EpcRecord {
                lmk_key: "a".to_string(),
                uprn: Some(1),
                local_authority: "E06000014".to_string(),
                rating: Some("C".to_string()),
                efficiency: Some(70),
            },
            EpcRecord {
                lmk_key: "b".to_string(),
                uprn: Some(2),
                local_authority: "E07000001".to_string(),
                rating: Some("A".to_string()),
                efficiency: Some(95),
            },
        ];
        // a 0.25 spaced lattice over the first footprint and its buffer
        let mut points = vec![];
        for i in 0..24 {
            for j in 0..24 {
                points.push(Point3D::new(-0.875 + i as f64 * 0.25, -0.875 + j as f64 * 0.25, 1.0));
            }
        }
        let patches = chip_points(points, 50, 0);
        TileStore::new(footprints, addresses, epc, boundaries, patches)
    }

    #[test]
    fn test_listing_is_ordered_and_cached() {
        let mut s = store();
        assert_eq!(s.prepare_listing("E06000014", None, false).unwrap(), 3);
        assert_eq!(s.prepare_listing("E06000014", Some(1), false).unwrap(), 3);
        assert_eq!(s.prepare_listing("E06000014", Some(2), true).unwrap(), 2);
        assert!(s.prepare_listing("W06000001", None, false).is_err());
    }

    #[test]
    fn test_fetch_chunk_joins() {
        let mut s = store();
        s.prepare_listing("E06000014", None, false).unwrap();
        let query = ChunkQuery { buffer_meters: 0.5, point_count_threshold: 100 };
        let chunk = s.fetch_chunk("E06000014", ChunkRange::of(0, 2), &query).unwrap();
        let ids: Vec<i64> = chunk.records.iter().map(|r| r.id_fp).collect();
        assert_eq!(ids, vec![10, 10, 20]);
        let first = &chunk.records[0];
        assert_eq!(first.id_query, 1);
        assert_eq!(first.uprn, Some(1));
        assert_eq!(first.id_epc_lmk_key.as_deref(), Some("a"));
        // certificate of another authority is filtered out
        assert_eq!(chunk.records[1].uprn, Some(2));
        assert!(chunk.records[1].id_epc_lmk_key.is_none());
        // lattice points within 0.5 of the 4 x 4 square: -0.375 ..= 4.375 in 0.25 steps,
        // minus the four lattice corners beyond the rounded buffer corners
        let stats = first.point_cloud.unwrap();
        assert_eq!(stats.num_p_in_pc, 20 * 20 - 4);
        assert_eq!(chunk.point_clouds[&10].len(), stats.num_p_in_pc);
        assert!(chunk.records[2].point_cloud.is_none());
        assert!(chunk.records[2].uprn.is_none());

        let last = s.fetch_chunk("E06000014", ChunkRange::of(1, 2), &query).unwrap();
        assert_eq!(last.records.len(), 1);
        assert_eq!(last.records[0].id_fp, 30);
        assert_eq!(last.records[0].id_query, 1);
    }

    #[test]
    fn test_fetch_without_listing() {
        let mut s = store();
        let query = ChunkQuery { buffer_meters: 0.5, point_count_threshold: 100 };
        assert!(s.fetch_chunk("E06000014", ChunkRange::of(0, 2), &query).is_err());
    }
}
