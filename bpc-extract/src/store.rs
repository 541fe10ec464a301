//! The spatial store seam: a numbered footprint listing per area and the
//! four-stage chunk query (filter by area, buffer, join and union point-cloud
//! patches, aggregate per footprint) answered by a backing store.

use bpc_common::structures::{MultiPoint, Point2D, Polygon};
use bpc_common::Result;
use std::collections::{BTreeMap, HashSet};

/// Listing numbers `(start, end]` of one chunk, i.e. `start + 1 ..= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRange {
    pub start: usize,
    pub end: usize,
}

impl ChunkRange {
    /// The range of chunk `index` for a given chunk size.
    pub fn of(index: usize, chunk_size: usize) -> ChunkRange {
        ChunkRange {
            start: index * chunk_size,
            end: (index + 1) * chunk_size,
        }
    }

    pub fn contains(&self, number: usize) -> bool {
        number > self.start && number <= self.end
    }
}

/// Number of chunks needed to cover `total` listing entries.
pub fn num_chunks(total: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    (total + chunk_size - 1) / chunk_size
}

/// Per-chunk parameters of the aggregate query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChunkQuery {
    pub buffer_meters: f64,
    pub point_count_threshold: usize,
}

/// Extrema of one building's aggregated point cloud.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointCloudStats {
    pub num_p_in_pc: usize,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_z: f64,
    pub z_min: f64,
    pub scaling_factor: f64,
}

impl PointCloudStats {
    /// Stats of an aggregated collection, or None when it is empty.
    pub fn from_points(points: &MultiPoint) -> Option<PointCloudStats> {
        let (min, max) = points.extent()?;
        let delta_x = max.x - min.x;
        let delta_y = max.y - min.y;
        let delta_z = max.z - min.z;
        Some(PointCloudStats {
            num_p_in_pc: points.len(),
            delta_x,
            delta_y,
            delta_z,
            z_min: min.z,
            scaling_factor: delta_x.max(delta_y).max(delta_z),
        })
    }
}

/// One joined row of a chunk: footprint, at most one address and at most one
/// energy certificate, plus point-cloud stats when the footprint passed the
/// point-count threshold.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildingRecord {
    pub id_query: u64,
    pub id_fp: i64,
    pub footprint: Polygon,
    pub uprn: Option<i64>,
    pub address_location: Option<Point2D>,
    pub id_epc_lmk_key: Option<String>,
    pub energy_rating: Option<String>,
    pub energy_efficiency: Option<i64>,
    pub point_cloud: Option<PointCloudStats>,
}

/// Everything the store returns for one chunk. Point collections are keyed by
/// footprint id so that footprints with several address rows hold their
/// points once.
#[derive(Clone, Debug, Default)]
pub struct ChunkData {
    pub records: Vec<BuildingRecord>,
    pub point_clouds: BTreeMap<i64, MultiPoint>,
}

impl ChunkData {
    /// Drops duplicate rows, keeping the first occurrence. A row is identified
    /// by its query number, footprint, address and certificate; the remaining
    /// columns are joined from those.
    pub fn distinct(&mut self) {
        let mut seen = HashSet::with_capacity(self.records.len());
        self.records.retain(|r| {
            seen.insert((r.id_query, r.id_fp, r.uprn, r.id_epc_lmk_key.clone()))
        });
    }
}

/// A store able to answer the extraction queries.
pub trait SpatialStore {
    /// Materializes the numbered listing of footprints intersecting the area,
    /// ordered by footprint id and capped at `max_footprints`, and returns its
    /// length. An existing listing is reused unless `refresh` is set.
    fn prepare_listing(
        &mut self,
        area_code: &str,
        max_footprints: Option<usize>,
        refresh: bool,
    ) -> Result<usize>;

    /// Runs the aggregate query for the footprints numbered within `range`.
    fn fetch_chunk(
        &mut self,
        area_code: &str,
        range: ChunkRange,
        query: &ChunkQuery,
    ) -> Result<ChunkData>;
}

#[cfg(test)]
mod test {
    use super::{num_chunks, BuildingRecord, ChunkData, ChunkRange, PointCloudStats};
    use bpc_common::structures::{MultiPoint, Point3D, Polygon};

    fn row(id_query: u64, id_fp: i64, uprn: Option<i64>) -> BuildingRecord {
        BuildingRecord {
            id_query,
            id_fp,
            footprint: Polygon::rectangle(0.0, 0.0, 10.0, 10.0).unwrap(),
            uprn,
            address_location: None,
            id_epc_lmk_key: uprn.map(|u| format!("lmk-{}", u)),
            energy_rating: None,
            energy_efficiency: None,
            point_cloud: None,
        }
    }

    #[test]
    fn test_distinct_keeps_first_occurrence() {
        let mut data = ChunkData {
            records: vec![
                row(1, 1, Some(10)),
                row(2, 1, Some(11)),
                row(1, 1, Some(10)),
                row(3, 2, None),
                row(3, 2, None),
            ],
            ..Default::default()
        };
        data.distinct();
        let keys: Vec<(u64, i64)> = data.records.iter().map(|r| (r.id_query, r.id_fp)).collect();
        assert_eq!(keys, vec![(1, 1), (2, 1), (3, 2)]);
    }

    #[test]
    fn test_partition_is_exhaustive_and_disjoint() {
        for total in 1..=40usize {
            for k in 1..=total {
                let n = num_chunks(total, k);
                for number in 1..=total {
                    let owners = (0..n)
                        .filter(|&i| ChunkRange::of(i, k).contains(number))
                        .count();
                    assert_eq!(owners, 1, "total {} chunk size {} number {}", total, k, number);
                }
                assert!(ChunkRange::of(n - 1, k).end >= total);
                assert!(ChunkRange::of(n - 1, k).start < total);
            }
        }
        assert_eq!(num_chunks(0, 5), 0);
    }

    #[test]
    fn test_stats() {
        assert!(PointCloudStats::from_points(&MultiPoint::empty()).is_none());
        let mp = MultiPoint::new(vec![
            Point3D::new(0.0, 0.0, 2.0),
            Point3D::new(4.0, 1.0, 3.0),
            Point3D::new(1.0, 6.0, 2.5),
        ])
        .unwrap();
        let stats = PointCloudStats::from_points(&mp).unwrap();
        assert_eq!(stats.num_p_in_pc, 3);
        assert_eq!(stats.delta_x, 4.0);
        assert_eq!(stats.delta_y, 6.0);
        assert_eq!(stats.delta_z, 1.0);
        assert_eq!(stats.z_min, 2.0);
        assert_eq!(stats.scaling_factor, 6.0);
    }
}
