//! Per-chunk metadata tables (footprints, addresses, certificates and the
//! label-to-file mapping), their JSON files, and stitching chunk files into
//! one consolidated set per area.

use crate::output::{Category, OutputLayout};
use crate::store::BuildingRecord;
use bpc_common::{BpcError, Result};
use bpc_vector::geojson::{
    feature, feature_collection, parse_addresses, parse_footprints, point_to_geojson,
    polygon_to_geojson, read_document, write_document,
};
use bpc_vector::{AddressPoint, Footprint};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::fs;
use std::path::{Path, PathBuf};

/// One energy certificate as written to the `epc` files.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EpcRow {
    pub id_epc_lmk_key: String,
    pub epc_rating: Option<String>,
    pub epc_efficiency: Option<i64>,
}

/// One row of the label-to-file mapping. `file_name` is null for buildings
/// that did not pass the point-count threshold.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FilenameMappingRow {
    pub id_fp: i64,
    pub uprn: Option<i64>,
    pub id_epc_lmk_key: Option<String>,
    pub id_query: u64,
    pub num_p_in_pc: Option<usize>,
    pub epc_rating: Option<String>,
    pub epc_efficiency: Option<i64>,
    pub file_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataTables {
    pub footprints: Vec<Footprint>,
    pub addresses: Vec<AddressPoint>,
    pub epc: Vec<EpcRow>,
    pub mappings: Vec<FilenameMappingRow>,
}

/// Pushes `item` unless a row with the same key was pushed before.
fn push_distinct<T, K: Eq + Hash>(v: &mut Vec<T>, seen: &mut HashSet<K>, key: K, item: T) {
    if seen.insert(key) {
        v.push(item);
    }
}

impl MetadataTables {
    /// Builds the tables of one chunk. `file_names` maps footprint ids to the
    /// array file written for them.
    pub fn from_records(
        records: &[BuildingRecord],
        file_names: &HashMap<i64, String>,
    ) -> MetadataTables {
        let mut tables = MetadataTables::default();
        let mut seen_footprints = HashSet::new();
        let mut seen_addresses = HashSet::new();
        let mut seen_epc = HashSet::new();
        for r in records {
            push_distinct(
                &mut tables.footprints,
                &mut seen_footprints,
                r.id_fp,
                Footprint {
                    id: r.id_fp,
                    geometry: r.footprint.clone(),
                },
            );
            if let (Some(uprn), Some(location)) = (r.uprn, r.address_location) {
                push_distinct(
                    &mut tables.addresses,
                    &mut seen_addresses,
                    (uprn, location.x.to_bits(), location.y.to_bits()),
                    AddressPoint { uprn, location },
                );
            }
            if let Some(key) = &r.id_epc_lmk_key {
                push_distinct(
                    &mut tables.epc,
                    &mut seen_epc,
                    (key.clone(), r.energy_rating.clone(), r.energy_efficiency),
                    EpcRow {
                        id_epc_lmk_key: key.clone(),
                        epc_rating: r.energy_rating.clone(),
                        epc_efficiency: r.energy_efficiency,
                    },
                );
            }
            tables.mappings.push(FilenameMappingRow {
                id_fp: r.id_fp,
                uprn: r.uprn,
                id_epc_lmk_key: r.id_epc_lmk_key.clone(),
                id_query: r.id_query,
                num_p_in_pc: r.point_cloud.map(|pc| pc.num_p_in_pc),
                epc_rating: r.energy_rating.clone(),
                epc_efficiency: r.energy_efficiency,
                file_name: file_names.get(&r.id_fp).cloned(),
            });
        }
        tables
    }

    /// Concatenates another table set onto this one.
    pub fn append(&mut self, other: MetadataTables) {
        self.footprints.extend(other.footprints);
        self.addresses.extend(other.addresses);
        self.epc.extend(other.epc);
        self.mappings.extend(other.mappings);
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
            && self.addresses.is_empty()
            && self.epc.is_empty()
            && self.mappings.is_empty()
    }

    pub fn write_chunk(&self, layout: &OutputLayout, chunk_index: usize) -> Result<()> {
        self.write_with(|c| layout.chunk_file(c, chunk_index))
    }

    pub fn write_stitched(&self, layout: &OutputLayout) -> Result<()> {
        self.write_with(|c| layout.stitched_file(c))
    }

    fn write_with<F: Fn(Category) -> PathBuf>(&self, path_of: F) -> Result<()> {
        write_document(
            &footprints_to_geojson(&self.footprints),
            &path_of(Category::Footprints),
        )?;
        write_document(&addresses_to_geojson(&self.addresses), &path_of(Category::Uprn))?;
        fs::write(path_of(Category::Epc), serde_json::to_string(&self.epc)?)?;
        write_filename_mapping(&self.mappings, &path_of(Category::FilenameMapping))
    }
}

fn footprints_to_geojson(footprints: &[Footprint]) -> Value {
    feature_collection(
        footprints
            .iter()
            .map(|f| {
                let mut props = Map::new();
                props.insert("id_fp".to_string(), Value::from(f.id));
                feature(props, Some(polygon_to_geojson(&f.geometry)))
            })
            .collect(),
    )
}

fn addresses_to_geojson(addresses: &[AddressPoint]) -> Value {
    feature_collection(
        addresses
            .iter()
            .map(|a| {
                let mut props = Map::new();
                props.insert("uprn".to_string(), Value::from(a.uprn));
                feature(props, Some(point_to_geojson(&a.location)))
            })
            .collect(),
    )
}

/// Writes mapping rows as an object keyed by row index, `"0"`, `"1"`, ...
pub fn write_filename_mapping(rows: &[FilenameMappingRow], path: &Path) -> Result<()> {
    let mut obj = Map::new();
    for (i, row) in rows.iter().enumerate() {
        obj.insert(i.to_string(), serde_json::to_value(row)?);
    }
    fs::write(path, serde_json::to_string(&Value::Object(obj))?)?;
    Ok(())
}

/// Reads an index-keyed mapping file, returning rows in index order.
pub fn read_filename_mapping(path: &Path) -> Result<Vec<FilenameMappingRow>> {
    let contents = fs::read_to_string(path)?;
    let keyed: HashMap<String, FilenameMappingRow> = serde_json::from_str(&contents)?;
    let mut indexed = BTreeMap::new();
    for (key, row) in keyed {
        let index = key.parse::<usize>().map_err(|_| {
            BpcError::Decode(format!(
                "'{}' is not a row index in {}",
                key,
                path.display()
            ))
        })?;
        indexed.insert(index, row);
    }
    Ok(indexed.into_values().collect())
}

/// Concatenates chunk tables in the order given.
pub fn stitch<I: IntoIterator<Item = MetadataTables>>(chunks: I) -> MetadataTables {
    let mut out = MetadataTables::default();
    for chunk in chunks {
        out.append(chunk);
    }
    out
}

fn chunk_files(layout: &OutputLayout, category: Category) -> Result<Vec<PathBuf>> {
    let dir = layout.category_dir(category);
    if !dir.is_dir() {
        return Ok(vec![]);
    }
    let mut found: Vec<(usize, PathBuf)> = vec![];
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        let index = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| layout.parse_chunk_index(category, n));
        if let Some(index) = index {
            found.push((index, path));
        }
    }
    found.sort_by_key(|(i, _)| *i);
    Ok(found.into_iter().map(|(_, p)| p).collect())
}

/// Deletes the chunk files a previous run left in the area folder, so that a
/// later stitch only sees the chunks of the current run. Returns the number
/// of files removed.
pub fn clear_chunk_files(layout: &OutputLayout) -> Result<usize> {
    let mut removed = 0;
    for category in Category::ALL {
        for path in chunk_files(layout, category)? {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Reads every chunk file of the area from disk, concatenates each category
/// in chunk order and writes `<category>_<area>.json` next to the
/// sub-folders. Mapping rows are re-indexed from zero.
pub fn stitch_from_disk(layout: &OutputLayout) -> Result<MetadataTables> {
    let mut tables = MetadataTables::default();
    for path in chunk_files(layout, Category::Footprints)? {
        tables
            .footprints
            .extend(parse_footprints(&read_document(&path)?, "id_fp")?);
    }
    for path in chunk_files(layout, Category::Uprn)? {
        tables
            .addresses
            .extend(parse_addresses(&read_document(&path)?)?);
    }
    for path in chunk_files(layout, Category::Epc)? {
        let rows: Vec<EpcRow> = serde_json::from_str(&fs::read_to_string(&path)?)?;
        tables.epc.extend(rows);
    }
    for path in chunk_files(layout, Category::FilenameMapping)? {
        tables.mappings.extend(read_filename_mapping(&path)?);
    }
    if tables.is_empty() {
        log::warn!(
            "No chunk files found for {} in {}",
            layout.area_code(),
            layout.aoi_dir().display()
        );
    }
    tables.write_stitched(layout)?;
    Ok(tables)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::store::PointCloudStats;
    use bpc_common::structures::{Point2D, Polygon};

    fn record(id_query: u64, id_fp: i64, uprn: Option<i64>, with_pc: bool) -> BuildingRecord {
        let x = id_fp as f64 * 20.0;
        BuildingRecord {
            id_query,
            id_fp,
            footprint: Polygon::rectangle(x, 0.0, x + 10.0, 10.0).unwrap(),
            uprn,
            address_location: uprn.map(|_| Point2D::new(x + 5.0, 5.0)),
            id_epc_lmk_key: uprn.map(|u| format!("lmk-{}", u)),
            energy_rating: uprn.map(|_| "C".to_string()),
            energy_efficiency: uprn.map(|_| 70),
            point_cloud: if with_pc {
                Some(PointCloudStats {
                    num_p_in_pc: 150,
                    delta_x: 10.0,
                    delta_y: 10.0,
                    delta_z: 4.0,
                    z_min: 1.0,
                    scaling_factor: 10.0,
                })
            } else {
                None
            },
        }
    }

    #[test]
    fn test_from_records() {
        let records = vec![
            record(1, 1, Some(100), true),
            record(2, 1, Some(101), true),
            record(3, 2, None, false),
        ];
        let mut names = HashMap::new();
        names.insert(1, "15.0_5.0.npy".to_string());
        let tables = MetadataTables::from_records(&records, &names);
        // footprint 1 appears on two rows but once in the footprint table
        assert_eq!(tables.footprints.len(), 2);
        assert_eq!(tables.addresses.len(), 2);
        assert_eq!(tables.epc.len(), 2);
        assert_eq!(tables.mappings.len(), 3);
        assert_eq!(tables.mappings[0].file_name.as_deref(), Some("15.0_5.0.npy"));
        assert_eq!(tables.mappings[2].file_name, None);
        assert_eq!(tables.mappings[2].num_p_in_pc, None);
    }

    #[test]
    fn test_stitch_concatenates_in_order() {
        let names = HashMap::new();
        let a = MetadataTables::from_records(&[record(1, 1, Some(100), false)], &names);
        let b = MetadataTables::from_records(&[record(1, 2, Some(200), false)], &names);
        let all = stitch(vec![a, b]);
        assert_eq!(all.mappings.len(), 2);
        assert_eq!(all.mappings[0].id_fp, 1);
        assert_eq!(all.mappings[1].id_fp, 2);
    }

    #[test]
    fn test_clear_chunk_files() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::setup(dir.path(), "E06000014").unwrap();
        let names = HashMap::new();
        for k in 0..3usize {
            MetadataTables::from_records(&[record(1, k as i64, Some(100), false)], &names)
                .write_chunk(&layout, k)
                .unwrap();
        }
        let stitched_epc = layout.stitched_file(Category::Epc);
        fs::write(&stitched_epc, "[]").unwrap();

        assert_eq!(clear_chunk_files(&layout).unwrap(), 12);
        for category in Category::ALL {
            assert!(chunk_files(&layout, category).unwrap().is_empty());
        }
        // stitched files are left alone
        assert!(stitched_epc.is_file());
        assert_eq!(clear_chunk_files(&layout).unwrap(), 0);
    }

    #[test]
    fn test_stitch_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::setup(dir.path(), "E06000014").unwrap();
        let names = HashMap::new();
        for (k, id) in [(0usize, 1i64), (1, 2), (2, 3)] {
            MetadataTables::from_records(&[record(1, id, Some(id * 100), true)], &names)
                .write_chunk(&layout, k)
                .unwrap();
        }
        let stitched = stitch_from_disk(&layout).unwrap();
        assert_eq!(stitched.footprints.len(), 3);
        assert_eq!(
            stitched.footprints.iter().map(|f| f.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(stitched.addresses.len(), 3);
        assert_eq!(stitched.epc.len(), 3);

        let mapping =
            read_filename_mapping(&layout.stitched_file(Category::FilenameMapping)).unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping[2].id_fp, 3);
        let raw: Value = serde_json::from_str(
            &fs::read_to_string(layout.stitched_file(Category::FilenameMapping)).unwrap(),
        )
        .unwrap();
        assert!(raw.get("2").is_some());
        assert!(raw.get("3").is_none());
    }
}
