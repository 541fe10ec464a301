/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use crate::patches::{chip_points, PointPatch};
use bpc_common::structures::Point3D;
use bpc_common::{BpcError, Result};
use las::{Read, Reader};
use std::fs;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

fn las_error(path: &Path, e: las::Error) -> BpcError {
    BpcError::Io(Error::new(
        ErrorKind::InvalidData,
        format!("Error reading {}: {}", path.display(), e),
    ))
}

/// Reads every point of a LAS or LAZ file with scale and offset applied.
pub fn read_tile_points(path: &Path) -> Result<Vec<Point3D>> {
    let mut reader = Reader::from_path(path).map_err(|e| las_error(path, e))?;
    let num_points = reader.header().number_of_points() as usize;
    let mut points = Vec::with_capacity(num_points);
    for p in reader.points() {
        let p = p.map_err(|e| las_error(path, e))?;
        points.push(Point3D::new(p.x, p.y, p.z));
    }
    Ok(points)
}

/// Lists the `.las` and `.laz` files in a directory, sorted by name. A LAZ file
/// whose decompressed LAS sibling is present is skipped.
pub fn list_tile_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut las_files = vec![];
    let mut laz_files = vec![];
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());
        match ext.as_deref() {
            Some("las") => las_files.push(path),
            Some("laz") => laz_files.push(path),
            _ => {}
        }
    }
    laz_files.retain(|laz| !las_files.iter().any(|las| las.file_stem() == laz.file_stem()));
    let mut files: Vec<PathBuf> = las_files.into_iter().chain(laz_files).collect();
    files.sort();
    Ok(files)
}

/// Loads all tiles of a directory and chips them into patches.
pub fn load_tile_directory(dir: &Path, capacity: usize) -> Result<Vec<PointPatch>> {
    let files = list_tile_files(dir)?;
    let mut patches = vec![];
    for (i, file) in files.iter().enumerate() {
        log::info!(
            "Importing tile {} of {}: {}",
            i + 1,
            files.len(),
            file.display()
        );
        let points = read_tile_points(file)?;
        let first_id = patches.len();
        patches.extend(chip_points(points, capacity, first_id));
    }
    Ok(patches)
}

#[cfg(test)]
mod test {
    use super::{list_tile_files, load_tile_directory, read_tile_points};
    use las::{Point, Write, Writer};
    use std::fs;
    use std::path::Path;

    fn write_las(path: &Path, coords: &[(f64, f64, f64)]) {
        let mut writer = Writer::from_path(path, Default::default()).unwrap();
        for &(x, y, z) in coords {
            let point = Point {
                x,
                y,
                z,
                ..Default::default()
            };
            writer.write(point).unwrap();
        }
        writer.close().unwrap();
    }

    #[test]
    fn test_read_tile_points() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tile.las");
        write_las(&path, &[(1.0, 2.0, 3.0), (4.5, 5.25, 6.125)]);
        let points = read_tile_points(&path).unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[1].x - 4.5).abs() < 1e-3);
        assert!((points[1].z - 6.125).abs() < 1e-3);
    }

    #[test]
    fn test_directory_listing_and_chipping() {
        let dir = tempfile::tempdir().unwrap();
        let coords: Vec<(f64, f64, f64)> = (0..1000)
            .map(|i| ((i % 40) as f64, (i / 40) as f64, 1.0))
            .collect();
        write_las(&dir.path().join("b.las"), &coords);
        fs::write(dir.path().join("b.laz"), b"not used").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();
        let files = list_tile_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        let patches = load_tile_directory(dir.path(), 400).unwrap();
        assert_eq!(patches.iter().map(|p| p.len()).sum::<usize>(), 1000);
        assert!(patches.iter().all(|p| p.len() <= 400));
    }

    #[test]
    fn test_unreadable_tile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.las");
        fs::write(&path, b"LASF").unwrap();
        assert!(read_tile_points(&path).is_err());
    }
}
