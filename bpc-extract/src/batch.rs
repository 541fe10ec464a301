//! Normalizing a directory of raw building arrays after extraction.

use crate::normalize::{normalize, sampling_rng};
use bpc_common::structures::PointArray;
use bpc_common::{BpcError, Result};
use bpc_lidar::{read_npy, write_npy};
use bpc_vector::array_to_multipoint;
use std::fs;
use std::path::{Path, PathBuf};

/// How the divisor of each array is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScalingMode {
    /// One factor for every array: the largest extent over all of them.
    Global,
    /// Each array's own largest extent.
    PerBuilding,
    /// A caller-supplied factor.
    Fixed(f64),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchSummary {
    pub normalized: usize,
    pub skipped: Vec<PathBuf>,
    pub scaling_factor: Option<f64>,
}

/// The largest of the x, y and z extents of an array.
pub fn array_scaling_factor(array: &PointArray) -> Option<f64> {
    let mut factor: Option<f64> = None;
    for col in 0..3 {
        let delta = array.column_max(col)? - array.column_min(col)?;
        factor = Some(factor.map_or(delta, |f| f.max(delta)));
    }
    factor
}

/// The largest per-array scaling factor over a set of arrays.
pub fn global_scaling_factor<'a, I: IntoIterator<Item = &'a PointArray>>(arrays: I) -> Option<f64> {
    arrays
        .into_iter()
        .filter_map(array_scaling_factor)
        .fold(None, |acc: Option<f64>, f| Some(acc.map_or(f, |a| a.max(f))))
}

/// The `.npy` files of a directory, sorted by name.
pub fn list_array_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_npy = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("npy"))
            .unwrap_or(false);
        if path.is_file() && is_npy {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Normalizes every raw array in `input_dir` to `sample_size` rows and writes
/// it under the same name to `output_dir`. Arrays with fewer rows than the
/// sample size are skipped.
pub fn normalize_directory(
    input_dir: &Path,
    output_dir: &Path,
    sample_size: usize,
    mode: ScalingMode,
    seed: Option<u64>,
) -> Result<BatchSummary> {
    if sample_size == 0 {
        return Err(BpcError::InvalidParameter(
            "the sample size must be greater than zero".to_string(),
        ));
    }
    let files = list_array_files(input_dir)?;
    fs::create_dir_all(output_dir)?;

    let global = match mode {
        ScalingMode::Global => {
            let mut factor: Option<f64> = None;
            for path in &files {
                if let Some(f) = array_scaling_factor(&read_npy(path)?) {
                    factor = Some(factor.map_or(f, |a: f64| a.max(f)));
                }
            }
            factor
        }
        ScalingMode::Fixed(f) => Some(f),
        ScalingMode::PerBuilding => None,
    };

    let mut summary = BatchSummary {
        scaling_factor: global,
        ..Default::default()
    };
    let mut rng = sampling_rng(seed);
    let num_files = files.len();
    for (i, path) in files.into_iter().enumerate() {
        let array = read_npy(&path)?;
        if array.num_rows() < sample_size {
            log::info!(
                "Skipping {}: {} points, {} required",
                path.display(),
                array.num_rows(),
                sample_size
            );
            summary.skipped.push(path);
            continue;
        }
        let factor = match global {
            Some(f) => f,
            None => array_scaling_factor(&array).unwrap_or(0f64),
        };
        let points = array_to_multipoint(&array)?;
        let normalized = normalize(&points, factor, sample_size, &mut rng)?;
        if let Some(name) = path.file_name() {
            write_npy(&output_dir.join(name), &normalized)?;
        }
        summary.normalized += 1;
        if (i + 1) % 1000 == 0 {
            log::info!("Normalized {} of {} arrays", i + 1, num_files);
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod test {
    use super::*;

    fn block(n: usize, width: f64) -> PointArray {
        let rows: Vec<[f64; 3]> = (0..n)
            .map(|i| {
                let t = i as f64 / n as f64;
                [t * width, t * 2.0, t]
            })
            .collect();
        PointArray::from_rows(&rows)
    }

    #[test]
    fn test_scaling_factors() {
        let a = block(10, 4.0);
        let b = block(10, 8.0);
        assert_eq!(array_scaling_factor(&a), Some(0.9 * 4.0));
        let g = global_scaling_factor(vec![&a, &b]).unwrap();
        assert!((g - 0.9 * 8.0).abs() < 1e-12);
        assert_eq!(global_scaling_factor(Vec::<&PointArray>::new()), None);
    }

    #[test]
    fn test_normalize_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("npy_raw");
        let output = dir.path().join("npy_normalized");
        fs::create_dir_all(&input).unwrap();
        write_npy(&input.join("1.0_1.0.npy"), &block(200, 4.0)).unwrap();
        write_npy(&input.join("2.0_2.0.npy"), &block(300, 8.0)).unwrap();
        write_npy(&input.join("3.0_3.0.npy"), &block(50, 8.0)).unwrap();
        fs::write(input.join("notes.txt"), "ignored").unwrap();

        let summary =
            normalize_directory(&input, &output, 100, ScalingMode::Global, Some(7)).unwrap();
        assert_eq!(summary.normalized, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert!(summary.scaling_factor.is_some());

        let out = read_npy(&output.join("2.0_2.0.npy")).unwrap();
        assert_eq!(out.shape(), (100, 3));
        for r in out.rows() {
            for v in r.iter() {
                assert!(*v >= 0.0 && *v <= 1.0 + 1e-12);
            }
        }
        assert!(!output.join("3.0_3.0.npy").exists());
    }

    #[test]
    fn test_zero_sample_size() {
        let dir = tempfile::tempdir().unwrap();
        assert!(normalize_directory(
            dir.path(),
            &dir.path().join("out"),
            0,
            ScalingMode::PerBuilding,
            None
        )
        .is_err());
    }
}
