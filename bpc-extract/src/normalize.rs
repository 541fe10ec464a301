use bpc_common::structures::{MultiPoint, PointArray};
use bpc_common::{BpcError, Result};
use bpc_vector::multipoint_to_array;
use rand::rngs::SmallRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

/// Builds the subsampling generator: seeded when a seed is given, otherwise
/// drawn from entropy.
pub fn sampling_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_entropy(),
    }
}

/// Translates each axis of the array so that its minimum becomes zero and
/// divides every value by `scaling_factor`.
pub fn translate_and_scale(array: &PointArray, scaling_factor: f64) -> Result<PointArray> {
    if !scaling_factor.is_finite() || scaling_factor <= 0f64 {
        return Err(BpcError::InvalidParameter(format!(
            "the scaling factor must be positive, found {}",
            scaling_factor
        )));
    }
    let mins = [
        array.column_min(0).unwrap_or(0f64),
        array.column_min(1).unwrap_or(0f64),
        array.column_min(2).unwrap_or(0f64),
    ];
    let rows: Vec<[f64; 3]> = array
        .rows()
        .map(|r| {
            [
                (r[0] - mins[0]) / scaling_factor,
                (r[1] - mins[1]) / scaling_factor,
                (r[2] - mins[2]) / scaling_factor,
            ]
        })
        .collect();
    Ok(PointArray::from_rows(&rows))
}

/// Rescales a building's points into a bounded frame and draws exactly
/// `sample_size` of them without replacement.
pub fn normalize<R: Rng + ?Sized>(
    collection: &MultiPoint,
    scaling_factor: f64,
    sample_size: usize,
    rng: &mut R,
) -> Result<PointArray> {
    if collection.len() < sample_size {
        return Err(BpcError::InsufficientPoints {
            available: collection.len(),
            required: sample_size,
        });
    }
    let scaled = translate_and_scale(&multipoint_to_array(collection), scaling_factor)?;
    let picked = sample(rng, scaled.num_rows(), sample_size);
    let rows: Vec<[f64; 3]> = picked.iter().map(|i| scaled.row(i)).collect();
    Ok(PointArray::from_rows(&rows))
}

/// `normalize` with a generator built from an optional seed.
pub fn normalize_with_seed(
    collection: &MultiPoint,
    scaling_factor: f64,
    sample_size: usize,
    seed: Option<u64>,
) -> Result<PointArray> {
    let mut rng = sampling_rng(seed);
    normalize(collection, scaling_factor, sample_size, &mut rng)
}
