use bpc_common::structures::{MultiPoint, Point3D, PointArray};
use bpc_common::{BpcError, Result};

/// Flattens a point collection into an (N, 3) array, one row per point in the
/// collection's stored order.
pub fn multipoint_to_array(collection: &MultiPoint) -> PointArray {
    let rows: Vec<[f64; 3]> = collection.iter().map(|p| [p.x, p.y, p.z]).collect();
    PointArray::from_rows(&rows)
}

/// Rebuilds a point collection from an (N, 3) array.
pub fn array_to_multipoint(array: &PointArray) -> Result<MultiPoint> {
    let (_, cols) = array.shape();
    if cols != PointArray::NUM_COLUMNS {
        return Err(BpcError::Shape(format!(
            "points must be stored as rows of 3 columns, found {} columns",
            cols
        )));
    }
    MultiPoint::new(array.rows().map(|r| Point3D::new(r[0], r[1], r[2])).collect())
}

/// Same as `array_to_multipoint`, for flat row-major data with a declared shape.
/// A transposed (3, N) layout is rejected rather than reinterpreted.
pub fn raw_to_multipoint(data: Vec<f64>, shape: (usize, usize)) -> Result<MultiPoint> {
    let array = PointArray::new(data, shape)?;
    array_to_multipoint(&array)
}

#[cfg(test)]
mod test {
    use super::{array_to_multipoint, multipoint_to_array, raw_to_multipoint};
    use bpc_common::structures::{MultiPoint, Point3D};
    use bpc_common::BpcError;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_rows_follow_insertion_order() {
        let mp = MultiPoint::new(vec![
            Point3D::new(3.0, 2.0, 1.0),
            Point3D::new(-1.0, 0.5, 8.0),
        ])
        .unwrap();
        let arr = multipoint_to_array(&mp);
        assert_eq!(arr.shape(), (2, 3));
        assert_eq!(arr.as_slice(), &[3.0, 2.0, 1.0, -1.0, 0.5, 8.0]);
    }

    #[test]
    fn test_random_collection_survives_conversion() {
        let mut rng = SmallRng::seed_from_u64(42);
        let points: Vec<Point3D> = (0..250)
            .map(|_| {
                Point3D::new(
                    rng.gen_range(400000.0..400010.0),
                    rng.gen_range(100000.0..100010.0),
                    rng.gen_range(0.0..5.0),
                )
            })
            .collect();
        let mp = MultiPoint::new(points).unwrap();
        let back = array_to_multipoint(&multipoint_to_array(&mp)).unwrap();
        assert_eq!(back, mp);
    }

    #[test]
    fn test_transposed_layout_rejected() {
        match raw_to_multipoint(vec![0.0; 12], (3, 4)) {
            Err(BpcError::Shape(_)) => {}
            other => panic!("expected a shape error, found {:?}", other),
        }
        assert_eq!(raw_to_multipoint(vec![1.0; 12], (4, 3)).unwrap().len(), 4);
    }
}
