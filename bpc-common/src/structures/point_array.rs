use crate::errors::{BpcError, Result};

/// A dense, row-major (N, 3) array of f64 values; one row per point, columns x, y, z.
#[derive(Clone, Debug, PartialEq)]
pub struct PointArray {
    data: Vec<f64>,
    num_rows: usize,
}

impl PointArray {
    pub const NUM_COLUMNS: usize = 3;

    /// Builds an array from flat row-major data with the declared shape. Any shape
    /// other than (N, 3), e.g. the transposed (3, N), is rejected.
    pub fn new(data: Vec<f64>, shape: (usize, usize)) -> Result<PointArray> {
        let (rows, cols) = shape;
        if cols != PointArray::NUM_COLUMNS {
            return Err(BpcError::Shape(format!(
                "expected an array of shape (N, 3) but found ({}, {})",
                rows, cols
            )));
        }
        if data.len() != rows * cols {
            return Err(BpcError::Shape(format!(
                "an array of shape ({}, {}) needs {} values but {} were supplied",
                rows,
                cols,
                rows * cols,
                data.len()
            )));
        }
        Ok(PointArray {
            data,
            num_rows: rows,
        })
    }

    pub fn from_rows(rows: &[[f64; 3]]) -> PointArray {
        let mut data = Vec::with_capacity(rows.len() * 3);
        for r in rows {
            data.extend_from_slice(r);
        }
        PointArray {
            data,
            num_rows: rows.len(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_rows, PointArray::NUM_COLUMNS)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn is_empty(&self) -> bool {
        self.num_rows == 0
    }

    pub fn row(&self, i: usize) -> [f64; 3] {
        let s = i * 3;
        [self.data[s], self.data[s + 1], self.data[s + 2]]
    }

    pub fn rows(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.data.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn column_min(&self, col: usize) -> Option<f64> {
        self.data
            .iter()
            .skip(col)
            .step_by(3)
            .copied()
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.min(v))))
    }

    pub fn column_max(&self, col: usize) -> Option<f64> {
        self.data
            .iter()
            .skip(col)
            .step_by(3)
            .copied()
            .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
    }
}

#[cfg(test)]
mod test {
    use super::PointArray;
    use crate::errors::BpcError;

    #[test]
    fn test_shape_checks() {
        assert!(PointArray::new(vec![0.0; 6], (2, 3)).is_ok());
        match PointArray::new(vec![0.0; 6], (3, 2)) {
            Err(BpcError::Shape(_)) => {}
            other => panic!("expected a shape error, found {:?}", other),
        }
        assert!(PointArray::new(vec![0.0; 5], (2, 3)).is_err());
    }

    #[test]
    fn test_rows_and_columns() {
        let arr = PointArray::from_rows(&[[1.0, 2.0, 3.0], [-1.0, 5.0, 0.5]]);
        assert_eq!(arr.shape(), (2, 3));
        assert_eq!(arr.row(1), [-1.0, 5.0, 0.5]);
        assert_eq!(arr.rows().count(), 2);
        assert_eq!(arr.column_min(0), Some(-1.0));
        assert_eq!(arr.column_max(1), Some(5.0));
        assert_eq!(arr.column_min(2), Some(0.5));
        assert_eq!(PointArray::from_rows(&[]).column_min(0), None);
    }
}
