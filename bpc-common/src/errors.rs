/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use std::io::{Error, ErrorKind};
use thiserror::Error as ThisError;

/// Errors raised while extracting, converting and normalizing building point clouds.
#[derive(Debug, ThisError)]
pub enum BpcError {
    /// A point collection is smaller than the sample size requested by the normalizer.
    #[error("insufficient points: the point cloud has {available} points but {required} are required")]
    InsufficientPoints { available: usize, required: usize },

    /// A geometry payload (WKB, GeoJSON) could not be decoded.
    #[error("malformed geometry payload: {0}")]
    Decode(String),

    /// A numeric array does not follow the (N, 3) points-as-rows convention.
    #[error("array shape error: {0}")]
    Shape(String),

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The spatial store failed to answer a query.
    #[error("spatial store error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BpcError>;

impl From<BpcError> for Error {
    fn from(err: BpcError) -> Error {
        match err {
            BpcError::Io(e) => e,
            BpcError::InvalidParameter(_) | BpcError::InsufficientPoints { .. } => {
                Error::new(ErrorKind::InvalidInput, err.to_string())
            }
            BpcError::Decode(_) | BpcError::Shape(_) | BpcError::InvalidGeometry(_) | BpcError::Json(_) => {
                Error::new(ErrorKind::InvalidData, err.to_string())
            }
            BpcError::Store(_) => Error::new(ErrorKind::Other, err.to_string()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::BpcError;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_conversion_to_io_error() {
        let err: Error = BpcError::InsufficientPoints {
            available: 10,
            required: 100,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(err.to_string().contains("10 points"));

        let err: Error = BpcError::Decode("truncated".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidData);

        let err: Error = BpcError::Io(Error::new(ErrorKind::NotFound, "gone")).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
