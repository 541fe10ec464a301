/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use bpc_common::{BpcError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Finest floor grid spacing a run accepts, in map units.
pub const MIN_FLOOR_RESOLUTION: f64 = 0.01;

/// Parameters of the optional normalization step.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NormalizationConfig {
    /// Number of points each normalized array is subsampled to.
    pub sample_size: usize,
    /// Shared divisor for all buildings; `None` uses each building's own
    /// largest bounding-box extent.
    #[serde(default)]
    pub scaling_factor: Option<f64>,
    /// Seed for the subsampling generator; `None` draws from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// All parameters of one extraction run over an area of interest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    pub area_code: String,
    pub buffer_meters: f64,
    pub max_footprints: Option<usize>,
    pub point_count_threshold: usize,
    pub chunk_size: usize,
    pub floor_resolution: f64,
    pub normalization: Option<NormalizationConfig>,
    pub isolate_building_errors: bool,
    pub refresh_listing: bool,
}

impl Default for ExtractionConfig {
    fn default() -> ExtractionConfig {
        ExtractionConfig {
            area_code: String::new(),
            buffer_meters: 0.5,
            max_footprints: None,
            point_count_threshold: 100,
            chunk_size: 500,
            floor_resolution: 0.5,
            normalization: None,
            isolate_building_errors: false,
            refresh_listing: false,
        }
    }
}

impl ExtractionConfig {
    pub fn new(area_code: &str) -> ExtractionConfig {
        ExtractionConfig {
            area_code: area_code.to_string(),
            ..Default::default()
        }
    }

    pub fn from_json_file(path: &Path) -> Result<ExtractionConfig> {
        let contents = fs::read_to_string(path)?;
        let config: ExtractionConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.area_code.trim().is_empty() {
            return Err(BpcError::InvalidParameter(
                "an area code is required".to_string(),
            ));
        }
        if self.chunk_size == 0 {
            return Err(BpcError::InvalidParameter(
                "the chunk size must be at least 1".to_string(),
            ));
        }
        if !self.buffer_meters.is_finite() || self.buffer_meters < 0f64 {
            return Err(BpcError::InvalidParameter(format!(
                "invalid buffer distance {}",
                self.buffer_meters
            )));
        }
        if !self.floor_resolution.is_finite() || self.floor_resolution < MIN_FLOOR_RESOLUTION {
            return Err(BpcError::InvalidParameter(format!(
                "invalid floor grid resolution {}",
                self.floor_resolution
            )));
        }
        if let Some(norm) = &self.normalization {
            if norm.sample_size == 0 {
                return Err(BpcError::InvalidParameter(
                    "the normalization sample size must be at least 1".to_string(),
                ));
            }
            if let Some(s) = norm.scaling_factor {
                if !s.is_finite() || s <= 0f64 {
                    return Err(BpcError::InvalidParameter(format!(
                        "invalid scaling factor {}",
                        s
                    )));
                }
            }
        }
        Ok(())
    }
}
