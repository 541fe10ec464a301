/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

pub mod batch;
pub mod config;
pub mod floor;
pub mod metadata;
pub mod metrics;
pub mod normalize;
pub mod orchestrator;
pub mod output;
#[cfg(feature = "pgpointcloud")]
pub mod pg_store;
pub mod sql;
pub mod store;
pub mod tile_store;

pub use crate::config::{ExtractionConfig, NormalizationConfig};
pub use crate::floor::add_floor;
pub use crate::metadata::{stitch, stitch_from_disk, MetadataTables};
pub use crate::metrics::{compute_metrics, production_metrics, MetricsReport};
pub use crate::normalize::normalize;
pub use crate::orchestrator::{extract_area, run_extraction, ChunkOutput, ExtractionSummary};
pub use crate::output::OutputLayout;
pub use crate::store::SpatialStore;
pub use crate::tile_store::TileStore;
