// metadata_tools
mod production_metrics;
mod stitch_building_metadata;

pub use self::production_metrics::ProductionMetrics;
pub use self::stitch_building_metadata::StitchBuildingMetadata;
