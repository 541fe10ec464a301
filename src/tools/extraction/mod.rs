// extraction
mod extract_building_point_clouds;
mod normalize_building_point_clouds;

pub use self::extract_building_point_clouds::ExtractBuildingPointClouds;
pub use self::normalize_building_point_clouds::NormalizeBuildingPointClouds;
