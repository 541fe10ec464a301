use bpc_common::structures::Polygon;
use bpc_common::utils::float_repr;
use bpc_common::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Sub-folders created for every area of interest.
pub const SUB_FOLDERS: [&str; 5] = ["npy_raw", "footprints", "uprn", "epc", "filename_mapping"];
pub const NORMALIZED_ARRAY_FOLDER: &str = "npy_normalized";

/// The metadata categories written per chunk and stitched per area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Footprints,
    Uprn,
    Epc,
    FilenameMapping,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Footprints,
        Category::Uprn,
        Category::Epc,
        Category::FilenameMapping,
    ];

    pub fn folder(&self) -> &'static str {
        match self {
            Category::Footprints => "footprints",
            Category::Uprn => "uprn",
            Category::Epc => "epc",
            Category::FilenameMapping => "filename_mapping",
        }
    }

    fn chunk_prefix(&self) -> &'static str {
        match self {
            Category::FilenameMapping => "label_filename_mapping",
            other => other.folder(),
        }
    }
}

/// Paths of one area's output tree, `<output>/<area code>/...`.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    aoi_dir: PathBuf,
    area_code: String,
}

impl OutputLayout {
    pub fn new(output_dir: &Path, area_code: &str) -> OutputLayout {
        OutputLayout {
            aoi_dir: output_dir.join(area_code),
            area_code: area_code.to_string(),
        }
    }

    /// Creates the area folder and its sub-folders. An existing folder is
    /// reused and files within it are overwritten.
    pub fn setup(output_dir: &Path, area_code: &str) -> Result<OutputLayout> {
        let layout = OutputLayout::new(output_dir, area_code);
        if layout.aoi_dir.is_dir() {
            log::warn!(
                "Output for {} already exists in {}; existing files will be overwritten",
                area_code,
                layout.aoi_dir.display()
            );
        }
        for sub in SUB_FOLDERS.iter() {
            fs::create_dir_all(layout.aoi_dir.join(sub))?;
        }
        Ok(layout)
    }

    pub fn area_code(&self) -> &str {
        &self.area_code
    }

    pub fn aoi_dir(&self) -> &Path {
        &self.aoi_dir
    }

    pub fn array_dir(&self, normalized: bool) -> PathBuf {
        if normalized {
            self.aoi_dir.join(NORMALIZED_ARRAY_FOLDER)
        } else {
            self.aoi_dir.join(SUB_FOLDERS[0])
        }
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.aoi_dir.join(category.folder())
    }

    /// e.g. `footprints/footprints_E06000014_3.json`
    pub fn chunk_file(&self, category: Category, chunk_index: usize) -> PathBuf {
        self.category_dir(category).join(format!(
            "{}_{}_{}.json",
            category.chunk_prefix(),
            self.area_code,
            chunk_index
        ))
    }

    /// Chunk index encoded in a chunk file name of the category, if it is one.
    pub fn parse_chunk_index(&self, category: Category, file_name: &str) -> Option<usize> {
        let prefix = format!("{}_{}_", category.chunk_prefix(), self.area_code);
        file_name
            .strip_prefix(&prefix)?
            .strip_suffix(".json")?
            .parse::<usize>()
            .ok()
    }

    pub fn stitched_file(&self, category: Category) -> PathBuf {
        self.aoi_dir
            .join(format!("{}_{}.json", category.folder(), self.area_code))
    }

    pub fn metrics_file(&self) -> PathBuf {
        self.aoi_dir
            .join(format!("production_metrics_{}.json", self.area_code))
    }
}

/// The array file name of a building: its footprint centroid, `<x>_<y>.npy`.
pub fn array_file_name(footprint: &Polygon) -> String {
    let c = footprint.centroid();
    format!("{}_{}.npy", float_repr(c.x), float_repr(c.y))
}

#[cfg(test)]
mod test {
    use super::{array_file_name, Category, OutputLayout};
    use bpc_common::structures::Polygon;

    #[test]
    fn test_setup_creates_tree() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::setup(dir.path(), "E06000014").unwrap();
        for sub in ["npy_raw", "footprints", "uprn", "epc", "filename_mapping"] {
            assert!(dir.path().join("E06000014").join(sub).is_dir());
        }
        // a second setup reuses the folder
        assert!(OutputLayout::setup(dir.path(), "E06000014").is_ok());
        assert!(layout
            .chunk_file(Category::FilenameMapping, 2)
            .ends_with("filename_mapping/label_filename_mapping_E06000014_2.json"));
        assert!(layout
            .stitched_file(Category::Epc)
            .ends_with("E06000014/epc_E06000014.json"));
        assert!(layout
            .metrics_file()
            .ends_with("production_metrics_E06000014.json"));
    }

    #[test]
    fn test_parse_chunk_index() {
        let layout = OutputLayout::new(std::path::Path::new("/out"), "E06000014");
        assert_eq!(
            layout.parse_chunk_index(Category::Uprn, "uprn_E06000014_12.json"),
            Some(12)
        );
        assert_eq!(
            layout.parse_chunk_index(Category::Uprn, "uprn_E06000014.json"),
            None
        );
        assert_eq!(
            layout.parse_chunk_index(Category::Footprints, "uprn_E06000014_1.json"),
            None
        );
    }

    #[test]
    fn test_array_file_name() {
        let square = Polygon::rectangle(0.0, 0.0, 10.0, 10.0).unwrap();
        assert_eq!(array_file_name(&square), "5.0_5.0.npy");
        let rect = Polygon::rectangle(412000.0, 87000.0, 412003.0, 87005.0).unwrap();
        assert_eq!(array_file_name(&rect), "412001.5_87002.5.npy");
    }
}
