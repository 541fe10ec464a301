/*
This tool is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use crate::tools::*;
use bpc_common::configs::get_configs;
use bpc_common::utils::{get_formatted_elapsed_time, resolve_path};
use bpc_extract::metadata::stitch_from_disk;
use bpc_extract::metrics::production_metrics;
use bpc_extract::orchestrator::run_extraction;
use bpc_extract::{ExtractionConfig, NormalizationConfig, OutputLayout, SpatialStore, TileStore};
use bpc_lidar::{load_tile_directory, DEFAULT_PATCH_CAPACITY};
use bpc_vector::epc_csv::read_epc;
use bpc_vector::geojson::{read_addresses, read_boundaries, read_footprints};
use std::io::{Error, ErrorKind};
use std::path;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// This tool extracts one point cloud per building footprint within an area of
/// interest (a local authority code). Footprints are processed in chunks; each
/// footprint is buffered, the LiDAR points within the buffer are gathered, and
/// footprints with more points than the threshold receive synthetic floor
/// points at the lowest observed elevation before being written as `.npy`
/// arrays named after the footprint centroid. Address (UPRN) and energy
/// certificate (EPC) metadata is written per chunk, stitched per area, and
/// summarized in a production metrics file.
///
/// Point data come either from a directory of LAS/LAZ tiles together with
/// GeoJSON footprints, address points and boundaries and an EPC CSV export, or,
/// when built with the `pgpointcloud` feature, from a PostgreSQL database with
/// the PostGIS and pgpointcloud extensions (`--database` or the
/// `database_url` setting).
pub struct ExtractBuildingPointClouds {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl ExtractBuildingPointClouds {
    pub fn new() -> ExtractBuildingPointClouds {
        // public constructor
        let name = "ExtractBuildingPointClouds".to_string();
        let toolbox = "Extraction".to_string();
        let description = "Extracts per-building LiDAR point clouds with floor points and address/energy metadata for an area of interest.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Area Code".to_owned(),
            flags: vec!["--area".to_owned()],
            description: "Code of the area of interest, e.g. a local authority district code.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output Directory".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Output directory; an area sub-folder is created within it.".to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Run Configuration File".to_owned(),
            flags: vec!["--config".to_owned()],
            description: "Optional JSON file of extraction parameters; flags override its values.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Json),
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "LiDAR Tile Directory".to_owned(),
            flags: vec!["--tiles".to_owned()],
            description: "Directory of LAS/LAZ tiles.".to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Footprints File".to_owned(),
            flags: vec!["--footprints".to_owned()],
            description: "GeoJSON building footprints (polygons).".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Vector(
                VectorGeometryType::Polygon,
            )),
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Footprint ID Field".to_owned(),
            flags: vec!["--id_field".to_owned()],
            description: "Integer footprint id property.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: Some("id".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Address Points File".to_owned(),
            flags: vec!["--addresses".to_owned()],
            description: "GeoJSON address points with a 'uprn' property.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Vector(
                VectorGeometryType::Point,
            )),
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Boundaries File".to_owned(),
            flags: vec!["--boundaries".to_owned()],
            description: "GeoJSON area boundaries (polygons).".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Vector(
                VectorGeometryType::Polygon,
            )),
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Boundary Code Field".to_owned(),
            flags: vec!["--area_field".to_owned()],
            description: "Boundary property holding the area code.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: Some("lad21cd".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "EPC File".to_owned(),
            flags: vec!["--epc".to_owned()],
            description: "EPC certificates CSV export.".to_owned(),
            parameter_type: ParameterType::ExistingFile(ParameterFileType::Csv),
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Database Connection".to_owned(),
            flags: vec!["--database".to_owned()],
            description: "PostgreSQL connection string (requires the pgpointcloud build).".to_owned(),
            parameter_type: ParameterType::String,
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Buffer Distance".to_owned(),
            flags: vec!["--buffer".to_owned()],
            description: "Footprint buffer distance, in metres.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("0.5".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Point Count Threshold".to_owned(),
            flags: vec!["--threshold".to_owned()],
            description: "Footprints need more points than this to be extracted.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: Some("100".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Chunk Size".to_owned(),
            flags: vec!["--chunk_size".to_owned()],
            description: "Number of footprints processed per chunk.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: Some("500".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Maximum Footprints".to_owned(),
            flags: vec!["--max_footprints".to_owned()],
            description: "Caps the number of footprints listed for the area.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Floor Point Resolution".to_owned(),
            flags: vec!["--floor_resolution".to_owned()],
            description: "Grid spacing of synthetic floor points, in metres.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: Some("0.5".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Normalized Sample Size".to_owned(),
            flags: vec!["--sample_size".to_owned()],
            description: "When given, arrays are normalized and subsampled to this many points.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Scaling Factor".to_owned(),
            flags: vec!["--scaling_factor".to_owned()],
            description: "Shared normalization divisor; each building's own extent is used when absent.".to_owned(),
            parameter_type: ParameterType::Float,
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Random Seed".to_owned(),
            flags: vec!["--seed".to_owned()],
            description: "Seed of the subsampling generator.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: None,
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Isolate building errors?".to_owned(),
            flags: vec!["--isolate_errors".to_owned()],
            description: "Log and skip buildings that fail instead of stopping the run.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        parameters.push(ToolParameter {
            name: "Refresh footprint listing?".to_owned(),
            flags: vec!["--refresh".to_owned()],
            description: "Rebuild the cached footprint listing of the area.".to_owned(),
            parameter_type: ParameterType::Boolean,
            default_value: Some("false".to_owned()),
            optional: true,
        });

        let sep: String = path::MAIN_SEPARATOR.to_string();
        let usage = format!(
            ">>.*{0} -r={1} -v --wd=\"*path*to*data*\" --area=E06000014 --tiles=tiles --footprints=footprints.geojson --addresses=uprn.geojson --boundaries=lad.geojson --epc=certificates.csv -o=output
>>.*{0} -r={1} -v --area=E06000014 --database=\"host=localhost dbname=uk user=bpc\" --chunk_size=250 --sample_size=1024 --seed=1",
            short_exe_name(),
            name
        )
        .replace('*', &sep);

        ExtractBuildingPointClouds {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

/// File-based inputs of an extraction run.
#[derive(Default)]
struct FileSources {
    tiles: Option<PathBuf>,
    footprints: Option<PathBuf>,
    id_field: String,
    addresses: Option<PathBuf>,
    boundaries: Option<PathBuf>,
    area_field: String,
    epc: Option<PathBuf>,
}

fn missing(what: &str) -> Error {
    Error::new(
        ErrorKind::InvalidInput,
        format!("The {} input was not specified.", what),
    )
}

fn tile_store_from_files(sources: &FileSources) -> Result<TileStore, Error> {
    let tiles = sources.tiles.as_ref().ok_or_else(|| missing("--tiles"))?;
    let footprints = read_footprints(
        sources.footprints.as_ref().ok_or_else(|| missing("--footprints"))?,
        &sources.id_field,
    )?;
    let boundaries = read_boundaries(
        sources.boundaries.as_ref().ok_or_else(|| missing("--boundaries"))?,
        &sources.area_field,
    )?;
    let addresses = match &sources.addresses {
        Some(p) => read_addresses(p)?,
        None => vec![],
    };
    let epc = match &sources.epc {
        Some(p) => read_epc(p)?,
        None => vec![],
    };
    log::info!(
        "Read {} footprints, {} addresses, {} certificates and {} boundaries",
        footprints.len(),
        addresses.len(),
        epc.len(),
        boundaries.len()
    );
    let patches = load_tile_directory(tiles, DEFAULT_PATCH_CAPACITY)?;
    Ok(TileStore::new(footprints, addresses, epc, boundaries, patches))
}

#[cfg(feature = "pgpointcloud")]
fn database_store(url: &str) -> Result<Box<dyn SpatialStore>, Error> {
    use bpc_extract::pg_store::PgPointCloudStore;
    use bpc_extract::sql::TableNames;
    Ok(Box::new(PgPointCloudStore::connect(url, TableNames::default())?))
}

#[cfg(not(feature = "pgpointcloud"))]
fn database_store(_url: &str) -> Result<Box<dyn SpatialStore>, Error> {
    Err(Error::new(
        ErrorKind::InvalidInput,
        "Database sources require a build with the 'pgpointcloud' feature; use --tiles instead.",
    ))
}

fn extract(
    store: &mut dyn SpatialStore,
    config: &ExtractionConfig,
    output_dir: &Path,
    verbose: bool,
) -> Result<(), Error> {
    let summary = run_extraction(store, config, output_dir)?;
    if verbose {
        println!(
            "{} footprints in {} chunks; {} arrays written, {} buildings skipped",
            summary.num_footprints, summary.num_chunks, summary.num_arrays, summary.num_skipped
        );
    }
    let layout = OutputLayout::new(output_dir, &config.area_code);
    stitch_from_disk(&layout)?;
    let report = production_metrics(&layout)?;
    if verbose {
        for line in report.summary_lines() {
            println!("{}", line);
        }
    }
    Ok(())
}

impl PointCloudTool for ExtractBuildingPointClouds {
    fn get_tool_name(&self) -> String {
        self.name.clone()
    }

    fn get_tool_description(&self) -> String {
        self.description.clone()
    }

    fn get_tool_parameters(&self) -> String {
        parameters_to_json(&self.parameters)
    }

    fn get_example_usage(&self) -> String {
        self.example_usage.clone()
    }

    fn get_toolbox(&self) -> String {
        self.toolbox.clone()
    }

    fn run<'a>(&self, args: Vec<String>, working_directory: &'a str, verbose: bool) -> Result<(), Error> {
        if args.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Tool run with no parameters.",
            ));
        }

        // a configuration file is the base; flags are applied on top of it
        let mut config = ExtractionConfig::default();
        for i in 0..args.len() {
            let (flag_val, value) = parse_flag(&args, i);
            if flag_val == "-config" {
                let file = require_value(&flag_val, &value)?;
                config = ExtractionConfig::from_json_file(&resolve_path(&file, working_directory))?;
            }
        }

        let mut output_dir = String::new();
        let mut database_url: Option<String> = None;
        let mut sources = FileSources {
            id_field: "id".to_string(),
            area_field: "lad21cd".to_string(),
            ..Default::default()
        };
        let mut sample_size: Option<usize> = None;
        let mut scaling_factor: Option<f64> = None;
        let mut seed: Option<u64> = None;
        for i in 0..args.len() {
            let (flag_val, value) = parse_flag(&args, i);
            let path_of = |v: &Option<String>| -> Result<PathBuf, Error> {
                Ok(resolve_path(&require_value(&flag_val, v)?, working_directory))
            };
            match flag_val.as_str() {
                "-area" => config.area_code = require_value(&flag_val, &value)?,
                "-o" | "-output" => output_dir = require_value(&flag_val, &value)?,
                "-tiles" => sources.tiles = Some(path_of(&value)?),
                "-footprints" => sources.footprints = Some(path_of(&value)?),
                "-id_field" => sources.id_field = require_value(&flag_val, &value)?,
                "-addresses" => sources.addresses = Some(path_of(&value)?),
                "-boundaries" => sources.boundaries = Some(path_of(&value)?),
                "-area_field" => sources.area_field = require_value(&flag_val, &value)?,
                "-epc" => sources.epc = Some(path_of(&value)?),
                "-database" => database_url = Some(require_value(&flag_val, &value)?),
                "-buffer" => config.buffer_meters = parse_value(&flag_val, &value)?,
                "-threshold" => config.point_count_threshold = parse_value(&flag_val, &value)?,
                "-chunk_size" => config.chunk_size = parse_value(&flag_val, &value)?,
                "-max_footprints" => config.max_footprints = Some(parse_value(&flag_val, &value)?),
                "-floor_resolution" => config.floor_resolution = parse_value(&flag_val, &value)?,
                "-sample_size" => sample_size = Some(parse_value(&flag_val, &value)?),
                "-scaling_factor" => scaling_factor = Some(parse_value(&flag_val, &value)?),
                "-seed" => seed = Some(parse_value(&flag_val, &value)?),
                "-isolate_errors" => config.isolate_building_errors = bool_flag(&value),
                "-refresh" => config.refresh_listing = bool_flag(&value),
                _ => {}
            }
        }

        if let Some(n) = sample_size {
            config.normalization = Some(NormalizationConfig {
                sample_size: n,
                scaling_factor,
                seed,
            });
        } else if let Some(norm) = config.normalization.as_mut() {
            if scaling_factor.is_some() {
                norm.scaling_factor = scaling_factor;
            }
            if seed.is_some() {
                norm.seed = seed;
            }
        }
        config.validate()?;

        if verbose {
            print_welcome(&self.get_tool_name());
        }

        let configs = get_configs()?;
        if output_dir.is_empty() {
            output_dir = configs.output_directory.clone();
        }
        let output_dir = resolve_path(&output_dir, working_directory);

        let start = Instant::now();
        if sources.tiles.is_some() {
            let mut store = tile_store_from_files(&sources)?;
            extract(&mut store, &config, &output_dir, verbose)?;
        } else {
            let url = database_url
                .or_else(|| configs.resolve_database_url())
                .ok_or_else(|| missing("--tiles or --database"))?;
            let mut store = database_store(&url)?;
            extract(store.as_mut(), &config, &output_dir, verbose)?;
        }

        let elapsed_time = get_formatted_elapsed_time(start);
        if verbose {
            println!("{}", &format!("Elapsed Time (excluding I/O): {}", elapsed_time));
        }

        Ok(())
    }
}
