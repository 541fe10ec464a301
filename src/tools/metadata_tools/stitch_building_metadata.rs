/*
This tool is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use crate::tools::*;
use bpc_common::configs::get_configs;
use bpc_common::utils::resolve_path;
use bpc_extract::metadata::stitch_from_disk;
use bpc_extract::OutputLayout;
use std::io::{Error, ErrorKind};
use std::path;

/// Concatenates the per-chunk footprint, address, EPC and filename-mapping
/// files of an area into `<category>_<area>.json` files in the area folder.
pub struct StitchBuildingMetadata {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl StitchBuildingMetadata {
    pub fn new() -> StitchBuildingMetadata {
        let name = "StitchBuildingMetadata".to_string();
        let toolbox = "Metadata Tools".to_string();
        let description = "Stitches per-chunk building metadata files into one file per category.".to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Area Code".to_owned(),
            flags: vec!["--area".to_owned()],
            description: "Code of the area of interest.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output Directory".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Directory holding the area sub-folder.".to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: true,
        });

        let sep: String = path::MAIN_SEPARATOR.to_string();
        let usage = format!(
            ">>.*{0} -r={1} -v --wd=\"*path*to*output*\" --area=E06000014",
            short_exe_name(),
            name
        )
        .replace('*', &sep);

        StitchBuildingMetadata {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl PointCloudTool for StitchBuildingMetadata {
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
        let mut area_code = String::new();
        let mut output_dir = String::new();
        for i in 0..args.len() {
            let (flag_val, value) = parse_flag(&args, i);
            if flag_val == "-area" {
                area_code = require_value(&flag_val, &value)?;
            } else if flag_val == "-o" || flag_val == "-output" {
                output_dir = require_value(&flag_val, &value)?;
            }
        }
        if area_code.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "The --area code was not specified.",
            ));
        }

        if verbose {
            print_welcome(&self.get_tool_name());
        }

        if output_dir.is_empty() {
            output_dir = get_configs()?.output_directory;
        }
        let layout = OutputLayout::new(&resolve_path(&output_dir, working_directory), &area_code);
        let tables = stitch_from_disk(&layout)?;
        if verbose {
            println!(
                "Stitched {} footprints, {} addresses, {} certificates and {} mapping rows into {}",
                tables.footprints.len(),
                tables.addresses.len(),
                tables.epc.len(),
                tables.mappings.len(),
                layout.aoi_dir().display()
            );
        }
        Ok(())
    }
}
