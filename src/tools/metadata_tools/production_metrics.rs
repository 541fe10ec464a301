/*
This tool is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use crate::tools::*;
use bpc_common::configs::get_configs;
use bpc_common::utils::resolve_path;
use bpc_extract::metrics::production_metrics;
use bpc_extract::OutputLayout;
use std::io::{Error, ErrorKind};
use std::path;

/// Computes coverage metrics from an area's stitched filename mapping: the
/// number of unique footprints overall, with a point cloud, with an address,
/// with an address and energy certificate, and with complete information. The
/// counts are written to `production_metrics_<area>.json` and printed with
/// their share of all footprints.
pub struct ProductionMetrics {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl ProductionMetrics {
    pub fn new() -> ProductionMetrics {
        let name = "ProductionMetrics".to_string();
        let toolbox = "Metadata Tools".to_string();
        let description = "Reports footprint coverage of point clouds, addresses and energy certificates for an area.".to_string();

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

        ProductionMetrics {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

impl PointCloudTool for ProductionMetrics {
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
        let report = production_metrics(&layout)?;
        // printed regardless of verbosity
        for line in report.summary_lines() {
            println!("{}", line);
        }
        log::info!("Metrics written to {}", layout.metrics_file().display());
        Ok(())
    }
}
