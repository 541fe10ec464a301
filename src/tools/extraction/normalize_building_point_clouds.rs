/*
This tool is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use crate::tools::*;
use bpc_common::utils::{get_formatted_elapsed_time, resolve_path};
use bpc_extract::batch::{normalize_directory, ScalingMode};
use std::io::{Error, ErrorKind};
use std::path;
use std::time::Instant;

/// Normalizes a directory of raw building arrays (`npy_raw`) into a fixed
/// number of points per building. Each axis is translated so that its minimum
/// is zero and divided by a scaling factor; points are then subsampled without
/// replacement. The scaling factor is the largest extent over all buildings
/// (`global`), each building's own largest extent (`building`), or a fixed
/// value. Arrays with fewer points than the sample size are skipped.
pub struct NormalizeBuildingPointClouds {
    name: String,
    description: String,
    toolbox: String,
    parameters: Vec<ToolParameter>,
    example_usage: String,
}

impl NormalizeBuildingPointClouds {
    pub fn new() -> NormalizeBuildingPointClouds {
        let name = "NormalizeBuildingPointClouds".to_string();
        let toolbox = "Extraction".to_string();
        let description =
            "Rescales and subsamples a directory of building point-cloud arrays to a fixed size."
                .to_string();

        let mut parameters = vec![];
        parameters.push(ToolParameter {
            name: "Input Directory".to_owned(),
            flags: vec!["-i".to_owned(), "--input".to_owned()],
            description: "Directory of raw .npy arrays.".to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Output Directory".to_owned(),
            flags: vec!["-o".to_owned(), "--output".to_owned()],
            description: "Directory receiving the normalized arrays.".to_owned(),
            parameter_type: ParameterType::Directory,
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Sample Size".to_owned(),
            flags: vec!["--sample_size".to_owned()],
            description: "Number of points per normalized array.".to_owned(),
            parameter_type: ParameterType::Integer,
            default_value: None,
            optional: false,
        });

        parameters.push(ToolParameter {
            name: "Scaling".to_owned(),
            flags: vec!["--scaling".to_owned()],
            description: "'global', 'building', or a numeric scaling factor.".to_owned(),
            parameter_type: ParameterType::String,
            default_value: Some("global".to_owned()),
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

        let sep: String = path::MAIN_SEPARATOR.to_string();
        let usage = format!(
            ">>.*{0} -r={1} -v --wd=\"*path*to*output*E06000014*\" -i=npy_raw -o=npy_normalized --sample_size=1024 --scaling=global",
            short_exe_name(),
            name
        )
        .replace('*', &sep);

        NormalizeBuildingPointClouds {
            name,
            description,
            toolbox,
            parameters,
            example_usage: usage,
        }
    }
}

fn parse_scaling(value: &str) -> Result<ScalingMode, Error> {
    match value.trim().to_lowercase().as_str() {
        "global" | "max" => Ok(ScalingMode::Global),
        "building" | "per_building" => Ok(ScalingMode::PerBuilding),
        v => v.parse::<f64>().map(ScalingMode::Fixed).map_err(|_| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("Unrecognized scaling '{}'.", value),
            )
        }),
    }
}

impl PointCloudTool for NormalizeBuildingPointClouds {
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
        let mut input_dir = String::new();
        let mut output_dir = String::new();
        let mut sample_size = 0usize;
        let mut scaling = ScalingMode::Global;
        let mut seed: Option<u64> = None;
        if args.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Tool run with no parameters.",
            ));
        }
        for i in 0..args.len() {
            let (flag_val, value) = parse_flag(&args, i);
            if flag_val == "-i" || flag_val == "-input" {
                input_dir = require_value(&flag_val, &value)?;
            } else if flag_val == "-o" || flag_val == "-output" {
                output_dir = require_value(&flag_val, &value)?;
            } else if flag_val == "-sample_size" {
                sample_size = parse_value(&flag_val, &value)?;
            } else if flag_val == "-scaling" {
                scaling = parse_scaling(&require_value(&flag_val, &value)?)?;
            } else if flag_val == "-seed" {
                seed = Some(parse_value(&flag_val, &value)?);
            }
        }

        if verbose {
            print_welcome(&self.get_tool_name());
        }

        if input_dir.is_empty() || output_dir.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                "Both the input and output directories must be specified.",
            ));
        }
        let input_dir = resolve_path(&input_dir, working_directory);
        let output_dir = resolve_path(&output_dir, working_directory);

        let start = Instant::now();
        let summary = normalize_directory(&input_dir, &output_dir, sample_size, scaling, seed)?;
        if verbose {
            if let Some(f) = summary.scaling_factor {
                println!("Scaling factor: {}", f);
            }
            println!(
                "{} arrays normalized, {} skipped with fewer than {} points",
                summary.normalized,
                summary.skipped.len(),
                sample_size
            );
            println!(
                "{}",
                &format!("Elapsed Time (excluding I/O): {}", get_formatted_elapsed_time(start))
            );
        }

        Ok(())
    }
}
