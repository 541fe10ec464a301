/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

/*!
Building Point-Cloud Tools extracts one LiDAR point cloud per building
footprint, augments it with floor points, optionally normalizes it, and writes
the metadata linking each cloud to its address and energy certificate.

The program is run from a terminal or a script. The following commands are
recognized:

| Command           | Description                                                                  |
| ----------------- | ---------------------------------------------------------------------------- |
| --cd, --wd        | Changes the working directory; used in conjunction with --run flag.          |
| -h, --help        | Prints help information.                                                     |
| --listtools       | Lists all available tools. Keywords may also be used, --listtools stitch.    |
| -r, --run         | Runs a tool; used in conjunction with --wd flag; -r="ProductionMetrics".     |
| --toolbox         | Prints the toolbox associated with a tool; --toolbox=ProductionMetrics.      |
| --toolhelp        | Prints the help associated with a tool; --toolhelp="ProductionMetrics".      |
| --toolparameters  | Prints the parameters (in json form) for a specific tool.                    |
| -v                | Verbose mode. Without this flag, tool outputs will not be printed.           |
| --version         | Prints the version information.                                              |
*/

pub mod tools;

use crate::tools::ToolManager;
use bpc_common::configs::{get_configs, save_configs};
use std::env;
use std::io::{Error, ErrorKind};
use std::path;

fn main() {
    if let Err(err) = run() {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

/// The value following the first '=' of a flag, with quotes removed.
fn flag_value(arg: &str) -> String {
    match arg.find('=') {
        Some(i) => arg[i + 1..].replace('\"', "").replace('\'', ""),
        None => String::new(),
    }
}

fn run() -> Result<(), Error> {
    let sep: &str = &path::MAIN_SEPARATOR.to_string();
    let mut tool_name = String::new();
    let mut run_tool = false;
    let mut tool_help = false;
    let mut tool_parameters = false;
    let mut toolbox = false;
    let mut list_tools = false;
    let mut keywords: Vec<String> = vec![];
    let mut tool_args_vec: Vec<String> = vec![];
    let mut finding_working_dir = false;
    let args: Vec<String> = env::args().collect();

    let mut configs = get_configs()?;
    let mut configs_modified = false;

    if args.len() <= 1 {
        init_logging(false);
        version();
        help();
        let tm = ToolManager::new(&configs.working_directory, &false)?;
        tm.list_tools();
        return Ok(());
    }

    for arg in args.iter().skip(1) {
        let flag_val = arg.to_lowercase().replace("--", "-");
        if flag_val == "-h" || flag_val == "-help" {
            help();
            return Ok(());
        } else if flag_val.starts_with("-cd") || flag_val.starts_with("-wd") {
            let mut v = flag_value(arg);
            if v.trim().is_empty() {
                finding_working_dir = true;
                continue;
            }
            if !v.ends_with(sep) {
                v.push_str(sep);
            }
            if configs.working_directory != v {
                configs.working_directory = v;
                configs_modified = true;
            }
        } else if flag_val.starts_with("-toolhelp") {
            tool_name = flag_value(arg);
            tool_help = true;
        } else if flag_val.starts_with("-toolparameters") {
            tool_name = flag_value(arg);
            tool_parameters = true;
        } else if flag_val.starts_with("-toolbox") {
            tool_name = flag_value(arg);
            toolbox = true;
        } else if flag_val.starts_with("-listtools") || flag_val.starts_with("-list_tools") {
            list_tools = true;
        } else if flag_val.starts_with("-run") || flag_val.starts_with("-r=") || flag_val == "-r" {
            tool_name = flag_value(arg);
            run_tool = true;
        } else if flag_val.starts_with("-version") {
            version();
            return Ok(());
        } else if flag_val == "-v" || flag_val.starts_with("-v=") || flag_val.starts_with("-verbose") {
            let v = flag_value(arg);
            let verbose = v.is_empty() || v.to_lowercase().contains('t');
            if configs.verbose_mode != verbose {
                configs.verbose_mode = verbose;
                configs_modified = true;
            }
        } else if arg.starts_with('-') {
            // it's an arg to be fed to the tool
            tool_args_vec.push(arg.trim().to_string());
        } else if finding_working_dir {
            let mut v = arg.trim().to_string();
            if !v.ends_with(sep) {
                v.push_str(sep);
            }
            configs.working_directory = v;
            configs_modified = true;
            finding_working_dir = false;
        } else if !tool_args_vec.is_empty() {
            tool_args_vec.push(arg.trim().to_string());
        } else {
            keywords.push(arg.trim().replace('\"', "").replace('\'', ""));
        }
    }

    init_logging(configs.verbose_mode);

    if configs_modified {
        save_configs(&configs)?;
    }

    let tm = ToolManager::new(&configs.working_directory, &configs.verbose_mode)?;
    if tool_name.is_empty() && !keywords.is_empty() && (run_tool || tool_help || tool_parameters || toolbox) {
        tool_name = keywords[0].clone();
    }
    if run_tool {
        if tool_name.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput, "No tool name was specified."));
        }
        return tm.run_tool(tool_name, tool_args_vec);
    } else if tool_help {
        return tm.tool_help(tool_name);
    } else if tool_parameters {
        return tm.tool_parameters(tool_name);
    } else if toolbox {
        return tm.toolbox(tool_name);
    } else if list_tools {
        if keywords.is_empty() {
            tm.list_tools();
        } else {
            tm.list_tools_with_keywords(keywords);
        }
    }

    Ok(())
}

fn help() {
    let ext = if cfg!(target_os = "windows") { ".exe" } else { "" };
    let exe_name = &format!("building_pointcloud_tools{}", ext);
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let s = "Building Point-Cloud Tools Help

The following commands are recognized:
--cd, --wd          Changes the working directory; used in conjunction with --run flag.
-h, --help          Prints help information.
--listtools         Lists all available tools. Keywords may also be used, --listtools metrics.
-r, --run           Runs a tool; used in conjunction with --wd flag; -r=\"ProductionMetrics\".
--toolbox           Prints the toolbox associated with a tool; --toolbox=ProductionMetrics.
--toolhelp          Prints the help associated with a tool; --toolhelp=\"ExtractBuildingPointClouds\".
--toolparameters    Prints the parameters (in json form) for a specific tool; --toolparameters=\"ProductionMetrics\".
-v                  Verbose mode. Without this flag, tool outputs will not be printed.
--version           Prints the version information.

Example Usage:
>> .*EXE_NAME -r=ProductionMetrics --wd=\"*path*to*output*\" --area=E06000014 -v
"
    .replace('*', &sep)
    .replace("EXE_NAME", exe_name);
    println!("{}", s);
}

fn version() {
    const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");
    println!(
        "Building Point-Cloud Tools v{}

Per-building LiDAR point-cloud extraction with address and energy
certificate metadata.",
        VERSION.unwrap_or("unknown")
    );
}
