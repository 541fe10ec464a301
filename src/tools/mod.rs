pub mod extraction;
pub mod metadata_tools;

use serde::{Deserialize, Serialize};
use std::env;
use std::io::{Error, ErrorKind};
use std::path;

#[derive(Default)]
pub struct ToolManager {
    pub working_dir: String,
    pub verbose: bool,
    tool_names: Vec<String>,
}

impl ToolManager {
    pub fn new<'a>(working_directory: &'a str, verbose_mode: &'a bool) -> Result<ToolManager, Error> {
        let mut tool_names = vec![];
        // extraction
        tool_names.push("ExtractBuildingPointClouds".to_string());
        tool_names.push("NormalizeBuildingPointClouds".to_string());
        // metadata_tools
        tool_names.push("ProductionMetrics".to_string());
        tool_names.push("StitchBuildingMetadata".to_string());

        let tm = ToolManager {
            working_dir: working_directory.to_string(),
            verbose: *verbose_mode,
            tool_names,
        };
        Ok(tm)
    }

    fn get_tool(&self, tool_name: &str) -> Option<Box<dyn PointCloudTool + 'static>> {
        match tool_name.to_lowercase().replace('_', "").as_ref() {
            // extraction
            "extractbuildingpointclouds" => Some(Box::new(extraction::ExtractBuildingPointClouds::new())),
            "normalizebuildingpointclouds" => {
                Some(Box::new(extraction::NormalizeBuildingPointClouds::new()))
            }
            // metadata_tools
            "productionmetrics" => Some(Box::new(metadata_tools::ProductionMetrics::new())),
            "stitchbuildingmetadata" => Some(Box::new(metadata_tools::StitchBuildingMetadata::new())),
            _ => None,
        }
    }

    fn unrecognized(tool_name: &str) -> Error {
        Error::new(
            ErrorKind::NotFound,
            format!("Unrecognized tool name {}.", tool_name),
        )
    }

    pub fn run_tool(&self, tool_name: String, args: Vec<String>) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => tool.run(args, &self.working_dir, self.verbose),
            None => Err(ToolManager::unrecognized(&tool_name)),
        }
    }

    pub fn tool_help(&self, tool_name: String) -> Result<(), Error> {
        if !tool_name.is_empty() {
            match self.get_tool(tool_name.as_ref()) {
                Some(tool) => println!("{}", get_help(tool)?),
                None => return Err(ToolManager::unrecognized(&tool_name)),
            }
        } else {
            for (i, val) in self.tool_names.iter().enumerate() {
                if let Some(tool) = self.get_tool(val) {
                    println!("{}. {}\n", i + 1, get_help(tool)?);
                }
            }
        }
        Ok(())
    }

    pub fn tool_parameters(&self, tool_name: String) -> Result<(), Error> {
        match self.get_tool(tool_name.as_ref()) {
            Some(tool) => println!("{}", tool.get_tool_parameters()),
            None => return Err(ToolManager::unrecognized(&tool_name)),
        }
        Ok(())
    }

    pub fn toolbox(&self, tool_name: String) -> Result<(), Error> {
        if !tool_name.is_empty() {
            match self.get_tool(tool_name.as_ref()) {
                Some(tool) => println!("{}", tool.get_toolbox()),
                None => return Err(ToolManager::unrecognized(&tool_name)),
            }
        } else {
            let mut tool_details: Vec<(String, String)> = self
                .tool_names
                .iter()
                .filter_map(|val| self.get_tool(val).map(|t| (val.clone(), t.get_toolbox())))
                .collect();
            tool_details.sort();
            for (name, toolbox) in &tool_details {
                println!("{}: {}", name, toolbox);
            }
        }
        Ok(())
    }

    pub fn list_tools(&self) {
        let mut tool_details: Vec<(String, String)> = self
            .tool_names
            .iter()
            .filter_map(|val| self.get_tool(val).map(get_name_and_description))
            .collect();
        tool_details.sort();

        let mut ret = format!("All {} Available Tools:\n", tool_details.len());
        for (name, description) in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", name, description));
        }
        println!("{}", ret);
    }

    pub fn list_tools_with_keywords(&self, keywords: Vec<String>) {
        let mut tool_details: Vec<(String, String)> = Vec::new();
        for val in &self.tool_names {
            let tool = match self.get_tool(val) {
                Some(t) => t,
                None => continue,
            };
            let toolbox = tool.get_toolbox().to_lowercase();
            let (nm, des) = get_name_and_description(tool);
            let matched = keywords.iter().any(|kw| {
                let kw = kw.to_lowercase();
                nm.to_lowercase().contains(&kw)
                    || des.to_lowercase().contains(&kw)
                    || toolbox.contains(&kw)
            });
            if matched {
                tool_details.push((nm, des));
            }
        }

        let mut ret = format!("All {} Tools containing keywords:\n", tool_details.len());
        for (name, description) in &tool_details {
            ret.push_str(&format!("{}: {}\n\n", name, description));
        }
        println!("{}", ret);
    }
}

pub trait PointCloudTool {
    fn get_tool_name(&self) -> String;
    fn get_tool_description(&self) -> String;
    fn get_tool_parameters(&self) -> String;
    fn get_example_usage(&self) -> String;
    fn get_toolbox(&self) -> String;
    fn run<'a>(&self, args: Vec<String>, working_directory: &'a str, verbose: bool) -> Result<(), Error>;
}

fn get_help<'a>(wt: Box<dyn PointCloudTool + 'a>) -> Result<String, Error> {
    let tool_name = wt.get_tool_name();
    let description = wt.get_tool_description();
    let parameters = wt.get_tool_parameters();
    let toolbox = wt.get_toolbox();
    let o: serde_json::Value = serde_json::from_str(&parameters)?;
    let mut p = String::new();
    p.push_str("Flag               Description\n");
    p.push_str("-----------------  -----------\n");
    if let Some(a) = o["parameters"].as_array() {
        for d in a {
            let flags: Vec<&str> = d["flags"]
                .as_array()
                .map(|f| f.iter().filter_map(|v| v.as_str()).collect())
                .unwrap_or_default();
            p.push_str(&format!(
                "{:width$} {}\n",
                flags.join(", "),
                d["description"].as_str().unwrap_or(""),
                width = 18
            ));
        }
    }
    let example = wt.get_example_usage();
    let s = if example.len() <= 1 {
        format!(
            "{}

Description:\n{}
Toolbox: {}
Parameters:\n
{}
",
            tool_name, description, toolbox, p
        )
    } else {
        format!(
            "{}
Description:\n{}
Toolbox: {}
Parameters:\n
{}

Example usage:
{}
",
            tool_name, description, toolbox, p, example
        )
    };
    Ok(s)
}

fn get_name_and_description<'a>(wt: Box<dyn PointCloudTool + 'a>) -> (String, String) {
    (wt.get_tool_name(), wt.get_tool_description())
}

/// Serializes a tool's parameter list as `{"parameters": [...]}`.
fn parameters_to_json(parameters: &[ToolParameter]) -> String {
    let list: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
    format!("{{\"parameters\": [{}]}}", list.join(","))
}

/// The executable's short name, used in example usage strings.
fn short_exe_name() -> String {
    let sep: String = path::MAIN_SEPARATOR.to_string();
    let exe = match env::current_exe() {
        Ok(e) => e,
        Err(_) => return "building_pointcloud_tools".to_string(),
    };
    let e = format!("{}", exe.display());
    let mut parent = exe.clone();
    parent.pop();
    let p = format!("{}", parent.display());
    let mut short_exe = e
        .replace(&p, "")
        .replace(".exe", "")
        .replace('.', "")
        .replace(&sep, "");
    if e.contains(".exe") {
        short_exe += ".exe";
    }
    short_exe
}

fn print_welcome(tool_name: &str) {
    let welcome_len = format!("* Welcome to {} *", tool_name).len().max(41);
    // 41 = length of the 'Powered by' statement.
    println!("{}", "*".repeat(welcome_len));
    println!(
        "* Welcome to {} {}*",
        tool_name,
        " ".repeat(welcome_len - 15 - tool_name.len())
    );
    println!(
        "* Powered by Building Point-Cloud Tools {}*",
        " ".repeat(welcome_len - 41)
    );
    println!("{}", "*".repeat(welcome_len));
}

/// Splits `--flag=value` / `--flag value` arguments into a normalized flag
/// (lower case, single leading dash) and its value, if any.
fn parse_flag(args: &[String], i: usize) -> (String, Option<String>) {
    let arg = args[i].replace('\"', "").replace('\'', "");
    let vec = arg.splitn(2, '=').collect::<Vec<&str>>();
    let flag_val = vec[0].to_lowercase().replace("--", "-");
    if vec.len() > 1 {
        return (flag_val, Some(vec[1].to_string()));
    }
    let next = args
        .get(i + 1)
        .filter(|a| !a.starts_with('-'))
        .map(|a| a.replace('\"', "").replace('\'', ""));
    (flag_val, next)
}

fn bool_flag(value: &Option<String>) -> bool {
    match value {
        None => true,
        Some(v) => !v.to_lowercase().contains("false"),
    }
}

fn parse_value<T: std::str::FromStr>(flag: &str, value: &Option<String>) -> Result<T, Error> {
    let v = value.as_ref().ok_or_else(|| {
        Error::new(ErrorKind::InvalidInput, format!("No value given for {}.", flag))
    })?;
    v.trim().parse::<T>().map_err(|_| {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Error parsing the value '{}' of {}.", v, flag),
        )
    })
}

fn require_value(flag: &str, value: &Option<String>) -> Result<String, Error> {
    value.clone().ok_or_else(|| {
        Error::new(ErrorKind::InvalidInput, format!("No value given for {}.", flag))
    })
}

#[derive(Serialize, Deserialize, Debug)]
struct ToolParameter {
    name: String,
    flags: Vec<String>,
    description: String,
    parameter_type: ParameterType,
    default_value: Option<String>,
    optional: bool,
}

impl ToolParameter {
    pub fn to_string(&self) -> String {
        match serde_json::to_string(&self) {
            Ok(json_str) => json_str,
            Err(err) => format!("{:?}", err),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
enum ParameterType {
    Boolean,
    String,
    Integer,
    Float,
    ExistingFile(ParameterFileType),
    Directory,
}

#[derive(Serialize, Deserialize, Debug)]
enum ParameterFileType {
    Vector(VectorGeometryType),
    Csv,
    Json,
}

#[derive(Serialize, Deserialize, Debug)]
enum VectorGeometryType {
    Point,
    Polygon,
}
