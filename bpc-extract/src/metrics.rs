/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

use crate::metadata::{read_filename_mapping, FilenameMappingRow};
use crate::output::{Category, OutputLayout};
use bpc_common::utils::float_repr;
use bpc_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Counts of unique footprints in an area's consolidated mapping.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MetricsReport {
    pub footprints_all: usize,
    pub footprints_w_pointclouds: usize,
    pub footprints_w_uprn: usize,
    pub footprints_w_uprn_epc: usize,
    pub footprints_full_info: usize,
}

fn unique_ids<'a, I: Iterator<Item = &'a FilenameMappingRow>>(rows: I) -> usize {
    rows.map(|r| r.id_fp).collect::<HashSet<i64>>().len()
}

fn has_full_info(r: &FilenameMappingRow) -> bool {
    r.uprn.is_some()
        && r.id_epc_lmk_key.is_some()
        && r.num_p_in_pc.is_some()
        && r.epc_rating.is_some()
        && r.epc_efficiency.is_some()
        && r.file_name.is_some()
}

/// Computes production metrics over mapping rows.
pub fn compute_metrics(rows: &[FilenameMappingRow]) -> MetricsReport {
    MetricsReport {
        footprints_all: unique_ids(rows.iter()),
        footprints_w_pointclouds: unique_ids(rows.iter().filter(|r| r.num_p_in_pc.is_some())),
        footprints_w_uprn: unique_ids(rows.iter().filter(|r| r.uprn.is_some())),
        footprints_w_uprn_epc: unique_ids(rows.iter().filter(|r| r.epc_efficiency.is_some())),
        footprints_full_info: unique_ids(rows.iter().filter(|r| has_full_info(r))),
    }
}

impl MetricsReport {
    /// `(name, count)` pairs in reporting order.
    pub fn entries(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("footprints_all", self.footprints_all),
            ("footprints_w_pointclouds", self.footprints_w_pointclouds),
            ("footprints_w_uprn", self.footprints_w_uprn),
            ("footprints_w_uprn_epc", self.footprints_w_uprn_epc),
            ("footprints_full_info", self.footprints_full_info),
        ]
    }

    /// Share of all footprints, in percent rounded to two decimals.
    pub fn percentage(&self, count: usize) -> f64 {
        if self.footprints_all == 0 {
            return 0f64;
        }
        (count as f64 / self.footprints_all as f64 * 10000f64).round() / 100f64
    }

    /// e.g. `number of footprints_all: 10 (100.0 %)`
    pub fn summary_lines(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .map(|(name, count)| {
                format!(
                    "number of {}: {} ({} %)",
                    name,
                    count,
                    float_repr(self.percentage(count))
                )
            })
            .collect()
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}

/// Reads the stitched mapping of an area, computes its metrics and writes
/// `production_metrics_<area>.json`.
pub fn production_metrics(layout: &OutputLayout) -> Result<MetricsReport> {
    let rows = read_filename_mapping(&layout.stitched_file(Category::FilenameMapping))?;
    let report = compute_metrics(&rows);
    report.write(&layout.metrics_file())?;
    Ok(report)
}
