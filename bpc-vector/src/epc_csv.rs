//! Reader for the energy performance certificate export (one CSV per local
//! authority). Only the columns needed to link certificates to addresses are
//! kept.

use crate::features::EpcRecord;
use bpc_common::{BpcError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 5] = [
    "LMK_KEY",
    "UPRN",
    "LOCAL_AUTHORITY",
    "CURRENT_ENERGY_RATING",
    "CURRENT_ENERGY_EFFICIENCY",
];

/// Splits one CSV line, honouring double-quoted fields and doubled quotes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = vec![];
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Parses certificates from any buffered reader. The first line must be the
/// header; columns may appear in any order.
pub fn parse_epc<R: BufRead>(reader: R) -> Result<Vec<EpcRecord>> {
    let mut lines = reader.lines();
    let header = match lines.next() {
        Some(line) => split_csv_line(line?.trim_start_matches('\u{feff}')),
        None => return Ok(vec![]),
    };
    let mut idx = [0usize; 5];
    for (k, name) in REQUIRED_COLUMNS.iter().enumerate() {
        idx[k] = header
            .iter()
            .position(|h| h.trim() == *name)
            .ok_or_else(|| BpcError::Decode(format!("EPC file has no '{}' column", name)))?;
    }
    let mut records = vec![];
    for (line_num, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let values = split_csv_line(&line);
        let field = |k: usize| values.get(idx[k]).map(String::as_str).unwrap_or("");
        let lmk_key = match non_empty(field(0)) {
            Some(s) => s.to_string(),
            None => {
                log::warn!("EPC line {} has no LMK_KEY; skipped", line_num + 2);
                continue;
            }
        };
        // UPRNs sometimes arrive as floats, e.g. "100023336956.0"
        let uprn = non_empty(field(1)).and_then(|s| {
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.fract() == 0f64).map(|f| f as i64))
        });
        let efficiency = non_empty(field(4)).and_then(|s| s.parse::<i64>().ok());
        records.push(EpcRecord {
            lmk_key,
            uprn,
            local_authority: field(2).trim().to_string(),
            rating: non_empty(field(3)).map(str::to_string),
            efficiency,
        });
    }
    Ok(records)
}

pub fn read_epc(path: &Path) -> Result<Vec<EpcRecord>> {
    let f = File::open(path)?;
    parse_epc(BufReader::new(f))
}
