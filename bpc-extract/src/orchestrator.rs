/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

//! Drives an extraction run chunk by chunk: query the store, synthesize floor
//! points, convert to arrays, optionally normalize, then hand the chunk to the
//! caller. A chunk's data lives only as long as the `ChunkOutput` it is
//! returned in.

use crate::config::ExtractionConfig;
use crate::floor::add_floor_with_resolution;
use crate::metadata::{clear_chunk_files, MetadataTables};
use crate::normalize::{normalize, sampling_rng};
use crate::output::{array_file_name, OutputLayout};
use crate::store::{num_chunks, BuildingRecord, ChunkQuery, ChunkRange, SpatialStore};
use bpc_common::structures::{MultiPoint, PointArray};
use bpc_common::utils::get_formatted_elapsed_time;
use bpc_common::{BpcError, Result};
use bpc_lidar::write_npy;
use bpc_vector::multipoint_to_array;
use rand::rngs::SmallRng;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

/// One building that passed the point-count threshold.
#[derive(Clone, Debug)]
pub struct ExtractedBuilding {
    pub id_fp: i64,
    pub file_name: String,
    /// Number of raw plus synthetic floor points.
    pub num_points: usize,
    /// The array persisted for the building; normalized when enabled.
    pub array: PointArray,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SkippedBuilding {
    pub id_fp: i64,
    pub reason: String,
}

#[derive(Clone, Debug)]
pub struct ChunkOutput {
    pub index: usize,
    pub records: Vec<BuildingRecord>,
    pub buildings: Vec<ExtractedBuilding>,
    pub skipped: Vec<SkippedBuilding>,
}

impl ChunkOutput {
    /// Footprint id to array file name, for the buildings of this chunk.
    pub fn file_names(&self) -> HashMap<i64, String> {
        self.buildings
            .iter()
            .map(|b| (b.id_fp, b.file_name.clone()))
            .collect()
    }

    pub fn metadata(&self) -> MetadataTables {
        MetadataTables::from_records(&self.records, &self.file_names())
    }
}

enum Built {
    Array(ExtractedBuilding),
    TooFewPoints { available: usize, required: usize },
}

/// A lazy, sequential run over the chunks of one area.
pub struct ExtractionRun<'a, S: SpatialStore + ?Sized> {
    store: &'a mut S,
    config: &'a ExtractionConfig,
    total: usize,
    num_chunks: usize,
    next_chunk: usize,
    failed: bool,
    rng: SmallRng,
}

/// Prepares the footprint listing of the configured area and returns an
/// iterator producing one `ChunkOutput` per chunk.
pub fn extract_area<'a, S: SpatialStore + ?Sized>(
    store: &'a mut S,
    config: &'a ExtractionConfig,
) -> Result<ExtractionRun<'a, S>> {
    config.validate()?;
    let total = store.prepare_listing(
        &config.area_code,
        config.max_footprints,
        config.refresh_listing,
    )?;
    let seed = config.normalization.as_ref().and_then(|n| n.seed);
    Ok(ExtractionRun {
        store,
        config,
        total,
        num_chunks: num_chunks(total, config.chunk_size),
        next_chunk: 0,
        failed: false,
        rng: sampling_rng(seed),
    })
}

impl<'a, S: SpatialStore + ?Sized> ExtractionRun<'a, S> {
    pub fn total_footprints(&self) -> usize {
        self.total
    }

    pub fn num_chunks(&self) -> usize {
        self.num_chunks
    }

    fn process_chunk(&mut self, index: usize) -> Result<ChunkOutput> {
        let range = ChunkRange::of(index, self.config.chunk_size);
        let query = ChunkQuery {
            buffer_meters: self.config.buffer_meters,
            point_count_threshold: self.config.point_count_threshold,
        };
        let data = self
            .store
            .fetch_chunk(&self.config.area_code, range, &query)?;
        let mut point_clouds = data.point_clouds;

        let mut buildings = vec![];
        let mut skipped = vec![];
        let mut seen = HashSet::new();
        let retained: Vec<&BuildingRecord> = data
            .records
            .iter()
            .filter(|r| r.point_cloud.is_some() && seen.insert(r.id_fp))
            .collect();
        let num_retained = retained.len();
        for (i, record) in retained.into_iter().enumerate() {
            let points = point_clouds.remove(&record.id_fp).ok_or_else(|| {
                BpcError::Store(format!(
                    "no point collection returned for footprint {}",
                    record.id_fp
                ))
            })?;
            match self.build(record, points) {
                Ok(Built::Array(b)) => buildings.push(b),
                Ok(Built::TooFewPoints {
                    available,
                    required,
                }) => {
                    log::info!(
                        "Footprint {} has {} points, fewer than the sample size {}; not normalized",
                        record.id_fp,
                        available,
                        required
                    );
                    skipped.push(SkippedBuilding {
                        id_fp: record.id_fp,
                        reason: format!("{} points, {} required", available, required),
                    });
                }
                Err(e) if self.config.isolate_building_errors => {
                    log::warn!("Skipping footprint {}: {}", record.id_fp, e);
                    skipped.push(SkippedBuilding {
                        id_fp: record.id_fp,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
            if (i + 1) % 1000 == 0 {
                log::info!("processing pointcloud {} out of {}", i + 1, num_retained);
            }
        }

        Ok(ChunkOutput {
            index,
            records: data.records,
            buildings,
            skipped,
        })
    }

    fn build(&mut self, record: &BuildingRecord, points: MultiPoint) -> Result<Built> {
        let stats = record.point_cloud.ok_or_else(|| {
            BpcError::Store(format!("footprint {} has no point-cloud stats", record.id_fp))
        })?;
        let augmented = add_floor_with_resolution(
            &record.footprint,
            &points,
            stats.z_min,
            self.config.floor_resolution,
        );
        let array = match &self.config.normalization {
            Some(n) if augmented.len() < n.sample_size => {
                return Ok(Built::TooFewPoints {
                    available: augmented.len(),
                    required: n.sample_size,
                });
            }
            Some(n) => normalize(
                &augmented,
                n.scaling_factor.unwrap_or(stats.scaling_factor),
                n.sample_size,
                &mut self.rng,
            )?,
            None => multipoint_to_array(&augmented),
        };
        Ok(Built::Array(ExtractedBuilding {
            id_fp: record.id_fp,
            file_name: array_file_name(&record.footprint),
            num_points: augmented.len(),
            array,
        }))
    }
}

impl<'a, S: SpatialStore + ?Sized> Iterator for ExtractionRun<'a, S> {
    type Item = Result<ChunkOutput>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_chunk >= self.num_chunks {
            return None;
        }
        let index = self.next_chunk;
        self.next_chunk += 1;
        log::info!(
            "Processing footprints - chunk {} out of {} - {}",
            index + 1,
            self.num_chunks,
            chrono::Local::now().format("%H:%M:%S")
        );
        let result = self.process_chunk(index);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Totals of a completed run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractionSummary {
    pub num_footprints: usize,
    pub num_chunks: usize,
    pub num_records: usize,
    pub num_arrays: usize,
    pub num_skipped: usize,
}

/// Writes a chunk's arrays and metadata files.
pub fn persist_chunk(layout: &OutputLayout, chunk: &ChunkOutput, normalized: bool) -> Result<()> {
    let array_dir = layout.array_dir(normalized);
    std::fs::create_dir_all(&array_dir)?;
    for b in &chunk.buildings {
        write_npy(&array_dir.join(&b.file_name), &b.array)?;
    }
    chunk.metadata().write_chunk(layout, chunk.index)
}

/// Runs a whole extraction into `output_dir`, persisting and releasing each
/// chunk before the next one is fetched.
pub fn run_extraction<S: SpatialStore + ?Sized>(
    store: &mut S,
    config: &ExtractionConfig,
    output_dir: &Path,
) -> Result<ExtractionSummary> {
    let start = Instant::now();
    let layout = OutputLayout::setup(output_dir, &config.area_code)?;
    let normalized = config.normalization.is_some();
    let run = extract_area(store, config)?;
    let cleared = clear_chunk_files(&layout)?;
    if cleared > 0 {
        log::info!("Removed {} chunk files of a previous run", cleared);
    }
    let mut summary = ExtractionSummary {
        num_footprints: run.total_footprints(),
        num_chunks: run.num_chunks(),
        ..Default::default()
    };
    log::info!(
        "{} footprints in {} chunks of {}",
        summary.num_footprints,
        summary.num_chunks,
        config.chunk_size
    );
    for chunk in run {
        let chunk = chunk?;
        persist_chunk(&layout, &chunk, normalized)?;
        summary.num_records += chunk.records.len();
        summary.num_arrays += chunk.buildings.len();
        summary.num_skipped += chunk.skipped.len();
    }
    log::info!(
        "Extraction of {} complete: {} arrays written (elapsed time: {})",
        config.area_code,
        summary.num_arrays,
        get_formatted_elapsed_time(start)
    );
    Ok(summary)
}
