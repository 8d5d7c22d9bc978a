//! Batch processing engine.
//!
//! Discovers export files, runs the per-file streaming pipeline on each one
//! in turn and aggregates the results. Files never overlap: the next one
//! starts only after the previous pipeline has finished and the configured
//! delay has passed.

pub mod discovery;
pub mod filter;
pub mod reader;
pub mod streaming;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::discovery::FileDiscovery;
use self::streaming::process_file;

use crate::config::EtlConfig;
use crate::error::{ContactError, PipelineStage, Result};
use crate::location::resolve_location;
use crate::models::{BatchStats, FileFailure, FileStats, Location};

use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tokio::fs;
use tokio::task;
use tracing::{debug, error, info, warn};

/// Main processor for a directory of contact exports
#[derive(Debug)]
pub struct BatchProcessor {
    config: EtlConfig,
    file_discovery: FileDiscovery,
}

impl BatchProcessor {
    /// Create a processor, rejecting unusable configuration up front
    pub fn new(config: EtlConfig) -> Result<Self> {
        config.validate()?;
        let file_discovery = FileDiscovery::new(config.input_dir.clone());
        Ok(Self {
            config,
            file_discovery,
        })
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// Process every export in the input directory
    pub async fn run(&self) -> Result<BatchStats> {
        let start_time = Instant::now();
        let output_dir = self.config.output_dir.clone();

        let files = self.file_discovery.discover_csv_files()?;
        info!(
            "Found {} export files in {}",
            files.len(),
            self.file_discovery.input_dir().display()
        );

        let mut stats = BatchStats {
            output_dir: output_dir.clone(),
            ..Default::default()
        };

        if files.is_empty() {
            stats.elapsed = start_time.elapsed();
            return Ok(stats);
        }

        fs::create_dir_all(&output_dir)
            .await
            .map_err(|e| ContactError::io(&output_dir, PipelineStage::OpenOutput, e))?;

        let pb = self.progress_bar(files.len());

        for (index, input) in files.iter().enumerate() {
            if index > 0 && !self.config.file_delay.is_zero() {
                debug!("Waiting {:?} before next file", self.config.file_delay);
                tokio::time::sleep(self.config.file_delay).await;
            }

            let Some(file_name) = input.file_name().map(|n| n.to_string_lossy().into_owned())
            else {
                continue;
            };
            pb.set_message(file_name.clone());

            let location = resolve_location(&file_name);
            if location.is_unset() {
                warn!("No known city in file name {}, location left empty", file_name);
            }

            let output = output_dir.join(&file_name);
            match Self::process_one(input.clone(), output, location).await {
                Ok(file_stats) => {
                    stats.files_processed += 1;
                    stats.rows.merge(&file_stats);
                }
                Err(e) => {
                    error!("Failed to process {}: {}", input.display(), e);
                    stats.files_failed += 1;
                    stats.failures.push(FileFailure {
                        path: input.clone(),
                        reason: e.to_string(),
                    });
                    if self.config.fail_fast {
                        pb.abandon_with_message(format!("Stopped at {}", file_name));
                        return Err(e);
                    }
                }
            }
            pb.inc(1);
        }

        pb.finish_with_message("All export files processed");
        stats.elapsed = start_time.elapsed();
        Ok(stats)
    }

    /// Run one file's blocking pipeline off the async runtime
    async fn process_one(input: PathBuf, output: PathBuf, location: Location) -> Result<FileStats> {
        let path = input.clone();
        task::spawn_blocking(move || process_file(&input, &output, &location))
            .await
            .map_err(|e| ContactError::ProcessingFailed {
                path,
                reason: format!("pipeline task did not complete: {}", e),
            })?
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb
    }
}
