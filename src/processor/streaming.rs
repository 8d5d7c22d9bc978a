//! Streaming processing module for a single contact export
//!
//! Connects decoder, filter and encoder into one pull-based pipeline. A row
//! is decoded only when the previous one has been written, so memory stays
//! bounded by one row plus the codec buffers whatever the file size.

use super::filter::ContactFilter;
use super::reader::ContactReader;
use super::writer::ContactWriter;

use crate::error::{ContactError, Result};
use crate::models::{FileStats, Location};

use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Lifecycle of one file's pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Streaming,
    Finished(FileStats),
    /// Terminal; the output file may hold partial content
    Failed(String),
}

/// Pipeline for one input/output file pair
#[derive(Debug)]
pub struct FilePipeline {
    input: PathBuf,
    output: PathBuf,
    location: Location,
    state: PipelineState,
}

impl FilePipeline {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, location: Location) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            location,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Stream the whole file. Runs once; later calls are rejected.
    pub fn run(&mut self) -> Result<FileStats> {
        if self.state != PipelineState::Idle {
            return Err(ContactError::ProcessingFailed {
                path: self.input.clone(),
                reason: format!("pipeline already ran (state: {:?})", self.state),
            });
        }

        self.state = PipelineState::Streaming;
        let result = self.stream();

        self.state = match &result {
            Ok(stats) => PipelineState::Finished(stats.clone()),
            Err(e) => PipelineState::Failed(e.to_string()),
        };
        result
    }

    fn stream(&self) -> Result<FileStats> {
        let file_name = self
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.input.display().to_string());

        debug!(
            "Streaming {} -> {} (city: {:?})",
            self.input.display(),
            self.output.display(),
            self.location.city
        );

        // Input first, so a missing input never truncates an existing output
        let mut reader = ContactReader::from_path(&self.input)?;
        let mut writer = ContactWriter::from_path(&self.output)?;
        let mut filter = ContactFilter::new(file_name, self.location.clone());

        for record in filter.filter_rows(reader.rows()) {
            writer.write(&record?)?;
        }
        writer.finish()?;

        let stats = filter.into_stats();
        info!(
            file = %self.input.display(),
            rows_read = stats.rows_read,
            written = stats.rows_written,
            invalid = stats.invalid_rows,
            unsubscribed = stats.unsubscribed_rows,
            header_rows = stats.header_rows,
            "Finished file"
        );
        Ok(stats)
    }
}

/// Filter one export file into `output`, tagging rows with `location`.
///
/// Succeeds only once every input row has been consumed and the output has
/// been flushed. On failure the output file is left as-is.
pub fn process_file(input: &Path, output: &Path, location: &Location) -> Result<FileStats> {
    FilePipeline::new(input, output, location.clone()).run()
}
