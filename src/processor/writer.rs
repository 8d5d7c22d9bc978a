//! CSV writing module for filtered contact exports
//!
//! Serializes [`OutputRecord`]s one at a time behind a fixed header line.
//! Memory use is bounded by the csv writer's buffer, not by the file size.

use crate::error::{ContactError, PipelineStage, Result};
use crate::models::OutputRecord;

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Streaming encoder for enriched contact records
#[derive(Debug)]
pub struct ContactWriter<W: Write> {
    writer: csv::Writer<W>,
    destination: PathBuf,
    records_written: usize,
}

impl ContactWriter<File> {
    /// Create or truncate the output file and write the header line
    pub fn from_path(path: &Path) -> Result<Self> {
        let file =
            File::create(path).map_err(|e| ContactError::io(path, PipelineStage::OpenOutput, e))?;
        Self::with_destination(file, path.to_path_buf())
    }
}

impl<W: Write> ContactWriter<W> {
    pub fn from_writer(writer: W) -> Result<Self> {
        Self::with_destination(writer, PathBuf::from("<stream>"))
    }

    fn with_destination(writer: W, destination: PathBuf) -> Result<Self> {
        // Header is written by hand so that an empty result still gets one
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(writer);

        writer
            .write_record(OutputRecord::COLUMNS)
            .map_err(|e| ContactError::encode(&destination, e))?;

        Ok(Self {
            writer,
            destination,
            records_written: 0,
        })
    }

    /// Encode one record. Fields containing a delimiter, quote or line
    /// break are quoted.
    pub fn write(&mut self, record: &OutputRecord) -> Result<()> {
        self.writer
            .serialize(record)
            .map_err(|e| ContactError::encode(&self.destination, e))?;
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush everything to the destination and hand it back
    pub fn finish(mut self) -> Result<W> {
        self.writer
            .flush()
            .map_err(|e| ContactError::io(&self.destination, PipelineStage::Flush, e))?;

        debug!(
            "Flushed {} records to {}",
            self.records_written,
            self.destination.display()
        );

        let destination = self.destination;
        self.writer
            .into_inner()
            .map_err(|e| ContactError::io(&destination, PipelineStage::Flush, e.into_error()))
    }
}
