//! Error handling for contact export processing.
//!
//! Per-row problems never show up here; they are absorbed by the filter and
//! logged. These variants are the per-file and per-batch failures that abort
//! a pipeline and carry the file, the stage and the underlying cause.

use crate::processor::reader::UnterminatedQuote;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Point in the per-file pipeline where an I/O failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    OpenInput,
    OpenOutput,
    Read,
    Write,
    Flush,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::OpenInput => "opening input",
            PipelineStage::OpenOutput => "opening output",
            PipelineStage::Read => "reading input",
            PipelineStage::Write => "writing output",
            PipelineStage::Flush => "flushing output",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("IO error while {stage} for file: {path}: {source}")]
    Io {
        path: PathBuf,
        stage: PipelineStage,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in file: {path}{}: {source}", line_suffix(.line))]
    Decode {
        path: PathBuf,
        line: Option<u64>,
        #[source]
        source: csv::Error,
    },

    #[error("Unterminated quoted field in file: {path} (opened on line {line})")]
    UnterminatedQuote { path: PathBuf, line: u64 },

    #[error("Failed to encode CSV output: {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Input directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("File discovery failed for pattern '{pattern}': {reason}")]
    Discovery { pattern: String, reason: String },

    #[error("Processing failed for file: {path} - {reason}")]
    ProcessingFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Processing interrupted: {reason}")]
    Interrupted { reason: String },
}

fn line_suffix(line: &Option<u64>) -> String {
    line.map(|l| format!(" (line {})", l)).unwrap_or_default()
}

impl ContactError {
    /// Wrap an I/O error with the file and stage it came from
    pub fn io(path: impl AsRef<Path>, stage: PipelineStage, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            stage,
            source,
        }
    }

    /// Classify a csv reader error. Underlying I/O failures keep their own
    /// variant so a disk problem is not reported as a malformed file, except
    /// for the unterminated-quote signal raised by the quote guard.
    pub fn decode(path: impl AsRef<Path>, source: csv::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if !source.is_io_error() {
            let line = source.position().map(|p| p.line());
            return Self::Decode { path, line, source };
        }
        match source.into_kind() {
            csv::ErrorKind::Io(io) => {
                let unterminated = io
                    .get_ref()
                    .and_then(|inner| inner.downcast_ref::<UnterminatedQuote>())
                    .map(|u| u.line);
                match unterminated {
                    Some(line) => Self::UnterminatedQuote { path, line },
                    None => Self::Io {
                        path,
                        stage: PipelineStage::Read,
                        source: io,
                    },
                }
            }
            other => Self::ProcessingFailed {
                path,
                reason: format!("unexpected CSV error kind: {:?}", other),
            },
        }
    }

    /// Classify a csv writer error, keeping I/O failures as `Io`
    pub fn encode(path: impl AsRef<Path>, source: csv::Error) -> Self {
        let path = path.as_ref().to_path_buf();
        if !source.is_io_error() {
            return Self::Encode { path, source };
        }
        match source.into_kind() {
            csv::ErrorKind::Io(io) => Self::Io {
                path,
                stage: PipelineStage::Write,
                source: io,
            },
            other => Self::ProcessingFailed {
                path,
                reason: format!("unexpected CSV error kind: {:?}", other),
            },
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// File the error is about, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ContactError::Io { path, .. }
            | ContactError::Decode { path, .. }
            | ContactError::UnterminatedQuote { path, .. }
            | ContactError::Encode { path, .. }
            | ContactError::DirectoryNotFound { path }
            | ContactError::ProcessingFailed { path, .. } => Some(path),
            ContactError::Discovery { .. }
            | ContactError::Configuration { .. }
            | ContactError::Interrupted { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ContactError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_stage_and_path() {
        let err = ContactError::io(
            "out/Berlin.csv",
            PipelineStage::OpenOutput,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let message = err.to_string();
        assert!(message.contains("opening output"));
        assert!(message.contains("out/Berlin.csv"));
        assert_eq!(err.path(), Some(Path::new("out/Berlin.csv")));
    }

    #[test]
    fn test_ragged_row_is_decode_error() {
        let data = "a,b\n1,2,3\n";
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(data.as_bytes());
        let err = reader
            .records()
            .find_map(|r| r.err())
            .expect("ragged row should fail");

        match ContactError::decode("in.csv", err) {
            ContactError::Decode { path, line, .. } => {
                assert_eq!(path, PathBuf::from("in.csv"));
                assert_eq!(line, Some(2));
            }
            other => panic!("Expected Decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_configuration_has_no_path() {
        let err = ContactError::configuration("bad delay");
        assert!(err.path().is_none());
        assert_eq!(err.to_string(), "Configuration error: bad delay");
    }
}
