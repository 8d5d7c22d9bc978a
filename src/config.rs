//! Configuration for batch runs.
//!
//! None of these settings change how a row is classified; they pick the
//! directories, the pacing between files and how loud the logs are.

use crate::error::{ContactError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_INPUT_DIR: &str = "./input";
pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_FILE_DELAY_MS: u64 = 1000;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Levels accepted for `log_level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Global configuration for a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct EtlConfig {
    /// Directory scanned for `*.csv` exports
    pub input_dir: PathBuf,

    /// Directory receiving one filtered file per export
    pub output_dir: PathBuf,

    /// Pause between two files, for downstream systems picking up output
    pub file_delay: Duration,

    pub log_level: String,

    /// Stop at the first failed file instead of moving on
    pub fail_fast: bool,

    pub show_progress: bool,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_delay: Duration::from_millis(DEFAULT_FILE_DELAY_MS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            fail_fast: false,
            show_progress: true,
        }
    }
}

impl EtlConfig {
    pub fn with_input_dir(mut self, input_dir: impl Into<PathBuf>) -> Self {
        self.input_dir = input_dir.into();
        self
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_file_delay(mut self, file_delay: Duration) -> Self {
        self.file_delay = file_delay;
        self
    }

    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }

    pub fn with_fail_fast(mut self) -> Self {
        self.fail_fast = true;
        self
    }

    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ContactError::configuration(format!(
                "unknown log level '{}', expected one of {:?}",
                self.log_level, LOG_LEVELS
            )));
        }

        if self.input_dir == self.output_dir {
            return Err(ContactError::configuration(format!(
                "input and output directory are the same ({}); outputs would overwrite exports",
                self.input_dir.display()
            )));
        }

        Ok(())
    }
}
