//! Contact Sieve Library
//!
//! A Rust library for cleaning regional contact exports before they are
//! loaded into a marketing system.
//!
//! This library provides tools for:
//! - Streaming CSV exports row by row without loading whole files
//! - Validating contacts and dropping malformed or unsubscribed rows
//! - Tagging each kept contact with the city encoded in the export file name
//! - Writing one filtered CSV per export, with a fixed header
//! - Running a whole directory of exports with pacing between files

pub mod cli;
pub mod config;
pub mod error;
pub mod location;
pub mod logging;
pub mod models;
pub mod processor;
pub mod validation;

// Re-export commonly used types
pub use config::EtlConfig;
pub use error::{ContactError, Result};
pub use location::resolve_location;
pub use models::{BatchStats, ContactRecord, FileStats, Location, OutputRecord};
pub use processor::BatchProcessor;
pub use processor::streaming::process_file;
pub use validation::validate;
