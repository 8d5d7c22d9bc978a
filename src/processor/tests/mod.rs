//! Integration tests for the processor module
//!
//! Exercises the per-file pipeline and the batch driver against export files
//! written into temporary directories.


use crate::config::EtlConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

/// Header line as it appears in real exports
pub const EXPORT_HEADER: &str = "Email Address,First Name,Last Name,Subscribed,Unsub Date";

/// Output header for enriched records
pub const OUTPUT_HEADER: &str =
    "email,firstName,lastName,isSubscribed,unsubscribedDate,countryCode,stateCode,city,countriesOfInterest";

/// Build export file content from data lines
pub fn export_content(lines: &[&str]) -> String {
    let mut content = String::from(EXPORT_HEADER);
    content.push('\n');
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    content
}

/// Create `input/` and `output/` under the temp dir, writing the given exports
pub fn create_batch_dirs(temp_dir: &TempDir, exports: &[(&str, String)]) -> (PathBuf, PathBuf) {
    let input_dir = temp_dir.path().join("input");
    let output_dir = temp_dir.path().join("output");
    fs::create_dir_all(&input_dir).unwrap();

    for (name, content) in exports {
        fs::write(input_dir.join(name), content).unwrap();
    }

    (input_dir, output_dir)
}

/// Quiet config with no pause between files
pub fn test_config(input_dir: &Path, output_dir: &Path) -> EtlConfig {
    EtlConfig::default()
        .with_input_dir(input_dir)
        .with_output_dir(output_dir)
        .with_file_delay(Duration::ZERO)
        .without_progress()
}

/// Data lines of an output file, header excluded
pub fn output_rows(path: &Path) -> Vec<String> {
    let content = fs::read_to_string(path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some(OUTPUT_HEADER));
    lines.map(str::to_string).collect()
}
