//! Command-line interface components.

use crate::config::{
    DEFAULT_FILE_DELAY_MS, DEFAULT_INPUT_DIR, DEFAULT_LOG_LEVEL, DEFAULT_OUTPUT_DIR, EtlConfig,
};
use crate::models::BatchStats;
use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "contact_sieve")]
#[command(about = "Filter and enrich regional contact exports for marketing import")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory containing the `*.csv` exports
    #[arg(short, long, env = "INPUT_DIR", default_value = DEFAULT_INPUT_DIR)]
    pub input_dir: PathBuf,

    /// Directory receiving the filtered files
    #[arg(short, long, env = "OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Pause between two files, in milliseconds
    #[arg(long, env = "FILE_DELAY_MS", default_value_t = DEFAULT_FILE_DELAY_MS)]
    pub delay_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Stop at the first file that fails
    #[arg(long)]
    pub fail_fast: bool,

    /// Only log errors and hide the progress bar
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Determine the log level from the flags, falling back to `--log-level`
    pub fn effective_log_level(&self) -> String {
        if self.quiet {
            return "error".to_string();
        }
        match self.verbose {
            0 => self.log_level.to_lowercase(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }

    pub fn to_config(&self) -> EtlConfig {
        let mut config = EtlConfig::default()
            .with_input_dir(&self.input_dir)
            .with_output_dir(&self.output_dir)
            .with_file_delay(Duration::from_millis(self.delay_ms))
            .with_log_level(self.effective_log_level());
        if self.fail_fast {
            config = config.with_fail_fast();
        }
        if self.quiet || self.json_logs {
            config = config.without_progress();
        }
        config
    }
}

/// Print the end-of-run summary to stdout
pub fn print_summary(stats: &BatchStats) {
    let heading = if stats.has_failures() {
        "Processing finished with failures".bright_yellow().bold()
    } else {
        "Processing complete".bright_green().bold()
    };

    println!("\n{}", heading);
    println!("{}", "━".repeat(40));
    println!(
        "  {} {}",
        "Files processed:".bright_cyan(),
        stats.files_processed.to_string().bright_white().bold()
    );
    println!("  {} {}", "Rows read:".bright_cyan(), stats.rows.rows_read);
    println!(
        "  {} {}",
        "Rows written:".bright_cyan(),
        stats.rows.rows_written.to_string().bright_white().bold()
    );
    println!(
        "  {} {} invalid, {} unsubscribed, {} header",
        "Rows dropped:".bright_cyan(),
        stats.rows.invalid_rows,
        stats.rows.unsubscribed_rows,
        stats.rows.header_rows
    );
    println!("  {} {}", "Output:".bright_cyan(), stats.output_dir.display());
    println!("  {} {:.2}s", "Elapsed:".bright_cyan(), stats.elapsed.as_secs_f64());

    if stats.has_failures() {
        println!("\n{} {}", "Failed files:".bright_red().bold(), stats.files_failed);
        for failure in &stats.failures {
            println!("  • {}: {}", failure.path.display(), failure.reason);
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_map_to_config() {
        let args = Args::try_parse_from(["contact_sieve"]).unwrap();
        let config = args.to_config();

        assert_eq!(config.input_dir, PathBuf::from("./input"));
        assert_eq!(config.output_dir, PathBuf::from("./output"));
        assert_eq!(config.file_delay, Duration::from_secs(1));
        assert_eq!(config.log_level, "info");
        assert!(config.show_progress);
        assert!(!config.fail_fast);
    }

    #[test]
    fn test_flags_map_to_config() {
        let args = Args::try_parse_from([
            "contact_sieve",
            "--input-dir",
            "/data/in",
            "-o",
            "/data/out",
            "--delay-ms",
            "0",
            "--fail-fast",
            "--json-logs",
        ])
        .unwrap();
        let config = args.to_config();

        assert_eq!(config.input_dir, PathBuf::from("/data/in"));
        assert_eq!(config.output_dir, PathBuf::from("/data/out"));
        assert_eq!(config.file_delay, Duration::ZERO);
        assert!(config.fail_fast);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_verbosity_overrides_log_level() {
        let args = Args::try_parse_from(["contact_sieve", "--log-level", "WARN"]).unwrap();
        assert_eq!(args.effective_log_level(), "warn");

        let args = Args::try_parse_from(["contact_sieve", "-v"]).unwrap();
        assert_eq!(args.effective_log_level(), "debug");

        let args = Args::try_parse_from(["contact_sieve", "-vvv"]).unwrap();
        assert_eq!(args.effective_log_level(), "trace");

        let args = Args::try_parse_from(["contact_sieve", "--quiet"]).unwrap();
        assert_eq!(args.effective_log_level(), "error");
        assert!(!args.to_config().show_progress);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["contact_sieve", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_rejects_non_numeric_delay() {
        assert!(Args::try_parse_from(["contact_sieve", "--delay-ms", "soon"]).is_err());
    }
}
