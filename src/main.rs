use anyhow::Context;
use clap::Parser;
use contact_sieve::cli::{Args, print_summary};
use contact_sieve::{BatchProcessor, BatchStats, ContactError, logging};
use std::process;

fn main() {
    // Values from .env act as defaults for the env-backed flags
    dotenvy::dotenv().ok();

    let args = Args::parse();

    if let Err(e) = logging::init(&args.effective_log_level(), args.json_logs) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    match runtime.block_on(run(args)) {
        Ok(stats) => {
            print_summary(&stats);
            if stats.has_failures() {
                process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

async fn run(args: Args) -> anyhow::Result<BatchStats> {
    let config = args.to_config();
    let processor = BatchProcessor::new(config).context("invalid configuration")?;

    let stats = tokio::select! {
        result = processor.run() => {
            result.with_context(|| {
                format!("batch over {} failed", processor.config().input_dir.display())
            })?
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for CTRL+C")?;
            eprintln!("\nReceived CTRL+C, shutting down...");
            return Err(ContactError::Interrupted {
                reason: "processing interrupted by user".to_string(),
            }
            .into());
        }
    };

    Ok(stats)
}
