use anyhow::Context;
use clap::Parser;
use imgprep::{
    format_file_size, run_session, Cli, Discovery, ImageProcessor, ProcessConfig,
    ProcessingStats, SessionOutcome,
};
use log::LevelFilter;
use std::io;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .parse_default_env()
        .init();

    println!("=== Image processing ===");

    let discovery = Discovery::new(&cli.base_dir);
    let targets = discovery
        .discover()
        .with_context(|| format!("Cannot list images under {}", cli.base_dir.display()))?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let run = match run_session(&targets, stdin.lock(), &mut stdout)? {
        SessionOutcome::Run(run) => run,
        SessionOutcome::Cancelled(reason) => {
            log::debug!("Session ended without processing: {:?}", reason);
            return Ok(());
        }
    };

    let encoder = cli.build_encoder();
    let processor = ImageProcessor::new(ProcessConfig::default(), encoder.as_ref());

    match processor.process(&run) {
        Ok(stats) => {
            println!("=== Done ===");
            print_summary(&stats);
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Processing failed: {:#}", anyhow::Error::from(e));
        }
    }

    Ok(())
}

fn print_summary(stats: &ProcessingStats) {
    println!("Converted: {} ({} failed)", stats.converted, stats.conversion_failures);
    println!(
        "Compressed: {} ({} -> {}, {:.1}% saved)",
        stats.compressed,
        format_file_size(stats.total_size_before),
        format_file_size(stats.total_size_after),
        stats.overall_savings()
    );
    println!(
        "Skipped: {} small, {} already named, {} without worthwhile saving",
        stats.skipped_small, stats.skipped_named, stats.unchanged
    );
    println!("Renamed: {}", stats.renamed);

    if !stats.errors.is_empty() {
        println!("Errors:");
        for (file, message) in &stats.errors {
            println!("  {}: {}", file, message);
        }
    }
}
