use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};

use twin_seeker::utils::format_human_elapsed;
use twin_seeker::{
    Cli, ReportFormat, ScanConfig, compute_duplicates, gather_files, logging, print_results,
};

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet)?;
    info!("Starting twin-seeker v{}", env!("CARGO_PKG_VERSION"));
    debug!("Command line arguments: {:?}", cli);

    ctrlc::set_handler(|| {
        warn!("Interrupted, exiting without a report");
        std::process::exit(130);
    })
    .context("Failed to install Ctrl+C handler")?;

    let config = ScanConfig::from_cli(&cli);
    debug!("Scan configuration: {:?}", config);

    let files = gather_files(cli.paths.as_slice(), &config).context("Failed to gather files")?;
    let duplicates = compute_duplicates(files, &config).context("Failed to hash files")?;

    let format = if cli.json {
        ReportFormat::Json
    } else {
        ReportFormat::Text
    };
    print_results(&duplicates, format).context("Failed to write report")?;

    info!("Completed in {}", format_human_elapsed(start_time.elapsed()));
    Ok(())
}
