use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode, ThreadLogMode};
use time::macros::format_description;

pub fn init_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = determine_level(verbose, quiet);

    let mut builder = ConfigBuilder::new();
    builder
        .set_time_format_custom(format_description!(
            "[hour]:[minute]:[second].[subsecond digits:3]"
        ))
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Debug)
        .set_thread_mode(ThreadLogMode::Names);
    // Fails on some platforms when the process is multi-threaded; UTC is fine then.
    let _ = builder.set_time_offset_to_local();

    TermLogger::init(level, builder.build(), TerminalMode::Stderr, ColorChoice::Auto)
        .context("Failed to initialize logger")?;
    log::debug!("Logging initialized at level: {:?}", level);
    Ok(())
}

fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determine_level() {
        assert_eq!(determine_level(0, false), LevelFilter::Info);
        assert_eq!(determine_level(1, false), LevelFilter::Debug);
        assert_eq!(determine_level(5, false), LevelFilter::Trace);
    }

    #[test]
    fn test_quiet_wins() {
        assert_eq!(determine_level(2, true), LevelFilter::Error);
    }
}
