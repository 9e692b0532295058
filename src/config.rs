use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::Cli;
use crate::digest::Backend;
use crate::utils::available_workers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Size of the hash worker pool, fixed for the whole run.
    pub threads: usize,
    pub backend: Backend,
    pub show_progress: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            threads: available_workers(),
            backend: Backend::default(),
            show_progress: false,
        }
    }
}

impl ScanConfig {
    /// `0` selects the hardware parallelism of the machine.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = if threads == 0 { available_workers() } else { threads };
        self
    }

    pub fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn from_cli(cli: &Cli) -> Self {
        Self::default()
            .with_threads(cli.threads.unwrap_or(0))
            .with_backend(cli.backend)
            .with_progress(!cli.no_progress && !cli.quiet && !cli.json)
    }

    pub(crate) fn spinner(&self, message: &'static str) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    pub(crate) fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg} ETA: {eta}")
        {
            Ok(style) => pb.set_style(style.progress_chars("#>-")),
            Err(e) => log::debug!("Falling back to default progress style: {}", e),
        }
        pb
    }
}
