use clap::Parser;
use std::path::PathBuf;

use crate::digest::Backend;

#[derive(Parser, Debug)]
#[command(name = "twin-seeker", version)]
#[command(about = "Detects duplicated files in the given directories recursively")]
pub struct Cli {
    /// Directories to scan for duplicates
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Number of parallel hash workers (default: number of CPU cores)
    #[arg(short, long, env = "TWIN_SEEKER_THREADS")]
    pub threads: Option<usize>,

    /// SHA-256 implementation used by the hash workers
    #[arg(short, long, value_enum, default_value_t = Backend::Scalar, env = "TWIN_SEEKER_BACKEND")]
    pub backend: Backend,

    /// Print the duplicate report as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
