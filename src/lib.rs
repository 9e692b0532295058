pub mod cli;
pub mod config;
pub mod digest;
pub mod duplicates;
pub mod error;
pub mod hasher;
pub mod logging;
pub mod scanner;
pub mod sha256;
pub mod utils;

use std::path::Path;

pub use cli::Cli;
pub use config::ScanConfig;
pub use digest::{Backend, Digest, DigestEngine};
pub use duplicates::{DuplicateIndex, ReportFormat, print_results, write_report};
pub use error::{DedupError, RootProblem};
pub use hasher::{compute_duplicates, hash_file};
pub use scanner::{FileCandidate, gather_files};
pub use sha256::Sha256;

/// Gathers every file under `roots` and groups them by content digest.
pub fn find_duplicates<P: AsRef<Path>>(
    roots: &[P],
    config: &ScanConfig,
) -> Result<DuplicateIndex, DedupError> {
    let files = gather_files(roots, config)?;
    compute_duplicates(files, config)
}
