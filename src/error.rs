use std::fmt;
use std::path::{Path, PathBuf};

/// Why a root directory was rejected before traversal started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootProblem {
    Missing,
    NotADirectory,
    Unresolvable,
}

impl fmt::Display for RootProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RootProblem::Missing => "path does not exist",
            RootProblem::NotADirectory => "not a directory",
            RootProblem::Unresolvable => "cannot be resolved to a canonical path",
        })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum DedupError {
    /// A root directory is missing, not a directory, or cannot be canonicalized.
    #[error("Invalid root '{}': {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: RootProblem },

    #[error("No root directories given")]
    NoRoots,

    /// An entry or file could not be listed, resolved or read.
    #[error("I/O error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start the hash worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}

impl DedupError {
    pub fn invalid_root(path: &Path, reason: RootProblem) -> Self {
        DedupError::InvalidRoot {
            path: path.to_path_buf(),
            reason,
        }
    }

    pub fn io(path: &Path, source: std::io::Error) -> Self {
        DedupError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
