use std::fs::File;
use std::io::Read;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use indicatif::{HumanBytes, HumanCount, ProgressBar};
use log::{debug, info, warn};

use crate::config::ScanConfig;
use crate::digest::{Digest, DigestEngine};
use crate::duplicates::DuplicateIndex;
use crate::error::DedupError;
use crate::scanner::FileCandidate;

/// Files not yet claimed by a worker.
pub struct WorkQueue {
    pending: Mutex<Vec<FileCandidate>>,
}

impl WorkQueue {
    pub fn new(files: Vec<FileCandidate>) -> Self {
        Self {
            pending: Mutex::new(files),
        }
    }

    /// Removes and returns the next file, or `None` once the queue is drained.
    pub fn claim(&self) -> Option<FileCandidate> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[derive(Default)]
struct ScanStats {
    hashed: AtomicUsize,
    skipped: AtomicUsize,
    bytes: AtomicU64,
}

/// Hashes a single file with `engine`, returning its digest and byte count.
///
/// The whole file is read into memory; empty files hash the empty input.
pub fn hash_file(
    candidate: &FileCandidate,
    engine: &mut dyn DigestEngine,
) -> Result<(Digest, u64), DedupError> {
    let path = candidate.path();
    let mut file = File::open(path).map_err(|e| DedupError::io(path, e))?;
    let size = file.metadata().map_err(|e| DedupError::io(path, e))?.len();
    if size == 0 {
        return Ok((engine.digest_of(&[]), 0));
    }

    let mut contents = Vec::with_capacity(usize::try_from(size).unwrap_or(0));
    file.read_to_end(&mut contents)
        .map_err(|e| DedupError::io(path, e))?;
    debug!("Read {} bytes from '{}'", contents.len(), path.display());
    Ok((engine.digest_of(&contents), contents.len() as u64))
}

/// Hashes every file and groups the results by digest.
///
/// Returns only after all workers have finished. Files that cannot be read
/// are logged and left out of the index.
pub fn compute_duplicates(
    files: Vec<FileCandidate>,
    config: &ScanConfig,
) -> Result<DuplicateIndex, DedupError> {
    if files.is_empty() {
        return Ok(DuplicateIndex::new());
    }

    let total = files.len();
    let workers = config.threads.clamp(1, total);
    info!(
        "Hashing {} files with {} workers ({} backend)",
        HumanCount(total as u64),
        workers,
        config.backend
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("hash-worker-{i}"))
        .build()?;

    let queue = WorkQueue::new(files);
    let index = Mutex::new(DuplicateIndex::new());
    let stats = ScanStats::default();
    let pb = config.progress_bar(total as u64);

    pool.scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|_| run_worker(&queue, &index, config, &stats, &pb));
        }
    });
    pb.finish_and_clear();

    info!(
        "Hashed {} files ({}), skipped {}",
        HumanCount(stats.hashed.load(Ordering::Relaxed) as u64),
        HumanBytes(stats.bytes.load(Ordering::Relaxed)),
        HumanCount(stats.skipped.load(Ordering::Relaxed) as u64)
    );
    Ok(index.into_inner().unwrap_or_else(PoisonError::into_inner))
}

fn run_worker(
    queue: &WorkQueue,
    index: &Mutex<DuplicateIndex>,
    config: &ScanConfig,
    stats: &ScanStats,
    pb: &ProgressBar,
) {
    let mut engine = config.backend.engine();

    while let Some(candidate) = queue.claim() {
        match hash_file(&candidate, engine.as_mut()) {
            Ok((digest, size)) => {
                stats.hashed.fetch_add(1, Ordering::Relaxed);
                stats.bytes.fetch_add(size, Ordering::Relaxed);
                index
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(digest, candidate);
            }
            Err(e) => {
                stats.skipped.fetch_add(1, Ordering::Relaxed);
                warn!("Skipping file: {}", e);
            }
        }
        pb.inc(1);
    }
}
