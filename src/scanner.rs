use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indicatif::HumanCount;
use log::{debug, info, trace, warn};
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::{DedupError, RootProblem};

/// Canonical path of a regular file waiting to be hashed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileCandidate(PathBuf);

impl FileCandidate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn into_path(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for FileCandidate {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Checks every root and returns their canonical forms with repeats removed.
///
/// Runs before any traversal so a bad root never leaves a half-finished walk.
pub fn resolve_roots<P: AsRef<Path>>(roots: &[P]) -> Result<Vec<PathBuf>, DedupError> {
    if roots.is_empty() {
        return Err(DedupError::NoRoots);
    }

    let mut seen = HashSet::new();
    let mut resolved = Vec::with_capacity(roots.len());
    for root in roots {
        let root = root.as_ref();
        let metadata = fs::metadata(root)
            .map_err(|_| DedupError::invalid_root(root, RootProblem::Missing))?;
        if !metadata.is_dir() {
            return Err(DedupError::invalid_root(root, RootProblem::NotADirectory));
        }
        let canonical = fs::canonicalize(root)
            .map_err(|_| DedupError::invalid_root(root, RootProblem::Unresolvable))?;
        if seen.insert(canonical.clone()) {
            resolved.push(canonical);
        } else {
            debug!(
                "Skipping root '{}': same location as an earlier root",
                root.display()
            );
        }
    }
    Ok(resolved)
}

/// Collects the canonical path of every regular file under `roots`.
///
/// Unreadable entries are logged and skipped. The order of the returned
/// files is unspecified.
pub fn gather_files<P: AsRef<Path>>(
    roots: &[P],
    config: &ScanConfig,
) -> Result<Vec<FileCandidate>, DedupError> {
    let roots = resolve_roots(roots)?;
    for root in &roots {
        info!("Scanning {}", root.display());
    }

    let pb = config.spinner("Gathering files...");

    let mut visited: HashSet<PathBuf> = roots.iter().cloned().collect();
    let mut emitted: HashSet<PathBuf> = HashSet::new();
    let mut stack = roots;
    let mut files = Vec::new();
    let mut total_dirs = 0u64;
    let mut skipped = 0u64;

    while let Some(dir) = stack.pop() {
        total_dirs += 1;
        debug!("Listing '{}'", dir.display());

        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    if let Some(ancestor) = e.loop_ancestor() {
                        debug!(
                            "Skipping symlink loop back to '{}'",
                            ancestor.display()
                        );
                    } else if e.path().is_some_and(is_dangling_symlink) {
                        trace!("Ignoring broken symlink: {}", e);
                    } else {
                        warn!("Failed to read entry in '{}': {}", dir.display(), e);
                        skipped += 1;
                    }
                    continue;
                }
            };

            let file_type = entry.file_type();
            if !file_type.is_dir() && !file_type.is_file() {
                trace!("Ignoring special file '{}'", entry.path().display());
                continue;
            }

            let canonical = match fs::canonicalize(entry.path()) {
                Ok(canonical) => canonical,
                Err(e) => {
                    warn!("{}", DedupError::io(entry.path(), e));
                    skipped += 1;
                    continue;
                }
            };

            if file_type.is_dir() {
                if visited.insert(canonical.clone()) {
                    stack.push(canonical);
                } else {
                    debug!(
                        "Already visited '{}' (via '{}')",
                        canonical.display(),
                        entry.path().display()
                    );
                }
            } else if emitted.insert(canonical.clone()) {
                files.push(FileCandidate(canonical));
                pb.set_message(format!(
                    "Gathering files... {} found",
                    HumanCount(files.len() as u64)
                ));
            } else {
                debug!(
                    "Already gathered '{}' (via '{}')",
                    canonical.display(),
                    entry.path().display()
                );
            }
        }
    }
    pb.finish_and_clear();

    info!(
        "Found {} files in {} directories ({} entries skipped)",
        HumanCount(files.len() as u64),
        HumanCount(total_dirs),
        HumanCount(skipped)
    );
    Ok(files)
}

fn is_dangling_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .is_ok_and(|m| m.file_type().is_symlink())
        && fs::metadata(path).is_err()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn config() -> ScanConfig {
        ScanConfig::default()
    }

    fn gathered(roots: &[PathBuf]) -> Vec<PathBuf> {
        gather_files(roots, &config())
            .unwrap()
            .into_iter()
            .map(FileCandidate::into_path)
            .collect()
    }

    fn as_set(paths: &[PathBuf]) -> BTreeSet<PathBuf> {
        paths.iter().cloned().collect()
    }

    #[test]
    fn test_nested_files_are_found() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::write(dir.path().join("top.txt"), "1").unwrap();
        fs::write(dir.path().join("a/mid.txt"), "2").unwrap();
        fs::write(dir.path().join("a/b/c/deep.txt"), "3").unwrap();

        let root = fs::canonicalize(dir.path()).unwrap();
        let files = gathered(&[root.clone()]);
        assert_eq!(files.len(), 3);
        assert_eq!(
            as_set(&files),
            as_set(&[
                root.join("top.txt"),
                root.join("a/mid.txt"),
                root.join("a/b/c/deep.txt"),
            ])
        );
    }

    #[test]
    fn test_returns_canonical_paths() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/file.txt"), "x").unwrap();

        let indirect = dir.path().join("sub/../sub");
        let files = gathered(&[indirect]);
        assert_eq!(files.len(), 1);
        assert_eq!(
            files[0],
            fs::canonicalize(dir.path().join("sub/file.txt")).unwrap()
        );
        assert!(files[0].is_absolute());
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert!(gathered(&[dir.path().to_path_buf()]).is_empty());
    }

    #[test]
    fn test_overlapping_roots_are_walked_once() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("inner")).unwrap();
        fs::write(dir.path().join("outer.txt"), "o").unwrap();
        fs::write(dir.path().join("inner/inner.txt"), "i").unwrap();

        let outer = dir.path().to_path_buf();
        let inner = dir.path().join("inner");
        for roots in [[outer.clone(), inner.clone()], [inner, outer]] {
            let files = gathered(&roots);
            assert_eq!(files.len(), 2, "roots {roots:?}");
            assert_eq!(as_set(&files).len(), 2);
        }
    }

    #[test]
    fn test_same_root_twice() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("only.txt"), "x").unwrap();

        let root = dir.path().to_path_buf();
        let resolved = resolve_roots(&[root.clone(), root.join(".")]).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(gathered(&[root.clone(), root]).len(), 1);
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = gather_files(&[dir.path().to_path_buf(), missing], &config()).unwrap_err();
        assert!(matches!(
            err,
            DedupError::InvalidRoot {
                reason: RootProblem::Missing,
                ..
            }
        ));
    }

    #[test]
    fn test_file_root_is_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        let err = gather_files(&[file], &config()).unwrap_err();
        assert!(matches!(
            err,
            DedupError::InvalidRoot {
                reason: RootProblem::NotADirectory,
                ..
            }
        ));
    }

    #[test]
    fn test_no_roots() {
        let roots: [PathBuf; 0] = [];
        assert!(matches!(
            gather_files(&roots, &config()),
            Err(DedupError::NoRoots)
        ));
    }

    #[cfg(unix)]
    mod symlinks {
        use super::*;
        use std::os::unix::fs::symlink;

        #[test]
        fn test_symlink_to_ancestor_terminates() {
            let dir = TempDir::new().unwrap();
            let root = fs::canonicalize(dir.path()).unwrap();
            fs::create_dir_all(root.join("a/b")).unwrap();
            fs::write(root.join("a/one.txt"), "1").unwrap();
            fs::write(root.join("a/b/two.txt"), "2").unwrap();
            symlink(&root, root.join("a/b/back_to_root")).unwrap();
            symlink(root.join("a"), root.join("a/b/back_to_a")).unwrap();
            symlink(root.join("a/b"), root.join("a/b/self")).unwrap();

            let files = gathered(&[root.clone()]);
            assert_eq!(files.len(), 2);
            assert_eq!(
                as_set(&files),
                as_set(&[root.join("a/one.txt"), root.join("a/b/two.txt")])
            );
        }

        #[test]
        fn test_symlinked_subtree_and_target_as_roots() {
            let dir = TempDir::new().unwrap();
            let root = fs::canonicalize(dir.path()).unwrap();
            fs::create_dir(root.join("real")).unwrap();
            fs::write(root.join("real/data.bin"), "data").unwrap();
            symlink(root.join("real"), root.join("alias")).unwrap();

            let files = gathered(&[root.join("alias"), root.join("real")]);
            assert_eq!(files, vec![root.join("real/data.bin")]);
        }

        #[test]
        fn test_file_symlink_is_not_gathered_twice() {
            let dir = TempDir::new().unwrap();
            let root = fs::canonicalize(dir.path()).unwrap();
            fs::create_dir(root.join("other")).unwrap();
            fs::write(root.join("target.txt"), "t").unwrap();
            symlink(root.join("target.txt"), root.join("other/link.txt")).unwrap();

            let files = gathered(&[root.clone()]);
            assert_eq!(files, vec![root.join("target.txt")]);
        }

        #[test]
        fn test_broken_symlink_is_ignored() {
            let dir = TempDir::new().unwrap();
            let root = fs::canonicalize(dir.path()).unwrap();
            fs::write(root.join("real.txt"), "r").unwrap();
            symlink(root.join("missing"), root.join("dangling")).unwrap();

            let files = gathered(&[root.clone()]);
            assert_eq!(files, vec![root.join("real.txt")]);
        }

        #[test]
        fn test_fifo_is_ignored() {
            let dir = TempDir::new().unwrap();
            let root = fs::canonicalize(dir.path()).unwrap();
            fs::write(root.join("real.txt"), "r").unwrap();
            // Best effort: without mkfifo the test still checks the regular file.
            let _ = std::process::Command::new("mkfifo")
                .arg(root.join("pipe"))
                .status();

            let files = gathered(&[root.clone()]);
            assert_eq!(files, vec![root.join("real.txt")]);
        }

        #[test]
        fn test_unreadable_directory_is_skipped() {
            use std::os::unix::fs::PermissionsExt;

            let dir = TempDir::new().unwrap();
            let root = fs::canonicalize(dir.path()).unwrap();
            fs::write(root.join("visible.txt"), "v").unwrap();
            let locked = root.join("locked");
            fs::create_dir(&locked).unwrap();
            fs::write(locked.join("hidden.txt"), "h").unwrap();
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
            // Privileged users can still list it.
            let still_readable = fs::read_dir(&locked).is_ok();

            let result = gather_files(&[root.clone()], &config());
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

            let files: Vec<PathBuf> = result
                .unwrap()
                .into_iter()
                .map(FileCandidate::into_path)
                .collect();
            assert!(files.contains(&root.join("visible.txt")));
            if !still_readable {
                assert_eq!(files, vec![root.join("visible.txt")]);
            }
        }
    }
}
