use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{self, Write};
use std::path::Path;

use colored::Colorize;
use indicatif::HumanCount;
use log::info;
use serde::{Serialize, Serializer};

use crate::digest::Digest;
use crate::scanner::FileCandidate;

/// Files grouped by content digest.
///
/// Member order inside a group follows worker completion order and is not
/// stable between runs.
#[derive(Debug, Clone, Default)]
pub struct DuplicateIndex {
    groups: HashMap<Digest, Vec<FileCandidate>>,
}

impl DuplicateIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `file` to the group for `digest`, creating the group if needed.
    pub fn insert(&mut self, digest: Digest, file: FileCandidate) {
        self.groups.entry(digest).or_default().push(file);
    }

    #[cfg(test)]
    fn get(&self, digest: &Digest) -> Option<&[FileCandidate]> {
        self.groups.get(digest).map(Vec::as_slice)
    }

    /// Number of distinct digests, singletons included.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Digest, &[FileCandidate])> {
        self.groups.iter().map(|(digest, files)| (digest, files.as_slice()))
    }

    /// Groups with at least two members.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = (&Digest, &[FileCandidate])> {
        self.iter().filter(|(_, files)| files.len() > 1)
    }

    /// Files that could be removed while keeping one copy of each group.
    pub fn redundant_files(&self) -> usize {
        self.duplicate_groups().map(|(_, files)| files.len() - 1).sum()
    }

    /// Order-independent view of the index.
    pub fn to_sets(&self) -> BTreeMap<Digest, BTreeSet<FileCandidate>> {
        self.groups
            .iter()
            .map(|(digest, files)| (*digest, files.iter().cloned().collect()))
            .collect()
    }

    /// Duplicate groups, largest first, members sorted by path.
    pub fn sorted_duplicates(&self) -> Vec<DuplicateGroup<'_>> {
        let mut groups: Vec<DuplicateGroup<'_>> = self
            .duplicate_groups()
            .map(|(digest, files)| {
                let mut files: Vec<&Path> = files.iter().map(FileCandidate::path).collect();
                files.sort_unstable();
                DuplicateGroup {
                    hash: *digest,
                    files,
                }
            })
            .collect();
        groups.sort_by(|a, b| {
            b.files
                .len()
                .cmp(&a.files.len())
                .then_with(|| a.hash.cmp(&b.hash))
        });
        groups
    }
}

#[derive(Debug, Serialize)]
pub struct DuplicateGroup<'a> {
    pub hash: Digest,
    #[serde(serialize_with = "lossy_paths")]
    pub files: Vec<&'a Path>,
}

// Non-UTF-8 bytes become U+FFFD, matching what the text report prints.
fn lossy_paths<S: Serializer>(files: &[&Path], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(files.iter().map(|path| path.to_string_lossy()))
}

#[derive(Serialize)]
struct JsonReport<'a> {
    duplicate_groups: usize,
    groups: Vec<DuplicateGroup<'a>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Writes every duplicate group of `index` to `out`.
pub fn write_report<W: Write>(
    index: &DuplicateIndex,
    format: ReportFormat,
    mut out: W,
) -> io::Result<()> {
    let groups = index.sorted_duplicates();

    match format {
        ReportFormat::Json => {
            let report = JsonReport {
                duplicate_groups: groups.len(),
                groups,
            };
            serde_json::to_writer_pretty(&mut out, &report)?;
            writeln!(out)?;
        }
        ReportFormat::Text => {
            if groups.is_empty() {
                writeln!(out, "{}", "No duplicate files found!".green())?;
                return Ok(());
            }
            writeln!(out, "{}", "Duplicates:".bold())?;
            for group in &groups {
                writeln!(out, "{} {}", "Hash:".yellow(), group.hash)?;
                for file in &group.files {
                    writeln!(out, "{}", file.display())?;
                }
                writeln!(out, "---")?;
            }
        }
    }
    Ok(())
}

/// Logs a summary and writes the report to stdout.
pub fn print_results(index: &DuplicateIndex, format: ReportFormat) -> io::Result<()> {
    let groups = index.duplicate_groups().count();
    if groups > 0 {
        info!(
            "Found {} duplicate groups ({} redundant files)",
            HumanCount(groups as u64),
            HumanCount(index.redundant_files() as u64)
        );
    }
    let stdout = io::stdout();
    write_report(index, format, stdout.lock())
}
