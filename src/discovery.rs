//! Directory scanning utilities for harvesting qualified resources.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::qualifiers::QualifierError;
use crate::resource::QualifiedResource;

/// A file whose name could not be parsed as a qualified resource.
#[derive(Debug)]
pub struct RejectedFile {
    /// Offending file path.
    pub path: PathBuf,
    /// Why parsing failed.
    pub error: QualifierError,
}

/// Result of scanning one directory for qualified resources.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Successfully parsed resources, ordered by file name.
    pub resources: Vec<QualifiedResource>,
    /// Files rejected by the qualifier parser. Rejections never abort the
    /// scan; siblings keep processing.
    pub rejected: Vec<RejectedFile>,
}

/// Scan `dir` for files with the given extension and parse each as a
/// qualified resource.
///
/// Entries are visited in sorted path order so repeated scans of the same
/// tree produce the same resource ordering, which downstream combination
/// enumeration depends on. A missing directory is treated as empty.
pub fn scan_qualified_files(dir: &Path, extension: &str) -> io::Result<ScanOutcome> {
    let mut paths: Vec<PathBuf> = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(ScanOutcome::default()),
        Err(err) => return Err(err),
    };
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches_extension {
            paths.push(path);
        }
    }
    paths.sort();

    let mut outcome = ScanOutcome::default();
    for path in paths {
        match QualifiedResource::from_path(&path) {
            Ok(resource) => outcome.resources.push(resource),
            Err(error) => {
                warn!(path = %path.display(), %error, "rejected qualified resource");
                outcome.rejected.push(RejectedFile { path, error });
            }
        }
    }
    Ok(outcome)
}
