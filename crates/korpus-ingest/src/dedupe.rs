// Content-digest duplicate detection.
//
// Used two ways: to refuse re-adding a file whose content already sits
// at the colliding destination name, and to pre-scan a directory for
// internal duplicates before ingesting it wholesale.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

/// Content digest of one file, as lowercase hex.
pub fn hexdigest(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Whether two paths both exist as files with identical content.
pub fn are_duplicates(a: &Path, b: &Path) -> io::Result<bool> {
    if a.is_file() && b.is_file() {
        Ok(hexdigest(a)? == hexdigest(b)?)
    } else {
        Ok(false)
    }
}

/// Groups of files under `dir` (recursively) with identical content.
/// Empty when the directory holds no duplicates.
pub fn duplicate_groups(dir: &Path) -> io::Result<Vec<Vec<PathBuf>>> {
    let mut by_digest: HashMap<String, Vec<PathBuf>> = HashMap::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if entry.file_type().is_file() {
            by_digest
                .entry(hexdigest(entry.path())?)
                .or_default()
                .push(entry.into_path());
        }
    }

    let mut groups: Vec<Vec<PathBuf>> = by_digest
        .into_values()
        .filter(|group| group.len() > 1)
        .collect();
    groups.sort();
    Ok(groups)
}
