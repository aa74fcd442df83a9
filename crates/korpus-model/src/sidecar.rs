// Metadata sidecars.
//
// Every content file in a corpus tree has a `<name>.meta` companion, a
// line-oriented key-value record carrying provenance and parallel-file
// linkage. Parallel references must stay symmetric: if A lists B, B
// lists A.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("could not write metadata sidecar {}", .path.display())]
    MetadataWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read metadata sidecar {}", .path.display())]
    MetadataRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad sidecar line {} in {}: {:?}", .line_no, .path.display(), .line)]
    Parse {
        path: PathBuf,
        line_no: usize,
        line: String,
    },
}

/// Reference to the counterpart document in another language's tree.
///
/// `path` is corpus-relative with forward slashes, as printed by
/// `CorpusPath`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelRef {
    pub lang: String,
    pub path: String,
}

/// Sidecar record for exactly one corpus file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MetadataRecord {
    /// Name the document had before normalization; the URL for fetched files.
    pub original_name: String,
    pub lang: String,
    pub genre: String,
    /// At most one parallel per language, in insertion order.
    pub parallels: Vec<ParallelRef>,
}

impl MetadataRecord {
    pub fn new(original_name: &str, lang: &str, genre: &str) -> Self {
        Self {
            original_name: original_name.to_string(),
            lang: lang.to_string(),
            genre: genre.to_string(),
            parallels: Vec::new(),
        }
    }

    pub fn parallel_for(&self, lang: &str) -> Option<&ParallelRef> {
        self.parallels.iter().find(|p| p.lang == lang)
    }

    /// Record `path` as the parallel in `lang`, replacing any earlier entry
    /// for that language. Returns whether the record changed.
    pub fn set_parallel(&mut self, lang: &str, path: &str) -> bool {
        match self.parallels.iter_mut().find(|p| p.lang == lang) {
            Some(existing) if existing.path == path => false,
            Some(existing) => {
                existing.path = path.to_string();
                true
            }
            None => {
                self.parallels.push(ParallelRef {
                    lang: lang.to_string(),
                    path: path.to_string(),
                });
                true
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, SidecarError> {
        let text = fs::read_to_string(path).map_err(|source| SidecarError::MetadataRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, origin: &Path) -> Result<Self, SidecarError> {
        let mut record = Self::default();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let bad_line = || SidecarError::Parse {
                path: origin.to_path_buf(),
                line_no: index + 1,
                line: line.to_string(),
            };
            let (key, value) = line.split_once(':').ok_or_else(bad_line)?;
            let value = value.trim();
            match key.trim() {
                "original_name" => record.original_name = value.to_string(),
                "lang" => record.lang = value.to_string(),
                "genre" => record.genre = value.to_string(),
                "parallel" => {
                    let (lang, path) = value.split_once(char::is_whitespace).ok_or_else(bad_line)?;
                    record.set_parallel(lang, path.trim());
                }
                _ => return Err(bad_line()),
            }
        }
        Ok(record)
    }

    pub fn write(&self, path: &Path) -> Result<(), SidecarError> {
        fs::write(path, self.to_string()).map_err(|source| SidecarError::MetadataWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl fmt::Display for MetadataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "original_name: {}", self.original_name)?;
        writeln!(f, "lang: {}", self.lang)?;
        writeln!(f, "genre: {}", self.genre)?;
        for parallel in &self.parallels {
            writeln!(f, "parallel: {} {}", parallel.lang, parallel.path)?;
        }
        Ok(())
    }
}

/// Make two records reference each other. Idempotent: linking an already
/// linked pair changes nothing. Returns whether either record changed.
pub fn link_parallel(
    a: &mut MetadataRecord,
    a_path: &str,
    b: &mut MetadataRecord,
    b_path: &str,
) -> bool {
    let b_lang = b.lang.clone();
    let a_lang = a.lang.clone();
    let a_changed = a.set_parallel(&b_lang, b_path);
    let b_changed = b.set_parallel(&a_lang, a_path);
    a_changed || b_changed
}
