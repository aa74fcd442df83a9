use std::path::{Path, PathBuf};

/// Settings the adder needs about the working copy it operates on.
///
/// Everything path-related is resolved against `root` so callers never
/// depend on the process working directory.
#[derive(Debug, Clone)]
pub struct CorpusConfig {
    /// Directory holding the per-language corpus trees.
    pub root: PathBuf,
    /// Append a numeric suffix when a destination name is already taken.
    /// When false, a collision is an error instead.
    pub disambiguate: bool,
}

impl CorpusConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            disambiguate: true,
        }
    }

    /// Fail on name collisions instead of renaming.
    pub fn no_disambiguation(mut self) -> Self {
        self.disambiguate = false;
        self
    }

    /// Absolute location of a corpus-relative path.
    pub fn absolute(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }
}
