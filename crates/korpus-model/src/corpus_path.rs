// Corpus tree naming conventions.
//
// Every per-language tree is a directory named `<prefix>-<lang>-<suffix>`
// (e.g. `corpus-sme-orig`). Trees of a language pair share the suffix and
// the subdirectory structure below the tree root, so the counterpart of a
// file in another language is found by swapping the lang segment. The
// first directory level under the tree root is the genre.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusPathError {
    #[error("not a path inside a corpus tree: {0}")]
    UnresolvableCorpusPath(String),

    #[error("no genre directory under the corpus tree in {0}")]
    MissingGenre(String),

    #[error("invalid language code {0:?}, expected three lowercase ascii letters")]
    InvalidLang(String),

    #[error("could not create corpus directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn tree_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<prefix>.+)-(?P<lang>[a-z]{3})-(?P<suffix>[a-z0-9]+)$")
            .expect("valid regex")
    })
}

/// Check that `lang` is a three-letter lowercase ISO-639 style code.
pub fn validate_lang(lang: &str) -> Result<(), CorpusPathError> {
    if lang.len() == 3 && lang.chars().all(|c| c.is_ascii_lowercase()) {
        Ok(())
    } else {
        Err(CorpusPathError::InvalidLang(lang.to_string()))
    }
}

/// Name of one per-language corpus tree, `<prefix>-<lang>-<suffix>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeName {
    pub prefix: String,
    pub lang: String,
    pub suffix: String,
}

impl TreeName {
    pub fn parse(component: &str) -> Result<Self, CorpusPathError> {
        let caps = tree_name_re()
            .captures(component)
            .ok_or_else(|| CorpusPathError::UnresolvableCorpusPath(component.to_string()))?;
        Ok(Self {
            prefix: caps["prefix"].to_string(),
            lang: caps["lang"].to_string(),
            suffix: caps["suffix"].to_string(),
        })
    }

    /// The same tree family for another language.
    pub fn with_lang(&self, lang: &str) -> Result<Self, CorpusPathError> {
        validate_lang(lang)?;
        Ok(Self {
            prefix: self.prefix.clone(),
            lang: lang.to_string(),
            suffix: self.suffix.clone(),
        })
    }
}

impl fmt::Display for TreeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.prefix, self.lang, self.suffix)
    }
}

/// A corpus-relative directory: tree root, genre, optional subdirectories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusDir {
    pub tree: TreeName,
    pub genre: String,
    pub subdirs: Vec<String>,
}

impl CorpusDir {
    /// Split a corpus-relative directory path into its conventional parts.
    pub fn parse(path: &Path) -> Result<Self, CorpusPathError> {
        let mut parts = utf8_components(path)?;
        if parts.is_empty() {
            return Err(CorpusPathError::UnresolvableCorpusPath(display(path)));
        }
        let tree = TreeName::parse(&parts.remove(0))?;
        if parts.is_empty() {
            return Err(CorpusPathError::MissingGenre(display(path)));
        }
        let genre = parts.remove(0);
        Ok(Self {
            tree,
            genre,
            subdirs: parts,
        })
    }

    /// The corresponding directory in another language's tree.
    pub fn with_lang(&self, lang: &str) -> Result<Self, CorpusPathError> {
        Ok(Self {
            tree: self.tree.with_lang(lang)?,
            genre: self.genre.clone(),
            subdirs: self.subdirs.clone(),
        })
    }

    pub fn join(&self, basename: &str) -> CorpusPath {
        CorpusPath {
            dir: self.clone(),
            basename: basename.to_string(),
        }
    }

    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::from(self.tree.to_string());
        path.push(&self.genre);
        for sub in &self.subdirs {
            path.push(sub);
        }
        path
    }

    /// Create the directory under `root` if it is missing.
    pub fn ensure_exists(&self, root: &Path) -> Result<PathBuf, CorpusPathError> {
        let absolute = root.join(self.relative_path());
        std::fs::create_dir_all(&absolute).map_err(|source| CorpusPathError::CreateDir {
            path: absolute.clone(),
            source,
        })?;
        Ok(absolute)
    }
}

impl fmt::Display for CorpusDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tree, self.genre)?;
        for sub in &self.subdirs {
            write!(f, "/{sub}")?;
        }
        Ok(())
    }
}

/// A corpus-relative file location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusPath {
    pub dir: CorpusDir,
    pub basename: String,
}

impl CorpusPath {
    /// Split a corpus-relative file path into its conventional parts.
    /// The genre directory is required, subdirectories are optional.
    pub fn parse(path: &Path) -> Result<Self, CorpusPathError> {
        let mut parts = utf8_components(path)?;
        if parts.len() < 2 {
            return Err(CorpusPathError::UnresolvableCorpusPath(display(path)));
        }
        let basename = parts.pop().expect("at least two components");
        let dir = CorpusDir::parse(&parts.iter().collect::<PathBuf>())?;
        Ok(Self { dir, basename })
    }

    pub fn lang(&self) -> &str {
        &self.dir.tree.lang
    }

    pub fn genre(&self) -> &str {
        &self.dir.genre
    }

    pub fn relative_path(&self) -> PathBuf {
        self.dir.relative_path().join(&self.basename)
    }

    /// Location of the metadata sidecar belonging to this file.
    pub fn sidecar_path(&self) -> PathBuf {
        self.dir.relative_path().join(format!("{}.meta", self.basename))
    }
}

impl fmt::Display for CorpusPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.dir, self.basename)
    }
}

/// A file placed inside the corpus working copy. Never mutated after
/// placement; re-adding the same origin yields a new, distinctly-named
/// file.
#[derive(Debug, Clone)]
pub struct CorpusFile {
    pub path: CorpusPath,
    /// Name the document had before normalization (the URL for fetched files).
    pub original_name: String,
    /// Local path or URL the content came from.
    pub origin: String,
}

/// Directory that will hold the counterpart of `parallel_file` in `target_lang`.
pub fn resolve_parallel_directory(
    parallel_file: &Path,
    target_lang: &str,
) -> Result<CorpusDir, CorpusPathError> {
    let parallel = CorpusPath::parse(parallel_file)?;
    parallel.dir.with_lang(target_lang)
}

fn utf8_components(path: &Path) -> Result<Vec<String>, CorpusPathError> {
    path.components()
        .map(|component| match component {
            Component::Normal(part) => part
                .to_str()
                .map(str::to_string)
                .ok_or_else(|| CorpusPathError::UnresolvableCorpusPath(display(path))),
            // Corpus paths are always relative to the corpus root
            _ => Err(CorpusPathError::UnresolvableCorpusPath(display(path))),
        })
        .collect()
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
