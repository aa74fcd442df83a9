// Adding originals to the corpus.
//
// The adder takes user-supplied references (local files, directories,
// URLs), resolves each to local bytes, normalizes the filename, copies
// the content into the destination tree and writes the metadata
// sidecar. Placement never moves or deletes the input. References are
// processed independently: one failing reference is reported and the
// rest continue.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use korpus_model::{
    link_parallel, resolve_parallel_directory, validate_lang, CorpusConfig, CorpusDir, CorpusFile,
    CorpusPath, CorpusPathError, MetadataRecord, SidecarError,
};

use crate::dedupe;
use crate::fetch::{self, FetchError};
use crate::naming;

#[derive(Debug, Error)]
pub enum AdderError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("no destination: pass a corpus directory or a parallel file")]
    MissingDestination,

    #[error("a name override only makes sense when adding exactly one file")]
    AmbiguousNameOverride,

    #[error("destination name already taken: {}", .0.display())]
    NameCollision(PathBuf),

    #[error("{} has the same content as corpus file {}", .new.display(), .existing.display())]
    Duplicate { new: PathBuf, existing: PathBuf },

    #[error("duplicate files under {}:\n{}", .dir.display(), .listing)]
    DuplicatesInDirectory { dir: PathBuf, listing: String },

    #[error("cannot handle reference {0:?}: not a file, directory or http(s) url")]
    UnknownReference(String),

    #[error(transparent)]
    CorpusPath(#[from] CorpusPathError),

    #[error(transparent)]
    Sidecar(#[from] SidecarError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

/// Where added files go. The two mutually exclusive CLI option groups
/// map onto the two variants, so "both set" and "neither set" cannot be
/// represented.
#[derive(Debug, Clone)]
pub enum Destination {
    /// Explicit corpus-relative directory (`-d`).
    Directory(PathBuf),
    /// Derived from an existing parallel file plus the new file's
    /// language (`-p` + `-l`).
    Parallel { path: PathBuf, lang: String },
}

impl Destination {
    /// Build from the CLI option set, rejecting invalid combinations
    /// before any I/O happens.
    pub fn from_options(
        directory: Option<PathBuf>,
        parallel: Option<PathBuf>,
        lang: Option<String>,
    ) -> Result<Self, AdderError> {
        match (directory, parallel, lang) {
            (Some(_), Some(_), _) => Err(AdderError::InvalidArguments(
                "--directory and --parallel are mutually exclusive".into(),
            )),
            (Some(_), None, Some(_)) => Err(AdderError::InvalidArguments(
                "--lang is only meaningful together with --parallel".into(),
            )),
            (Some(directory), None, None) => Ok(Destination::Directory(directory)),
            (None, Some(_), None) => Err(AdderError::InvalidArguments(
                "--parallel needs --lang for the language of the new file".into(),
            )),
            (None, Some(path), Some(lang)) => {
                validate_lang(&lang)?;
                Ok(Destination::Parallel { path, lang })
            }
            (None, None, _) => Err(AdderError::MissingDestination),
        }
    }
}

/// One user-supplied origin.
#[derive(Debug, Clone)]
pub enum OriginalReference {
    File(PathBuf),
    Directory(PathBuf),
    Url(String),
}

impl OriginalReference {
    pub fn classify(raw: &str) -> Result<Self, AdderError> {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(Self::Url(raw.to_string()));
        }
        let path = PathBuf::from(raw);
        if path.is_file() {
            Ok(Self::File(path))
        } else if path.is_dir() {
            Ok(Self::Directory(path))
        } else {
            Err(AdderError::UnknownReference(raw.to_string()))
        }
    }
}

/// One reference that could not be added.
#[derive(Debug)]
pub struct Failure {
    pub reference: String,
    pub error: AdderError,
}

/// Outcome of one `add` invocation. Already-placed files stay placed
/// even when later references fail.
#[derive(Debug, Default)]
pub struct AddReport {
    pub added: Vec<CorpusFile>,
    pub failures: Vec<Failure>,
}

impl AddReport {
    pub fn all_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Adder {
    config: CorpusConfig,
    destination: Destination,
}

impl Adder {
    pub fn new(config: CorpusConfig, destination: Destination) -> Self {
        Self {
            config,
            destination,
        }
    }

    /// Add every reference, continuing past per-reference failures.
    ///
    /// Argument-level violations fail the whole invocation before any
    /// filesystem write.
    pub async fn add(
        &self,
        references: &[String],
        name_override: Option<&str>,
    ) -> Result<AddReport, AdderError> {
        if references.is_empty() {
            return Err(AdderError::InvalidArguments("no references given".into()));
        }
        if name_override.is_some() && references.len() > 1 {
            return Err(AdderError::AmbiguousNameOverride);
        }
        if matches!(self.destination, Destination::Parallel { .. }) && references.len() > 1 {
            return Err(AdderError::InvalidArguments(
                "only one file can be added against a parallel file".into(),
            ));
        }

        let goal = self.resolve_goal_dir()?;
        tracing::debug!(goal = %goal, "Resolved destination directory");

        let mut report = AddReport::default();
        for reference in references {
            match self.add_reference(reference, name_override, &goal).await {
                Ok(mut files) => report.added.append(&mut files),
                Err(error) => {
                    tracing::error!(reference = %reference, %error, "Could not add reference");
                    report.failures.push(Failure {
                        reference: reference.clone(),
                        error,
                    });
                }
            }
        }
        Ok(report)
    }

    fn resolve_goal_dir(&self) -> Result<CorpusDir, AdderError> {
        let goal = match &self.destination {
            Destination::Directory(path) => {
                let parsed = CorpusDir::parse(path)?;
                // Destination segments go through the same normalization
                // as filenames
                CorpusDir {
                    tree: parsed.tree,
                    genre: naming::normalize(&parsed.genre),
                    subdirs: parsed.subdirs.iter().map(|s| naming::normalize(s)).collect(),
                }
            }
            Destination::Parallel { path, lang } => {
                if !self.config.absolute(path).is_file() {
                    return Err(CorpusPathError::UnresolvableCorpusPath(
                        path.display().to_string(),
                    )
                    .into());
                }
                resolve_parallel_directory(path, lang)?
            }
        };
        goal.ensure_exists(&self.config.root)?;
        Ok(goal)
    }

    async fn add_reference(
        &self,
        reference: &str,
        name_override: Option<&str>,
        goal: &CorpusDir,
    ) -> Result<Vec<CorpusFile>, AdderError> {
        match OriginalReference::classify(reference)? {
            OriginalReference::File(path) => {
                let basename = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .ok_or_else(|| AdderError::UnknownReference(reference.to_string()))?;
                let wanted = name_override.unwrap_or(&basename);
                let origin = path.display().to_string();
                let file = self.place_file(&path, wanted, wanted, &origin, goal)?;
                Ok(vec![file])
            }
            OriginalReference::Url(url) => {
                let download_dir = self.config.root.join("tmp");
                let fetched = fetch::fetch_url(&url, &download_dir, name_override).await?;
                let file = self.place_file(
                    &fetched.path,
                    &fetched.original_name,
                    &fetched.origin,
                    &fetched.origin,
                    goal,
                )?;
                Ok(vec![file])
            }
            OriginalReference::Directory(dir) => {
                if name_override.is_some() {
                    return Err(AdderError::InvalidArguments(
                        "a name override makes no sense for a directory reference".into(),
                    ));
                }
                if matches!(self.destination, Destination::Parallel { .. }) {
                    return Err(AdderError::InvalidArguments(
                        "a directory cannot be added against a parallel file".into(),
                    ));
                }
                self.add_directory(&dir, goal)
            }
        }
    }

    fn add_directory(&self, dir: &Path, goal: &CorpusDir) -> Result<Vec<CorpusFile>, AdderError> {
        let groups = dedupe::duplicate_groups(dir)?;
        if !groups.is_empty() {
            let listing = groups
                .iter()
                .map(|group| {
                    group
                        .iter()
                        .map(|path| format!("\t{}", path.display()))
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .collect::<Vec<_>>()
                .join("\n___\n");
            return Err(AdderError::DuplicatesInDirectory {
                dir: dir.to_path_buf(),
                listing,
            });
        }

        let mut added = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let basename = entry.file_name().to_string_lossy().into_owned();
            let origin = entry.path().display().to_string();
            // The full source path is recorded for directory ingests
            added.push(self.place_file(entry.path(), &basename, &origin, &origin, goal)?);
        }
        Ok(added)
    }

    /// Copy `src` into the goal directory under a normalized,
    /// collision-free name and write its sidecar.
    fn place_file(
        &self,
        src: &Path,
        wanted_name: &str,
        recorded_name: &str,
        origin: &str,
        goal: &CorpusDir,
    ) -> Result<CorpusFile, AdderError> {
        let normalized = naming::normalize(wanted_name);
        let corpus_path = self.none_dupe_path(src, goal, &normalized)?;
        let destination = self.config.absolute(corpus_path.relative_path());
        fs::copy(src, &destination)?;
        tracing::debug!(src = %src.display(), dest = %destination.display(), "Copied into corpus");

        // The new file's own sidecar goes to disk first, so the group
        // never references a file without a record
        let mut record =
            MetadataRecord::new(recorded_name, corpus_path.lang(), corpus_path.genre());
        let group_updates = self.collect_parallel_links(&corpus_path, &mut record)?;
        record.write(&self.config.absolute(corpus_path.sidecar_path()))?;
        for (sidecar, member) in group_updates {
            member.write(&sidecar)?;
        }

        Ok(CorpusFile {
            path: corpus_path,
            original_name: recorded_name.to_string(),
            origin: origin.to_string(),
        })
    }

    /// First free corpus path for `normalized` in the goal directory.
    /// Re-adding identical content under a taken name is refused.
    fn none_dupe_path(
        &self,
        src: &Path,
        goal: &CorpusDir,
        normalized: &str,
    ) -> Result<CorpusPath, AdderError> {
        let mut candidate = goal.join(normalized);
        let mut index = 1;
        loop {
            let absolute = self.config.absolute(candidate.relative_path());
            if !absolute.exists() {
                return Ok(candidate);
            }
            if dedupe::are_duplicates(src, &absolute)? {
                return Err(AdderError::Duplicate {
                    new: src.to_path_buf(),
                    existing: absolute,
                });
            }
            if !self.config.disambiguate {
                return Err(AdderError::NameCollision(absolute));
            }
            candidate = goal.join(&suffixed(normalized, index));
            index += 1;
        }
    }

    /// Cross-reference the new record with the parallel file and every
    /// existing member of its parallel group. Returns the changed member
    /// records with their sidecar paths; the caller flushes them after
    /// the new record itself is on disk. Empty for directory
    /// destinations.
    fn collect_parallel_links(
        &self,
        new_path: &CorpusPath,
        new_record: &mut MetadataRecord,
    ) -> Result<Vec<(PathBuf, MetadataRecord)>, AdderError> {
        let Destination::Parallel { path, .. } = &self.destination else {
            return Ok(Vec::new());
        };

        let parallel = CorpusPath::parse(path)?;
        let parallel_sidecar = self.config.absolute(parallel.sidecar_path());
        let mut parallel_record = if parallel_sidecar.is_file() {
            MetadataRecord::load(&parallel_sidecar)?
        } else {
            MetadataRecord::new(&parallel.basename, parallel.lang(), parallel.genre())
        };

        let new_rel = new_path.to_string();
        let mut updates = Vec::new();
        for member in parallel_record.parallels.clone() {
            let member_path = CorpusPath::parse(Path::new(&member.path))?;
            let member_sidecar = self.config.absolute(member_path.sidecar_path());
            let mut member_record = if member_sidecar.is_file() {
                MetadataRecord::load(&member_sidecar)?
            } else {
                MetadataRecord::new(&member_path.basename, member_path.lang(), member_path.genre())
            };
            if link_parallel(new_record, &new_rel, &mut member_record, &member.path) {
                updates.push((member_sidecar, member_record));
            }
        }

        link_parallel(
            new_record,
            &new_rel,
            &mut parallel_record,
            &parallel.to_string(),
        );
        updates.push((parallel_sidecar, parallel_record));
        Ok(updates)
    }
}

/// `report.pdf` -> `report_1.pdf`; extensionless names get a bare index.
fn suffixed(name: &str, index: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_{}{}", &name[..dot], index, &name[dot..]),
        _ => format!("{name}{index}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SME_DIR: &str = "corpus-sme-orig/admin/sd/other_files";
    const SME_NAME: &str = "Sametingets årsmelding 2013 - nordsamisk.pdf";
    const SME_PLACED: &str =
        "corpus-sme-orig/admin/sd/other_files/sametingets_ay-rsmelding_2013_-_nordsamisk.pdf";
    const NOB_NAME: &str = "Sametingets årsmelding 2013 - norsk.pdf";
    const NOB_PLACED: &str =
        "corpus-nob-orig/admin/sd/other_files/sametingets_ay-rsmelding_2013_-_norsk.pdf";

    fn write_src(dir: &Path, name: &str, content: &str) -> String {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    fn directory_adder(root: &Path, dir: &str) -> Adder {
        Adder::new(
            CorpusConfig::new(root),
            Destination::Directory(PathBuf::from(dir)),
        )
    }

    fn parallel_adder(root: &Path, parallel: &str, lang: &str) -> Adder {
        Adder::new(
            CorpusConfig::new(root),
            Destination::Parallel {
                path: PathBuf::from(parallel),
                lang: lang.to_string(),
            },
        )
    }

    fn read_sidecar(root: &Path, placed: &str) -> MetadataRecord {
        MetadataRecord::load(&root.join(format!("{placed}.meta"))).unwrap()
    }

    #[tokio::test]
    async fn test_add_file_to_directory() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();
        let src = write_src(srcdir.path(), SME_NAME, "samisk innhold");

        let adder = directory_adder(root.path(), SME_DIR);
        let report = adder.add(&[src.clone()], None).await.unwrap();

        assert!(report.all_ok());
        assert_eq!(report.added.len(), 1);
        assert_eq!(report.added[0].path.to_string(), SME_PLACED);
        assert!(root.path().join(SME_PLACED).is_file());
        // The input is copied, never moved
        assert!(Path::new(&src).is_file());

        let record = read_sidecar(root.path(), SME_PLACED);
        assert_eq!(record.original_name, SME_NAME);
        assert_eq!(record.lang, "sme");
        assert_eq!(record.genre, "admin");
        assert!(record.parallels.is_empty());
    }

    #[tokio::test]
    async fn test_add_parallel_file_links_both_sidecars() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();

        let sme_src = write_src(srcdir.path(), SME_NAME, "samisk innhold");
        directory_adder(root.path(), SME_DIR)
            .add(&[sme_src], None)
            .await
            .unwrap();

        let nob_src = write_src(srcdir.path(), NOB_NAME, "norsk innhold");
        let report = parallel_adder(root.path(), SME_PLACED, "nob")
            .add(&[nob_src], None)
            .await
            .unwrap();

        assert!(report.all_ok());
        assert_eq!(report.added[0].path.to_string(), NOB_PLACED);
        assert!(root.path().join(NOB_PLACED).is_file());

        let sme_record = read_sidecar(root.path(), SME_PLACED);
        assert_eq!(sme_record.parallel_for("nob").unwrap().path, NOB_PLACED);
        let nob_record = read_sidecar(root.path(), NOB_PLACED);
        assert_eq!(nob_record.parallel_for("sme").unwrap().path, SME_PLACED);
    }

    #[tokio::test]
    async fn test_parallel_links_propagate_to_whole_group() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();

        let sme_src = write_src(srcdir.path(), SME_NAME, "samisk innhold");
        directory_adder(root.path(), SME_DIR)
            .add(&[sme_src], None)
            .await
            .unwrap();
        let nob_src = write_src(srcdir.path(), NOB_NAME, "norsk innhold");
        parallel_adder(root.path(), SME_PLACED, "nob")
            .add(&[nob_src], None)
            .await
            .unwrap();

        let fin_src = write_src(srcdir.path(), "vuosikertomus.pdf", "suomalainen sisältö");
        parallel_adder(root.path(), SME_PLACED, "fin")
            .add(&[fin_src], None)
            .await
            .unwrap();

        let fin_placed = "corpus-fin-orig/admin/sd/other_files/vuosikertomus.pdf";
        let fin_record = read_sidecar(root.path(), fin_placed);
        assert_eq!(fin_record.parallel_for("sme").unwrap().path, SME_PLACED);
        assert_eq!(fin_record.parallel_for("nob").unwrap().path, NOB_PLACED);

        let nob_record = read_sidecar(root.path(), NOB_PLACED);
        assert_eq!(nob_record.parallel_for("fin").unwrap().path, fin_placed);
        let sme_record = read_sidecar(root.path(), SME_PLACED);
        assert_eq!(sme_record.parallel_for("fin").unwrap().path, fin_placed);
    }

    #[tokio::test]
    async fn test_linking_twice_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();

        let sme_src = write_src(srcdir.path(), SME_NAME, "samisk innhold");
        directory_adder(root.path(), SME_DIR)
            .add(&[sme_src], None)
            .await
            .unwrap();
        let nob_src = write_src(srcdir.path(), NOB_NAME, "norsk innhold");
        parallel_adder(root.path(), SME_PLACED, "nob")
            .add(&[nob_src.clone()], None)
            .await
            .unwrap();

        let sme_before = read_sidecar(root.path(), SME_PLACED);

        // Re-adding the same content is refused, and the existing links
        // stay as they were
        let report = parallel_adder(root.path(), SME_PLACED, "nob")
            .add(&[nob_src], None)
            .await
            .unwrap();
        assert!(!report.all_ok());
        assert!(matches!(
            report.failures[0].error,
            AdderError::Duplicate { .. }
        ));
        assert_eq!(read_sidecar(root.path(), SME_PLACED), sme_before);
    }

    #[tokio::test]
    async fn test_failed_record_write_leaves_group_unlinked() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();

        let sme_src = write_src(srcdir.path(), SME_NAME, "samisk innhold");
        directory_adder(root.path(), SME_DIR)
            .add(&[sme_src], None)
            .await
            .unwrap();

        // A directory squatting on the sidecar path makes its write fail
        fs::create_dir_all(root.path().join(format!("{NOB_PLACED}.meta"))).unwrap();

        let nob_src = write_src(srcdir.path(), NOB_NAME, "norsk innhold");
        let report = parallel_adder(root.path(), SME_PLACED, "nob")
            .add(&[nob_src], None)
            .await
            .unwrap();

        assert!(matches!(
            report.failures[0].error,
            AdderError::Sidecar(SidecarError::MetadataWrite { .. })
        ));
        // No member may point at a file whose own record never made it
        // to disk
        let sme_record = read_sidecar(root.path(), SME_PLACED);
        assert!(sme_record.parallel_for("nob").is_none());
    }

    #[tokio::test]
    async fn test_add_url_records_the_url_as_provenance() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rapporter/nedlasting"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"rapportinnhold".to_vec())
                    .insert_header(
                        "content-disposition",
                        "attachment; filename=\"Sametingets rapport.pdf\"",
                    ),
            )
            .mount(&server)
            .await;

        let root = tempfile::tempdir().unwrap();
        let url = format!("{}/rapporter/nedlasting", server.uri());
        let adder = directory_adder(root.path(), "corpus-sme-orig/admin");
        let report = adder.add(&[url.clone()], None).await.unwrap();

        assert!(report.all_ok());
        let placed = "corpus-sme-orig/admin/sametingets_rapport.pdf";
        assert_eq!(report.added[0].path.to_string(), placed);
        assert_eq!(
            fs::read(root.path().join(placed)).unwrap(),
            b"rapportinnhold"
        );
        // Fetches record the final URL, not the server-suggested name
        let record = read_sidecar(root.path(), placed);
        assert_eq!(record.original_name, url);
        assert_eq!(report.added[0].origin, url);
        // The scratch copy stays under <root>/tmp
        assert!(root.path().join("tmp/Sametingets rapport.pdf").is_file());
    }

    #[test]
    fn test_destination_from_options() {
        let dir = Some(PathBuf::from("corpus-sme-orig/admin"));
        let par = Some(PathBuf::from("corpus-sme-orig/admin/a.pdf"));

        assert!(matches!(
            Destination::from_options(dir.clone(), None, None),
            Ok(Destination::Directory(_))
        ));
        assert!(matches!(
            Destination::from_options(None, par.clone(), Some("nob".into())),
            Ok(Destination::Parallel { .. })
        ));

        assert!(matches!(
            Destination::from_options(None, None, None),
            Err(AdderError::MissingDestination)
        ));
        assert!(matches!(
            Destination::from_options(dir.clone(), par.clone(), Some("nob".into())),
            Err(AdderError::InvalidArguments(_))
        ));
        assert!(matches!(
            Destination::from_options(dir, None, Some("nob".into())),
            Err(AdderError::InvalidArguments(_))
        ));
        assert!(matches!(
            Destination::from_options(None, par.clone(), None),
            Err(AdderError::InvalidArguments(_))
        ));
        assert!(matches!(
            Destination::from_options(None, par, Some("norsk".into())),
            Err(AdderError::CorpusPath(CorpusPathError::InvalidLang(_)))
        ));
    }

    #[tokio::test]
    async fn test_name_override() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();
        let src = write_src(srcdir.path(), "dl_7f3a9c.tmp", "rapportinnhold");

        let adder = directory_adder(root.path(), "corpus-sme-orig/admin");
        let report = adder
            .add(&[src], Some("Sametingets rapport.pdf"))
            .await
            .unwrap();

        assert_eq!(
            report.added[0].path.to_string(),
            "corpus-sme-orig/admin/sametingets_rapport.pdf"
        );
        let record = read_sidecar(root.path(), "corpus-sme-orig/admin/sametingets_rapport.pdf");
        assert_eq!(record.original_name, "Sametingets rapport.pdf");
    }

    #[tokio::test]
    async fn test_ambiguous_name_override_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();
        let a = write_src(srcdir.path(), "a.pdf", "a");
        let b = write_src(srcdir.path(), "b.pdf", "b");

        let adder = directory_adder(root.path(), SME_DIR);
        let err = adder.add(&[a, b], Some("rapport.pdf")).await.unwrap_err();

        assert!(matches!(err, AdderError::AmbiguousNameOverride));
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_collision_appends_numeric_suffix() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();
        let first = write_src(srcdir.path(), "rapport.pdf", "first version");

        let adder = directory_adder(root.path(), "corpus-sme-orig/admin");
        adder.add(&[first], None).await.unwrap();

        let second = write_src(srcdir.path(), "rapport (ny).pdf", "second version");
        let report = adder
            .add(&[second], Some("rapport.pdf"))
            .await
            .unwrap();

        assert_eq!(
            report.added[0].path.to_string(),
            "corpus-sme-orig/admin/rapport_1.pdf"
        );
        assert!(root.path().join("corpus-sme-orig/admin/rapport.pdf").is_file());
        assert!(root.path().join("corpus-sme-orig/admin/rapport_1.pdf").is_file());
    }

    #[tokio::test]
    async fn test_collision_without_disambiguation_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();
        let first = write_src(srcdir.path(), "rapport.pdf", "first version");

        directory_adder(root.path(), "corpus-sme-orig/admin")
            .add(&[first], None)
            .await
            .unwrap();

        let second = write_src(srcdir.path(), "rapport2.pdf", "second version");
        let adder = Adder::new(
            CorpusConfig::new(root.path()).no_disambiguation(),
            Destination::Directory(PathBuf::from("corpus-sme-orig/admin")),
        );
        let report = adder.add(&[second], Some("rapport.pdf")).await.unwrap();

        assert!(matches!(
            report.failures[0].error,
            AdderError::NameCollision(_)
        ));
    }

    #[tokio::test]
    async fn test_directory_reference_recurses() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();
        fs::create_dir(srcdir.path().join("2013")).unwrap();
        write_src(srcdir.path(), "Årsmelding.pdf", "en");
        write_src(&srcdir.path().join("2013"), "Vedlegg.pdf", "to");

        let adder = directory_adder(root.path(), "corpus-sme-orig/admin");
        let report = adder
            .add(&[srcdir.path().display().to_string()], None)
            .await
            .unwrap();

        assert!(report.all_ok());
        assert_eq!(report.added.len(), 2);
        let placed: Vec<String> = report.added.iter().map(|f| f.path.to_string()).collect();
        assert!(placed.contains(&"corpus-sme-orig/admin/ay-rsmelding.pdf".to_string()));
        assert!(placed.contains(&"corpus-sme-orig/admin/vedlegg.pdf".to_string()));
        // Directory ingests record the full source path
        let record = read_sidecar(root.path(), "corpus-sme-orig/admin/vedlegg.pdf");
        assert!(record.original_name.ends_with("2013/Vedlegg.pdf"));
    }

    #[tokio::test]
    async fn test_directory_with_internal_duplicates_is_refused() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();
        write_src(srcdir.path(), "a.pdf", "same bytes");
        write_src(srcdir.path(), "b.pdf", "same bytes");

        let adder = directory_adder(root.path(), "corpus-sme-orig/admin");
        let report = adder
            .add(&[srcdir.path().display().to_string()], None)
            .await
            .unwrap();

        assert!(matches!(
            report.failures[0].error,
            AdderError::DuplicatesInDirectory { .. }
        ));
        assert!(report.added.is_empty());
    }

    #[tokio::test]
    async fn test_directory_reference_with_parallel_is_refused() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();
        let sme_src = write_src(srcdir.path(), SME_NAME, "samisk innhold");
        directory_adder(root.path(), SME_DIR)
            .add(&[sme_src], None)
            .await
            .unwrap();

        let refdir = tempfile::tempdir().unwrap();
        write_src(refdir.path(), "x.pdf", "x");

        let report = parallel_adder(root.path(), SME_PLACED, "nob")
            .add(&[refdir.path().display().to_string()], None)
            .await
            .unwrap();
        assert!(matches!(
            report.failures[0].error,
            AdderError::InvalidArguments(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_parallel_file_is_refused() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();
        let src = write_src(srcdir.path(), NOB_NAME, "norsk innhold");

        let err = parallel_adder(root.path(), SME_PLACED, "nob")
            .add(&[src], None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdderError::CorpusPath(CorpusPathError::UnresolvableCorpusPath(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_reference_does_not_stop_the_rest() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();
        let good = write_src(srcdir.path(), "rapport.pdf", "innhold");

        let adder = directory_adder(root.path(), "corpus-sme-orig/admin");
        let report = adder
            .add(&["no/such/thing.pdf".to_string(), good], None)
            .await
            .unwrap();

        assert_eq!(report.added.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].error,
            AdderError::UnknownReference(_)
        ));
    }

    #[tokio::test]
    async fn test_destination_segments_are_normalized() {
        let root = tempfile::tempdir().unwrap();
        let srcdir = tempfile::tempdir().unwrap();
        let src = write_src(srcdir.path(), "rapport.pdf", "innhold");

        let adder = directory_adder(root.path(), "corpus-sme-orig/Admin/Gamle Filer");
        let report = adder.add(&[src], None).await.unwrap();

        assert_eq!(
            report.added[0].path.to_string(),
            "corpus-sme-orig/admin/gamle_filer/rapport.pdf"
        );
    }

    #[test]
    fn test_suffixed() {
        assert_eq!(suffixed("rapport.pdf", 1), "rapport_1.pdf");
        assert_eq!(suffixed("arkiv.tar.gz", 2), "arkiv.tar_2.gz");
        assert_eq!(suffixed("rapport", 3), "rapport3");
    }
}
