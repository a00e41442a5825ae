//! Document discovery: recursive directory walk filtered by extension and globs.

use globset::{Glob, GlobSet, GlobSetBuilder};
use reqcat_core::config::DiscoveryConfig;
use reqcat_core::document::DocumentId;
use reqcat_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Custom ignore file honored alongside `.gitignore` and `.ignore`.
pub const IGNORE_FILENAME: &str = ".reqcatignore";

/// Enumerates the documents a run processes.
pub trait DocumentSource {
    /// Document identifiers in a stable order.
    fn discover(&self) -> Result<Vec<DocumentId>>;
}

/// Walks a directory tree for files with the configured extension.
///
/// Entries are visited in file-name order within each directory, so the
/// discovered sequence is reproducible on an unchanged tree.
#[derive(Debug)]
pub struct FsSource {
    root: PathBuf,
    extension: String,
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
    hidden: bool,
    respect_ignore_files: bool,
    skip: Vec<PathBuf>,
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        let glob = Glob::new(p).map_err(|e| Error::InvalidGlob {
            pattern: p.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map(Some).map_err(|e| Error::InvalidGlob {
        pattern: patterns.join(", "),
        message: e.to_string(),
    })
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>, config: &DiscoveryConfig) -> Result<Self> {
        Ok(Self {
            root: root.into(),
            extension: config.extension.clone(),
            include: build_globset(&config.include)?,
            exclude: build_globset(&config.exclude)?,
            hidden: config.hidden,
            respect_ignore_files: config.respect_ignore_files,
            skip: Vec::new(),
        })
    }

    /// Never yield `path`, e.g. the output artifact from a previous run.
    #[must_use]
    pub fn skipping(mut self, path: impl AsRef<Path>) -> Self {
        self.skip.push(DocumentId::new(path.as_ref()).as_path().to_path_buf());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn accepts(&self, path: &Path) -> bool {
        if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
            return false;
        }
        if self.skip.iter().any(|s| s == path) {
            return false;
        }
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        if let Some(ref inc) = self.include
            && !inc.is_match(rel)
        {
            return false;
        }
        if let Some(ref exc) = self.exclude
            && exc.is_match(rel)
        {
            return false;
        }
        true
    }
}

impl DocumentSource for FsSource {
    fn discover(&self) -> Result<Vec<DocumentId>> {
        if !self.root.is_dir() {
            return Err(Error::io(
                &self.root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "root is not a directory"),
            ));
        }

        let walker = ignore::WalkBuilder::new(&self.root)
            .hidden(!self.hidden)
            .ignore(self.respect_ignore_files)
            .git_ignore(self.respect_ignore_files)
            .git_global(false)
            .git_exclude(self.respect_ignore_files)
            .require_git(false)
            .parents(false)
            .add_custom_ignore_filename(IGNORE_FILENAME)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut documents = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| Error::Walk {
                root: self.root.clone(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let id = DocumentId::new(entry.path());
            if self.accepts(id.as_path()) {
                tracing::debug!(document = %id, "discovered document");
                documents.push(id);
            }
        }

        tracing::info!(
            count = documents.len(),
            root = %self.root.display(),
            "discovered documents"
        );
        Ok(documents)
    }
}

/// A fixed list of documents, in the given order.
impl DocumentSource for Vec<DocumentId> {
    fn discover(&self) -> Result<Vec<DocumentId>> {
        Ok(self.clone())
    }
}
