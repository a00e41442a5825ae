//! Per-invocation run context and recoverable diagnostics.
//!
//! A [`RunContext`] is created once per pipeline invocation and dropped when it
//! ends. It carries the absolute locations every stage needs plus the
//! diagnostics collected along the way; nothing here outlives a run.

use crate::document::{DocumentId, normalize};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a raw declaration could not be turned into a document reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedReason {
    MissingClosingMarker,
    EmptyReference,
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingClosingMarker => write!(f, "missing closing marker"),
            Self::EmptyReference => write!(f, "empty reference"),
        }
    }
}

/// A recoverable problem: reported, never fatal on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A declaration was dropped because it is malformed.
    UnresolvedReference {
        document: DocumentId,
        line: usize,
        raw: String,
        reason: UnresolvedReason,
    },
    /// An edge points at a document the source never discovered.
    /// The target is sorted as a leaf and left out of the output.
    MissingDependencyTarget {
        dependent: DocumentId,
        target: DocumentId,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnresolvedReference {
                document,
                line,
                raw,
                reason,
            } => write!(
                f,
                "{}:{}: dropped declaration {:?} ({})",
                document, line, raw, reason
            ),
            Self::MissingDependencyTarget { dependent, target } => {
                write!(f, "{} requires missing document {}", dependent, target)
            }
        }
    }
}

/// Everything one pipeline invocation needs, scoped to that invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Directory the document source walks.
    pub root: PathBuf,
    /// Directory raw references are resolved against.
    pub base_dir: PathBuf,
    /// Output artifact location.
    pub output: PathBuf,
    diagnostics: Vec<Diagnostic>,
}

impl RunContext {
    /// Build a context. Relative `base_dir` and `output` are taken relative to
    /// `root`; a relative `root` is taken relative to the current directory.
    pub fn new(root: &Path, base_dir: Option<&Path>, output: &Path) -> std::io::Result<Self> {
        let root = if root.is_absolute() {
            normalize(root)
        } else {
            normalize(&std::env::current_dir()?.join(root))
        };
        let base_dir = base_dir.map_or_else(|| root.clone(), |dir| normalize(&root.join(dir)));
        let output = normalize(&root.join(output));
        Ok(Self {
            root,
            base_dir,
            output,
            diagnostics: Vec::new(),
        })
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.report(diagnostic);
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Temp path the output is staged at before it is moved into place.
    pub fn staging_output(&self) -> PathBuf {
        let mut name = self.output.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
