//! Canonical document identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A canonical identifier for a document: a lexically normalized path.
///
/// Two `DocumentId`s built from paths that differ only by `.` segments or
/// resolvable `..` segments compare equal. Normalization never touches the
/// filesystem, so identifiers can be built for documents that do not exist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(PathBuf);

impl DocumentId {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(normalize(path.as_ref()))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Path relative to `root` for display, or the full path when outside it.
    pub fn display_relative(&self, root: &Path) -> String {
        self.0
            .strip_prefix(root)
            .unwrap_or(&self.0)
            .display()
            .to_string()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for DocumentId {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl From<PathBuf> for DocumentId {
    fn from(path: PathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&Path> for DocumentId {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

/// Lexically normalize a path: drop `.` and fold `..` into its parent.
///
/// A `..` that would climb above the root of an absolute path is discarded;
/// on a relative path with nothing left to pop it is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}
