//! Resolve raw `require` references into canonical document identifiers.

use crate::context::{Diagnostic, UnresolvedReason};
use crate::document::DocumentId;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Opening mark of a declaration reference.
pub const OPEN_MARK: char = '\u{2018}';
/// Closing mark of a declaration reference.
pub const CLOSE_MARK: char = '\u{2019}';

/// A declaration exactly as the scanner found it, delimiters included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeclaration {
    /// The quoted token, starting at the opening mark. Ends at the closing
    /// mark when one was present on the line.
    pub raw: String,
    /// 1-based line number within the declaring document.
    pub line: usize,
}

impl RawDeclaration {
    pub fn new(raw: impl Into<String>, line: usize) -> Self {
        Self {
            raw: raw.into(),
            line,
        }
    }

    /// Strip the delimiter marks and surrounding whitespace.
    pub fn reference(&self) -> Result<&str, UnresolvedReason> {
        let inner = self.raw.strip_prefix(OPEN_MARK).unwrap_or(&self.raw);
        let inner = inner
            .strip_suffix(CLOSE_MARK)
            .ok_or(UnresolvedReason::MissingClosingMarker)?;
        let inner = inner.trim();
        if inner.is_empty() {
            return Err(UnresolvedReason::EmptyReference);
        }
        Ok(inner)
    }
}

/// Result of resolving one document's declarations.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Resolved dependencies, deduplicated, in first-seen order.
    pub dependencies: Vec<DocumentId>,
    /// One entry per dropped declaration.
    pub diagnostics: Vec<Diagnostic>,
}

/// Maps raw references to `DocumentId`s by joining them against a fixed base
/// directory and appending the document extension.
#[derive(Debug, Clone)]
pub struct Resolver {
    base_dir: PathBuf,
    extension: String,
}

impl Resolver {
    pub fn new(base_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            extension: extension.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Canonical identifier for a trimmed reference.
    ///
    /// The extension is appended unconditionally, so `‘a.txt’` names `a.txt.txt`.
    pub fn resolve_reference(&self, reference: &str) -> DocumentId {
        DocumentId::new(self.base_dir.join(format!("{}.{}", reference, self.extension)))
    }

    /// Resolve every declaration of `owner`. Malformed declarations are
    /// dropped and reported; duplicates collapse onto their first occurrence.
    pub fn resolve(&self, owner: &DocumentId, declarations: &[RawDeclaration]) -> Resolution {
        let mut resolution = Resolution::default();
        let mut seen: HashSet<DocumentId> = HashSet::new();

        for decl in declarations {
            match decl.reference() {
                Ok(reference) => {
                    let id = self.resolve_reference(reference);
                    if seen.insert(id.clone()) {
                        tracing::debug!(document = %owner, dependency = %id, "resolved reference");
                        resolution.dependencies.push(id);
                    }
                }
                Err(reason) => resolution.diagnostics.push(Diagnostic::UnresolvedReference {
                    document: owner.clone(),
                    line: decl.line,
                    raw: decl.raw.clone(),
                    reason,
                }),
            }
        }

        resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> Resolver {
        Resolver::new("/docs", "txt")
    }

    fn owner() -> DocumentId {
        DocumentId::new("/docs/main.txt")
    }

    #[test]
    fn test_resolves_against_base_with_extension() {
        let res = resolver().resolve(&owner(), &[RawDeclaration::new("‘intro’", 1)]);
        assert_eq!(res.dependencies, vec![DocumentId::new("/docs/intro.txt")]);
        assert!(res.diagnostics.is_empty());
    }

    #[test]
    fn test_nested_and_parent_references_normalize() {
        let res = resolver().resolve(
            &owner(),
            &[
                RawDeclaration::new("‘chapters/one’", 1),
                RawDeclaration::new("‘chapters/../chapters/./one’", 2),
            ],
        );
        assert_eq!(res.dependencies, vec![DocumentId::new("/docs/chapters/one.txt")]);
    }

    #[test]
    fn test_duplicates_keep_first_seen_order() {
        let res = resolver().resolve(
            &owner(),
            &[
                RawDeclaration::new("‘b’", 1),
                RawDeclaration::new("‘a’", 2),
                RawDeclaration::new("‘b’", 3),
            ],
        );
        assert_eq!(
            res.dependencies,
            vec![DocumentId::new("/docs/b.txt"), DocumentId::new("/docs/a.txt")]
        );
    }

    #[test]
    fn test_missing_closing_marker_dropped() {
        let res = resolver().resolve(
            &owner(),
            &[
                RawDeclaration::new("‘broken", 1),
                RawDeclaration::new("‘fine’", 2),
            ],
        );
        assert_eq!(res.dependencies, vec![DocumentId::new("/docs/fine.txt")]);
        assert_eq!(
            res.diagnostics,
            vec![Diagnostic::UnresolvedReference {
                document: owner(),
                line: 1,
                raw: "‘broken".to_string(),
                reason: UnresolvedReason::MissingClosingMarker,
            }]
        );
    }

    #[test]
    fn test_empty_reference_dropped() {
        let res = resolver().resolve(
            &owner(),
            &[RawDeclaration::new("‘’", 4), RawDeclaration::new("‘   ’", 5)],
        );
        assert!(res.dependencies.is_empty());
        assert_eq!(res.diagnostics.len(), 2);
        assert!(res.diagnostics.iter().all(|d| matches!(
            d,
            Diagnostic::UnresolvedReference {
                reason: UnresolvedReason::EmptyReference,
                ..
            }
        )));
    }

    #[test]
    fn test_reference_whitespace_trimmed() {
        let decl = RawDeclaration::new("‘ spaced ’", 1);
        assert_eq!(decl.reference(), Ok("spaced"));
    }

    #[test]
    fn test_extension_always_appended() {
        let id = resolver().resolve_reference("a.txt");
        assert_eq!(id, DocumentId::new("/docs/a.txt.txt"));
    }
}
