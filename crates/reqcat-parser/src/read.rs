//! Load document contents and scan their declarations.

use crate::declarations;
use rayon::prelude::*;
use reqcat_core::document::DocumentId;
use reqcat_core::resolve::RawDeclaration;
use reqcat_core::{Error, Result};
use std::borrow::Cow;

/// A discovered document with its bytes and raw declarations.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub id: DocumentId,
    /// File contents exactly as read; this is what gets concatenated.
    pub content: Vec<u8>,
    pub declarations: Vec<RawDeclaration>,
}

impl LoadedDocument {
    /// Contents as text, with invalid UTF-8 replaced by U+FFFD.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// Read and scan one document. Invalid UTF-8 is not fatal: declarations are
/// scanned from a lossy decoding and the bytes are kept unchanged.
pub fn load(id: &DocumentId) -> Result<LoadedDocument> {
    let content = std::fs::read(id.as_path()).map_err(|e| Error::io(id.as_path(), e))?;
    let text = String::from_utf8_lossy(&content);
    if matches!(text, Cow::Owned(_)) {
        tracing::warn!(document = %id, "document is not valid UTF-8; scanning a lossy decoding");
    }
    let declarations = declarations::scan(&text);
    tracing::debug!(
        document = %id,
        declarations = declarations.len(),
        "scanned document"
    );
    Ok(LoadedDocument {
        id: id.clone(),
        content,
        declarations,
    })
}

/// Read and scan all documents in parallel. The result keeps the input order;
/// the first read failure fails the whole batch.
pub fn load_all(ids: &[DocumentId]) -> Result<Vec<LoadedDocument>> {
    ids.par_iter().map(load).collect()
}
