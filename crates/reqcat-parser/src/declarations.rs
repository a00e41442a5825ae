//! Lexical scan for `require ‘reference’` declarations.
//!
//! The syntax is fixed: the word `require`, at least one space or tab, then a
//! reference enclosed in `‘` and `’`. Nothing else in a document is
//! interpreted. An opening mark with no closing mark still yields a raw
//! declaration so the resolver can report it; that token stops at the end of
//! the line or at the next opening mark, whichever comes first.

use regex::Regex;
use reqcat_core::resolve::{CLOSE_MARK, OPEN_MARK, RawDeclaration};
use std::sync::OnceLock;

/// Matches the keyword up to and including the opening mark. The token itself
/// is delimited by [`token_at`], so an unclosed token never consumes a
/// following declaration.
fn declaration_re() -> &'static Regex {
    static DECLARATION_RE: OnceLock<Regex> = OnceLock::new();
    DECLARATION_RE.get_or_init(|| {
        Regex::new(r"\brequire[ \t]+\x{2018}").expect("declaration pattern is valid")
    })
}

/// The raw token starting at the opening mark at `start`: through the first
/// closing mark, or up to the end of the line or the next opening mark.
fn token_at(content: &str, start: usize) -> &str {
    let body = start + OPEN_MARK.len_utf8();
    for (offset, ch) in content[body..].char_indices() {
        match ch {
            CLOSE_MARK => return &content[start..body + offset + ch.len_utf8()],
            OPEN_MARK | '\r' | '\n' => return &content[start..body + offset],
            _ => {}
        }
    }
    &content[start..]
}

/// Scan `content` for declarations, in source order.
pub fn scan(content: &str) -> Vec<RawDeclaration> {
    let mut declarations = Vec::new();
    let mut line = 1;
    let mut counted_to = 0;

    for m in declaration_re().find_iter(content) {
        let start = m.end() - OPEN_MARK.len_utf8();
        line += content[counted_to..start]
            .bytes()
            .filter(|&b| b == b'\n')
            .count();
        counted_to = start;
        declarations.push(RawDeclaration::new(token_at(content, start), line));
    }

    declarations
}
