//! Input side of reqcat: finding documents and scanning their declarations.
//!
//! [`source`] walks a directory tree for documents, [`declarations`] extracts
//! raw `require ‘…’` declarations from document text, and [`read`] loads
//! document contents in parallel.

pub mod declarations;
pub mod read;
pub mod source;
