//! Core types and algorithms for reqcat.
//!
//! Provides the document identity ([`document::DocumentId`]), reference resolution
//! ([`resolve::Resolver`]), the dependency graph ([`graph::DependencyGraph`]),
//! deterministic topological ordering with cycle detection ([`sort::sort`]),
//! per-run context and diagnostics, configuration, and graph export.

pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod export;
pub mod graph;
pub mod resolve;
pub mod sort;

pub use error::{Error, Result};
