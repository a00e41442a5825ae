//! The bundling pipeline: source → resolver → graph → order → sink.

use crate::sink::{FileSink, Sink};
use reqcat_core::config::Config;
use reqcat_core::context::{Diagnostic, RunContext};
use reqcat_core::document::DocumentId;
use reqcat_core::graph::{DependencyGraph, GraphBuilder};
use reqcat_core::resolve::Resolver;
use reqcat_core::sort::{self, CycleReport, Ordering};
use reqcat_core::{Error, Result};
use reqcat_parser::read::{self, LoadedDocument};
use reqcat_parser::source::{DocumentSource, FsSource};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Discovered documents and the graph built from their declarations.
#[derive(Debug)]
pub struct Analysis {
    pub graph: DependencyGraph,
    pub documents: Vec<LoadedDocument>,
}

impl Analysis {
    /// Order the graph. Every cycle is logged; any cycle fails the run.
    pub fn sort(&self) -> std::result::Result<Ordering, CycleReport> {
        sort::sort(&self.graph)
    }
}

/// A fully ordered run, ready to be written.
#[derive(Debug)]
pub struct Plan {
    pub graph: DependencyGraph,
    pub ordering: Ordering,
    contents: HashMap<DocumentId, Vec<u8>>,
}

impl Plan {
    /// Discovered documents with their contents, in output order.
    /// Placeholders for undiscovered targets are left out.
    pub fn documents(&self) -> impl Iterator<Item = (&DocumentId, &[u8])> {
        self.ordering
            .iter()
            .filter_map(|id| self.contents.get(id).map(|c| (id, c.as_slice())))
    }

    /// Ordered nodes that have no content because they were never discovered.
    pub fn missing(&self) -> Vec<&DocumentId> {
        self.ordering
            .iter()
            .filter(|id| !self.graph.is_discovered(id))
            .collect()
    }
}

/// What a sink received from [`write_plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Written {
    pub documents: usize,
    /// As reported by the sink's `finish`.
    pub bytes: u64,
}

/// Outcome of a successful [`bundle`].
#[derive(Debug, Clone, Serialize)]
pub struct BundleSummary {
    pub output: PathBuf,
    pub documents: usize,
    pub bytes: u64,
    pub skipped_missing: Vec<DocumentId>,
    pub diagnostics: usize,
}

/// The filesystem source for a run: the configured walk over `ctx.root`,
/// never yielding the output artifact or its staging file.
pub fn source_for(ctx: &RunContext, config: &Config) -> Result<FsSource> {
    Ok(FsSource::new(&ctx.root, &config.discovery)?
        .skipping(&ctx.output)
        .skipping(ctx.staging_output()))
}

/// Discover, read, resolve and build. Resolution starts only once the full
/// document set has been read.
pub fn analyze<S: DocumentSource>(
    ctx: &mut RunContext,
    source: &S,
    config: &Config,
) -> Result<Analysis> {
    let ids = source.discover()?;
    let documents = read::load_all(&ids)?;

    let resolver = Resolver::new(&ctx.base_dir, &config.discovery.extension);
    let mut builder = GraphBuilder::new();
    for doc in &documents {
        let resolution = resolver.resolve(&doc.id, &doc.declarations);
        ctx.extend(resolution.diagnostics);
        builder.add_document(doc.id.clone(), resolution.dependencies);
    }
    let graph = builder.build();

    tracing::info!(
        documents = documents.len(),
        edges = graph.edge_count(),
        "built dependency graph"
    );
    Ok(Analysis { graph, documents })
}

/// Analyze and order. Fails on any cycle, and on a missing dependency target
/// when `strict_missing` is set.
pub fn plan_with<S: DocumentSource>(
    ctx: &mut RunContext,
    source: &S,
    config: &Config,
) -> Result<Plan> {
    let analysis = analyze(ctx, source, config)?;

    let missing = analysis.graph.missing_targets();
    if config.output.strict_missing
        && let Some(Diagnostic::MissingDependencyTarget { dependent, target }) = missing.first()
    {
        return Err(Error::MissingDependencyTarget {
            dependent: dependent.clone(),
            target: target.clone(),
        });
    }
    ctx.extend(missing);

    let ordering = analysis.sort()?;
    let contents = analysis
        .documents
        .into_iter()
        .map(|doc| (doc.id, doc.content))
        .collect();

    Ok(Plan {
        graph: analysis.graph,
        ordering,
        contents,
    })
}

/// [`plan_with`] over the configured filesystem source.
pub fn plan(ctx: &mut RunContext, config: &Config) -> Result<Plan> {
    let source = source_for(ctx, config)?;
    plan_with(ctx, &source, config)
}

/// Write a plan's documents, in order, into `sink` and commit it.
pub fn write_plan<K: Sink>(plan: &Plan, mut sink: K) -> Result<Written> {
    let mut documents = 0;
    for (id, content) in plan.documents() {
        sink.write_document(id, content)?;
        documents += 1;
    }
    let bytes = sink.finish()?;
    Ok(Written { documents, bytes })
}

/// Plan the run and write the concatenated artifact to `ctx.output`.
/// On failure nothing is written at the output location.
pub fn bundle(ctx: &mut RunContext, config: &Config) -> Result<BundleSummary> {
    let plan = plan(ctx, config)?;

    let skipped_missing: Vec<DocumentId> = plan.missing().into_iter().cloned().collect();
    for id in &skipped_missing {
        tracing::warn!(document = %id, "skipping undiscovered document");
    }

    let sink = FileSink::create(&ctx.output, ctx.staging_output(), &config.output.separator)?;
    let written = write_plan(&plan, sink)?;

    Ok(BundleSummary {
        output: ctx.output.clone(),
        documents: written.documents,
        bytes: written.bytes,
        skipped_missing,
        diagnostics: ctx.diagnostics().len(),
    })
}
