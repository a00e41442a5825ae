//! CLI binary for reqcat: order documents by their `require` declarations and
//! concatenate them into one file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqcat_bundle::pipeline;
use reqcat_core::config::Config;
use reqcat_core::context::RunContext;
use reqcat_core::document::DocumentId;
use reqcat_core::export::{ExportFormat, export};
use reqcat_core::sort::Cycle;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "reqcat",
    version,
    about = "Concatenate documents in dependency order"
)]
struct Cli {
    /// Directory to scan for documents (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the order and write the concatenated output (default)
    Build(BuildArgs),

    /// Print the resolved document order without writing anything
    Order {
        /// Emit JSON instead of one path per line
        #[arg(long)]
        json: bool,
    },

    /// Report malformed declarations, missing documents and cycles
    Check {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the dependency graph as DOT (Graphviz) or Mermaid
    Export {
        /// Output format: dot, mermaid
        #[arg(short, long, default_value = "dot")]
        format: String,
    },
}

#[derive(clap::Args, Default)]
struct BuildArgs {
    /// Output file (defaults to result.txt under the root)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Glob patterns to include documents (repeatable)
    #[arg(long)]
    include: Vec<String>,

    /// Glob patterns to exclude documents (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Fail when a document requires a document that does not exist
    #[arg(long)]
    strict: bool,
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.root {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let root = get_project_root(&cli)?;

    match cli.command.unwrap_or_else(|| Commands::Build(BuildArgs::default())) {
        Commands::Build(args) => cmd_build(&root, args),
        Commands::Order { json } => cmd_order(&root, json),
        Commands::Check { json } => cmd_check(&root, json),
        Commands::Export { format } => cmd_export(&root, &format),
    }
}

/// Load config for `root`, then apply command-line overrides.
fn load_config(root: &Path, args: &BuildArgs) -> Result<Config> {
    let mut config = Config::load(root)?;
    if let Some(output) = &args.output {
        config.output.path.clone_from(output);
    }
    config.discovery.include.extend(args.include.iter().cloned());
    config.discovery.exclude.extend(args.exclude.iter().cloned());
    if args.strict {
        config.output.strict_missing = true;
    }
    Ok(config)
}

fn run_context(root: &Path, config: &Config) -> Result<RunContext> {
    let ctx = RunContext::new(root, config.resolve.base_dir.as_deref(), &config.output.path)
        .with_context(|| format!("failed to resolve root {}", root.display()))?;
    tracing::debug!(
        root = %ctx.root.display(),
        base_dir = %ctx.base_dir.display(),
        output = %ctx.output.display(),
        "run context"
    );
    Ok(ctx)
}

fn relative(ctx: &RunContext, id: &DocumentId) -> String {
    id.display_relative(&ctx.root)
}

fn cycle_representation(ctx: &RunContext, cycle: &Cycle) -> String {
    let mut parts: Vec<String> = cycle.members.iter().map(|m| relative(ctx, m)).collect();
    if let Some(first) = cycle.members.first() {
        parts.push(relative(ctx, first));
    }
    parts.join(" → ")
}

fn cmd_build(root: &Path, args: BuildArgs) -> Result<()> {
    use indicatif::{ProgressBar, ProgressStyle};

    let config = load_config(root, &args)?;
    let mut ctx = run_context(root, &config)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    spinner.set_message("Resolving document order...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    let result = pipeline::bundle(&mut ctx, &config);
    spinner.finish_and_clear();

    let summary = match result {
        Ok(summary) => summary,
        Err(reqcat_core::Error::CycleDetected(report)) => {
            for cycle in &report.cycles {
                eprintln!("  cycle: {}", cycle_representation(&ctx, cycle));
            }
            anyhow::bail!(
                "circular dependency detected involving {}; no output written",
                report
                    .participants()
                    .first()
                    .map_or_else(String::new, |id| relative(&ctx, id))
            );
        }
        Err(e) => return Err(e).context("bundling failed; no output written"),
    };

    if !ctx.diagnostics().is_empty() {
        eprintln!("  {} warning(s) reported", ctx.diagnostics().len());
    }
    for id in &summary.skipped_missing {
        eprintln!("  skipped missing document: {}", relative(&ctx, id));
    }
    println!(
        "Bundled {} document(s) into {}",
        summary.documents,
        summary.output.display()
    );
    Ok(())
}

fn cmd_order(root: &Path, json: bool) -> Result<()> {
    let config = Config::load(root)?;
    let mut ctx = run_context(root, &config)?;
    let plan = pipeline::plan(&mut ctx, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan.ordering)?);
        return Ok(());
    }

    for id in &plan.ordering {
        if plan.graph.is_discovered(id) {
            println!("{}", relative(&ctx, id));
        } else {
            println!("{} (missing)", relative(&ctx, id));
        }
    }
    Ok(())
}

fn cmd_check(root: &Path, json: bool) -> Result<()> {
    let config = Config::load(root)?;
    let mut ctx = run_context(root, &config)?;
    let source = pipeline::source_for(&ctx, &config)?;
    let analysis = pipeline::analyze(&mut ctx, &source, &config)?;
    ctx.extend(analysis.graph.missing_targets());
    let cycles = analysis.sort().err();

    if json {
        let report = serde_json::json!({
            "documents": analysis.documents.len(),
            "edges": analysis.graph.edge_count(),
            "diagnostics": ctx.diagnostics(),
            "cycles": cycles.as_ref().map(|r| &r.cycles),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for diagnostic in ctx.diagnostics() {
            println!("WARN: {}", diagnostic);
        }
        if let Some(report) = &cycles {
            for cycle in &report.cycles {
                println!("ERROR: cycle: {}", cycle_representation(&ctx, cycle));
            }
        }
    }

    if let Some(report) = cycles {
        anyhow::bail!(
            "found {} dependency cycle(s); the documents cannot be ordered",
            report.cycles.len()
        );
    }

    if !json {
        eprintln!(
            "{} document(s), {} dependency edge(s), {} warning(s). Order is resolvable.",
            analysis.documents.len(),
            analysis.graph.edge_count(),
            ctx.diagnostics().len()
        );
    }
    Ok(())
}

fn cmd_export(root: &Path, format: &str) -> Result<()> {
    let format = ExportFormat::from_name(format)
        .ok_or_else(|| anyhow::anyhow!("unknown export format: {} (use dot or mermaid)", format))?;
    let config = Config::load(root)?;
    let mut ctx = run_context(root, &config)?;
    let source = pipeline::source_for(&ctx, &config)?;
    let analysis = pipeline::analyze(&mut ctx, &source, &config)?;
    print!("{}", export(&analysis.graph, &ctx.root, format));
    Ok(())
}
