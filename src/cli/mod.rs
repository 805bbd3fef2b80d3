// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `new`     — creates an empty dataset file
//   2. `inspect` — prints summaries and validation errors
//   3. `export`  — re-saves a dataset and writes its splits
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{Commands, ExportArgs, InspectArgs, NewArgs};

use crate::application::session::EditorSession;
use crate::infra::config::{EditorConfig, DEFAULT_CONFIG_FILE};
use crate::infra::storage::FileStorage;
use crate::state::{Annotation, EditorTree, NodeId};

#[derive(Parser, Debug)]
#[command(
    name = "squad2-editor",
    version,
    about = "Create, check and export SQuAD2.0 question-answering datasets."
)]
pub struct Cli {
    /// Settings file (JSON); missing file means defaults
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Load settings, then dispatch to the subcommand.
    pub fn run(self) -> Result<()> {
        let config = EditorConfig::load_or_default(&self.config)?;
        match self.command {
            Commands::New(args)     => run_new(&config, args),
            Commands::Inspect(args) => run_inspect(&config, args),
            Commands::Export(args)  => run_export(&config, args),
        }
    }
}

/// Handles the `new` subcommand: create, then save once so the file exists.
fn run_new(config: &EditorConfig, args: NewArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| config.data_dir.clone());
    let mut session = EditorSession::create(
        &args.name,
        &dir,
        config.strategy(),
        Arc::new(FileStorage::new()),
        config.export,
    )
    .with_context(|| format!("Cannot create dataset '{}'", args.name))?;

    let root = session.tree().root();
    let report = session.save(root)?;
    println!("Created {}", session.tree().source_path().display());
    for path in report.written.iter().skip(1) {
        println!("  {}", path.display());
    }
    Ok(())
}

/// Handles the `inspect` subcommand.
fn run_inspect(config: &EditorConfig, args: InspectArgs) -> Result<()> {
    let session = EditorSession::open(
        &args.path,
        args.strategy(config.strategy()),
        Arc::new(FileStorage::new()),
        config.export,
    )
    .with_context(|| format!("Cannot open '{}'", args.path.display()))?;

    let tree = session.tree();
    println!("{}", tree.summary(tree.root())?);
    for &article in tree.children(tree.root())? {
        println!("  [{}] {}", tree.row(article)?.committed(), tree.summary(article)?);
        for &paragraph in tree.children(article)? {
            let view = tree.paragraph(paragraph)?;
            let mark = if view.is_valid() { " " } else { "!" };
            println!("   {mark} {} {}", paragraph, view.summary());
        }
    }

    let errors = tree.errors();
    if errors.is_empty() {
        println!("\nNo validation errors.");
    } else {
        println!("\n{} validation error(s):", errors.len());
        for (id, message) in &errors {
            println!("  {}", describe(tree, *id, message));
        }
    }
    Ok(())
}

/// Handles the `export` subcommand.
fn run_export(config: &EditorConfig, args: ExportArgs) -> Result<()> {
    let mut session = EditorSession::open(
        &args.path,
        config.strategy(),
        Arc::new(FileStorage::new()),
        args.export_config(config.export),
    )
    .with_context(|| format!("Cannot open '{}'", args.path.display()))?;

    let root = session.tree().root();
    let report = session
        .save(root)
        .with_context(|| format!("Cannot export '{}'", args.path.display()))?;

    for path in &report.written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// "question #12 'Where?': Some answer of this question ..."
fn describe(tree: &EditorTree, id: NodeId, message: &str) -> String {
    let label = tree.kind(id).map(|k| k.label()).unwrap_or("node");
    let text  = tree.row(id).map(|r| r.committed()).unwrap_or("");
    format!("{label} {id} {text:?}: {message}")
}
