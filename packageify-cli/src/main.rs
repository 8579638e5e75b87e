//! Packageify CLI Entry Point
//!
//! `packageify SOURCE_DIR MAPPING_FILE DEST_DIR` moves every unit listed in
//! the mapping file into its namespace directory under DEST_DIR and copies
//! the remaining top-level files alongside.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use packageify_transform::{
    DirectoryPolicy, PassthroughAction, ReorganizationPlan, Reorganizer, ReorganizerConfig,
    RunPaths, RunSummary,
};
use packageify_utils::logging::{init_logging, LogLevel, LoggerConfig};
use packageify_utils::ConfigBuilder;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "packageify")]
#[command(about = "Reorganize a flat folder of source files into namespace directories")]
#[command(long_about = "Reads a mapping file of `Unit;namespace.path` lines, moves each Unit file into\n\
the directory derived from its namespace, writes a namespace declaration at the top,\n\
injects references to other mapped units it mentions, and copies every other\n\
top-level file into the destination unchanged.")]
#[command(version)]
struct Cli {
    /// SOURCE_DIR MAPPING_FILE DEST_DIR
    #[arg(value_name = "PATHS")]
    paths: Vec<PathBuf>,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Pipeline stages to run
    #[arg(short = 'm', long, value_enum)]
    mode: Option<ModeChoice>,

    /// Managed file extension, without the dot
    #[arg(short = 'e', long)]
    extension: Option<String>,

    /// Do not inject reference lines
    #[arg(long)]
    no_references: bool,

    /// Do not copy non-managed files
    #[arg(long)]
    no_passthrough: bool,

    /// What to do with subdirectories of the source folder
    #[arg(long, value_enum)]
    directories: Option<DirectoryChoice>,

    /// Write the body with a single trailing newline instead of the legacy layout
    #[arg(long)]
    normalize_body: bool,

    /// Print the plan without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Print the plan or run summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short = 'q', long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeChoice {
    /// Move files only
    Move,
    /// Move files and write namespace declarations
    Rewrite,
    /// Move, rewrite, inject references and copy passthrough files
    Full,
}

impl ModeChoice {
    fn overrides(self) -> Value {
        let (rewrite, references, passthrough) = match self {
            ModeChoice::Move => (false, false, false),
            ModeChoice::Rewrite => (true, false, false),
            ModeChoice::Full => (true, true, true),
        };
        json!({
            "rewrite_header": rewrite,
            "inject_references": references,
            "copy_passthrough": passthrough,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectoryChoice {
    /// Leave subdirectories behind with a warning
    Skip,
    /// Fail the run
    Error,
    /// Copy subdirectories recursively
    Recursive,
}

impl From<DirectoryChoice> for DirectoryPolicy {
    fn from(choice: DirectoryChoice) -> Self {
        match choice {
            DirectoryChoice::Skip => DirectoryPolicy::Skip,
            DirectoryChoice::Error => DirectoryPolicy::Error,
            DirectoryChoice::Recursive => DirectoryPolicy::Recursive,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LogLevel::Debug
    } else if cli.quiet {
        LogLevel::Error
    } else {
        LogLevel::Info
    };
    if let Err(e) = init_logging(LoggerConfig {
        level,
        ..Default::default()
    }) {
        eprintln!("Warning: {}", e);
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let paths = RunPaths::from_args(cli.paths.iter().cloned())?;
    let config = build_config(cli)?;
    let reorganizer = Reorganizer::new(paths, config)?;

    if cli.dry_run {
        let plan = reorganizer.plan()?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            print_plan(&plan);
        }
        return Ok(());
    }

    let summary = reorganizer.run()?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

/// Defaults, then the config file, then the mode preset, then single flags
fn build_config(cli: &Cli) -> anyhow::Result<ReorganizerConfig> {
    let mut builder = ConfigBuilder::<ReorganizerConfig>::new();

    if let Some(path) = &cli.config {
        builder = builder
            .load_file(path)
            .with_context(|| format!("loading config {}", path.display()))?;
    }

    if let Some(mode) = cli.mode {
        builder = builder.merge_value(mode.overrides())?;
    }

    let flags = json!({
        "managed_extension": cli.extension,
        "inject_references": cli.no_references.then_some(false),
        "copy_passthrough": cli.no_passthrough.then_some(false),
        "legacy_body_layout": cli.normalize_body.then_some(false),
        "directory_policy": cli.directories.map(DirectoryPolicy::from),
    });

    Ok(builder.merge_value(flags)?.build())
}

fn print_plan(plan: &ReorganizationPlan) {
    println!("Planned placements ({}):", plan.placements.len());
    for placement in &plan.placements {
        println!("   {} -> {}", placement.source.display(), placement.target.display());
        for reference in &placement.references {
            println!("      + {}", reference);
        }
    }

    if !plan.passthrough.is_empty() {
        println!("Passthrough ({}):", plan.passthrough.len());
        for action in &plan.passthrough {
            print_action(action);
        }
    }

    print_warnings(&plan.unmapped_units, &plan.duplicate_units);
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Placed {} units, copied {} passthrough entries in {:.2}s",
        summary.units_written(),
        summary.entries_copied(),
        summary.duration_seconds()
    );
    for placement in &summary.placements {
        println!("   {} -> {}", placement.unit_name, placement.target.display());
    }
    for action in summary.passthrough.iter().filter(|a| a.is_skip()) {
        print_action(action);
    }
    print_warnings(&summary.unmapped_units, &summary.duplicate_units);
}

fn print_action(action: &PassthroughAction) {
    match action {
        PassthroughAction::Copy { source, target } => {
            println!("   copy {} -> {}", source.display(), target.display());
        }
        PassthroughAction::CopyTree { source, target } => {
            println!("   copy tree {} -> {}", source.display(), target.display());
        }
        PassthroughAction::Skip { source, reason } => {
            println!("   skip {} ({})", source.display(), reason);
        }
    }
}

fn print_warnings(unmapped: &[String], duplicates: &[String]) {
    if !unmapped.is_empty() {
        println!("Unmapped units: {}", unmapped.join(", "));
    }
    if !duplicates.is_empty() {
        println!("Duplicate units: {}", duplicates.join(", "));
    }
}
