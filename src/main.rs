//! CLI entry point for pattern discovery.
//!
//! Provides commands for initializing settings, inspecting them, and running
//! discovery over source trees or issue exports. Reports are JSON.

use anyhow::Context;
use clap::{
    Args, Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use console::style;
use pattern_learner::parsing::collect_code_nodes;
use pattern_learner::{
    DiscoveryError, DiscoveryReport, PatternLearner, Settings, documents::load_documents,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::Level;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Unsupervised pattern discovery for code and issues
#[derive(Parser)]
#[command(
    name = "pattern-learner",
    version = env!("CARGO_PKG_VERSION"),
    about = "Discover recurring patterns in code and issue text",
    long_about = "Cluster syntax nodes or issue documents with K-means and report named patterns and anomalies.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log progress and clustering details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
enum Commands {
    /// Initialize project
    #[command(about = "Set up .pattern-learner directory with default configuration")]
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration
    #[command(about = "Display effective settings")]
    Config,

    /// Discover structural patterns in source code
    #[command(about = "Cluster functions and types found under PATH")]
    Code {
        /// File or directory to analyze
        path: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Discover topical patterns in issues
    #[command(about = "Cluster issues from a JSON export")]
    Issues {
        /// JSON array of {id, title, body, labels}
        file: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Number of clusters (chosen by silhouette when omitted)
    #[arg(short, long)]
    k: Option<usize>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Report plus enough context to resolve member indices.
#[derive(Serialize)]
struct RunOutput<'a, T: Serialize> {
    report: &'a DiscoveryReport,
    entities: Vec<T>,
}

#[derive(Serialize)]
struct NodeRef<'a> {
    name: &'a str,
    kind: &'a str,
    file: String,
    line: u32,
}

#[derive(Serialize)]
struct IssueRef<'a> {
    id: &'a str,
    title: &'a str,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {e:#}", style("Error:").red().bold());
        if let Some(discovery) = e.downcast_ref::<DiscoveryError>() {
            for suggestion in discovery.recovery_suggestions() {
                eprintln!("  - {suggestion}");
            }
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Settings::load().context("loading configuration")?,
    };

    init_logging(cli.verbose || settings.debug);

    match cli.command {
        Commands::Init { force } => {
            let path = Settings::init_config_file(".", force)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            println!("Created configuration file at: {}", path.display());
            println!("Edit this file to customize your settings.");
        }

        Commands::Config => {
            println!("{}", settings.to_toml()?);
        }

        Commands::Code { path, run: args } => {
            apply_overrides(&mut settings, &args);
            let collection = collect_code_nodes(&path, &settings.discovery)?;

            let learner = PatternLearner::new(settings);
            let mut rng = make_rng(learner.settings());
            let report = learner.discover_code(&collection.nodes, &mut rng);

            let entities: Vec<NodeRef> = collection
                .nodes
                .iter()
                .map(|node| NodeRef {
                    name: &node.name,
                    kind: node.kind.as_str(),
                    file: node.file_path.display().to_string(),
                    line: node.line_start,
                })
                .collect();
            emit(&RunOutput { report: &report, entities }, args.output.as_deref())?;

            if collection.skipped_files > 0 {
                eprintln!(
                    "{} {} files could not be parsed",
                    style("Note:").yellow(),
                    collection.skipped_files
                );
            }
            print_summary(&report);
        }

        Commands::Issues { file, run: args } => {
            apply_overrides(&mut settings, &args);
            let documents = load_documents(&file)?;

            let learner = PatternLearner::new(settings);
            let mut rng = make_rng(learner.settings());
            let report = learner.discover_documents(&documents, &mut rng);

            let entities: Vec<IssueRef> = documents
                .iter()
                .map(|document| IssueRef {
                    id: &document.id,
                    title: &document.title,
                })
                .collect();
            emit(&RunOutput { report: &report, entities }, args.output.as_deref())?;
            print_summary(&report);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn apply_overrides(settings: &mut Settings, args: &RunArgs) {
    if args.k.is_some() {
        settings.clustering.k = args.k;
    }
    if args.seed.is_some() {
        settings.clustering.seed = args.seed;
    }
}

fn make_rng(settings: &Settings) -> StdRng {
    match settings.clustering.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn emit<T: Serialize>(output: &T, path: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(output).map_err(DiscoveryError::from)?;
    match path {
        Some(path) => {
            std::fs::write(path, json).map_err(|source| DiscoveryError::FileWrite {
                path: path.to_path_buf(),
                source,
            })?;
            eprintln!("Report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn print_summary(report: &DiscoveryReport) {
    eprintln!(
        "{} {} entities, k = {}, silhouette {:.3}",
        style("Summary:").cyan().bold(),
        report.entity_count,
        report.k,
        report.quality.silhouette
    );
    for pattern in &report.patterns {
        eprintln!(
            "  {:<12} {:<40} size {:>4}  confidence {:.2}",
            pattern.id,
            pattern.name,
            pattern.size,
            pattern.confidence
        );
    }
}
