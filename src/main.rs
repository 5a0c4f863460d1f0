//! kbjoin: sync a markdown knowledge base into a cloze flashcard collection.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use kbjoin::config::Config;
use kbjoin::store::json::JsonCollection;
use kbjoin::store::memory::MemoryCollection;
use kbjoin::sync::{self, Frontend, Synchronizer};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kbjoin")]
#[command(about = "Turn markdown headings into cloze flashcards", long_about = None)]
struct Args {
    /// Source tree root (must contain the root marker)
    #[arg(value_name = "ROOT")]
    root: PathBuf,

    /// Collection directory to write records and media into
    #[arg(long, short = 'c', value_name = "DIR", default_value = "collection")]
    collection: PathBuf,

    /// Configuration file (defaults to kbjoin.toml in the working directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Heading levels that produce records
    #[arg(long, short = 'l', value_delimiter = ',', value_name = "LEVEL")]
    levels: Vec<usize>,

    /// Minimum directory depth for documents to be imported
    #[arg(long, value_name = "N")]
    min_depth: Option<usize>,

    /// File extensions to match
    #[arg(long, short = 'e', value_name = "EXT")]
    ext: Vec<String>,

    /// End every section at the next heading of any level
    #[arg(long)]
    flat: bool,

    /// Convert into a throwaway in-memory collection
    #[arg(long)]
    dry_run: bool,

    /// Log every skipped and imported heading
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// Prints the outcome of a pass on stdout.
struct ConsoleFrontend;

impl Frontend for ConsoleFrontend {
    fn show_summary(&mut self, summary: &str) {
        println!("{summary}");
    }

    fn refresh_decks(&mut self) {
        tracing::debug!("Deck list changed");
    }
}

/// Initialize tracing with output to stderr, keeping stdout for the summary
fn init_tracing(verbose: bool) {
    let default = if verbose { "kbjoin=debug" } else { "kbjoin=info" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default.into()),
    );
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &Args) -> kbjoin::Result<Config> {
    let mut cfg = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load(),
    };

    // Override config with command line args
    if !args.levels.is_empty() {
        cfg.trigger_levels.clone_from(&args.levels);
    }
    if let Some(depth) = args.min_depth {
        cfg.min_depth = depth;
    }
    if !args.ext.is_empty() {
        cfg.file_extensions.clone_from(&args.ext);
    }
    if args.flat {
        cfg.flat_sections = true;
    }
    Ok(cfg)
}

fn run(args: &Args) -> kbjoin::Result<()> {
    let cfg = load_config(args)?;
    let mut frontend = ConsoleFrontend;
    if args.dry_run {
        let mut store = MemoryCollection::new();
        let report = Synchronizer::new(&cfg, &mut store)?
            .dry_run(true)
            .run(&args.root)?;
        frontend.show_summary(&report.summary());
    } else {
        let mut store = JsonCollection::open(&args.collection)?;
        sync::run(&args.root, &cfg, &mut store, &mut frontend)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
