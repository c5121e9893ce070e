use std::io;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use circontig::fasta::{read_fasta, write_fasta};
use circontig::mash::Mash;
use circontig::parser::load_gfa;
use circontig::pipeline::{self, Options, DEFAULT_MAX_DISTANCE};

/// Extract circular contigs from a GFA assembly graph
#[derive(Parser, Debug)]
#[command(name = "circontig", version, about)]
struct Cli {
    /// Input assembly GFA file (optionally gzipped)
    in_gfa: PathBuf,

    /// Minimum acceptable contig size in bp (default: no minimum size)
    #[arg(long)]
    min: Option<usize>,

    /// Maximum acceptable contig size in bp (default: no maximum size)
    #[arg(long)]
    max: Option<usize>,

    /// Query reference sequence(s) in FASTA format (default: none)
    #[arg(long)]
    query: Option<PathBuf>,

    /// Maximum acceptable Mash distance to a query sequence
    #[arg(long, default_value_t = DEFAULT_MAX_DISTANCE)]
    mash: f64,
}

fn main() -> anyhow::Result<()> {
    // Progress goes to stderr; stdout carries only the output FASTA.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    let graph = load_gfa(&cli.in_gfa)
        .with_context(|| format!("failed to load {}", cli.in_gfa.display()))?;

    let queries = match &cli.query {
        Some(path) => Some(
            read_fasta(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
        ),
        None => None,
    };

    let options = Options {
        min_size: cli.min,
        max_size: cli.max,
        queries,
        max_distance: cli.mash,
    };

    let contigs = pipeline::run(&graph, &options, &Mash::default())?;

    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    write_fasta(&contigs, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}
