use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use estimator_common::MetricsSnapshot;
use estimator_visualizer::render_convergence_chart;
use log::{info, LevelFilter};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// Command-line arguments for the history visualizer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input metrics history file (.json or .bin)
    #[arg(short, long)]
    input: PathBuf,

    /// Output chart file path (.png)
    #[arg(short, long, default_value = "convergence.png")]
    output: PathBuf,

    /// Width of the output chart in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Height of the output chart in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,
}

fn main() -> Result<()> {
    // Initialize logger
    Builder::from_default_env()
        .filter(None, LevelFilter::Info)
        .init();

    let args = Args::parse();
    info!("Reading metrics history from {}", args.input.display());

    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open input file: {}", args.input.display()))?;
    let reader = BufReader::new(file);

    let history: Vec<MetricsSnapshot> = match args.input.extension().and_then(|e| e.to_str()) {
        Some("bin") => bincode::deserialize_from(reader)
            .context("Failed to decode bincode metrics history")?,
        _ => serde_json::from_reader(reader).context("Failed to decode JSON metrics history")?,
    };
    info!("Loaded {} snapshots.", history.len());

    render_convergence_chart(&history, &args.output, args.width, args.height)?;
    info!("Convergence chart saved to {}", args.output.display());
    Ok(())
}
