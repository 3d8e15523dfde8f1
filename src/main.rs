// ==============================================================================
// main.rs - Disorder Consensus Entry Point
// ==============================================================================
// Description: Computes consensus disorder for every protein in a hand-off file
// Author: Matt Barham
// Created: 2026-10-05
// Modified: 2026-10-14
// Version: 1.1.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use disorder_consensus::config::ConsensusSettings;
use disorder_consensus::output::OutputWriter;
use disorder_consensus::parsers::PredictionParser;
use disorder_consensus::pipeline::ConsensusPipeline;
use disorder_consensus::processor::ConsensusProcessor;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON-lines predictor output (plain or gzip), or '-' for stdin
    input: String,

    /// Output file (.gz for compressed output); stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON consensus settings file
    #[arg(short, long, env = "DISORDER_CONSENSUS_CONFIG")]
    config: Option<PathBuf>,

    /// Dilation/erosion radius (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    radius: Option<i64>,

    /// Minimum disordered region length (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    min_region_length: Option<i64>,

    /// Compute the consensus even when some predictors produced no output
    #[arg(short, long)]
    force: bool,

    /// Also emit raw per-residue agreement (majority consensus)
    #[arg(short, long)]
    majority: bool,

    /// Proteins computed concurrently
    #[arg(short, long, default_value_t = 4)]
    threads: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (logs go to stderr, results may go to stdout)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "disorder_consensus=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Disorder consensus starting...");

    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => ConsensusSettings::from_path(path)?,
        None => ConsensusSettings::default(),
    };
    if let Some(radius) = args.radius {
        settings.radius = radius;
    }
    if let Some(min_region_length) = args.min_region_length {
        settings.min_region_length = min_region_length;
    }
    settings.force |= args.force;
    settings.majority |= args.majority;

    // Fail fast on bad settings, before reading any input
    let pipeline = ConsensusPipeline::from_settings(&settings).context("Invalid consensus settings")?;
    info!(
        "Consensus settings: radius={}, min_region_length={}, min_predictors={}, force={}",
        pipeline.config().radius,
        pipeline.config().min_region_length,
        pipeline.config().min_predictors,
        pipeline.config().force
    );

    let processor = ConsensusProcessor::new(pipeline, args.threads);
    let mut writer = OutputWriter::create(args.output.as_deref())?;

    let summary = if args.input == "-" {
        let reader = PredictionParser::open(std::io::stdin())?;
        let proteins = PredictionParser::parse_reader(reader).context("Failed to parse predictions from stdin")?;
        processor.process(proteins, &mut writer).await?
    } else {
        processor.process_file(Path::new(&args.input), &mut writer).await?
    };

    writer.finish()?;

    info!(
        "Processing complete: {} of {} proteins written",
        summary.output_count, summary.input_count
    );
    Ok(())
}
