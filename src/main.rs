use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

use bike_pipeline::config::Config;
use bike_pipeline::logging;
use bike_pipeline::pipeline::{Pipeline, StageKind, StageReport};

#[derive(Parser)]
#[command(name = "bike_pipeline")]
#[command(about = "Clean, filter, aggregate, sort and enrich bicycle product records")]
#[command(version = "0.1.0")]
struct Cli {
    /// Config file (defaults to $BIKE_PIPELINE_CONFIG, then ./pipeline.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory that stage file names are resolved against
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Default)]
struct StageArgs {
    /// Override the stage's input file
    #[arg(long)]
    input: Option<PathBuf>,
    /// Override the stage's output file
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop incomplete records and deduplicate by model_id
    Clean(StageArgs),
    /// Keep in-stock mountain bikes within the price ceiling
    Filter(StageArgs),
    /// Count records per brand
    Aggregate(StageArgs),
    /// Sort by price then weight, keeping model_id, price_gbp and weight_kg
    Sort(StageArgs),
    /// Add price_per_weight to every record
    Transform(StageArgs),
    /// Run clean, then every stage that reads the cleaned data
    Run,
}

fn print_report(report: &StageReport) {
    println!("\n📊 Stage results for {}:", report.stage);
    println!("   Input file: {}", report.input_file.display());
    println!("   Records in: {}", report.input_records);
    println!("   Records out: {}", report.output_records);
    println!("   Output file: {}", report.output_file.display());
    println!(
        "   Completed at: {} ({:.3}s)",
        report.completed_at.to_rfc3339(),
        report.duration_secs
    );
}

fn run_single(pipeline: &Pipeline, kind: StageKind, args: StageArgs) -> anyhow::Result<()> {
    let report = pipeline
        .run(kind, args.input.as_deref(), args.output.as_deref())
        .with_context(|| format!("{} stage failed", kind))?;
    print_report(&report);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let log_guard = logging::init_logging();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir {
        config.paths.data_dir = data_dir;
    }
    let pipeline = Pipeline::new(config).context("invalid configuration")?;

    let result = match cli.command {
        Commands::Clean(args) => run_single(&pipeline, StageKind::Clean, args),
        Commands::Filter(args) => run_single(&pipeline, StageKind::Filter, args),
        Commands::Aggregate(args) => run_single(&pipeline, StageKind::Aggregate, args),
        Commands::Sort(args) => run_single(&pipeline, StageKind::Sort, args),
        Commands::Transform(args) => run_single(&pipeline, StageKind::Transform, args),
        Commands::Run => {
            println!("🚀 Running full pipeline...");
            pipeline
                .run_all()
                .map(|reports| {
                    reports.iter().for_each(print_report);
                    println!("\n✅ Full pipeline completed successfully!");
                })
                .context("pipeline run failed")
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("❌ {:#}", e);
        drop(log_guard);
        std::process::exit(1);
    }
    Ok(())
}
