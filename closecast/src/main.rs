use anyhow::Context;
use chrono::Local;
use clap::Parser;
use closecast::config::PipelineConfig;
use closecast::pipeline::ForecastPipeline;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file; unset fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Price history CSV with Date and Close columns
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Forecast ledger CSV, read and then overwritten
    #[arg(short, long)]
    ledger: Option<PathBuf>,

    /// Directory receiving chart files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of business days to forecast
    #[arg(long)]
    horizon: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let started = Instant::now();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(input) = cli.input {
        config.input_path = input;
    }
    if let Some(ledger) = cli.ledger {
        config.ledger_path = ledger;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(horizon) = cli.horizon {
        config.horizon = horizon;
    }

    let pipeline = ForecastPipeline::new(config).context("invalid configuration")?;
    let report = pipeline.run().context("forecast run failed")?;

    println!("Estimated differencing value: {}", report.differencing.n_diffs);
    println!();
    println!("{}", report.metrics);
    println!();
    println!("{}", report.model_summary);

    println!("Next {} business days:", report.future.len());
    for record in &report.future {
        println!(
            "  {}  {:.4}  [{:.4}, {:.4}]",
            record.date, record.forecast, record.interval.0, record.interval.1
        );
    }

    let elapsed = started.elapsed().as_secs();
    println!(
        "\nSuccess! Your forecast has been updated in {} minutes and {} seconds on {}",
        (elapsed % 3600) / 60,
        elapsed % 60,
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    Ok(())
}
