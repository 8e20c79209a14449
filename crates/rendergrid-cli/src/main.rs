//! rendergrid CLI
//!
//! Loads a batch plan, wires the telemetry probe and process runtime into
//! the scheduler, runs the batch to completion, and reports the outcome.

use anyhow::Context;
use clap::Parser;
use rendergrid_core::{expand_jobs, Config};
use rendergrid_runtime::{ProcessRuntime, ProcessRuntimeConfig};
use rendergrid_scheduler::{RenderScheduler, SmiProbe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// rendergrid - admission-controlled GPU scheduler for batch rendering
#[derive(Parser, Debug)]
#[command(name = "rendergrid")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the run configuration (TOML)
    #[arg(long)]
    config: PathBuf,

    /// Enumerate the job plan without launching anything
    #[arg(long)]
    dry_run: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting rendergrid v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    let jobs = expand_jobs(&config.plan);
    info!(
        jobs = jobs.len(),
        frames = config.plan.end_frame - config.plan.start_frame + 1,
        layers = config.plan.layers.len(),
        "Job plan expanded"
    );

    if cli.dry_run {
        for job in &jobs {
            println!("{}  ->  {}", job, job.output_path.display());
        }
        return Ok(());
    }

    std::fs::create_dir_all(&config.plan.output_dir)
        .with_context(|| format!("Failed to create {}", config.plan.output_dir.display()))?;

    let probe = Arc::new(SmiProbe::new());
    let runtime = Arc::new(ProcessRuntime::new(ProcessRuntimeConfig::from(
        &config.render,
    )));
    let mut scheduler = RenderScheduler::new(&config.gpu, probe, runtime);

    let started = Instant::now();
    let report = scheduler.run(jobs).await;
    let elapsed = started.elapsed();

    info!(
        "Render batch took: {}min {:.1}s",
        elapsed.as_secs() / 60,
        elapsed.as_secs_f64() % 60.0
    );
    info!(
        total = report.total,
        launched = report.launched,
        succeeded = report.succeeded,
        failed = report.failed.len(),
        launch_failed = report.launch_failed.len(),
        starved = report.starved.len(),
        "Run complete"
    );

    for (job, code) in &report.failed {
        error!(job = %job, code = ?code, "Job failed");
    }
    for job in &report.launch_failed {
        error!(job = %job, "Job never started");
    }
    for job in &report.starved {
        error!(job = %job, "Job starved out of admission attempts");
    }

    if !report.all_succeeded() {
        std::process::exit(1);
    }

    Ok(())
}
