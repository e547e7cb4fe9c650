use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::{RunMode, RunOverrides, RunRequest};
use mira_core::analysis;
use std::fs;
use std::path::{Path, PathBuf};

mod config;
mod plotting;
mod workflow;

#[derive(Parser)]
#[command(name = "mira")]
#[command(about = "Grow-chamber simulation harness", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation session
    Run {
        /// Path to the run request (YAML)
        #[arg(short, long, default_value = "mira-app/run.yaml")]
        config: PathBuf,

        /// Crop id from the catalog
        #[arg(long)]
        crop: Option<String>,

        /// Simulated hours per tick
        #[arg(short, long)]
        speed: Option<f64>,

        /// Number of ticks to run
        #[arg(short, long)]
        ticks: Option<u64>,

        /// Random seed for a reproducible session
        #[arg(long)]
        seed: Option<u64>,

        #[arg(long, value_enum)]
        mode: Option<RunMode>,

        /// Wall-clock period between ticks in realtime mode
        #[arg(long)]
        tick_interval_ms: Option<u64>,

        /// Directory of crop YAML files
        #[arg(long)]
        catalog_dir: Option<PathBuf>,

        /// Directory under which the run folder is created
        #[arg(short, long)]
        output_root: Option<PathBuf>,
    },
    /// List the crops in the catalog
    Crops {
        #[arg(long)]
        catalog_dir: Option<PathBuf>,
    },
    /// Print the summary of an existing time-series log
    Summarize {
        /// Path to the CSV written by a previous run
        log: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            crop,
            speed,
            ticks,
            seed,
            mode,
            tick_interval_ms,
            catalog_dir,
            output_root,
        } => {
            let request = RunRequest::load_or_default(&config)?.apply(RunOverrides {
                crop,
                speed,
                ticks,
                seed,
                mode,
                tick_interval_ms,
                catalog_dir,
                output_root,
            });
            run(request)
        }
        Commands::Crops { catalog_dir } => {
            let catalog = config::load_catalog(catalog_dir.as_deref())?;
            for crop in catalog.iter() {
                println!(
                    "{:<14} {:<14} {:>3} days  {:>6.1} g  {}",
                    crop.id, crop.name, crop.cycle_length, crop.target_yield, crop.description
                );
            }
            Ok(())
        }
        Commands::Summarize { log } => {
            let log_path = log.to_str().context("Log path is not valid UTF-8")?;
            let summary = analysis::summarize_log(log_path)?;
            workflow::print_run_summary(&summary);
            Ok(())
        }
    }
}

fn run(request: RunRequest) -> Result<()> {
    println!("--- MIRA Grow Chamber ---");

    let catalog = config::load_catalog(request.catalog_dir.as_deref())?;
    let crop = catalog.get(&request.crop)?.clone();

    let output_dir = request.output_root.join(format!(
        "{}_{}",
        crop.id,
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    ));
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    // Keep the effective request next to the results for traceability
    fs::write(
        Path::new(&output_dir).join("run.yaml"),
        serde_yaml::to_string(&request)?,
    )?;

    workflow::run_session(&request, crop, &output_dir)?;

    println!("\nRun complete. Results are in '{}'", output_dir.display());
    Ok(())
}
