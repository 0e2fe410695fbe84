use anyhow::{bail, Context, Result};
use breakdetect_analysis::{format_collision_report, CollisionAnalyzer};
use breakdetect_manifest::{Manifest, DEFAULT_MANIFEST_NAME};
use breakdetect_sim::{ExecutionMode, MonteCarloDriver};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// breakdetect - Monte Carlo ALT simulation of resistor break-sensor networks
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a breakdetect.toml describing the default five-sensor network
    Init {
        /// Destination (defaults to ./breakdetect.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run the Monte Carlo simulation
    Run {
        /// Configuration file (defaults to ./breakdetect.toml, else the built-in network)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of simulations to run
        #[arg(short = 'n', long)]
        simulations: Option<usize>,

        /// Use the worker pool instead of a single thread
        #[arg(short = 'm', long)]
        multicore: bool,

        /// Worker pool size (implies --multicore)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Results file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cycle ceiling for each trial
        #[arg(long)]
        cycles: Option<u64>,

        /// Master seed for a reproducible batch
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Check a results file for readings shared by different failure sets
    Analyze {
        /// Results file to analyze
        results: PathBuf,

        /// Readings within this many ohms are treated as identical
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// Configuration file supplying the default tolerance
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// List every collision
        #[arg(short, long)]
        details: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt().with_env_filter(log_level).init();

    match cli.command {
        Commands::Init { path, force } => {
            let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST_NAME));
            init_manifest(&path, force)?;
        }

        Commands::Run {
            config,
            simulations,
            multicore,
            jobs,
            output,
            cycles,
            seed,
        } => {
            let mut manifest = load_manifest(config.as_deref())?;
            let sim = &mut manifest.simulation;
            if let Some(n) = simulations {
                sim.simulations = n;
            }
            if multicore || jobs.is_some() {
                sim.mode = ExecutionMode::Pooled;
            }
            if jobs.is_some() {
                sim.workers = jobs;
            }
            if let Some(output) = output {
                sim.output = output;
            }
            if cycles.is_some() {
                sim.cycle_ceiling = cycles;
            }
            if seed.is_some() {
                sim.seed = seed;
            }
            run_simulation(&manifest)?;
        }

        Commands::Analyze {
            results,
            tolerance,
            config,
            details,
        } => {
            let tolerance = match tolerance {
                Some(t) => t,
                None => load_manifest(config.as_deref())?.analysis.tolerance,
            };
            analyze_results(&results, tolerance, details)?;
        }
    }

    Ok(())
}

/// Load the configuration, falling back to ./breakdetect.toml and then the built-in network
fn load_manifest(path: Option<&Path>) -> Result<Manifest> {
    let manifest = match path {
        Some(path) => breakdetect_manifest::from_path(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None if Path::new(DEFAULT_MANIFEST_NAME).exists() => {
            info!("Using {}", DEFAULT_MANIFEST_NAME);
            breakdetect_manifest::from_path(DEFAULT_MANIFEST_NAME)
                .with_context(|| format!("Failed to load {}", DEFAULT_MANIFEST_NAME))?
        }
        None => {
            info!("No configuration given, using the built-in five-sensor network");
            Manifest::default_network()
        }
    };
    Ok(manifest)
}

/// Write the default manifest
fn init_manifest(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let manifest = Manifest::default_network();
    fs::write(path, manifest.to_toml_string()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Wrote {}", path.display());
    println!(
        "   {} parts, {} simulations of {} cycles",
        manifest.parts.len(),
        manifest.simulation.simulations,
        manifest.cycle_ceiling()
    );
    Ok(())
}

/// Run the configured batch and report where the results went
fn run_simulation(manifest: &Manifest) -> Result<()> {
    manifest.validate().context("Invalid configuration")?;

    let config = manifest.simulation_config();
    let output = &manifest.simulation.output;
    match config.mode {
        ExecutionMode::Sequential => println!(
            "Running single process:  {} simulations, output saved to '{}'",
            config.num_simulations,
            output.display()
        ),
        ExecutionMode::Pooled => println!(
            "Running {} worker threads:  {} simulations, output saved to '{}'",
            config.worker_count(),
            config.num_simulations,
            output.display()
        ),
    }

    let start = Instant::now();
    let summary = MonteCarloDriver::new(config)
        .run_to_path(output)
        .context("Simulation failed")?;

    println!(
        "✅ {} trials, {} readings written to '{}'",
        summary.trials,
        summary.rows,
        output.display()
    );
    if summary.incomplete_trials > 0 {
        println!(
            "⚠️  {} trials hit the cycle ceiling with parts still intact",
            summary.incomplete_trials
        );
    }
    println!("Elapsed time: {:.3} s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Report collisions in a results file
fn analyze_results(results: &Path, tolerance: f64, details: bool) -> Result<()> {
    let mut analyzer = CollisionAnalyzer::new(results).with_tolerance(tolerance)?;
    let collisions = analyzer
        .check_obvious_collisions()
        .with_context(|| format!("Failed to analyze {}", results.display()))?;

    println!(
        "Analyzed {} readings ({} distinct) from '{}'",
        analyzer.rows_read(),
        analyzer.distinct_readings(),
        results.display()
    );
    print!("{}", format_collision_report(&collisions, details));
    println!("Collisions: {}", collisions.len());
    Ok(())
}
