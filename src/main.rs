//! BakForge command-line interface

use anyhow::{Context, Result};
use bakforge::config::Config;
use bakforge::db::BulkLoader;
use bakforge::progress::{print_run_summary, print_scan_summary, RunProgress};
use bakforge::scan::{CandidateSet, Scanner};
use bakforge::synth::{seed_masters, GeneratorReport, RecordGenerator, ValuePools};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::{Path, PathBuf};
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "bakforge")]
#[command(about = "Salvage text fragments from a corrupted SQL Server backup and forge a sales dataset around them", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "bakforge.toml")]
    config: PathBuf,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a backup file and rebuild the dataset seeded by what it yields
    Import {
        /// Path to the .bak file
        bak_file: PathBuf,

        /// Override the number of extraction worker threads
        #[arg(long)]
        workers: Option<usize>,

        /// Override the number of sale records to fabricate
        #[arg(long)]
        target: Option<usize>,

        /// Override the insert batch size
        #[arg(long)]
        batch_size: Option<usize>,

        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Suppress the progress bar and summaries
        #[arg(short, long)]
        quiet: bool,
    },

    /// Rebuild the dataset from defaults alone, without scanning anything
    Generate {
        /// Override the number of sale records to fabricate
        #[arg(long)]
        target: Option<usize>,

        /// RNG seed for a reproducible run
        #[arg(long)]
        seed: Option<u64>,

        /// Suppress the progress bar and summaries
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print aggregate counts and totals for an existing database
    Stats {
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Write a default configuration file
    Init {
        /// Where to write it
        #[arg(default_value = "bakforge.toml")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Import {
            bak_file,
            workers,
            target,
            batch_size,
            seed,
            quiet,
        } => {
            let mut config = load_config(&cli.config)?;
            if let Some(w) = workers {
                config.scan.workers = w;
            }
            if let Some(t) = target {
                config.generator.target_record_count = t;
            }
            if let Some(b) = batch_size {
                config.loader.batch_size = b;
            }
            if let Some(s) = seed {
                config.generator.seed = Some(s);
            }
            config.validate()?;
            run_import(&config, &bak_file, quiet)
        }
        Commands::Generate { target, seed, quiet } => {
            let mut config = load_config(&cli.config)?;
            if let Some(t) = target {
                config.generator.target_record_count = t;
            }
            if let Some(s) = seed {
                config.generator.seed = Some(s);
            }
            config.validate()?;
            run_generate(&config, quiet)
        }
        Commands::Stats { format } => {
            let config = load_config(&cli.config)?;
            run_stats(&config, &format)
        }
        Commands::Init { path } => run_init(&path),
    }
}

/// Read the config file if present; fall back to built-in defaults
/// (env overrides apply either way).
fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        Config::load(path)
    } else {
        info!(
            "Config file '{}' not found, using built-in defaults",
            path.display()
        );
        let mut config = Config::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }
}

fn run_import(config: &Config, bak_file: &Path, quiet: bool) -> Result<()> {
    let file_size = std::fs::metadata(bak_file)
        .with_context(|| format!("Cannot stat backup file '{}'", bak_file.display()))?
        .len();
    let total_chunks = file_size.div_ceil(config.scan.chunk_size_bytes as u64).max(1);

    info!(
        "Scanning '{}' ({} MB, {} chunks, {} workers)",
        bak_file.display(),
        file_size / 1_000_000,
        total_chunks,
        config.scan.workers
    );

    let progress = RunProgress::new(Some(total_chunks), quiet);
    let scanner = Scanner::new(config.scan.clone());
    let outcome = scanner
        .scan(bak_file, |bytes| progress.chunk_processed(bytes))
        .with_context(|| format!("Scan of '{}' failed", bak_file.display()))?;
    progress.finish();

    if !quiet {
        print_scan_summary(
            &outcome.candidates,
            outcome.chunks_processed,
            outcome.bytes_processed,
        );
    }

    build_dataset(config, &outcome.candidates, &progress, quiet)
}

fn run_generate(config: &Config, quiet: bool) -> Result<()> {
    info!("Generating dataset from defaults, no backup scan");
    let progress = RunProgress::new(None, quiet);
    build_dataset(config, &CandidateSet::default(), &progress, quiet)
}

/// Shared back half of import and generate: pools, masters, records, load.
fn build_dataset(
    config: &Config,
    candidates: &CandidateSet,
    progress: &RunProgress,
    quiet: bool,
) -> Result<()> {
    let pools = ValuePools::from_candidates(candidates, &config.generator);

    let mut rng = match config.generator.seed {
        Some(seed) => {
            info!("Using fixed RNG seed {}", seed);
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };

    let masters = seed_masters(candidates, &config.generator, &mut rng);
    let generator = RecordGenerator::new(&config.generator, &pools);
    let (records, report) = generator.generate(
        &masters,
        config.generator.target_record_count,
        &mut rng,
    );

    let mut loader = BulkLoader::open(&config.database, config.loader.batch_size)?;
    loader.create_schema()?;
    loader.load_masters(&masters)?;

    progress.start_load_phase(records.len());
    let written = loader.load_sales(&records, |_, committed| {
        progress.batch_committed(committed);
    })?;
    info!("Loaded {} sale records", written);

    let summary = loader.summary()?;
    warn_fabricated(&report);
    if !quiet {
        print_run_summary(&summary, &report, progress.elapsed_seconds());
    }
    Ok(())
}

fn warn_fabricated(report: &GeneratorReport) {
    warn!(
        "Dataset is fabricated: {} of {} records merely seeded by extracted \
         values, the rest fully synthetic. Do not treat it as recovered data.",
        report.seeded_records,
        report.total()
    );
}

fn run_stats(config: &Config, format: &str) -> Result<()> {
    if !config.database.database.exists() {
        anyhow::bail!(
            "Database '{}' does not exist; run import or generate first",
            config.database.database.display()
        );
    }

    let loader = BulkLoader::open(&config.database, config.loader.batch_size)?;
    let summary = loader.summary()?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        "text" => {
            println!("Productos: {}", summary.productos);
            println!("Clientes:  {}", summary.clientes);
            println!("Agentes:   {}", summary.agentes);
            println!("Ventas:    {}", summary.ventas);
            println!("Suma total: ${:.2}", summary.total_sum);
            if !summary.monthly.is_empty() {
                println!("\nPor mes:");
                for (mes, total) in &summary.monthly {
                    println!("  {:<12} ${:.2}", mes, total);
                }
            }
        }
        other => anyhow::bail!("Unknown format '{}', expected 'text' or 'json'", other),
    }
    Ok(())
}

fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("'{}' already exists, refusing to overwrite", path.display());
    }
    let config = Config::default();
    let toml_str = toml::to_string_pretty(&config)?;
    std::fs::write(path, toml_str)
        .with_context(|| format!("Failed to write '{}'", path.display()))?;
    println!("Wrote default configuration to '{}'", path.display());
    Ok(())
}
