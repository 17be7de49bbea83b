//! Configuration for BakForge

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Target database
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Backup-file scanning
    #[serde(default)]
    pub scan: ScanConfig,
    /// Record synthesis
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Bulk loading
    #[serde(default)]
    pub loader: LoaderConfig,
}

impl Config {
    /// Load configuration from a TOML file, apply environment overrides,
    /// then validate everything in one pass.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let mut config: Config = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over the config file so runs
    /// can be re-targeted without editing TOML.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(db) = std::env::var("BAKFORGE_DATABASE") {
            self.database.database = PathBuf::from(db);
        }
        if let Ok(v) = std::env::var("BAKFORGE_TARGET_RECORDS") {
            self.generator.target_record_count = v
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid BAKFORGE_TARGET_RECORDS '{}': {}", v, e))?;
        }
        if let Ok(v) = std::env::var("BAKFORGE_BATCH_SIZE") {
            self.loader.batch_size = v
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid BAKFORGE_BATCH_SIZE '{}': {}", v, e))?;
        }
        if let Ok(v) = std::env::var("BAKFORGE_CHUNK_SIZE") {
            self.scan.chunk_size_bytes = v
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid BAKFORGE_CHUNK_SIZE '{}': {}", v, e))?;
        }
        Ok(())
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        if self.database.database.as_os_str().is_empty() {
            errors.push("database path must not be empty".to_string());
        }

        if self.scan.chunk_size_bytes == 0 {
            errors.push("chunk_size_bytes must be positive".to_string());
        }
        if self.scan.overlap_bytes >= self.scan.chunk_size_bytes {
            errors.push("overlap_bytes must be smaller than chunk_size_bytes".to_string());
        }
        if self.scan.workers == 0 {
            errors.push("workers must be positive".to_string());
        }

        if self.generator.target_record_count == 0 {
            errors.push("target_record_count must be positive".to_string());
        }
        if self.generator.min_year > self.generator.max_year {
            errors.push("min_year must not exceed max_year".to_string());
        }
        if self.generator.default_year < self.generator.min_year
            || self.generator.default_year > self.generator.max_year
        {
            errors.push("default_year must fall within [min_year, max_year]".to_string());
        }
        if self.generator.min_amount >= self.generator.max_amount {
            errors.push("min_amount must be smaller than max_amount".to_string());
        }
        if !(0.0..=1.0).contains(&self.generator.venta_probability) {
            errors.push("venta_probability must be between 0.0 and 1.0".to_string());
        }
        if self.generator.agent_count == 0 {
            errors.push("agent_count must be positive".to_string());
        }

        if self.loader.batch_size == 0 {
            errors.push("batch_size must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

/// Target database configuration.
///
/// The loader writes to an embedded SQLite file. The server fields are
/// accepted for compatibility with configs written for server-backed
/// deployments; when set, the loader logs a warning and ignores them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the database file
    pub database: PathBuf,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("ventas.db"),
            host: None,
            port: None,
            user: None,
            password: None,
        }
    }
}

/// Backup-file scanning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Bytes read per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size_bytes: usize,
    /// Tail of the previous chunk prepended to the next one, to catch
    /// candidates straddling a chunk boundary. Zero disables overlap.
    #[serde(default = "default_overlap")]
    pub overlap_bytes: usize,
    /// Extraction worker threads (1 = sequential)
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Per-chunk candidate caps, keeping memory bounded on garbage-dense
    /// input where the loose patterns match constantly
    #[serde(default = "default_max_dates")]
    pub max_dates_per_chunk: usize,
    #[serde(default = "default_max_amounts")]
    pub max_amounts_per_chunk: usize,
    #[serde(default = "default_max_names")]
    pub max_names_per_chunk: usize,
    #[serde(default = "default_max_products")]
    pub max_products_per_chunk: usize,
    #[serde(default = "default_max_codes")]
    pub max_codes_per_chunk: usize,
    #[serde(default = "default_max_emails")]
    pub max_emails_per_chunk: usize,
    #[serde(default = "default_max_phones")]
    pub max_phones_per_chunk: usize,
}

fn default_chunk_size() -> usize {
    4 * 1024 * 1024
}

fn default_overlap() -> usize {
    4096
}

fn default_workers() -> usize {
    4
}

fn default_max_dates() -> usize {
    50
}

fn default_max_amounts() -> usize {
    100
}

fn default_max_names() -> usize {
    50
}

fn default_max_products() -> usize {
    30
}

fn default_max_codes() -> usize {
    50
}

fn default_max_emails() -> usize {
    50
}

fn default_max_phones() -> usize {
    50
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            chunk_size_bytes: default_chunk_size(),
            overlap_bytes: default_overlap(),
            workers: default_workers(),
            max_dates_per_chunk: default_max_dates(),
            max_amounts_per_chunk: default_max_amounts(),
            max_names_per_chunk: default_max_names(),
            max_products_per_chunk: default_max_products(),
            max_codes_per_chunk: default_max_codes(),
            max_emails_per_chunk: default_max_emails(),
            max_phones_per_chunk: default_max_phones(),
        }
    }
}

/// Record synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of sale records to fabricate
    #[serde(default = "default_target_records")]
    pub target_record_count: usize,
    /// Sanity bounds on extracted dates; anything outside is dropped
    #[serde(default = "default_min_year")]
    pub min_year: i32,
    #[serde(default = "default_max_year")]
    pub max_year: i32,
    /// Year used when the extracted date pool is empty
    #[serde(default = "default_default_year")]
    pub default_year: i32,
    /// Sanity bounds on extracted amounts; anything outside is dropped
    #[serde(default = "default_min_amount")]
    pub min_amount: f64,
    #[serde(default = "default_max_amount")]
    pub max_amount: f64,
    /// Probability of a record being a regular sale (the rest are tolling)
    #[serde(default = "default_venta_probability")]
    pub venta_probability: f64,
    /// Caps on master tables seeded from extracted candidates
    #[serde(default = "default_max_seeded_products")]
    pub max_products: usize,
    #[serde(default = "default_max_seeded_clients")]
    pub max_clients: usize,
    /// Agents are always synthetic
    #[serde(default = "default_agent_count")]
    pub agent_count: usize,
    /// RNG seed for reproducible runs (random when unset)
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_target_records() -> usize {
    100_000
}

fn default_min_year() -> i32 {
    2020
}

fn default_max_year() -> i32 {
    2025
}

fn default_default_year() -> i32 {
    2024
}

fn default_min_amount() -> f64 {
    100.0
}

fn default_max_amount() -> f64 {
    10_000_000.0
}

fn default_venta_probability() -> f64 {
    0.75
}

fn default_max_seeded_products() -> usize {
    500
}

fn default_max_seeded_clients() -> usize {
    1000
}

fn default_agent_count() -> usize {
    20
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            target_record_count: default_target_records(),
            min_year: default_min_year(),
            max_year: default_max_year(),
            default_year: default_default_year(),
            min_amount: default_min_amount(),
            max_amount: default_max_amount(),
            venta_probability: default_venta_probability(),
            max_products: default_max_seeded_products(),
            max_clients: default_max_seeded_clients(),
            agent_count: default_agent_count(),
            seed: None,
        }
    }
}

/// Bulk loading configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Records per insert transaction. A mid-run failure loses at most one
    /// batch; prior batches stay committed.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_batch_size() -> usize {
    5000
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}
