//! Configuration resolution for huemap.
//!
//! Priority per field: command-line flag (or its environment variable, via
//! clap's env fallback) > TOML config file > compiled default. The config
//! file defaults to `huemap/config.toml` under the user config directory;
//! an absent file falls through to defaults, a broken one is an error.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::services::subdivision::DEFAULT_MIN_SPAN;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5740;
pub const DEFAULT_ORACLE_URL: &str = "https://www.thecolorapi.com";
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 30;

/// Command-line interface
#[derive(Debug, Default, Parser)]
#[command(name = "huemap", version, about = "Hue wheel segmentation service")]
pub struct Cli {
    /// Host address to bind
    #[arg(long, env = "HUEMAP_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "HUEMAP_PORT")]
    pub port: Option<u16>,

    /// Base URL of the color-naming oracle
    #[arg(long, env = "HUEMAP_ORACLE_URL")]
    pub oracle_url: Option<String>,

    /// Oracle request timeout in seconds
    #[arg(long, env = "HUEMAP_ORACLE_TIMEOUT_SECS")]
    pub oracle_timeout_secs: Option<u64>,

    /// Finest subdivision span in degrees
    #[arg(long, env = "HUEMAP_MIN_SPAN")]
    pub min_span_degrees: Option<f64>,

    /// Explicit TOML config file path
    #[arg(long, env = "HUEMAP_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Optional fields loadable from the TOML config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub oracle_url: Option<String>,
    pub oracle_timeout_secs: Option<u64>,
    pub min_span_degrees: Option<f64>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub oracle_url: String,
    pub oracle_timeout_secs: u64,
    pub min_span_degrees: f64,
}

impl Config {
    pub fn resolve(cli: &Cli) -> Result<Self> {
        let file = load_file_config(cli.config.as_deref())?;

        Ok(Self {
            host: cli
                .host
                .clone()
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            oracle_url: cli
                .oracle_url
                .clone()
                .or(file.oracle_url)
                .unwrap_or_else(|| DEFAULT_ORACLE_URL.to_string()),
            oracle_timeout_secs: cli
                .oracle_timeout_secs
                .or(file.oracle_timeout_secs)
                .unwrap_or(DEFAULT_ORACLE_TIMEOUT_SECS),
            min_span_degrees: cli
                .min_span_degrees
                .or(file.min_span_degrees)
                .unwrap_or(DEFAULT_MIN_SPAN),
        })
    }
}

fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match dirs::config_dir() {
            Some(dir) => dir.join("huemap").join("config.toml"),
            None => return Ok(FileConfig::default()),
        },
    };

    if !path.exists() {
        if explicit.is_some() {
            bail!("Config file not found: {}", path.display());
        }
        return Ok(FileConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let parsed = toml::from_str(&content)
        .with_context(|| format!("Invalid TOML in {}", path.display()))?;
    info!("Loaded config file {}", path.display());
    Ok(parsed)
}
