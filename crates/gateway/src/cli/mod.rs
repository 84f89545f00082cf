pub mod config;

use clap::{Parser, Subcommand};

/// credcache: a TTL-bound session credential cache.
#[derive(Debug, Parser)]
#[command(name = "credcache", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server (default when no subcommand is given).
    Serve,
    /// Configuration utilities.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Print version information.
    Version,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Parse the config file and report any errors.
    Validate,
    /// Dump the resolved configuration (with defaults) as TOML.
    Show,
}

// ── Config loading helper ─────────────────────────────────────────────

/// Load the configuration from the path in `CC_CONFIG` (default
/// `config.toml`).  A missing file yields the defaults.  Returns the
/// parsed [`Config`](cc_domain::config::Config) and the path that was
/// used.
pub fn load_config() -> anyhow::Result<(cc_domain::config::Config, String)> {
    let config_path = std::env::var("CC_CONFIG").unwrap_or_else(|_| "config.toml".into());
    let config = load_config_from(&config_path)?;
    Ok((config, config_path))
}

pub fn load_config_from(path: &str) -> anyhow::Result<cc_domain::config::Config> {
    if !std::path::Path::new(path).exists() {
        return Ok(cc_domain::config::Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("reading {path}: {e}"))?;
    toml::from_str(&raw).map_err(|e| anyhow::anyhow!("parsing {path}: {e}"))
}
