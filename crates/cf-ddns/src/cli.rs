//! Command line and environment configuration
//!
//! Every option can be given as a flag or through the environment variable
//! named next to it. Flags win over the environment.

use anyhow::{Result, bail};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use ddns_core::DdnsConfig;
use tracing::Level;

/// Keep Cloudflare A records pointed at this host's public IPv4 address
#[derive(Debug, Parser)]
#[command(name = "cf-ddns", version, about)]
pub struct Cli {
    /// Cloudflare API token with Zone:DNS:Edit permission
    #[arg(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true)]
    pub api_token: String,

    /// Zone / domain name (e.g. example.com)
    #[arg(long, env = "DOMAIN")]
    pub domain: String,

    /// Comma-separated record names to keep updated
    #[arg(long, env = "RECORD_NAMES")]
    pub record_names: Option<String>,

    /// Discover records by their leading label instead of listing them
    #[arg(
        long,
        env = "AUTO_DISCOVER_LOCAL",
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new(),
        default_value = "false"
    )]
    pub auto_discover_local: bool,

    /// Leading label matched by auto-discovery
    #[arg(long, env = "DNS_PATTERN", default_value = "local")]
    pub dns_pattern: String,

    /// Record TTL in seconds (1 = automatic)
    #[arg(long, env = "TTL", default_value_t = 1)]
    pub ttl: u32,

    /// Seconds between reconciliation cycles
    #[arg(long, env = "CHECK_INTERVAL", default_value_t = 300)]
    pub check_interval: u64,

    /// Destination label for --rename
    #[arg(long, env = "NEW_SUBDOMAIN_PATTERN")]
    pub new_subdomain_pattern: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Live updates, or dry-run (reads only, writes are logged)
    #[arg(long, env = "DDNS_MODE", value_enum, default_value_t = Mode::Live)]
    pub mode: Mode,

    /// Run a single update cycle and exit
    #[arg(short, long)]
    pub once: bool,

    /// Rename every pattern-matched record to NEW_SUBDOMAIN_PATTERN and exit
    #[arg(long, conflicts_with = "once")]
    pub rename: bool,
}

/// Provider write mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Live,
    DryRun,
}

impl Cli {
    /// Parsed record names: trimmed, empty entries dropped
    pub fn record_list(&self) -> Vec<String> {
        self.record_names
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Build the engine configuration
    ///
    /// Range checks are left to `DdnsConfig::validate`.
    pub fn to_config(&self) -> Result<DdnsConfig> {
        let config = if self.auto_discover_local {
            DdnsConfig::pattern(self.domain.trim(), self.dns_pattern.trim())
        } else {
            let names = self.record_list();
            if names.is_empty() {
                bail!(
                    "RECORD_NAMES must contain at least one record when AUTO_DISCOVER_LOCAL is false. \
                    Set it via: export RECORD_NAMES=home.example.com,vpn.example.com"
                );
            }
            DdnsConfig::explicit(self.domain.trim(), names)
        };

        let mut config = config
            .with_ttl(self.ttl)
            .with_poll_interval(self.check_interval);

        if let Some(pattern) = self.new_subdomain_pattern.as_deref().map(str::trim) {
            config = config.with_new_pattern(pattern);
        }

        if self.rename {
            if !self.auto_discover_local {
                bail!("--rename requires AUTO_DISCOVER_LOCAL=true and a DNS_PATTERN");
            }
            if config.new_pattern.is_none() {
                bail!("--rename requires NEW_SUBDOMAIN_PATTERN to be set");
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Tracing level from `--log-level`
    pub fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => bail!(
                "LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}
