// # cf-ddns - Cloudflare DDNS Service
//
// Thin integration layer: all reconciliation logic lives in ddns-core.
//
// The binary is responsible for:
// 1. Reading configuration from flags and environment variables
// 2. Installing the tracing subscriber
// 3. Wiring the HTTP IP sources and the Cloudflare provider into the engine
// 4. Running one cycle, one rename, or the scheduler until a signal arrives
//
// ## Example
//
// ```bash
// export CLOUDFLARE_API_TOKEN=your_token
// export DOMAIN=example.com
// export RECORD_NAMES=home.example.com,vpn.example.com
//
// cf-ddns            # run every CHECK_INTERVAL seconds
// cf-ddns --once     # single cycle, non-zero exit on failure
// ```

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Mode};
use ddns_core::{DdnsConfig, DdnsEngine, IpResolver, RecordTargets, Scheduler};
use ddns_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (failed single cycle or rename)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return if e.use_stderr() {
                DdnsExitCode::ConfigError.into()
            } else {
                DdnsExitCode::CleanShutdown.into()
            };
        }
    };

    let log_level = match cli.level() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let config = match cli.to_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    log_config_summary(&cli, &config);

    let engine = match build_engine(&cli, config) {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(&cli, engine)).into()
}

/// Wire IP sources and provider into an engine
fn build_engine(cli: &Cli, config: DdnsConfig) -> Result<DdnsEngine> {
    let provider = CloudflareProvider::new(&cli.api_token, cli.mode == Mode::DryRun)
        .context("Failed to create Cloudflare provider")?;
    if provider.is_dry_run() {
        warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
    }

    let sources = ddns_ip_http::default_sources().context("Failed to create IP sources")?;
    let resolver = IpResolver::new(sources);

    DdnsEngine::new(resolver, Box::new(provider), config).context("Invalid configuration")
}

async fn run(cli: &Cli, engine: DdnsEngine) -> DdnsExitCode {
    if cli.rename {
        return run_rename(&engine).await;
    }

    let scheduler = Scheduler::new(engine);

    if cli.once {
        return match scheduler.run_once().await {
            Ok(_) => DdnsExitCode::CleanShutdown,
            Err(_) => DdnsExitCode::RuntimeError,
        };
    }

    info!("Starting cf-ddns service");
    scheduler.run_until_signal().await;
    info!("Shutting down cf-ddns service");
    DdnsExitCode::CleanShutdown
}

async fn run_rename(engine: &DdnsEngine) -> DdnsExitCode {
    match engine.rename_matching().await {
        Ok(report) => {
            info!(
                renamed = report.renamed_count(),
                failed = report.errors.len(),
                "Rename complete"
            );
            for message in &report.errors {
                warn!("{}", message);
            }
            if report.is_clean() {
                DdnsExitCode::CleanShutdown
            } else {
                DdnsExitCode::RuntimeError
            }
        }
        Err(e) => {
            error!("Rename failed: {}", e);
            DdnsExitCode::RuntimeError
        }
    }
}

/// Log the effective configuration, without the token
fn log_config_summary(cli: &Cli, config: &DdnsConfig) {
    info!("Configuration loaded:");
    info!("  Domain: {}", config.zone);
    match &config.targets {
        RecordTargets::Explicit { names } => info!("  Records: {}", names.join(", ")),
        RecordTargets::Pattern { pattern } => {
            info!("  Auto-discovery: records starting with '{}.'", pattern)
        }
    }
    info!("  TTL: {}", config.ttl);
    info!("  Check interval: {}s", config.poll_interval_secs);
    if let Some(ref new_pattern) = config.new_pattern {
        info!("  New subdomain pattern: {}", new_pattern);
    }
    info!("  Mode: {:?}", cli.mode);
}
