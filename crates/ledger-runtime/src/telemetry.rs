//! # Tracing Setup
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and either a
//! pretty or JSON `fmt` layer.
//!
//! Filter precedence: `RUST_LOG`, then `LedgerConfig::log_level`, then the
//! `RunContext` default (`debug` when verbose, otherwise `info`).

use crate::container::LedgerConfig;
use anyhow::{anyhow, Result};
use shared_types::RunContext;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize global logging.
///
/// Returns an error instead of panicking when a subscriber is already
/// installed, so repeated calls are harmless to callers that ignore it.
pub fn init_tracing(config: &LedgerConfig, ctx: &RunContext) -> Result<()> {
    let env_filter = build_filter(config, ctx)?;

    if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| anyhow!("Failed to install JSON subscriber: {}", e))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(ctx.verbose)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| anyhow!("Failed to install subscriber: {}", e))?;
    }

    tracing::debug!(
        "[ledger] Logging initialized (json={}, verbose={})",
        config.json_logs,
        ctx.verbose
    );
    Ok(())
}

/// Directive used when `RUST_LOG` is unset.
pub fn default_directive<'a>(config: &'a LedgerConfig, ctx: &RunContext) -> &'a str {
    config
        .log_level
        .as_deref()
        .unwrap_or_else(|| ctx.default_log_level())
}

fn build_filter(config: &LedgerConfig, ctx: &RunContext) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(config, ctx)))
        .map_err(|e| anyhow!("Invalid log filter: {}", e))
}
