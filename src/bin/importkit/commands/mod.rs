//! Command implementations

pub mod import;
pub mod list;
pub mod probe;
pub mod select;
pub mod show;

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use importkit::util::config::{load_default_config, Config};
use importkit::CacheRequirement;

/// Run a future to completion on a fresh runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

/// Load config and apply a `--node` override.
pub fn config_with_node(node: Option<PathBuf>) -> Config {
    let mut config = load_default_config();
    if node.is_some() {
        config.probe.node = node;
    }
    config
}

/// Parse a `--cache` flag, falling back to the configured default.
pub fn parse_cache(flag: Option<&str>, config: &Config) -> Result<CacheRequirement> {
    match flag {
        Some(value) => value
            .parse::<CacheRequirement>()
            .map_err(|e| anyhow::anyhow!("{}", e)),
        None => Ok(config.import.cache()),
    }
}
