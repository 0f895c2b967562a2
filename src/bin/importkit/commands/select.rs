//! `importkit select` command
//!
//! Explains which strategy an automatic import would pick.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use semver::Version;

use crate::cli::SelectArgs;
use crate::commands::{block_on, config_with_node, parse_cache};
use importkit::host::NodeHost;
use importkit::loader::{
    hook_transpile_eligible, is_transformable_path, parse_runtime_version, ImportAttributes,
    NativeSupportProbe,
};
use importkit::{select_strategy, CacheRequirement, HostRuntime, Module};

/// Node host with its version replaced by a fixed value.
struct PinnedVersionHost {
    inner: NodeHost,
    version: Option<Version>,
}

#[async_trait]
impl HostRuntime for PinnedVersionHost {
    async fn version(&self) -> Option<Version> {
        self.version.clone()
    }

    async fn native_import(
        &self,
        specifier: &str,
        attributes: Option<&ImportAttributes>,
    ) -> anyhow::Result<Module> {
        self.inner.native_import(specifier, attributes).await
    }
}

fn pinned_version(value: &str) -> Result<Option<Version>> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_runtime_version(value)
        .map(Some)
        .ok_or_else(|| anyhow::anyhow!("invalid runtime version '{}'", value))
}

pub fn execute(args: SelectArgs) -> Result<()> {
    let config = config_with_node(args.node);
    let cache = parse_cache(args.cache.as_deref(), &config)?;
    let node = NodeHost::from_config(&config.probe);

    let host: Arc<dyn HostRuntime> = match args.runtime_version {
        Some(ref value) => Arc::new(PinnedVersionHost {
            inner: node,
            version: pinned_version(value)?,
        }),
        None => Arc::new(node),
    };

    let probe = match config.probe.fixture {
        Some(ref fixture) => NativeSupportProbe::with_fixture(host.clone(), fixture),
        None => NativeSupportProbe::new(host.clone()),
    };

    let transformable = is_transformable_path(&args.path);
    let (strategy, version) = block_on(async {
        let strategy = select_strategy(cache, transformable, &probe, host.as_ref()).await;
        (strategy, host.version().await)
    })?;

    println!("{}", strategy);

    tracing::info!("path:          {}", args.path);
    tracing::info!("transformable: {}", transformable);
    tracing::info!("cache:         {}", cache);
    match version {
        Some(version) => tracing::info!(
            "host version:  {} (hook-transpile eligible: {})",
            version,
            hook_transpile_eligible(Some(&version))
        ),
        None => tracing::info!("host version:  none"),
    }
    match probe.cached() {
        Some(supported) => tracing::info!("native probe:  {}", supported),
        None => tracing::info!("native probe:  not needed"),
    }
    if cache == CacheRequirement::MustNotCache {
        tracing::info!("native skipped: native imports are always cached");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_version() {
        assert_eq!(pinned_version("none").unwrap(), None);
        assert_eq!(
            pinned_version("18.19.0").unwrap(),
            Some(Version::new(18, 19, 0))
        );
        assert!(pinned_version("latest").is_err());
    }
}
