//! Native support probe.
//!
//! Detects, once, whether the host can import a transformable-language file
//! without any engine. The probe imports a tiny fixture shipped with this
//! crate; any failure means "not supported" and is never reported as an error.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::OnceCell;
use url::Url;

use crate::loader::engine::HostRuntime;

/// Value the fixture's `default` export must equal.
pub const PROBE_SENTINEL: &str = "importkit:native-probe";

/// Fixture shipped under the crate's installation root.
pub fn default_fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("runtime-fixtures")
        .join("native-probe.mts")
}

/// Memoized native-support probe.
///
/// The first caller runs the probe; concurrent first callers wait on the same
/// in-flight attempt and every later caller reads the stored result.
pub struct NativeSupportProbe {
    host: Arc<dyn HostRuntime>,
    fixture: PathBuf,
    result: OnceCell<bool>,
}

impl NativeSupportProbe {
    /// Create a probe for a host using the bundled fixture.
    pub fn new(host: Arc<dyn HostRuntime>) -> Self {
        Self::with_fixture(host, default_fixture_path())
    }

    /// Create a probe with a custom fixture.
    pub fn with_fixture(host: Arc<dyn HostRuntime>, fixture: impl Into<PathBuf>) -> Self {
        NativeSupportProbe {
            host,
            fixture: fixture.into(),
            result: OnceCell::new(),
        }
    }

    /// Fixture this probe imports.
    pub fn fixture(&self) -> &Path {
        &self.fixture
    }

    /// Result of an earlier probe, if one has completed.
    pub fn cached(&self) -> Option<bool> {
        self.result.get().copied()
    }

    /// Can the host natively import transformable-language files?
    pub async fn is_supported(&self) -> bool {
        *self.result.get_or_init(|| self.run_probe()).await
    }

    async fn run_probe(&self) -> bool {
        let specifier = match Url::from_file_path(&self.fixture) {
            Ok(url) => url.to_string(),
            Err(()) => {
                tracing::debug!(
                    "probe fixture path is not absolute: {}",
                    self.fixture.display()
                );
                return false;
            }
        };

        let supported = match self.host.native_import(&specifier, None).await {
            Ok(module) => {
                module.default_export() == Some(&Value::String(PROBE_SENTINEL.to_string()))
            }
            Err(e) => {
                tracing::debug!("native import probe failed: {:#}", e);
                false
            }
        };

        tracing::debug!("native transformable-language import supported: {}", supported);
        supported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::module::Module;
    use crate::loader::request::ImportAttributes;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeHost {
        calls: AtomicUsize,
        default_export: Option<Value>,
    }

    impl FakeHost {
        fn returning(value: Option<Value>) -> Arc<Self> {
            Arc::new(FakeHost {
                calls: AtomicUsize::new(0),
                default_export: value,
            })
        }
    }

    #[async_trait]
    impl HostRuntime for FakeHost {
        async fn version(&self) -> Option<semver::Version> {
            None
        }

        async fn native_import(
            &self,
            specifier: &str,
            _attributes: Option<&ImportAttributes>,
        ) -> Result<Module> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            match &self.default_export {
                Some(value) => Ok(Module::from_json(specifier, json!({ "default": value }))),
                None => bail!("Unknown file extension \".mts\""),
            }
        }
    }

    #[tokio::test]
    async fn test_probe_supported_with_sentinel() {
        let host = FakeHost::returning(Some(json!(PROBE_SENTINEL)));
        let probe = NativeSupportProbe::new(host.clone());
        assert!(probe.is_supported().await);
        assert_eq!(probe.cached(), Some(true));
    }

    #[tokio::test]
    async fn test_probe_wrong_value_is_unsupported() {
        let host = FakeHost::returning(Some(json!("something else")));
        let probe = NativeSupportProbe::new(host);
        assert!(!probe.is_supported().await);
    }

    #[tokio::test]
    async fn test_probe_failure_is_folded_into_false() {
        let host = FakeHost::returning(None);
        let probe = NativeSupportProbe::new(host);
        assert!(!probe.is_supported().await);
    }

    #[tokio::test]
    async fn test_probe_runs_once() {
        let host = FakeHost::returning(None);
        let probe = NativeSupportProbe::new(host.clone());
        assert_eq!(probe.cached(), None);

        let first = probe.is_supported().await;
        let second = probe.is_supported().await;
        assert_eq!(first, second);
        assert_eq!(host.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_callers_share_one_probe() {
        let host = FakeHost::returning(Some(json!(PROBE_SENTINEL)));
        let probe = NativeSupportProbe::new(host.clone());

        let (a, b, c) = tokio::join!(
            probe.is_supported(),
            probe.is_supported(),
            probe.is_supported()
        );
        assert!(a && b && c);
        assert_eq!(host.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_relative_fixture_is_unsupported_without_import() {
        let host = FakeHost::returning(Some(json!(PROBE_SENTINEL)));
        let probe = NativeSupportProbe::with_fixture(host.clone(), "relative/probe.mts");
        assert!(!probe.is_supported().await);
        assert_eq!(host.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_default_fixture_exists() {
        assert!(default_fixture_path().exists());
    }
}
