//! Node.js host runtime.
//!
//! Runs the host as a subprocess: the version comes from `node --version`,
//! and a native import evaluates a one-shot ES module that prints the
//! imported namespace as JSON.
//!
//! Native imports are cached per host like the host's own module map: the
//! same specifier and attributes give back the same `Module` instance and are
//! evaluated once. Failed imports are not cached.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use semver::Version;
use tokio::process::Command;
use tokio::sync::{Mutex, OnceCell};

use crate::loader::engine::HostRuntime;
use crate::loader::module::Module;
use crate::loader::request::ImportAttributes;
use crate::loader::version_gate::parse_runtime_version;
use crate::util::config::ProbeConfig;

/// Evaluated with `--input-type=module`; the last two argv entries are the
/// specifier and the JSON-encoded import attributes.
const IMPORT_SCRIPT: &str = r#"
const [specifier, rawAttributes] = process.argv.slice(-2);
const attributes = JSON.parse(rawAttributes);
const mod = Object.keys(attributes).length
  ? await import(specifier, { with: attributes })
  : await import(specifier);
const exports = {};
for (const [name, value] of Object.entries(mod)) {
  try {
    exports[name] = JSON.parse(JSON.stringify(value ?? null));
  } catch {
    exports[name] = null;
  }
}
process.stdout.write(JSON.stringify(exports));
"#;

/// Module map key: resolved specifier and JSON-encoded attributes.
type ModuleKey = (String, String);

/// Node.js host.
pub struct NodeHost {
    /// Configured executable, if any
    configured: Option<PathBuf>,
    /// Executable found on PATH (lazily computed)
    resolved: OnceLock<Option<PathBuf>>,
    /// Detected version (lazily computed)
    version: OnceCell<Option<Version>>,
    /// Successfully imported modules
    modules: Mutex<HashMap<ModuleKey, Module>>,
}

impl NodeHost {
    /// Host using `node` from PATH.
    pub fn new() -> Self {
        NodeHost {
            configured: None,
            resolved: OnceLock::new(),
            version: OnceCell::new(),
            modules: Mutex::new(HashMap::new()),
        }
    }

    /// Host using a specific executable.
    pub fn with_executable(node: impl Into<PathBuf>) -> Self {
        NodeHost {
            configured: Some(node.into()),
            ..Self::new()
        }
    }

    /// Host from the `[probe]` config section.
    pub fn from_config(config: &ProbeConfig) -> Self {
        match config.node {
            Some(ref node) => Self::with_executable(node),
            None => Self::new(),
        }
    }

    /// The executable this host runs, if one can be found.
    pub fn executable(&self) -> Option<&Path> {
        self.resolved
            .get_or_init(|| {
                self.configured
                    .clone()
                    .or_else(|| which::which("node").ok())
            })
            .as_deref()
    }

    async fn detect_version(node: &Path) -> Result<Version> {
        let output = Command::new(node)
            .arg("--version")
            .output()
            .await
            .with_context(|| format!("failed to run {} --version", node.display()))?;

        if !output.status.success() {
            bail!("{} --version failed", node.display());
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_runtime_version(&stdout)
            .with_context(|| format!("could not parse node version from output: {}", stdout.trim()))
    }

    async fn evaluate(node: &Path, specifier: &str, attributes: &str) -> Result<Module> {
        let output = Command::new(node)
            .args(["--input-type=module", "--eval", IMPORT_SCRIPT, "--"])
            .arg(specifier)
            .arg(attributes)
            .output()
            .await
            .with_context(|| format!("failed to run {}", node.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{}", stderr.trim());
        }

        let exports: serde_json::Value = serde_json::from_slice(&output.stdout)
            .with_context(|| format!("unexpected output importing {}", specifier))?;

        Ok(Module::from_json(specifier, exports))
    }
}

impl Default for NodeHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostRuntime for NodeHost {
    async fn version(&self) -> Option<Version> {
        self.version
            .get_or_init(|| async {
                match self.executable() {
                    Some(node) => Self::detect_version(node)
                        .await
                        .map_err(|e| tracing::debug!("node version unavailable: {:#}", e))
                        .ok(),
                    None => None,
                }
            })
            .await
            .clone()
    }

    async fn native_import(
        &self,
        specifier: &str,
        attributes: Option<&ImportAttributes>,
    ) -> Result<Module> {
        let Some(node) = self.executable() else {
            bail!("node executable not found on PATH");
        };

        let attributes = serde_json::to_string(&attributes.cloned().unwrap_or_default())
            .context("failed to encode import attributes")?;
        let key = (specifier.to_string(), attributes);

        // Held across evaluation so concurrent first imports evaluate once.
        let mut modules = self.modules.lock().await;
        if let Some(module) = modules.get(&key) {
            tracing::debug!("{} served from the module map", specifier);
            return Ok(module.clone());
        }

        let module = Self::evaluate(node, specifier, &key.1).await?;
        modules.insert(key, module.clone());
        Ok(module)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use url::Url;

    fn node_available() -> bool {
        which::which("node").is_ok()
    }

    fn file_specifier(path: &Path) -> String {
        Url::from_file_path(path).unwrap().to_string()
    }

    #[tokio::test]
    async fn test_missing_executable_has_no_version() {
        let host = NodeHost::with_executable("/definitely/not/a/node");
        assert_eq!(host.version().await, None);
    }

    #[tokio::test]
    async fn test_missing_executable_import_fails() {
        let host = NodeHost::with_executable("/definitely/not/a/node");
        let result = host.native_import("node:path", None).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_from_config_prefers_configured_node() {
        let config = ProbeConfig {
            fixture: None,
            node: Some(PathBuf::from("/opt/node/bin/node")),
        };
        let host = NodeHost::from_config(&config);
        assert_eq!(host.executable(), Some(Path::new("/opt/node/bin/node")));
    }

    #[tokio::test]
    async fn test_repeated_imports_share_one_instance() {
        if !node_available() {
            eprintln!("skipping: node not found on PATH");
            return;
        }

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("random.mjs");
        std::fs::write(&path, "export default Math.random()\n").unwrap();
        let specifier = file_specifier(&path);

        let host = NodeHost::new();
        let first = host.native_import(&specifier, None).await.unwrap();
        let second = host.native_import(&specifier, None).await.unwrap();

        assert!(first.same_instance(&second));
        assert_eq!(first.default_export(), second.default_export());
    }

    #[tokio::test]
    async fn test_failed_imports_are_not_cached() {
        if !node_available() {
            eprintln!("skipping: node not found on PATH");
            return;
        }

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("late.mjs");
        let specifier = file_specifier(&path);

        let host = NodeHost::new();
        assert!(host.native_import(&specifier, None).await.is_err());

        std::fs::write(&path, "export default 'ready'\n").unwrap();
        let module = host.native_import(&specifier, None).await.unwrap();
        assert_eq!(module.default_export(), Some(&serde_json::json!("ready")));
    }

    #[tokio::test]
    async fn test_detects_version() {
        if !node_available() {
            eprintln!("skipping: node not found on PATH");
            return;
        }

        let host = NodeHost::new();
        let version = host.version().await.unwrap();
        assert!(version.major > 0);
        assert_eq!(host.version().await, Some(version));
    }
}
