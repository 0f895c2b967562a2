//! Engine contracts.
//!
//! The transformation engines are external collaborators. These traits are
//! the exact call shapes the dispatcher uses; implementations decide how the
//! work is actually done.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

use crate::loader::module::Module;
use crate::loader::request::{BundleOptions, HookTranspileOptions, ImportAttributes, RunnerOptions};

/// Result of an engine that may report dependencies.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    /// The loaded module
    pub module: Module,

    /// Files the module read, if the engine collected them
    pub dependencies: Option<Vec<PathBuf>>,
}

impl EngineOutput {
    /// Output without a dependency list.
    pub fn module(module: Module) -> Self {
        EngineOutput {
            module,
            dependencies: None,
        }
    }

    /// Output with a dependency list.
    pub fn with_dependencies(module: Module, dependencies: Vec<PathBuf>) -> Self {
        EngineOutput {
            module,
            dependencies: Some(dependencies),
        }
    }
}

/// The host runtime: its version and its native dynamic import.
#[async_trait]
pub trait HostRuntime: Send + Sync {
    /// Host version, or `None` on hosts that don't expose one.
    async fn version(&self) -> Option<semver::Version>;

    /// Import a resolved absolute file URL or a bare specifier natively.
    async fn native_import(
        &self,
        specifier: &str,
        attributes: Option<&ImportAttributes>,
    ) -> Result<Module>;
}

/// Loader-hook based transpiler.
#[async_trait]
pub trait HookTranspiler: Send + Sync {
    /// Transpile and import `path`, resolved relative to `options.parent_dir`.
    async fn transpile_import(
        &self,
        path: &str,
        options: HookTranspileOptions,
    ) -> Result<EngineOutput>;
}

/// Runner instance created by a `RunnerFactory`.
#[async_trait]
pub trait ModuleRunner: Send + Sync {
    /// Import `path` through this runner.
    async fn import(&self, path: &str) -> Result<Module>;
}

/// Factory for bundled-parser module runners.
pub trait RunnerFactory: Send + Sync {
    /// Create a runner rooted at `parent_dir`.
    fn create_runner(
        &self,
        parent_dir: PathBuf,
        options: RunnerOptions,
    ) -> Result<Box<dyn ModuleRunner>>;
}

/// Bundle-to-temporary-file engine.
///
/// The engine owns the temporary file and its cleanup.
#[async_trait]
pub trait Bundler: Send + Sync {
    /// Bundle `options.filepath`, load the bundle, report its inputs.
    async fn bundle_and_require(&self, options: BundleOptions) -> Result<EngineOutput>;
}
