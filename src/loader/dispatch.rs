//! Validation and dispatch - the single entry point for imports.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::SystemTime;

use crate::host::node::NodeHost;
use crate::loader::capabilities::{CacheRequirement, Strategy};
use crate::loader::engine::{Bundler, EngineOutput, HookTranspiler, HostRuntime, RunnerFactory};
use crate::loader::error::ImportError;
use crate::loader::module::{record_module_info, Module, ModuleInfo};
use crate::loader::probe::NativeSupportProbe;
use crate::loader::request::{
    is_transformable_path, resolve_native_specifier, BundleOptions, HookTranspileOptions,
    ImportOptions, ParentRef, RunnerOptions,
};
use crate::loader::select::select_strategy;
use crate::loader::validation::validate_request;
use crate::util::config::{load_default_config, Config};

static GLOBAL: LazyLock<Importer> = LazyLock::new(|| Importer::from_config(&load_default_config()));

/// Process-wide importer backed by the node host and the default config.
///
/// The native support probe runs at most once per importer.
pub fn global() -> &'static Importer {
    &GLOBAL
}

/// Import with automatic selection and a must-cache requirement, using the
/// process-wide importer.
pub async fn run(path: &str, parent: impl Into<ParentRef>) -> Result<Module, ImportError> {
    global().run(path, parent).await
}

/// Import with full options, using the process-wide importer.
pub async fn import(path: &str, options: ImportOptions) -> Result<Module, ImportError> {
    global().import(path, options).await
}

/// Builder for an `Importer`.
///
/// Only the host is required. A strategy whose engine was not registered
/// fails with `EngineUnavailable` when it is used.
pub struct ImporterBuilder {
    host: Arc<dyn HostRuntime>,
    fixture: Option<PathBuf>,
    hook_transpiler: Option<Arc<dyn HookTranspiler>>,
    runner_factory: Option<Arc<dyn RunnerFactory>>,
    bundler: Option<Arc<dyn Bundler>>,
}

impl ImporterBuilder {
    /// Use a custom probe fixture.
    pub fn probe_fixture(mut self, fixture: impl Into<PathBuf>) -> Self {
        self.fixture = Some(fixture.into());
        self
    }

    /// Register the hook-transpile engine.
    pub fn hook_transpiler(mut self, engine: Arc<dyn HookTranspiler>) -> Self {
        self.hook_transpiler = Some(engine);
        self
    }

    /// Register the bundled-runner engine.
    pub fn runner_factory(mut self, engine: Arc<dyn RunnerFactory>) -> Self {
        self.runner_factory = Some(engine);
        self
    }

    /// Register the bundle-to-temp engine.
    pub fn bundler(mut self, engine: Arc<dyn Bundler>) -> Self {
        self.bundler = Some(engine);
        self
    }

    /// Build the importer.
    pub fn build(self) -> Importer {
        let probe = match self.fixture {
            Some(fixture) => NativeSupportProbe::with_fixture(self.host.clone(), fixture),
            None => NativeSupportProbe::new(self.host.clone()),
        };

        Importer {
            host: self.host,
            probe,
            hook_transpiler: self.hook_transpiler,
            runner_factory: self.runner_factory,
            bundler: self.bundler,
        }
    }
}

/// Selects, validates and invokes import strategies.
pub struct Importer {
    host: Arc<dyn HostRuntime>,
    probe: NativeSupportProbe,
    hook_transpiler: Option<Arc<dyn HookTranspiler>>,
    runner_factory: Option<Arc<dyn RunnerFactory>>,
    bundler: Option<Arc<dyn Bundler>>,
}

impl Importer {
    /// Start building an importer for a host.
    pub fn builder(host: Arc<dyn HostRuntime>) -> ImporterBuilder {
        ImporterBuilder {
            host,
            fixture: None,
            hook_transpiler: None,
            runner_factory: None,
            bundler: None,
        }
    }

    /// Importer on the node host with only the native engine.
    pub fn from_config(config: &Config) -> Self {
        let host = Arc::new(NodeHost::from_config(&config.probe));
        let mut builder = Importer::builder(host);
        if let Some(ref fixture) = config.probe.fixture {
            builder = builder.probe_fixture(fixture);
        }
        builder.build()
    }

    /// The host runtime.
    pub fn host(&self) -> &dyn HostRuntime {
        self.host.as_ref()
    }

    /// The native support probe.
    pub fn probe(&self) -> &NativeSupportProbe {
        &self.probe
    }

    /// Check whether an engine is registered for a strategy.
    pub fn has_engine(&self, strategy: Strategy) -> bool {
        match strategy {
            Strategy::Native => true,
            Strategy::HookTranspile => self.hook_transpiler.is_some(),
            Strategy::BundledRunner => self.runner_factory.is_some(),
            Strategy::BundleToTemp => self.bundler.is_some(),
        }
    }

    /// Pick the strategy an `auto` request for `path` would use.
    pub async fn select(&self, path: &str, cache: CacheRequirement) -> Strategy {
        select_strategy(
            cache,
            is_transformable_path(path),
            &self.probe,
            self.host.as_ref(),
        )
        .await
    }

    /// Resolve the loader name and validate the result, without importing.
    pub async fn resolve_strategy(
        &self,
        path: &str,
        options: &ImportOptions,
    ) -> Result<Strategy, ImportError> {
        let strategy = match options.requested_strategy()? {
            Some(strategy) => strategy,
            None => self.select(path, options.cache).await,
        };

        validate_request(
            strategy,
            options.cache,
            options.list_dependencies,
            options.bypass_validation,
        )?;

        Ok(strategy)
    }

    /// Shorthand import: automatic selection, must-cache.
    pub async fn run(&self, path: &str, parent: impl Into<ParentRef>) -> Result<Module, ImportError> {
        self.import(path, ImportOptions::new(parent)).await
    }

    /// Import `path` with full options.
    ///
    /// Engine failures are returned as `ImportError::Engine` without
    /// wrapping, and a failed import is never retried with another strategy.
    pub async fn import(&self, path: &str, options: ImportOptions) -> Result<Module, ImportError> {
        options.requested_strategy()?;
        let parent_dir = options.parent.parent_dir()?;
        let strategy = self.resolve_strategy(path, &options).await?;

        tracing::debug!(
            "importing {} with {} (cache: {}, parent: {})",
            path,
            strategy,
            options.cache,
            parent_dir.display()
        );

        let timestamp_init = SystemTime::now();
        let output = self.invoke(strategy, path, &parent_dir, &options).await?;
        let timestamp_load = SystemTime::now();

        record_module_info(
            &output.module,
            ModuleInfo {
                strategy,
                cache: options.cache,
                specifier: path.to_string(),
                parent_dir,
                timestamp_init,
                timestamp_load,
                dependencies: output.dependencies,
            },
        );

        Ok(output.module)
    }

    async fn invoke(
        &self,
        strategy: Strategy,
        path: &str,
        parent_dir: &Path,
        options: &ImportOptions,
    ) -> Result<EngineOutput, ImportError> {
        let unavailable = || ImportError::EngineUnavailable { strategy };

        match strategy {
            Strategy::Native => {
                let specifier = resolve_native_specifier(path, parent_dir)?;
                let module = self
                    .host
                    .native_import(&specifier, options.attributes.as_ref())
                    .await?;
                Ok(EngineOutput::module(module))
            }
            Strategy::HookTranspile => {
                let engine = self.hook_transpiler.as_ref().ok_or_else(unavailable)?;
                let user = options
                    .loader_options
                    .hook_transpile
                    .clone()
                    .unwrap_or_default();
                let engine_options = HookTranspileOptions {
                    parent_dir: parent_dir.to_path_buf(),
                    collect_dependencies: options.list_dependencies,
                    ..user
                };
                Ok(engine.transpile_import(path, engine_options).await?)
            }
            Strategy::BundledRunner => {
                let factory = self.runner_factory.as_ref().ok_or_else(unavailable)?;
                let user = options
                    .loader_options
                    .bundled_runner
                    .clone()
                    .unwrap_or_default();
                let cache_flag = options.cache.as_flag();
                let runner_options = RunnerOptions {
                    esm_resolve: true,
                    module_cache: user.module_cache.or(cache_flag),
                    fs_cache: user.fs_cache.or(cache_flag),
                    ..user
                };
                let runner = factory.create_runner(parent_dir.to_path_buf(), runner_options)?;
                Ok(EngineOutput::module(runner.import(path).await?))
            }
            Strategy::BundleToTemp => {
                let bundler = self.bundler.as_ref().ok_or_else(unavailable)?;
                let user = options
                    .loader_options
                    .bundle_to_temp
                    .clone()
                    .unwrap_or_default();
                let bundle_options = BundleOptions {
                    filepath: PathBuf::from(path),
                    cwd: parent_dir.to_path_buf(),
                    ..user
                };
                Ok(bundler.bundle_and_require(bundle_options).await?)
            }
        }
    }
}
