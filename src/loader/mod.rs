//! Loader selection and dispatch.
//!
//! Import strategies declare what they can do, the selection policy picks one
//! for `auto` requests, and the dispatcher validates the request against the
//! chosen strategy before calling its engine.
//!
//! # Architecture
//!
//! ```text
//!                       ┌─────────────────┐
//!                       │  ImportOptions  │ (caller wants)
//!                       └────────┬────────┘
//!                                │ loader = auto?
//!          ┌─────────────────────┼─────────────────────┐
//!          ▼                     ▼                     ▼
//!  ┌───────────────┐    ┌───────────────┐    ┌───────────────┐
//!  │ Native        │    │ Version       │    │ Capability    │
//!  │ Probe         │    │ Gate          │    │ Matrix        │
//!  └───────┬───────┘    └───────┬───────┘    └───────┬───────┘
//!          └─────────────────────┼─────────────────────┘
//!                                ▼
//!          ┌──────────────┬──────┴───────┬──────────────┐
//!          ▼              ▼              ▼              ▼
//!     ┌─────────┐  ┌──────────────┐ ┌──────────────┐ ┌──────────────┐
//!     │ native  │  │hook-transpile│ │bundled-runner│ │bundle-to-temp│
//!     └─────────┘  └──────────────┘ └──────────────┘ └──────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use importkit::loader::{Importer, ImportOptions, CacheRequirement};
//!
//! let importer = Importer::builder(host).hook_transpiler(tsx).build();
//! let module = importer
//!     .import("./config.ts", ImportOptions::new("/project/").with_cache(false))
//!     .await?;
//! let info = importkit::module_info(&module);
//! ```

pub mod capabilities;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod module;
pub mod probe;
pub mod request;
pub mod select;
pub mod validation;
pub mod version_gate;

pub use capabilities::{
    capabilities_of, CacheRequirement, CacheRequirementParseError, CapabilityMatrix, Strategy,
    StrategyParseError,
};
pub use dispatch::{global, import, run, Importer, ImporterBuilder};
pub use engine::{Bundler, EngineOutput, HookTranspiler, HostRuntime, ModuleRunner, RunnerFactory};
pub use error::ImportError;
pub use module::{module_info, Module, ModuleId, ModuleInfo};
pub use probe::{default_fixture_path, NativeSupportProbe, PROBE_SENTINEL};
pub use request::{
    is_transformable_path, resolve_native_specifier, BundleFormat, BundleOptions,
    HookTranspileOptions, ImportAttributes, ImportOptions, LoaderOptions, ParentRef,
    RunnerOptions, AUTO_LOADER,
};
pub use select::select_strategy;
pub use validation::{validate_request, StrategyValidator};
pub use version_gate::{hook_transpile_eligible, parse_runtime_version};
