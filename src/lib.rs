//! importkit - loader selection and dispatch for runtime module imports
//!
//! This crate decides how a module that may need transpilation gets imported:
//! natively by the host, or through one of three transformation engines. It
//! validates the caller's caching requirement against the chosen strategy and
//! records how every module was loaded.

pub mod host;
pub mod loader;
pub mod util;

pub use loader::{
    capabilities_of, global, import, module_info, run, select_strategy, CacheRequirement,
    CapabilityMatrix, HostRuntime, ImportError, ImportOptions, Importer, Module, ModuleInfo,
    ParentRef, Strategy,
};
pub use util::config::Config;
