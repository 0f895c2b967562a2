//! Imported module values and the module info side-table.
//!
//! Every `Module` carries a process-unique identity. Info about how a module
//! was loaded lives in a process-wide table keyed by that identity, so the
//! module value itself stays exactly what the engine produced.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, RwLock};
use std::time::SystemTime;

use serde_json::{Map, Value};

use crate::loader::capabilities::{CacheRequirement, Strategy};

static NEXT_MODULE_ID: AtomicU64 = AtomicU64::new(1);

static MODULE_INFO: LazyLock<RwLock<HashMap<ModuleId, ModuleInfo>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Opaque identity of a module instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u64);

impl ModuleId {
    fn next() -> Self {
        ModuleId(NEXT_MODULE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A loaded module: its specifier and export namespace.
///
/// Clones share the identity of the original.
#[derive(Debug, Clone)]
pub struct Module {
    id: ModuleId,
    specifier: Arc<str>,
    exports: Arc<Map<String, Value>>,
}

impl Module {
    /// Create a new module instance with a fresh identity.
    pub fn new(specifier: impl Into<String>, exports: Map<String, Value>) -> Self {
        Module {
            id: ModuleId::next(),
            specifier: Arc::from(specifier.into()),
            exports: Arc::new(exports),
        }
    }

    /// Build a module from a JSON object of exports.
    ///
    /// Non-object values are exposed as the `default` export.
    pub fn from_json(specifier: impl Into<String>, value: Value) -> Self {
        let exports = match value {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("default".to_string(), other);
                map
            }
        };
        Module::new(specifier, exports)
    }

    /// Identity of this instance.
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Specifier the module was loaded from.
    pub fn specifier(&self) -> &str {
        &self.specifier
    }

    /// Full export namespace.
    pub fn exports(&self) -> &Map<String, Value> {
        &self.exports
    }

    /// A single named export.
    pub fn export(&self, name: &str) -> Option<&Value> {
        self.exports.get(name)
    }

    /// The `default` export.
    pub fn default_export(&self) -> Option<&Value> {
        self.export("default")
    }

    /// Check whether two values are the same instance.
    pub fn same_instance(&self, other: &Module) -> bool {
        self.id == other.id
    }
}

/// How a module was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Strategy that produced the module
    pub strategy: Strategy,

    /// Cache requirement the import was made with
    pub cache: CacheRequirement,

    /// Path or specifier as given by the caller
    pub specifier: String,

    /// Absolute directory the import was resolved from
    pub parent_dir: PathBuf,

    /// Taken right before the engine was invoked
    pub timestamp_init: SystemTime,

    /// Taken right after the engine resolved
    pub timestamp_load: SystemTime,

    /// Files the module read, when the engine reports them
    pub dependencies: Option<Vec<PathBuf>>,
}

/// Record info for a module. Entries are never evicted.
pub(crate) fn record_module_info(module: &Module, info: ModuleInfo) {
    let mut table = MODULE_INFO.write().unwrap_or_else(|e| e.into_inner());
    table.insert(module.id(), info);
}

/// Look up how a module was loaded.
///
/// Returns `None` for modules that were not produced by an `Importer`.
pub fn module_info(module: &Module) -> Option<ModuleInfo> {
    let table = MODULE_INFO.read().unwrap_or_else(|e| e.into_inner());
    table.get(&module.id()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_info() -> ModuleInfo {
        let now = SystemTime::now();
        ModuleInfo {
            strategy: Strategy::Native,
            cache: CacheRequirement::MustCache,
            specifier: "./mod.js".to_string(),
            parent_dir: PathBuf::from("/project"),
            timestamp_init: now,
            timestamp_load: now,
            dependencies: None,
        }
    }

    #[test]
    fn test_module_ids_unique() {
        let a = Module::new("a", Map::new());
        let b = Module::new("a", Map::new());
        assert_ne!(a.id(), b.id());
        assert!(!a.same_instance(&b));
        assert!(a.same_instance(&a.clone()));
    }

    #[test]
    fn test_from_json() {
        let object = Module::from_json("obj", json!({ "default": 1, "named": "x" }));
        assert_eq!(object.default_export(), Some(&json!(1)));
        assert_eq!(object.export("named"), Some(&json!("x")));

        let scalar = Module::from_json("scalar", json!(42));
        assert_eq!(scalar.default_export(), Some(&json!(42)));
    }

    #[test]
    fn test_unknown_module_has_no_info() {
        let module = Module::new("untracked", Map::new());
        assert!(module_info(&module).is_none());
    }

    #[test]
    fn test_module_info_lookup_is_stable() {
        let module = Module::new("tracked", Map::new());
        record_module_info(&module, sample_info());

        let first = module_info(&module).unwrap();
        let second = module_info(&module.clone()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.strategy, Strategy::Native);
    }
}
