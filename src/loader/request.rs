//! Import requests and per-strategy options.
//!
//! `ImportOptions` is what the caller wants. Each strategy gets its own typed
//! option struct; the dispatcher reads only the slot matching the strategy it
//! ends up using.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::loader::capabilities::{CacheRequirement, Strategy};
use crate::loader::error::ImportError;
use crate::util::config::ImportConfig;

/// Loader name that asks for automatic selection.
pub const AUTO_LOADER: &str = "auto";

static TRANSFORMABLE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[mc]?tsx?$").unwrap());

/// Check whether a path names a file that needs transformation before the
/// host can run it (`.ts`, `.mts`, `.cts`, `.tsx`, ...).
pub fn is_transformable_path(path: &str) -> bool {
    TRANSFORMABLE_PATH.is_match(path)
}

/// Where an import is resolved from: a file path or a `file:` URL.
///
/// Resolution is lexical: a reference ending in a separator (or `.`/`..`)
/// names a directory and is used as is; anything else names a file and
/// imports resolve relative to its directory. The filesystem is never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentRef {
    /// Filesystem path
    Path(PathBuf),
    /// URL, usually `file:///...`
    Url(Url),
}

impl ParentRef {
    /// Parse a parent reference, treating anything with a scheme as a URL.
    ///
    /// Single-letter schemes are Windows drive letters, not URLs.
    pub fn parse(reference: &str) -> Self {
        if has_url_scheme(reference) {
            if let Ok(url) = Url::parse(reference) {
                return ParentRef::Url(url);
            }
        }
        ParentRef::Path(PathBuf::from(reference))
    }

    /// The current working directory.
    pub fn cwd() -> Self {
        let mut dir = std::env::current_dir().unwrap_or_default().into_os_string();
        dir.push(std::path::MAIN_SEPARATOR_STR);
        ParentRef::Path(PathBuf::from(dir))
    }

    fn invalid(&self, reason: impl Into<String>) -> ImportError {
        ImportError::InvalidParent {
            parent: self.to_string(),
            reason: reason.into(),
        }
    }

    fn names_directory(&self) -> bool {
        match self {
            ParentRef::Path(p) => {
                let p = p.to_string_lossy();
                let last = p.rsplit(['/', '\\']).next().unwrap_or_default();
                matches!(last, "" | "." | "..")
            }
            ParentRef::Url(u) => u.path().ends_with('/'),
        }
    }

    /// Resolve to an absolute directory imports are relative to.
    pub fn parent_dir(&self) -> Result<PathBuf, ImportError> {
        let path = match self {
            ParentRef::Path(p) => p.clone(),
            ParentRef::Url(u) => {
                if u.scheme() != "file" {
                    return Err(self.invalid(format!("unsupported URL scheme `{}`", u.scheme())));
                }
                u.to_file_path()
                    .map_err(|_| self.invalid("URL does not name a local file"))?
            }
        };

        let absolute = std::path::absolute(&path).map_err(|e| self.invalid(e.to_string()))?;

        if self.names_directory() {
            return Ok(absolute);
        }

        Ok(absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(absolute))
    }
}

/// Check for a `scheme:` prefix of two or more characters.
fn has_url_scheme(reference: &str) -> bool {
    let Some((scheme, _)) = reference.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    scheme.len() >= 2
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl std::fmt::Display for ParentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParentRef::Path(p) => write!(f, "{}", p.display()),
            ParentRef::Url(u) => write!(f, "{}", u),
        }
    }
}

impl From<&str> for ParentRef {
    fn from(reference: &str) -> Self {
        ParentRef::parse(reference)
    }
}

impl From<String> for ParentRef {
    fn from(reference: String) -> Self {
        ParentRef::parse(&reference)
    }
}

impl From<PathBuf> for ParentRef {
    fn from(path: PathBuf) -> Self {
        ParentRef::Path(path)
    }
}

impl From<&Path> for ParentRef {
    fn from(path: &Path) -> Self {
        ParentRef::Path(path.to_path_buf())
    }
}

impl From<Url> for ParentRef {
    fn from(url: Url) -> Self {
        ParentRef::Url(url)
    }
}

/// Turn a caller path into what the host's native import accepts.
///
/// Relative and absolute paths become `file:` URLs resolved against
/// `parent_dir`; URLs and bare package specifiers pass through.
pub fn resolve_native_specifier(path: &str, parent_dir: &Path) -> Result<String, ImportError> {
    let invalid = |reason: &str| ImportError::InvalidParent {
        parent: parent_dir.display().to_string(),
        reason: reason.to_string(),
    };

    let is_relative = path == "."
        || path == ".."
        || path.starts_with("./")
        || path.starts_with("../")
        || path.starts_with(".\\")
        || path.starts_with("..\\");

    if is_relative {
        let base = Url::from_directory_path(parent_dir)
            .map_err(|_| invalid("parent directory is not absolute"))?;
        let resolved = base
            .join(&path.replace('\\', "/"))
            .map_err(|e| invalid(&e.to_string()))?;
        return Ok(resolved.to_string());
    }

    if Path::new(path).is_absolute() {
        let url = Url::from_file_path(path).map_err(|_| invalid("path is not a valid file path"))?;
        return Ok(url.to_string());
    }

    Ok(path.to_string())
}

/// Import attributes for native imports (`with { type: "json" }`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportAttributes(pub BTreeMap<String, String>);

impl ImportAttributes {
    /// Create an empty attribute set.
    pub fn new() -> Self {
        ImportAttributes(BTreeMap::new())
    }

    /// Add an attribute.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Get an attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Check if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Options for the hook-transpile engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookTranspileOptions {
    /// tsconfig to apply, instead of the nearest one
    pub tsconfig: Option<PathBuf>,

    /// Namespace isolating this import's hooks from other registrations
    pub namespace: Option<String>,

    /// Directory to resolve the path from (set by the dispatcher)
    pub parent_dir: PathBuf,

    /// Record every file the import reads (set by the dispatcher)
    pub collect_dependencies: bool,
}

/// Options for the bundled-runner engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Resolve with ESM semantics (always set by the dispatcher)
    pub esm_resolve: bool,

    /// Share evaluated modules between imports; `None` uses the caller's cache requirement
    pub module_cache: Option<bool>,

    /// Persist transformed sources on disk; `None` uses the caller's cache requirement
    pub fs_cache: Option<bool>,

    /// Unwrap `default` exports of CommonJS interop modules
    pub interop_default: Option<bool>,

    /// Import aliases
    pub alias: BTreeMap<String, String>,
}

/// Output format of the bundle-to-temp engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BundleFormat {
    /// ES module output
    #[default]
    Esm,
    /// CommonJS output
    Cjs,
}

/// Options for the bundle-to-temp engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleOptions {
    /// Entry file (set by the dispatcher)
    pub filepath: PathBuf,

    /// Working directory the bundle resolves from (set by the dispatcher)
    pub cwd: PathBuf,

    /// Output module format
    pub format: Option<BundleFormat>,

    /// tsconfig to apply
    pub tsconfig: Option<PathBuf>,

    /// Packages to leave out of the bundle
    pub external: Vec<String>,

    /// Keep the temporary bundle after loading
    pub preserve_temporary_file: bool,
}

/// One optional option slot per strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Read only when hook-transpile is used
    pub hook_transpile: Option<HookTranspileOptions>,

    /// Read only when bundled-runner is used
    pub bundled_runner: Option<RunnerOptions>,

    /// Read only when bundle-to-temp is used
    pub bundle_to_temp: Option<BundleOptions>,
}

/// A single import request.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Where relative paths resolve from
    pub parent: ParentRef,

    /// `auto` or a strategy name
    pub loader: String,

    /// Caching requirement
    pub cache: CacheRequirement,

    /// Ask the engine to report the files the module read
    pub list_dependencies: bool,

    /// Skip capability checks; engine errors still propagate
    pub bypass_validation: bool,

    /// Import attributes, used by the native strategy only
    pub attributes: Option<ImportAttributes>,

    /// Per-strategy options
    pub loader_options: LoaderOptions,
}

impl ImportOptions {
    /// Create options with automatic selection and a must-cache requirement.
    pub fn new(parent: impl Into<ParentRef>) -> Self {
        ImportOptions {
            parent: parent.into(),
            loader: AUTO_LOADER.to_string(),
            cache: CacheRequirement::MustCache,
            list_dependencies: false,
            bypass_validation: false,
            attributes: None,
            loader_options: LoaderOptions::default(),
        }
    }

    /// Create options seeded from configuration.
    pub fn from_config(parent: impl Into<ParentRef>, config: &ImportConfig) -> Self {
        ImportOptions {
            loader: config.loader().to_string(),
            cache: config.cache(),
            list_dependencies: config.list_dependencies,
            bypass_validation: config.bypass_validation,
            ..ImportOptions::new(parent)
        }
    }

    /// Set the loader by name (`auto` or a strategy name).
    pub fn with_loader(mut self, loader: impl Into<String>) -> Self {
        self.loader = loader.into();
        self
    }

    /// Request a specific strategy.
    pub fn with_strategy(self, strategy: Strategy) -> Self {
        self.with_loader(strategy.as_str())
    }

    /// Set the cache requirement.
    pub fn with_cache(mut self, cache: impl Into<CacheRequirement>) -> Self {
        self.cache = cache.into();
        self
    }

    /// Ask for a dependency list.
    pub fn with_list_dependencies(mut self, list: bool) -> Self {
        self.list_dependencies = list;
        self
    }

    /// Skip capability validation.
    pub fn with_bypass_validation(mut self, bypass: bool) -> Self {
        self.bypass_validation = bypass;
        self
    }

    /// Set import attributes for native imports.
    pub fn with_attributes(mut self, attributes: ImportAttributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Set hook-transpile options.
    pub fn with_hook_transpile(mut self, options: HookTranspileOptions) -> Self {
        self.loader_options.hook_transpile = Some(options);
        self
    }

    /// Set bundled-runner options.
    pub fn with_bundled_runner(mut self, options: RunnerOptions) -> Self {
        self.loader_options.bundled_runner = Some(options);
        self
    }

    /// Set bundle-to-temp options.
    pub fn with_bundle_to_temp(mut self, options: BundleOptions) -> Self {
        self.loader_options.bundle_to_temp = Some(options);
        self
    }

    /// Resolve the loader name: `None` for `auto`.
    pub fn requested_strategy(&self) -> Result<Option<Strategy>, ImportError> {
        let name = self.loader.trim();
        if name.eq_ignore_ascii_case(AUTO_LOADER) {
            return Ok(None);
        }
        name.parse()
            .map(Some)
            .map_err(|_| ImportError::UnknownStrategy {
                name: self.loader.clone(),
            })
    }
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions::new(ParentRef::cwd())
    }
}
