//! Strategy capability types - hard constraints on what each loader can do.
//!
//! Capabilities are immutable facts about strategies, not configuration.
//! Policy (which strategy to prefer) belongs in `select.rs`.

use serde::{Deserialize, Serialize};

/// Unique identifier for an import strategy.
///
/// The set is closed: adding a strategy is a code change, never data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// The host runtime's own dynamic import
    Native,
    /// Loader-hook based transpiler registered with the host
    HookTranspile,
    /// Module runner with a bundled parser
    BundledRunner,
    /// Bundle to a temporary file, then load that file
    BundleToTemp,
}

impl Strategy {
    /// Every strategy, in registry order.
    pub const ALL: [Strategy; 4] = [
        Strategy::Native,
        Strategy::HookTranspile,
        Strategy::BundledRunner,
        Strategy::BundleToTemp,
    ];

    /// Get the strategy name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Native => "native",
            Strategy::HookTranspile => "hook-transpile",
            Strategy::BundledRunner => "bundled-runner",
            Strategy::BundleToTemp => "bundle-to-temp",
        }
    }

    /// Static capabilities of this strategy.
    pub fn capabilities(&self) -> CapabilityMatrix {
        capabilities_of(*self)
    }

    /// Short human description, used by the CLI.
    pub fn description(&self) -> &'static str {
        match self {
            Strategy::Native => "host runtime dynamic import, no transformation",
            Strategy::HookTranspile => "transpile through loader hooks registered with the host",
            Strategy::BundledRunner => "module runner with a bundled parser",
            Strategy::BundleToTemp => "bundle to a temporary file and load it",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(Strategy::Native),
            "hook-transpile" => Ok(Strategy::HookTranspile),
            "bundled-runner" => Ok(Strategy::BundledRunner),
            "bundle-to-temp" => Ok(Strategy::BundleToTemp),
            _ => Err(StrategyParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid strategy name.
#[derive(Debug, Clone)]
pub struct StrategyParseError(pub String);

impl std::fmt::Display for StrategyParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid strategy '{}', valid values: native, hook-transpile, bundled-runner, bundle-to-temp",
            self.0
        )
    }
}

impl std::error::Error for StrategyParseError {}

/// What the caller needs from the module cache for one import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheRequirement {
    /// Repeated imports must return the same instance
    #[default]
    MustCache,
    /// Every import must evaluate the module afresh
    MustNotCache,
    /// Either behavior is acceptable
    Indifferent,
}

impl CacheRequirement {
    /// Get the requirement name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheRequirement::MustCache => "must-cache",
            CacheRequirement::MustNotCache => "must-not-cache",
            CacheRequirement::Indifferent => "indifferent",
        }
    }

    /// The boolean form used by engines: `Some(true)`, `Some(false)` or no preference.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            CacheRequirement::MustCache => Some(true),
            CacheRequirement::MustNotCache => Some(false),
            CacheRequirement::Indifferent => None,
        }
    }
}

impl From<Option<bool>> for CacheRequirement {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => CacheRequirement::MustCache,
            Some(false) => CacheRequirement::MustNotCache,
            None => CacheRequirement::Indifferent,
        }
    }
}

impl From<bool> for CacheRequirement {
    fn from(flag: bool) -> Self {
        Some(flag).into()
    }
}

impl std::fmt::Display for CacheRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CacheRequirement {
    type Err = CacheRequirementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "must" | "must-cache" | "true" => Ok(CacheRequirement::MustCache),
            "never" | "must-not-cache" | "false" => Ok(CacheRequirement::MustNotCache),
            "any" | "indifferent" => Ok(CacheRequirement::Indifferent),
            _ => Err(CacheRequirementParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid cache requirement.
#[derive(Debug, Clone)]
pub struct CacheRequirementParseError(pub String);

impl std::fmt::Display for CacheRequirementParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid cache requirement '{}', valid values: must, never, any",
            self.0
        )
    }
}

impl std::error::Error for CacheRequirementParseError {}

/// Complete capabilities of one strategy.
///
/// A strategy always supports at least one caching mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilityMatrix {
    /// Can guarantee that repeated imports share one instance
    pub supports_cache_true: bool,

    /// Can guarantee a fresh evaluation on every import
    pub supports_cache_false: bool,

    /// Can report the files the module transitively read
    pub supports_dependency_listing: bool,

    /// Only works on the reference host runtime
    pub native_runtimes_only: bool,
}

impl CapabilityMatrix {
    /// Check whether a cache requirement can be honored.
    pub fn supports_cache(&self, requirement: CacheRequirement) -> bool {
        match requirement {
            CacheRequirement::MustCache => self.supports_cache_true,
            CacheRequirement::MustNotCache => self.supports_cache_false,
            CacheRequirement::Indifferent => true,
        }
    }
}

const NATIVE: CapabilityMatrix = CapabilityMatrix {
    supports_cache_true: true,
    supports_cache_false: false,
    supports_dependency_listing: false,
    native_runtimes_only: false,
};

const HOOK_TRANSPILE: CapabilityMatrix = CapabilityMatrix {
    supports_cache_true: false,
    supports_cache_false: true,
    supports_dependency_listing: true,
    native_runtimes_only: true,
};

const BUNDLED_RUNNER: CapabilityMatrix = CapabilityMatrix {
    supports_cache_true: true,
    supports_cache_false: true,
    supports_dependency_listing: false,
    native_runtimes_only: false,
};

const BUNDLE_TO_TEMP: CapabilityMatrix = CapabilityMatrix {
    supports_cache_true: false,
    supports_cache_false: true,
    supports_dependency_listing: true,
    native_runtimes_only: false,
};

/// Look up the capability matrix for a strategy.
pub fn capabilities_of(strategy: Strategy) -> CapabilityMatrix {
    match strategy {
        Strategy::Native => NATIVE,
        Strategy::HookTranspile => HOOK_TRANSPILE,
        Strategy::BundledRunner => BUNDLED_RUNNER,
        Strategy::BundleToTemp => BUNDLE_TO_TEMP,
    }
}
