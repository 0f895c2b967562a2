//! Request validation against strategy capabilities.
//!
//! Checks are table-driven: everything comes from the capability matrix,
//! never from per-strategy conditionals.

use crate::loader::capabilities::{CacheRequirement, CapabilityMatrix, Strategy};
use crate::loader::error::ImportError;

/// Validates one request against one strategy.
pub struct StrategyValidator {
    strategy: Strategy,
    capabilities: CapabilityMatrix,
}

impl StrategyValidator {
    /// Create a validator for a strategy.
    pub fn new(strategy: Strategy) -> Self {
        StrategyValidator {
            strategy,
            capabilities: strategy.capabilities(),
        }
    }

    /// Run every check, cache first.
    pub fn validate(
        &self,
        cache: CacheRequirement,
        list_dependencies: bool,
    ) -> Result<(), ImportError> {
        self.validate_cache(cache)?;
        self.validate_dependency_listing(list_dependencies)?;
        Ok(())
    }

    fn validate_cache(&self, cache: CacheRequirement) -> Result<(), ImportError> {
        if !self.capabilities.supports_cache(cache) {
            return Err(ImportError::CacheIncompatible {
                strategy: self.strategy,
                requirement: cache,
            });
        }
        Ok(())
    }

    fn validate_dependency_listing(&self, list_dependencies: bool) -> Result<(), ImportError> {
        if list_dependencies && !self.capabilities.supports_dependency_listing {
            return Err(ImportError::DependencyListingUnsupported {
                strategy: self.strategy,
            });
        }
        Ok(())
    }
}

/// Validate a request unless validation is bypassed.
///
/// A bypassed failure is logged and otherwise ignored.
pub fn validate_request(
    strategy: Strategy,
    cache: CacheRequirement,
    list_dependencies: bool,
    bypass: bool,
) -> Result<(), ImportError> {
    match StrategyValidator::new(strategy).validate(cache, list_dependencies) {
        Err(e) if bypass => {
            tracing::warn!("validation bypassed: {}", e);
            Ok(())
        }
        other => other,
    }
}
