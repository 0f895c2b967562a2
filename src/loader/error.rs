//! Import error types.

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::loader::capabilities::{CacheRequirement, Strategy};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Errors raised by the dispatcher.
///
/// Validation errors surface before any engine runs. Engine failures are
/// passed through untouched in `Engine`.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ImportError {
    #[error("unknown strategy `{name}`")]
    #[diagnostic(
        code(importkit::validate::unknown_strategy),
        help("valid loaders: auto, native, hook-transpile, bundled-runner, bundle-to-temp")
    )]
    UnknownStrategy { name: String },

    #[error("strategy `{strategy}` cannot satisfy cache requirement `{requirement}`")]
    #[diagnostic(code(importkit::validate::cache_incompatible))]
    CacheIncompatible {
        strategy: Strategy,
        requirement: CacheRequirement,
    },

    #[error("strategy `{strategy}` cannot list dependencies")]
    #[diagnostic(
        code(importkit::validate::dependency_listing),
        help("use hook-transpile or bundle-to-temp to collect dependencies")
    )]
    DependencyListingUnsupported { strategy: Strategy },

    #[error("invalid parent reference `{parent}`: {reason}")]
    #[diagnostic(code(importkit::request::invalid_parent))]
    InvalidParent { parent: String, reason: String },

    #[error("no engine registered for strategy `{strategy}`")]
    #[diagnostic(code(importkit::dispatch::engine_unavailable))]
    EngineUnavailable { strategy: Strategy },

    #[error(transparent)]
    #[diagnostic(code(importkit::engine))]
    Engine(#[from] anyhow::Error),
}

impl ImportError {
    /// Check whether `bypass_validation` would have suppressed this error.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ImportError::CacheIncompatible { .. } | ImportError::DependencyListingUnsupported { .. }
        )
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ImportError::UnknownStrategy { name } => {
                Diagnostic::error(format!("unknown loader `{}`", name))
                    .with_suggestion(suggestions::LIST_STRATEGIES)
            }
            ImportError::CacheIncompatible {
                strategy,
                requirement,
            } => {
                let mut diag = Diagnostic::error(self.to_string());
                let compatible: Vec<&str> = Strategy::ALL
                    .iter()
                    .filter(|s| s.capabilities().supports_cache(*requirement))
                    .map(|s| s.as_str())
                    .collect();
                diag = diag.with_context(format!(
                    "strategies supporting `{}`: {}",
                    requirement,
                    compatible.join(", ")
                ));
                diag.with_suggestion(format!(
                    "Use one of the strategies above instead of `{}`",
                    strategy
                ))
                .with_suggestion(suggestions::BYPASS_VALIDATION)
            }
            ImportError::DependencyListingUnsupported { .. } => {
                Diagnostic::error(self.to_string())
                    .with_suggestion("Use --loader hook-transpile or --loader bundle-to-temp")
                    .with_suggestion(suggestions::BYPASS_VALIDATION)
            }
            ImportError::InvalidParent { parent, reason } => {
                Diagnostic::error(format!("cannot resolve imports from `{}`", parent))
                    .with_context(reason.clone())
            }
            ImportError::EngineUnavailable { strategy } => Diagnostic::error(self.to_string())
                .with_context(format!("{} engines are provided by the embedding program", strategy))
                .with_suggestion(suggestions::NATIVE_ONLY),
            ImportError::Engine(e) => Diagnostic::error(format!("{:#}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ImportError::CacheIncompatible {
            strategy: Strategy::Native,
            requirement: CacheRequirement::MustNotCache,
        };
        assert_eq!(
            err.to_string(),
            "strategy `native` cannot satisfy cache requirement `must-not-cache`"
        );
        assert!(err.is_validation());

        let err = ImportError::UnknownStrategy {
            name: "foo".to_string(),
        };
        assert!(err.to_string().contains("foo"));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_engine_errors_pass_through() {
        let err: ImportError = anyhow::anyhow!("SyntaxError: Unexpected token").into();
        assert_eq!(err.to_string(), "SyntaxError: Unexpected token");
    }

    #[test]
    fn test_cache_diagnostic_lists_alternatives() {
        let err = ImportError::CacheIncompatible {
            strategy: Strategy::HookTranspile,
            requirement: CacheRequirement::MustCache,
        };
        let output = err.to_diagnostic().format(false);
        assert!(output.contains("native, bundled-runner"));
        assert!(output.contains("--force"));
    }
}
