//! Automatic strategy selection.
//!
//! Order matters:
//! 1. `must-not-cache` never goes native; native imports are always cached.
//! 2. Files the host can run as is go native.
//! 3. `must-cache` goes to the bundled runner.
//! 4. Everything else goes to hook-transpile when the host version allows it.
//!
//! bundle-to-temp is never chosen here; callers must ask for it.

use crate::loader::capabilities::{CacheRequirement, Strategy};
use crate::loader::engine::HostRuntime;
use crate::loader::probe::NativeSupportProbe;
use crate::loader::version_gate::hook_transpile_eligible;

/// Pick a strategy for an `auto` request.
///
/// The probe only runs when its answer can change the outcome.
pub async fn select_strategy(
    cache: CacheRequirement,
    is_transformable: bool,
    probe: &NativeSupportProbe,
    host: &dyn HostRuntime,
) -> Strategy {
    if cache != CacheRequirement::MustNotCache {
        if !is_transformable || probe.is_supported().await {
            return Strategy::Native;
        }

        if cache == CacheRequirement::MustCache {
            return Strategy::BundledRunner;
        }
    }

    select_transpiler(host).await
}

async fn select_transpiler(host: &dyn HostRuntime) -> Strategy {
    match host.version().await {
        None => {
            tracing::debug!("host has no version identifier, assuming hook support");
            Strategy::HookTranspile
        }
        Some(version) if !hook_transpile_eligible(Some(&version)) => {
            tracing::debug!("host {} predates loader hooks, using bundled runner", version);
            Strategy::BundledRunner
        }
        Some(_) => Strategy::HookTranspile,
    }
}
