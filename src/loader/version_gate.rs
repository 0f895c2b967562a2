//! Runtime version gate for the hook-transpile engine.
//!
//! Loader hooks only work on hosts that ship off-thread module hooks, which
//! landed in different minor releases of each major line.

use semver::Version;

/// Minimum minor version per major line: `(major, min_minor)`.
///
/// Majors below the first entry are ineligible. Majors that are not listed
/// and sit above the first entry are eligible unconditionally.
const VERSION_THRESHOLDS: &[(u64, u64)] = &[(18, 19), (20, 8)];

/// Decide whether the hook-transpile engine can run on a host.
///
/// A host without a version identifier is treated as eligible.
pub fn hook_transpile_eligible(version: Option<&Version>) -> bool {
    let Some(version) = version else {
        return true;
    };

    let oldest_major = VERSION_THRESHOLDS[0].0;
    if version.major < oldest_major {
        return false;
    }

    VERSION_THRESHOLDS
        .iter()
        .find(|(major, _)| *major == version.major)
        .map_or(true, |(_, min_minor)| version.minor >= *min_minor)
}

/// Parse a runtime version string, tolerating a `v` prefix, suffixes and
/// missing components (`v20.8.1`, `18.19`, `22.0.0-nightly`).
pub fn parse_runtime_version(version_str: &str) -> Option<Version> {
    let trimmed = version_str.trim().trim_start_matches('v');

    let clean_version = trimmed
        .split(|c: char| !c.is_ascii_digit() && c != '.')
        .next()
        .unwrap_or(trimmed);

    if let Ok(v) = clean_version.parse() {
        return Some(v);
    }

    let parts: Vec<&str> = clean_version.split('.').collect();
    let major = parts.first().and_then(|s| s.parse().ok())?;
    let minor = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(0);
    let patch = parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(0);

    Some(Version::new(major, minor, patch))
}
