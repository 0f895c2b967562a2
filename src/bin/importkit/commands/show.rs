//! `importkit show` command

use anyhow::Result;

use crate::cli::ShowArgs;
use importkit::loader::CacheRequirement;
use importkit::Strategy;

pub fn execute(args: ShowArgs) -> Result<()> {
    let strategy = args.strategy.parse::<Strategy>().map_err(|e| anyhow::anyhow!("{}", e))?;
    let caps = strategy.capabilities();

    println!("Strategy: {}", strategy);
    println!("  {}", strategy.description());
    println!();

    println!("Cache requirements:");
    for requirement in [
        CacheRequirement::MustCache,
        CacheRequirement::MustNotCache,
        CacheRequirement::Indifferent,
    ] {
        let status = if caps.supports_cache(requirement) {
            "supported"
        } else {
            "rejected"
        };
        println!("  {:<15} {}", requirement, status);
    }
    println!();

    println!("Dependency listing: {}", caps.supports_dependency_listing);
    println!("Native runtimes only: {}", caps.native_runtimes_only);

    match strategy {
        Strategy::HookTranspile => {
            println!();
            println!("Host versions: >=18.19, excluding 20.0 to 20.7 (hosts without a version count as eligible)");
        }
        Strategy::BundleToTemp => {
            println!();
            println!("Never chosen automatically; request it with --loader bundle-to-temp");
        }
        Strategy::Native | Strategy::BundledRunner => {}
    }

    Ok(())
}
