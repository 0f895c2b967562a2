//! `importkit list` command

use anyhow::Result;

use importkit::Strategy;

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub fn execute() -> Result<()> {
    println!("Import Strategies:");
    println!();

    for strategy in Strategy::ALL {
        let caps = strategy.capabilities();

        println!("  {} - {}", strategy, strategy.description());
        println!("    Cache:        {}", yes_no(caps.supports_cache_true));
        println!("    No cache:     {}", yes_no(caps.supports_cache_false));
        println!("    Dependencies: {}", yes_no(caps.supports_dependency_listing));
        println!("    Native only:  {}", yes_no(caps.native_runtimes_only));
        println!();
    }

    Ok(())
}
