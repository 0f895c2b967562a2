//! `importkit probe` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::ProbeArgs;
use crate::commands::{block_on, config_with_node};
use importkit::host::NodeHost;
use importkit::loader::NativeSupportProbe;
use importkit::util::diagnostic::{emit, suggestions, Diagnostic};
use importkit::HostRuntime;

pub fn execute(args: ProbeArgs, color: bool) -> Result<()> {
    let config = config_with_node(args.node);
    let host = Arc::new(NodeHost::from_config(&config.probe));

    let fixture = args.fixture.or(config.probe.fixture);
    let probe = match fixture {
        Some(fixture) => NativeSupportProbe::with_fixture(host.clone(), fixture),
        None => NativeSupportProbe::new(host.clone()),
    };

    match host.executable() {
        Some(node) => println!("Host:     {}", node.display()),
        None => {
            println!("Host:     not found");
            emit(
                &Diagnostic::warning("no node executable found, native imports will fail")
                    .with_suggestion(suggestions::INSTALL_NODE),
                color,
            );
        }
    }
    let (version, supported) = block_on(async {
        let version = host.version().await;
        (version, probe.is_supported().await)
    })?;

    match version {
        Some(version) => println!("Version:  {}", version),
        None => println!("Version:  unknown"),
    }
    println!("Fixture:  {}", probe.fixture().display());
    println!(
        "Native:   {}",
        if supported { "supported" } else { "not supported" }
    );

    Ok(())
}
