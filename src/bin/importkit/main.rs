//! importkit CLI - inspect and exercise import strategy selection

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("importkit=debug")
    } else {
        EnvFilter::new("importkit=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let color = !cli.no_color;

    match cli.command {
        Commands::List => commands::list::execute(),
        Commands::Show(args) => commands::show::execute(args),
        Commands::Select(args) => commands::select::execute(args),
        Commands::Probe(args) => commands::probe::execute(args, color),
        Commands::Import(args) => commands::import::execute(args, color),
    }
}
