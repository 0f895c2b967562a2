//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// importkit - pick and run the right loader for a module
#[derive(Parser)]
#[command(name = "importkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List import strategies and their capabilities
    List,

    /// Show one strategy in detail
    Show(ShowArgs),

    /// Explain which strategy an automatic import would use
    Select(SelectArgs),

    /// Check whether the host imports transformable files natively
    Probe(ProbeArgs),

    /// Import a module through the node host and print its exports
    Import(ImportArgs),
}

#[derive(Args)]
pub struct ShowArgs {
    /// Strategy name (native, hook-transpile, bundled-runner, bundle-to-temp)
    pub strategy: String,
}

#[derive(Args)]
pub struct SelectArgs {
    /// Module path
    pub path: String,

    /// Cache requirement (must, never, any)
    #[arg(long)]
    pub cache: Option<String>,

    /// Pretend the host has this version ("none" for no version)
    #[arg(long)]
    pub runtime_version: Option<String>,

    /// Node executable
    #[arg(long, env = "IMPORTKIT_NODE")]
    pub node: Option<PathBuf>,
}

#[derive(Args)]
pub struct ProbeArgs {
    /// Fixture to import instead of the bundled one
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Node executable
    #[arg(long, env = "IMPORTKIT_NODE")]
    pub node: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Module path or specifier
    pub path: String,

    /// Loader (auto, native, hook-transpile, bundled-runner, bundle-to-temp)
    #[arg(long)]
    pub loader: Option<String>,

    /// Cache requirement (must, never, any)
    #[arg(long)]
    pub cache: Option<String>,

    /// Ask the engine for the files the module read
    #[arg(long)]
    pub list_dependencies: bool,

    /// Skip capability validation
    #[arg(long)]
    pub force: bool,

    /// Resolve relative paths from this file (or directory, with a trailing separator)
    #[arg(long)]
    pub parent: Option<String>,

    /// Node executable
    #[arg(long, env = "IMPORTKIT_NODE")]
    pub node: Option<PathBuf>,
}
