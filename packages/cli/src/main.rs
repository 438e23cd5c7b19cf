mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, blocks, init, render, versions, ApplyArgs, BlocksArgs, InitArgs, RenderArgs, VersionsArgs,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Pagecraft CLI - build, edit and publish block-based landing pages
#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a config file and a starter page
    Init(InitArgs),

    /// Render page files to static HTML
    Render(RenderArgs),

    /// List block kinds, their caps and fields
    Blocks(BlocksArgs),

    /// Apply a mutation script to a page file
    Apply(ApplyArgs),

    /// Manage saved versions on the backend
    Versions(VersionsArgs),
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| match cli.command {
            Command::Init(args) => init(args, &cwd),
            Command::Render(args) => render(args, &cwd),
            Command::Blocks(args) => blocks(args, &cwd),
            Command::Apply(args) => apply(args, &cwd),
            Command::Versions(args) => versions(args, &cwd),
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
