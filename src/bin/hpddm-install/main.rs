//! hpddm-install - build and register HPDDM for a SLEPc configure run

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("ERROR: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("hpddm_installer=debug,hpddm_install=debug")
    } else {
        EnvFilter::new("hpddm_installer=info,hpddm_install=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Install(args) => commands::install::execute(args),
        Commands::Check(args) => commands::check::execute(args),
        Commands::Plan(args) => commands::plan::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
