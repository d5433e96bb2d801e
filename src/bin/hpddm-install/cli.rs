//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Download, build and register HPDDM for a SLEPc build
#[derive(Parser)]
#[command(name = "hpddm-install")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download, build and install HPDDM, then register it
    Install(InstallArgs),

    /// Check the build preconditions without touching anything
    Check(CheckArgs),

    /// Show the install plan and commands without running them
    Plan(PlanArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where the host descriptor comes from, plus overrides.
#[derive(Args, Debug, Clone)]
pub struct HostArgs {
    /// Host descriptor (TOML)
    #[arg(long, value_name = "FILE")]
    pub host: PathBuf,

    /// PETSc directory
    #[arg(long, env = "PETSC_DIR", value_name = "DIR")]
    pub petsc_dir: Option<PathBuf>,

    /// PETSc architecture
    #[arg(long, env = "PETSC_ARCH", value_name = "ARCH")]
    pub petsc_arch: Option<String>,

    /// SLEPc directory
    #[arg(long, env = "SLEPC_DIR", value_name = "DIR")]
    pub slepc_dir: Option<PathBuf>,

    /// Installation prefix
    #[arg(long, value_name = "DIR")]
    pub prefix: Option<PathBuf>,
}

#[derive(Args)]
pub struct InstallArgs {
    #[command(flatten)]
    pub host: HostArgs,

    /// SLEPc architecture directory (defaults to <slepc-dir>/<petsc-arch>)
    #[arg(long, value_name = "DIR")]
    pub arch_dir: Option<PathBuf>,

    /// Take the HPDDM archive from this URL or file instead of the pinned URL
    #[arg(long, value_name = "URL|FILE")]
    pub download: Option<String>,

    /// Configuration header the define is appended to
    #[arg(long, value_name = "FILE")]
    pub conf: Option<PathBuf>,

    /// Make variables file the flags are appended to
    #[arg(long, value_name = "FILE")]
    pub vars: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub host: HostArgs,
}

#[derive(Args)]
pub struct PlanArgs {
    #[command(flatten)]
    pub host: HostArgs,

    /// SLEPc architecture directory (defaults to <slepc-dir>/<petsc-arch>)
    #[arg(long, value_name = "DIR")]
    pub arch_dir: Option<PathBuf>,

    /// Emit the plan as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
