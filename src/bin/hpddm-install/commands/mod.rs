//! Command implementations

pub mod check;
pub mod completions;
pub mod install;
pub mod plan;

use std::path::PathBuf;

use anyhow::{bail, Result};
use hpddm_installer::HostDescriptor;

use crate::cli::HostArgs;

/// Load the host descriptor and apply command-line/environment overrides.
pub fn load_host(args: &HostArgs) -> Result<HostDescriptor> {
    let mut host = HostDescriptor::load(&args.host)?;

    if let Some(ref dir) = args.petsc_dir {
        host.petsc.dir = dir.clone();
    }
    if let Some(ref arch) = args.petsc_arch {
        host.petsc.arch = arch.clone();
    }
    if let Some(ref dir) = args.slepc_dir {
        host.slepc.dir = dir.clone();
    }
    if let Some(ref prefix) = args.prefix {
        host.slepc.prefix = Some(prefix.clone());
    }

    tracing::debug!(
        "PETSc: {} (arch `{}`), SLEPc: {}",
        host.petsc.dir.display(),
        host.petsc.arch,
        host.slepc.dir.display()
    );
    Ok(host)
}

/// The SLEPc architecture directory: explicit, or `<slepc-dir>/<petsc-arch>`.
pub fn resolve_arch_dir(host: &HostDescriptor, arch_dir: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = arch_dir {
        return Ok(dir);
    }
    if !host.petsc.has_arch() {
        bail!("--arch-dir is required when PETSc has no architecture (prefix install)");
    }
    Ok(host.slepc.dir.join(&host.petsc.arch))
}
