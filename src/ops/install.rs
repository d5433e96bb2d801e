//! The install procedure.
//!
//! A straight line: preconditions, fetch, helper makefile, adapters, compile,
//! query soname, link, headers, registration. Each stage either succeeds or
//! aborts the whole install with an [`InstallError`].

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use crate::builder::compile::{CompileCommand, KSP_ADAPTER, PC_ADAPTER};
use crate::builder::shlib::{query_command, write_helper_makefile, SharedLibrary};
use crate::core::host::HostDescriptor;
use crate::core::package::{DownloadSource, PackageDescriptor};
use crate::core::plan::InstallPlan;
use crate::error::{InstallError, InstallResult};
use crate::ops::precondition::check_preconditions;
use crate::sources::archive::{acquire, Acquired};
use crate::sources::fetch::Fetcher;
use crate::util::fs::{copy_file, copy_files_flat, ensure_dir, force_symlink};
use crate::util::process::CommandRunner;

/// Base URL the adapters are downloaded from when PETSc has no source tree.
pub const ADAPTER_BASE_URL: &str = "https://www.mcs.anl.gov/petsc/petsc-master";

/// Location of the adapters relative to the PETSc root (or [`ADAPTER_BASE_URL`]).
const KSP_ADAPTER_ORIGIN: &str = "src/ksp/ksp/impls/hpddm/hpddm.cxx";
const PC_ADAPTER_ORIGIN: &str = "src/ksp/pc/impls/hpddm/hpddm.cxx";

/// External collaborators used by an install.
pub struct InstallEnv<'a> {
    pub runner: &'a mut dyn CommandRunner,
    pub fetcher: &'a mut dyn Fetcher,
}

impl<'a> InstallEnv<'a> {
    pub fn new(runner: &'a mut dyn CommandRunner, fetcher: &'a mut dyn Fetcher) -> Self {
        InstallEnv { runner, fetcher }
    }
}

/// Options for a single install.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Where the source archive comes from
    pub download: DownloadSource,
}

/// Where an adapter source is taken from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterOrigin {
    Download(String),
    Copy(PathBuf),
}

/// An adapter source and its destination inside the build directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adapter {
    pub origin: AdapterOrigin,
    pub dest: PathBuf,
}

/// Where the two adapters come from for `host`.
///
/// Without an architecture tag PETSc was installed to a prefix and ships no
/// sources, so the adapters are downloaded. Otherwise they are copied out of
/// the PETSc source tree.
pub fn adapters(host: &HostDescriptor) -> Vec<Adapter> {
    [(KSP_ADAPTER_ORIGIN, KSP_ADAPTER), (PC_ADAPTER_ORIGIN, PC_ADAPTER)]
        .into_iter()
        .map(|(origin, dest)| {
            let origin = if host.petsc.has_arch() {
                AdapterOrigin::Copy(host.petsc.dir.join(origin))
            } else {
                AdapterOrigin::Download(format!("{}/{}", ADAPTER_BASE_URL, origin))
            };
            Adapter {
                origin,
                dest: PathBuf::from(dest),
            }
        })
        .collect()
}

/// Lines registered with the host build once the package is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registration {
    /// `#define <PREFIX>_HAVE_<NAME> 1`
    pub define: String,
    /// `<NAME>_LIB = ...`
    pub lib: String,
    /// `<NAME>_INCLUDE = ...`
    pub include: String,
    /// Link flags, kept for later use by the host build
    pub lib_flags: String,
}

impl Registration {
    /// Compose the registration for an install into `plan`.
    pub fn new(package: &PackageDescriptor, host: &HostDescriptor, plan: &InstallPlan) -> Self {
        let name = package.macro_name();
        let lib_dir = plan.lib_dir();
        let lib_flags = format!(
            "{}{} -L{} -l{}",
            host.petsc.slflag,
            lib_dir.display(),
            lib_dir.display(),
            package.library
        );

        Registration {
            define: format!("#define {}_HAVE_{} 1", host.slepc.macro_prefix, name),
            lib: format!("{}_LIB = {}", name, lib_flags),
            include: format!("{}_INCLUDE = -I{}", name, plan.include_dir().display()),
            lib_flags,
        }
    }

    /// Append the define to `conf` and the variables to `vars`.
    pub fn write_to(&self, conf: &mut dyn Write, vars: &mut dyn Write) -> std::io::Result<()> {
        writeln!(conf, "{}", self.define)?;
        writeln!(vars, "{}", self.lib)?;
        writeln!(vars, "{}", self.include)?;
        Ok(())
    }
}

/// Installs one package and remembers whether it succeeded.
#[derive(Debug, Clone)]
pub struct Installer {
    package: PackageDescriptor,
    have_package: bool,
    package_flags: Vec<String>,
}

impl Installer {
    pub fn new(package: PackageDescriptor) -> Self {
        Installer {
            package,
            have_package: false,
            package_flags: Vec::new(),
        }
    }

    pub fn package(&self) -> &PackageDescriptor {
        &self.package
    }

    /// Whether the package was installed successfully.
    pub fn have_package(&self) -> bool {
        self.have_package
    }

    /// Link flags recorded by the last successful install.
    pub fn package_flags(&self) -> &[String] {
        &self.package_flags
    }

    /// Check the build preconditions without side effects.
    pub fn check(&self, host: &HostDescriptor) -> InstallResult<()> {
        check_preconditions(&self.package, host)
    }

    /// Download, build and install the package, then register it.
    ///
    /// `arch_dir` is the host project's architecture directory; the
    /// registration lines are appended to `conf` and `vars`.
    pub fn install(
        &mut self,
        host: &HostDescriptor,
        arch_dir: &Path,
        opts: &InstallOptions,
        env: &mut InstallEnv<'_>,
        conf: &mut dyn Write,
        vars: &mut dyn Write,
    ) -> InstallResult<Registration> {
        let package = &self.package;
        let name = package.macro_name();

        check_preconditions(package, host)?;

        let plan = InstallPlan::new(package, host, arch_dir);
        tracing::info!(
            "Installing {} {} into {}",
            name,
            package.short_version(),
            plan.install_dir.display()
        );

        match acquire(package, &plan, &opts.download, &mut *env.fetcher)? {
            Acquired::Existing => {}
            Acquired::Unpacked(archive) | Acquired::Downloaded(archive) => {
                tracing::debug!("Sources unpacked from {}", archive.display());
            }
        }

        write_helper_makefile(package, host, &plan)?;

        for adapter in adapters(host) {
            fetch_adapter(&adapter, &plan.build_dir, &mut *env.fetcher)?;
        }

        tracing::info!("Compiling {}", name);
        let compile = CompileCommand::new(host, &plan).chained(&plan.build_dir);
        let output = env.runner.run(&compile)?;
        if !output.success() {
            return Err(InstallError::Compile { package: name });
        }

        let output = env.runner.run(&query_command(host, &plan.build_dir))?;
        if !output.success() {
            return Err(InstallError::HostTool);
        }
        let shlib = SharedLibrary::from_output(&output).ok_or(InstallError::HostTool)?;

        tracing::info!("Linking {}", shlib.soname);
        ensure_dir(&plan.lib_dir())?;
        let output = env.runner.run(&shlib.link_command(host, &plan.build_dir))?;
        if !output.success() {
            return Err(InstallError::Link { package: name });
        }
        let link = plan.library_link(package, &host.petsc.sl_suffix);
        force_symlink(Path::new(&shlib.soname), &link).map_err(|e| {
            tracing::debug!("{:#}", e);
            InstallError::Link {
                package: name.clone(),
            }
        })?;

        let headers = copy_files_flat(&plan.build_dir.join("include"), &plan.include_dir())?;
        tracing::debug!(
            "Installed {} headers into {}",
            headers.len(),
            plan.include_dir().display()
        );

        let registration = Registration::new(package, host, &plan);
        registration
            .write_to(conf, vars)
            .context("failed to write build configuration")?;

        self.package_flags = vec![registration.lib_flags.clone()];
        self.have_package = true;
        tracing::info!("Installed {}", name);

        Ok(registration)
    }

    /// Human-readable summary for the end of a configure run.
    pub fn summary(&self) -> String {
        let name = self.package.macro_name();
        if !self.have_package {
            return format!("{}: not installed\n", name);
        }
        let mut out = format!(
            "{} library flags:\n  {}\n",
            name,
            self.package_flags.join(" ")
        );
        out.push_str(&format!("{} version: {}\n", name, self.package.version));
        out
    }
}

fn fetch_adapter(adapter: &Adapter, build_dir: &Path, fetcher: &mut dyn Fetcher) -> InstallResult<()> {
    let dest = build_dir.join(&adapter.dest);
    match &adapter.origin {
        AdapterOrigin::Download(url) => fetcher
            .fetch(url, &dest)
            .map_err(|e| InstallError::download(url, e)),
        AdapterOrigin::Copy(src) => {
            tracing::debug!("Copying {} to {}", src.display(), dest.display());
            copy_file(src, &dest).map_err(|e| InstallError::download(src.display().to_string(), e))
        }
    }
}
