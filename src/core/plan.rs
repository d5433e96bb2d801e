//! Install plan: the directories one install call works in.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::host::HostDescriptor;
use crate::core::package::PackageDescriptor;

/// Name of the directory holding downloaded packages inside the arch dir.
pub const EXTERNAL_PACKAGES_DIR: &str = "externalpackages";

/// Derived paths for a single install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallPlan {
    /// SLEPc arch directory the configure run writes into
    pub arch_dir: PathBuf,
    /// `<arch_dir>/externalpackages`
    pub extern_dir: PathBuf,
    /// Unpacked package sources
    pub build_dir: PathBuf,
    /// Installation root (prefix or arch dir)
    pub install_dir: PathBuf,
}

impl InstallPlan {
    /// Compute the plan for `package` on `host`.
    pub fn new(package: &PackageDescriptor, host: &HostDescriptor, arch_dir: &Path) -> Self {
        let extern_dir = arch_dir.join(EXTERNAL_PACKAGES_DIR);
        let build_dir = extern_dir.join(&package.dirname);
        let install_dir = host
            .slepc
            .prefix
            .clone()
            .unwrap_or_else(|| arch_dir.to_path_buf());

        InstallPlan {
            arch_dir: arch_dir.to_path_buf(),
            extern_dir,
            build_dir,
            install_dir,
        }
    }

    /// Where the downloaded archive is kept.
    pub fn archive_path(&self, package: &PackageDescriptor) -> PathBuf {
        self.extern_dir.join(&package.archive)
    }

    /// `<install_dir>/lib`
    pub fn lib_dir(&self) -> PathBuf {
        self.install_dir.join("lib")
    }

    /// `<install_dir>/include`
    pub fn include_dir(&self) -> PathBuf {
        self.install_dir.join("include")
    }

    /// `<arch_dir>/include`
    pub fn arch_include_dir(&self) -> PathBuf {
        self.arch_dir.join("include")
    }

    /// Library path without suffix, handed to PETSc's make functions.
    pub fn library_stem(&self, package: &PackageDescriptor) -> PathBuf {
        self.lib_dir().join(format!("lib{}", package.library))
    }

    /// Suffix-qualified symlink pointing at the versioned shared object.
    pub fn library_link(&self, package: &PackageDescriptor, sl_suffix: &str) -> PathBuf {
        self.lib_dir()
            .join(format!("lib{}.{}", package.library, sl_suffix))
    }
}
