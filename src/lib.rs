//! hpddm-installer - builds the HPDDM dependency for a SLEPc configure run
//!
//! This crate downloads a pinned HPDDM revision, compiles its PETSc
//! interface against an existing PETSc build, installs the resulting shared
//! library and headers, and emits the build variables SLEPc consumes.

pub mod builder;
pub mod core;
pub mod error;
pub mod ops;
pub mod sources;
pub mod util;

/// Test doubles for the runner and fetcher seams.
///
/// Only compiled for unit tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{DownloadSource, HostDescriptor, InstallPlan, PackageDescriptor};
pub use error::{InstallError, InstallResult};
pub use ops::{InstallEnv, InstallOptions, Installer, Registration};
