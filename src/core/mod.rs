//! Core data structures.
//!
//! - The package descriptor for the pinned HPDDM revision
//! - The host descriptor supplied by the surrounding build
//! - The install plan derived from both

pub mod host;
pub mod package;
pub mod plan;

pub use host::{BaseLibrary, HostDescriptor, HostProject, Precision};
pub use package::{DownloadSource, PackageDescriptor};
pub use plan::InstallPlan;
