//! High-level operations.

pub mod install;
pub mod precondition;

pub use install::{InstallEnv, InstallOptions, Installer, Registration};
pub use precondition::check_preconditions;
