//! Installer error types.
//!
//! Every failure is fatal for the surrounding configure run. The variants only
//! exist so callers and tests can tell the stages apart; none of them is
//! retried or rolled back.

use thiserror::Error;

/// Error raised by the install procedure.
#[derive(Debug, Error)]
pub enum InstallError {
    /// A build precondition does not hold (C++11, shared libraries, ...).
    #[error("{0}")]
    Precondition(String),

    /// The source archive or an adapter file could not be fetched or unpacked.
    #[error("download of {what} failed: {cause:#}")]
    Download { what: String, cause: anyhow::Error },

    /// The compiler exited with a non-zero status.
    #[error("compilation of {package} failed.")]
    Compile { package: String },

    /// The host build tool could not compute the soname or linker invocation.
    #[error("calling PETSc SONAME_FUNCTION or SL_LINKER_FUNCTION failed.")]
    HostTool,

    /// Linking or installing the shared library failed.
    #[error("installation of {package} failed.")]
    Link { package: String },

    /// Any other filesystem or process error.
    #[error(transparent)]
    Io(#[from] anyhow::Error),
}

impl InstallError {
    /// Wrap a fetch/unpack error.
    pub fn download(what: impl Into<String>, cause: anyhow::Error) -> Self {
        InstallError::Download {
            what: what.into(),
            cause,
        }
    }

    /// Short name of the stage that failed, used in log output.
    pub fn stage(&self) -> &'static str {
        match self {
            InstallError::Precondition(_) => "precondition",
            InstallError::Download { .. } => "download",
            InstallError::Compile { .. } => "compile",
            InstallError::HostTool => "host-tool",
            InstallError::Link { .. } => "link",
            InstallError::Io(_) => "io",
        }
    }
}

/// Result alias for installer operations.
pub type InstallResult<T> = Result<T, InstallError>;
