//! Host descriptor: what the surrounding build tells us about PETSc and SLEPc.
//!
//! The descriptor is normally read from a TOML file written by the configure
//! step of the host project:
//!
//! ```toml
//! [petsc]
//! dir = "/opt/petsc"
//! arch = "arch-linux-c-opt"
//! cxx = "mpicxx"
//! cxx_flags = "-O2 -fPIC"
//!
//! [slepc]
//! dir = "/opt/slepc"
//! prefix = "/usr/local"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Scalar precision PETSc was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Precision {
    #[serde(rename = "single")]
    Single,
    #[default]
    #[serde(rename = "double")]
    Double,
    #[serde(rename = "__float128")]
    Quad,
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => write!(f, "single"),
            Precision::Double => write!(f, "double"),
            Precision::Quad => write!(f, "__float128"),
        }
    }
}

/// The already-built base library (PETSc) we compile and link against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseLibrary {
    /// PETSc source/install directory (`PETSC_DIR`)
    pub dir: PathBuf,

    /// Architecture tag (`PETSC_ARCH`); empty for prefix installs
    #[serde(default)]
    pub arch: String,

    /// C++ compiler
    pub cxx: String,

    /// C++ compiler flags, passed to the shell verbatim
    #[serde(default)]
    pub cxx_flags: String,

    /// Runtime search path flag, immediately followed by a directory
    #[serde(default = "default_slflag")]
    pub slflag: String,

    /// Shared library suffix, without the dot
    #[serde(default = "default_sl_suffix")]
    pub sl_suffix: String,

    /// Whether the C++11 dialect is available
    #[serde(default = "default_true")]
    pub cxx11: bool,

    /// Whether PETSc was built as a shared library
    #[serde(default = "default_true")]
    pub shared_libraries: bool,

    /// Whether PETSc was built with its own HPDDM
    #[serde(default)]
    pub hpddm: bool,

    /// Scalar precision
    #[serde(default)]
    pub precision: Precision,

    /// Whether PETSc uses 64-bit indices
    #[serde(default)]
    pub index_64bit: bool,

    /// Build tool used to evaluate PETSc's make functions
    #[serde(default = "default_make")]
    pub make: String,
}

/// The host project (SLEPc) that the package is installed into.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostProject {
    /// SLEPc source directory (`SLEPC_DIR`)
    pub dir: PathBuf,

    /// Installation prefix, if installing outside the arch directory
    #[serde(default)]
    pub prefix: Option<PathBuf>,

    /// Prefix of the configuration macros (`<PREFIX>_HAVE_<NAME>`)
    #[serde(default = "default_macro_prefix")]
    pub macro_prefix: String,
}

/// Everything the installer needs to know about the host build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostDescriptor {
    pub petsc: BaseLibrary,
    pub slepc: HostProject,
}

fn default_slflag() -> String {
    "-Wl,-rpath,".to_string()
}

fn default_sl_suffix() -> String {
    "so".to_string()
}

fn default_make() -> String {
    "make".to_string()
}

fn default_macro_prefix() -> String {
    "SLEPC".to_string()
}

fn default_true() -> bool {
    true
}

impl BaseLibrary {
    /// Create a base library description with default flags.
    pub fn new(dir: impl Into<PathBuf>, arch: impl Into<String>, cxx: impl Into<String>) -> Self {
        BaseLibrary {
            dir: dir.into(),
            arch: arch.into(),
            cxx: cxx.into(),
            cxx_flags: String::new(),
            slflag: default_slflag(),
            sl_suffix: default_sl_suffix(),
            cxx11: true,
            shared_libraries: true,
            hpddm: false,
            precision: Precision::Double,
            index_64bit: false,
            make: default_make(),
        }
    }

    /// Whether this is an in-tree build with an architecture directory.
    ///
    /// An empty tag means PETSc was installed to a prefix and its sources
    /// are not available on disk.
    pub fn has_arch(&self) -> bool {
        !self.arch.is_empty()
    }

    /// `<dir>/<arch>`, which collapses to `<dir>` for prefix installs.
    pub fn arch_dir(&self) -> PathBuf {
        if self.has_arch() {
            self.dir.join(&self.arch)
        } else {
            self.dir.clone()
        }
    }

    /// Directory holding `libpetsc`.
    pub fn lib_dir(&self) -> PathBuf {
        self.arch_dir().join("lib")
    }

    /// Architecture-specific include directory.
    pub fn arch_include_dir(&self) -> PathBuf {
        self.arch_dir().join("include")
    }

    /// Top-level include directory.
    pub fn include_dir(&self) -> PathBuf {
        self.dir.join("include")
    }

    /// PETSc's make variables file, which defines the shared library functions.
    pub fn variables_file(&self) -> PathBuf {
        self.lib_dir()
            .join("petsc")
            .join("conf")
            .join("petscvariables")
    }

    /// Link flags for `libpetsc`.
    pub fn link_flags(&self) -> String {
        let lib = self.lib_dir();
        format!(
            "{}{} -L{} -lpetsc",
            self.slflag,
            lib.display(),
            lib.display()
        )
    }
}

impl HostProject {
    /// Create a host project description.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HostProject {
            dir: dir.into(),
            prefix: None,
            macro_prefix: default_macro_prefix(),
        }
    }

    /// Top-level include directory.
    pub fn include_dir(&self) -> PathBuf {
        self.dir.join("include")
    }
}

impl HostDescriptor {
    /// Create a descriptor from its two halves.
    pub fn new(petsc: BaseLibrary, slepc: HostProject) -> Self {
        HostDescriptor { petsc, slepc }
    }

    /// Parse a descriptor from TOML text.
    pub fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse host descriptor")
    }

    /// Load a descriptor from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read host descriptor: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse host descriptor: {}", path.display()))
    }

    /// Save the descriptor to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory: {}", parent.display())
            })?;
        }

        let contents =
            toml::to_string_pretty(self).context("failed to serialize host descriptor")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write host descriptor: {}", path.display()))
    }
}
