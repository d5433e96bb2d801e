//! Shared library naming and linking.
//!
//! PETSc's make configuration already knows how to name and link shared
//! libraries on every platform it supports (`SONAME_FUNCTION`,
//! `SL_LINKER_FUNCTION`). Instead of re-implementing those rules we write a
//! tiny makefile that includes `petscvariables` and echoes both results.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::compile::link_objects;
use crate::core::host::HostDescriptor;
use crate::core::package::PackageDescriptor;
use crate::core::plan::InstallPlan;
use crate::util::fs::write_string;
use crate::util::process::{ProcessBuilder, ProcessOutput};

/// File name of the generated helper makefile.
pub const HELPER_MAKEFILE: &str = "SONAME_SL_LINKER";

/// Render the helper makefile.
pub fn helper_makefile(variables_file: &Path, library_stem: &Path) -> String {
    format!(
        "include {vars}\n\
         soname:\n\
         \t@echo $(call SONAME_FUNCTION,{lib},0)\n\
         sl_linker:\n\
         \t@echo $(call SL_LINKER_FUNCTION,{lib},0,0)\n",
        vars = variables_file.display(),
        lib = library_stem.display(),
    )
}

/// Write the helper makefile into the build directory.
pub fn write_helper_makefile(
    package: &PackageDescriptor,
    host: &HostDescriptor,
    plan: &InstallPlan,
) -> Result<PathBuf> {
    let path = plan.build_dir.join(HELPER_MAKEFILE);
    let contents = helper_makefile(&host.petsc.variables_file(), &plan.library_stem(package));
    write_string(&path, &contents)?;
    Ok(path)
}

/// Command that prints the soname and the linker invocation, one per line.
pub fn query_command(host: &HostDescriptor, build_dir: &Path) -> ProcessBuilder {
    let make = &host.petsc.make;
    ProcessBuilder::shell(format!(
        "{make} -f {file} soname && {make} -f {file} sl_linker",
        make = make,
        file = HELPER_MAKEFILE
    ))
    .cwd(build_dir)
}

/// What the host build tool computed for the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedLibrary {
    /// Full path of the versioned shared object
    pub soname: String,
    /// Linker flags producing a shared object with that name
    pub linker: String,
}

impl SharedLibrary {
    /// Read the two output lines of [`query_command`].
    ///
    /// Returns `None` if either line is missing.
    pub fn from_output(output: &ProcessOutput) -> Option<Self> {
        let lines = output.stdout_lines();
        match lines.as_slice() {
            [soname, linker, ..] => Some(SharedLibrary {
                soname: (*soname).to_string(),
                linker: (*linker).to_string(),
            }),
            _ => None,
        }
    }

    /// Command linking the objects and PETSc into the shared object.
    pub fn link_command(&self, host: &HostDescriptor, build_dir: &Path) -> ProcessBuilder {
        let mut parts = vec![host.petsc.cxx.clone()];
        if !host.petsc.cxx_flags.trim().is_empty() {
            parts.push(host.petsc.cxx_flags.trim().to_string());
        }
        parts.extend(link_objects().iter().map(|o| o.display().to_string()));
        parts.push("-o".to_string());
        parts.push(self.soname.clone());
        parts.push(self.linker.clone());
        parts.push(host.petsc.link_flags());

        ProcessBuilder::shell(parts.join(" ")).cwd(build_dir)
    }
}
