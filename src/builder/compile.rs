//! Compiler invocation for the adapter and interface sources.

use std::path::{Path, PathBuf};

use crate::core::host::HostDescriptor;
use crate::core::plan::InstallPlan;
use crate::util::process::ProcessBuilder;

/// Sources compiled into the shared library, relative to the build dir.
///
/// Order matters only for the log; each object is independent.
pub const KSP_ADAPTER: &str = "interface/ksphpddm.cxx";
pub const PC_ADAPTER: &str = "interface/pchpddm.cxx";
pub const INTERFACE_SOURCE: &str = "interface/hpddm_petsc.cpp";

/// A source file and the object it compiles to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileUnit {
    pub source: PathBuf,
    pub object: PathBuf,
}

impl CompileUnit {
    fn new(source: &str) -> Self {
        let source = PathBuf::from(source);
        let object = source.with_extension("o");
        CompileUnit { source, object }
    }
}

/// The three units, in compile order.
pub fn compile_units() -> Vec<CompileUnit> {
    [KSP_ADAPTER, PC_ADAPTER, INTERFACE_SOURCE]
        .into_iter()
        .map(CompileUnit::new)
        .collect()
}

/// Objects in the order they are handed to the linker.
pub fn link_objects() -> Vec<PathBuf> {
    let mut objects: Vec<PathBuf> = compile_units().into_iter().map(|u| u.object).collect();
    objects.reverse();
    objects
}

/// The shared part of every compile command: compiler, flags, include paths
/// and integration macros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileCommand {
    pub compiler: String,
    pub flags: String,
    pub include_dirs: Vec<PathBuf>,
    pub defines: Vec<String>,
}

impl CompileCommand {
    /// Build the command used for every unit.
    pub fn new(host: &HostDescriptor, plan: &InstallPlan) -> Self {
        let include_dirs = vec![
            Path::new(".").join("include"),
            host.petsc.arch_include_dir(),
            host.slepc.include_dir(),
            plan.arch_include_dir(),
            host.petsc.include_dir(),
        ];

        let defines = vec![
            "-DPETSC_HAVE_SLEPC=1".to_string(),
            format!("-DSLEPC_LIB_DIR=\"{}\"", plan.lib_dir().display()),
        ];

        CompileCommand {
            compiler: host.petsc.cxx.clone(),
            flags: host.petsc.cxx_flags.clone(),
            include_dirs,
            defines,
        }
    }

    /// Command line prefix shared by all units.
    pub fn prefix(&self) -> String {
        let mut parts = vec![self.compiler.clone()];
        if !self.flags.trim().is_empty() {
            parts.push(self.flags.trim().to_string());
        }
        parts.extend(
            self.include_dirs
                .iter()
                .map(|d| format!("-I{}", d.display())),
        );
        parts.extend(self.defines.iter().cloned());
        parts.join(" ")
    }

    /// Command line for one unit.
    pub fn for_unit(&self, unit: &CompileUnit) -> String {
        format!(
            "{} {} -c -o {}",
            self.prefix(),
            unit.source.display(),
            unit.object.display()
        )
    }

    /// One shell invocation compiling every unit, stopping at the first failure.
    pub fn chained(&self, build_dir: &Path) -> ProcessBuilder {
        let script = compile_units()
            .iter()
            .map(|u| self.for_unit(u))
            .collect::<Vec<_>>()
            .join(" && ");
        ProcessBuilder::shell(script).cwd(build_dir)
    }
}
