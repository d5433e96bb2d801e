//! Test fixtures: source archives and on-disk PETSc/SLEPc trees.

use std::fs;
use std::path::{Path, PathBuf};

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use crate::core::host::{BaseLibrary, HostDescriptor, HostProject};

/// Files shipped in the fake HPDDM archive (path -> content).
pub const HPDDM_FILES: &[(&str, &str)] = &[
    ("include/HPDDM.hpp", "#include \"HPDDM_define.hpp\"\n"),
    ("include/HPDDM_define.hpp", "#define HPDDM_VERSION 20000\n"),
    ("interface/hpddm_petsc.cpp", "#include <HPDDM.hpp>\n"),
    ("README.md", "HPDDM\n"),
];

/// Build a gzip-compressed tarball with every file under `top_dir/`.
pub fn hpddm_tarball(top_dir: &str) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut header = tar::Header::new_gnu();
    header.set_path(format!("{}/", top_dir)).unwrap();
    header.set_size(0);
    header.set_mode(0o755);
    header.set_entry_type(tar::EntryType::Directory);
    header.set_cksum();
    builder.append(&header, &[][..]).unwrap();

    for (path, content) in HPDDM_FILES {
        let mut header = tar::Header::new_gnu();
        header.set_path(format!("{}/{}", top_dir, path)).unwrap();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_entry_type(tar::EntryType::Regular);
        header.set_cksum();
        builder.append(&header, content.as_bytes()).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// A temporary directory laid out like an in-tree PETSc + SLEPc build.
pub struct HostFixture {
    pub tmp: TempDir,
    pub host: HostDescriptor,
}

impl HostFixture {
    /// PETSc with architecture `arch`; adapter sources exist on disk.
    pub fn new(arch: &str) -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let petsc_dir = tmp.path().join("petsc");
        let slepc_dir = tmp.path().join("slepc");

        for (origin, content) in [
            ("src/ksp/ksp/impls/hpddm/hpddm.cxx", "// KSPHPDDM\n"),
            ("src/ksp/pc/impls/hpddm/hpddm.cxx", "// PCHPDDM\n"),
        ] {
            let path = petsc_dir.join(origin);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        fs::create_dir_all(slepc_dir.join("include")).unwrap();

        let mut petsc = BaseLibrary::new(&petsc_dir, arch, "c++");
        petsc.cxx_flags = "-O2 -fPIC".to_string();
        let host = HostDescriptor::new(petsc, HostProject::new(&slepc_dir));

        HostFixture { tmp, host }
    }

    /// SLEPc arch directory the install writes into.
    pub fn arch_dir(&self) -> PathBuf {
        self.host.slepc.dir.join("arch-test")
    }

    /// Root of the temporary tree.
    pub fn root(&self) -> &Path {
        self.tmp.path()
    }
}
