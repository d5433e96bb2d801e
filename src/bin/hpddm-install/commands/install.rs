//! `hpddm-install install` command

use std::fs::{File, OpenOptions};
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::InstallArgs;
use crate::commands::{load_host, resolve_arch_dir};
use hpddm_installer::sources::HttpFetcher;
use hpddm_installer::util::fs::ensure_dir;
use hpddm_installer::util::SystemRunner;
use hpddm_installer::{DownloadSource, InstallEnv, InstallOptions, Installer, PackageDescriptor};

pub fn execute(args: InstallArgs) -> Result<()> {
    let host = load_host(&args.host)?;
    let arch_dir = resolve_arch_dir(&host, args.arch_dir)?;

    let conf_path = args
        .conf
        .unwrap_or_else(|| arch_dir.join("include").join("slepcconf.h"));
    let vars_path = args.vars.unwrap_or_else(|| {
        arch_dir
            .join("lib")
            .join("slepc")
            .join("conf")
            .join("slepcvariables")
    });

    let opts = InstallOptions {
        download: match args.download {
            Some(ref s) => s.parse::<DownloadSource>()?,
            None => DownloadSource::Pinned,
        },
    };

    let mut installer = Installer::new(PackageDescriptor::hpddm());

    // Fail on preconditions before creating any output file
    installer.check(&host)?;

    let mut conf = open_append(&conf_path)?;
    let mut vars = open_append(&vars_path)?;

    let mut runner = SystemRunner;
    let mut fetcher = HttpFetcher::new();
    let mut env = InstallEnv::new(&mut runner, &mut fetcher);

    if let Err(e) = installer.install(&host, &arch_dir, &opts, &mut env, &mut conf, &mut vars) {
        tracing::debug!("{} stage failed", e.stage());
        return Err(e.into());
    }

    print!("{}", installer.summary());
    Ok(())
}

fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))
}
