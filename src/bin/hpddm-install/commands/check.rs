//! `hpddm-install check` command

use anyhow::Result;

use crate::cli::CheckArgs;
use crate::commands::load_host;
use hpddm_installer::util::process::find_command;
use hpddm_installer::{Installer, PackageDescriptor};

pub fn execute(args: CheckArgs) -> Result<()> {
    let host = load_host(&args.host)?;
    let installer = Installer::new(PackageDescriptor::hpddm());

    installer.check(&host)?;

    // Missing tools only fail later, at the stage that needs them
    for (what, command) in [("C++ compiler", &host.petsc.cxx), ("build tool", &host.petsc.make)] {
        match find_command(command) {
            Some(path) => tracing::info!("{}: {}", what, path.display()),
            None => tracing::warn!("{} `{}` not found in PATH", what, command),
        }
    }

    println!(
        "{}: preconditions satisfied",
        installer.package().macro_name()
    );
    Ok(())
}
