//! `hpddm-install plan` command

use anyhow::Result;
use serde::Serialize;

use crate::cli::PlanArgs;
use crate::commands::{load_host, resolve_arch_dir};
use hpddm_installer::builder::compile::compile_units;
use hpddm_installer::builder::CompileCommand;
use hpddm_installer::ops::install::{adapters, AdapterOrigin};
use hpddm_installer::{InstallPlan, PackageDescriptor, Registration};

#[derive(Serialize)]
struct PlanReport<'a> {
    package: &'a PackageDescriptor,
    plan: &'a InstallPlan,
    adapters: Vec<String>,
    compile: Vec<String>,
    registration: Registration,
}

pub fn execute(args: PlanArgs) -> Result<()> {
    let host = load_host(&args.host)?;
    let arch_dir = resolve_arch_dir(&host, args.arch_dir)?;
    let package = PackageDescriptor::hpddm();
    let plan = InstallPlan::new(&package, &host, &arch_dir);

    let compile = CompileCommand::new(&host, &plan);
    let report = PlanReport {
        package: &package,
        plan: &plan,
        adapters: adapters(&host)
            .into_iter()
            .map(|a| match a.origin {
                AdapterOrigin::Download(url) => format!("download {}", url),
                AdapterOrigin::Copy(path) => format!("copy {}", path.display()),
            })
            .collect(),
        compile: compile_units().iter().map(|u| compile.for_unit(u)).collect(),
        registration: Registration::new(&package, &host, &plan),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Package:     {} {}", package.name, package.version);
    println!("Archive:     {}", package.url);
    println!("Build dir:   {}", plan.build_dir.display());
    println!("Install dir: {}", plan.install_dir.display());
    println!("Adapters:");
    for adapter in &report.adapters {
        println!("  {}", adapter);
    }
    println!("Compile (in {}):", plan.build_dir.display());
    for line in &report.compile {
        println!("  {}", line);
    }
    println!("Registers:");
    println!("  {}", report.registration.define);
    println!("  {}", report.registration.lib);
    println!("  {}", report.registration.include);
    Ok(())
}
