//! `module:validate`

use super::select_modules;
use crate::Session;
use anyhow::{Result, bail};
use blueprint_codegen::inspect::{InspectionReport, Inspector};
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Module to inspect
    pub module: Option<String>,

    /// Write missing files and repair host registrations
    #[arg(long)]
    pub fix: bool,

    /// Inspect every module
    #[arg(long)]
    pub all: bool,
}

impl ValidateArgs {
    pub fn run(&self, session: &Session) -> Result<()> {
        let modules = select_modules(session, self.module.as_deref(), self.all)?;
        if modules.is_empty() {
            println!("No modules found");
            return Ok(());
        }

        let inspector = Inspector::new(session.generator_config());
        let mut failed = 0;
        for module in &modules {
            let report = if self.fix {
                inspector.fix(module)?
            } else {
                inspector.inspect(module)?
            };
            print_report(&report);
            if !report.is_ok() {
                failed += 1;
            }
        }

        if failed > 0 {
            bail!("{} of {} module(s) failed validation", failed, modules.len());
        }
        Ok(())
    }
}

fn print_report(report: &InspectionReport) {
    let status = if report.is_ok() {
        "OK".green().bold()
    } else {
        "FAILED".red().bold()
    };
    println!(
        "{} {} ({} errors, {} warnings)",
        report.module.bold(),
        status,
        report.error_count(),
        report.warning_count()
    );
    for path in &report.fixed {
        println!("  {} {}", "fixed".green(), path.display());
    }
    for issue in &report.issues {
        println!("  {}", issue);
    }
    if !report.fixed.is_empty() || report.fixable_count() == 0 {
        return;
    }
    println!("  run with --fix to repair {} issue(s)", report.fixable_count());
}
