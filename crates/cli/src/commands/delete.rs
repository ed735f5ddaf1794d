//! `module:force-delete`

use crate::Session;
use anyhow::{Context, Result};
use blueprint_codegen::removal::remove_module;
use blueprint_core::naming;
use clap::Args;
use colored::Colorize;

#[derive(Debug, Args)]
pub struct ForceDeleteArgs {
    /// Module to delete
    pub name: String,
}

impl ForceDeleteArgs {
    pub fn run(&self, session: &Session) -> Result<()> {
        let module = naming::pascal(&self.name);
        let report = remove_module(&session.generator_config(), &module)
            .with_context(|| format!("Cannot delete module '{}'", module))?;

        for path in &report.replaced {
            println!("  {} {}", "updated".cyan(), path.display());
        }
        println!("{} Module {} deleted", "✓".green().bold(), module.bold());
        Ok(())
    }
}
