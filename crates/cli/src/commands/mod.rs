//! Command implementations
//!
//! Each command is a clap `Args` struct with a `run` method taking the
//! [`Session`](crate::Session). Errors bubble up as `anyhow::Error`; the
//! binary turns them into exit code 1.

mod blueprint;
mod delete;
mod docs;
mod validate;

pub use blueprint::{AdvancedBlueprintArgs, BlueprintArgs};
pub use delete::ForceDeleteArgs;
pub use docs::{ApiDocsArgs, DocsArgs};
pub use validate::ValidateArgs;

use anyhow::{Result, bail};
use blueprint_codegen::generator::discover_modules;
use blueprint_core::naming;
use colored::Colorize;

use crate::Session;

/// Modules selected by an optional name and `--all`
fn select_modules(session: &Session, module: Option<&str>, all: bool) -> Result<Vec<String>> {
    match (module, all) {
        (Some(_), true) => bail!("Give either a module name or --all, not both"),
        (Some(name), false) => Ok(vec![naming::pascal(name)]),
        (None, true) => Ok(discover_modules(&session.generator_config())),
        (None, false) => bail!("Give a module name or --all"),
    }
}

fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
}
