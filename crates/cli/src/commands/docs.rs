//! `module:docs` and `api:generate-docs`

use super::select_modules;
use crate::Session;
use anyhow::{Context, Result};
use blueprint_codegen::docs::{write_module_docs, write_openapi};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct DocsArgs {
    /// Module to document
    pub module: Option<String>,

    /// Document every module
    #[arg(long)]
    pub all: bool,
}

impl DocsArgs {
    pub fn run(&self, session: &Session) -> Result<()> {
        let modules = select_modules(session, self.module.as_deref(), self.all)?;
        if modules.is_empty() {
            println!("No modules found");
            return Ok(());
        }

        let config = session.generator_config();
        for module in &modules {
            let path = write_module_docs(&config, module)
                .with_context(|| format!("Cannot document module '{}'", module))?;
            println!("{} {}", "wrote".green(), path.display());
        }
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct ApiDocsArgs {
    /// Output file, relative to the app root
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl ApiDocsArgs {
    pub fn run(&self, session: &Session) -> Result<()> {
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| session.settings.api_docs_path.clone());
        let count = write_openapi(&session.generator_config(), &output)
            .context("Cannot write the OpenAPI document")?;
        println!(
            "{} {} ({} module(s))",
            "wrote".green(),
            output.display(),
            count
        );
        Ok(())
    }
}
