//! # Blueprint CLI
//!
//! Command-line interface for Module Blueprint.
//!
//! ## Commands
//!
//! - `module:blueprint` - Generate a single-entity module from an inline field list
//! - `module:advanced-blueprint` - Generate a module from a JSON config or prompts
//! - `module:force-delete` - Delete a module and unregister it from the host
//! - `module:validate` - Inspect generated modules, optionally repairing them
//! - `module:docs` - Write `docs/API.md` for modules
//! - `api:generate-docs` - Write the OpenAPI document for every module
//!
//! Every command accepts `--path <app root>` (default: current directory)
//! and `-v` for debug logging.

pub mod commands;
pub mod settings;

pub use settings::{SETTINGS_FILE, Settings};

use anyhow::{Context, Result};
use blueprint_codegen::GeneratorConfig;
use clap::{Parser, Subcommand};
use commands::{
    AdvancedBlueprintArgs, ApiDocsArgs, BlueprintArgs, DocsArgs, ForceDeleteArgs, ValidateArgs,
};
use std::path::PathBuf;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Arguments
// ============================================================================

/// Scaffold host-framework modules from entity blueprints
#[derive(Debug, Parser)]
#[command(name = "blueprint", version, about, long_about = None)]
pub struct Cli {
    /// Root of the host application
    #[arg(long, global = true, env = "BLUEPRINT_PATH", default_value = ".")]
    pub path: PathBuf,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a module with one entity from an inline field list
    #[command(name = "module:blueprint")]
    Blueprint(BlueprintArgs),

    /// Generate a module from a JSON config, or interactively
    #[command(name = "module:advanced-blueprint")]
    AdvancedBlueprint(AdvancedBlueprintArgs),

    /// Delete a module and remove it from composer, routes and seeders
    #[command(name = "module:force-delete")]
    ForceDelete(ForceDeleteArgs),

    /// Check generated modules for missing files and registrations
    #[command(name = "module:validate")]
    Validate(ValidateArgs),

    /// Write the Markdown API reference of modules
    #[command(name = "module:docs")]
    Docs(DocsArgs),

    /// Write the OpenAPI document covering every module
    #[command(name = "api:generate-docs")]
    ApiDocs(ApiDocsArgs),
}

// ============================================================================
// Session
// ============================================================================

/// App root plus its settings, shared by every command
#[derive(Debug, Clone)]
pub struct Session {
    pub app_root: PathBuf,
    pub settings: Settings,
}

impl Session {
    pub fn open(app_root: impl Into<PathBuf>) -> Result<Self> {
        let app_root = app_root.into();
        let settings = Settings::load(&app_root)
            .with_context(|| format!("Cannot read settings in '{}'", app_root.display()))?;
        Ok(Self { app_root, settings })
    }

    /// Generator configuration from the settings
    pub fn generator_config(&self) -> GeneratorConfig {
        self.settings.generator_config(&self.app_root)
    }
}

/// Run a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let session = Session::open(&cli.path)?;
    match &cli.command {
        Commands::Blueprint(args) => args.run(&session),
        Commands::AdvancedBlueprint(args) => args.run(&session),
        Commands::ForceDelete(args) => args.run(&session),
        Commands::Validate(args) => args.run(&session),
        Commands::Docs(args) => args.run(&session),
        Commands::ApiDocs(args) => args.run(&session),
    }
}
