//! # Blueprint Codegen
//!
//! Code generation engine for Module Blueprint.
//!
//! This crate turns a validated [`Blueprint`](blueprint_ir::Blueprint) into
//! the PHP sources of a host-framework module and wires the module into the
//! host application.
//!
//! ## Features
//!
//! - **Dependency ordering**: migrations of referenced tables come first
//! - **Relationship resolution**: accessor names and Eloquent relation kinds
//! - **Stub rendering**: embedded or overridden templates with PHP escaping
//! - **Artifacts**: models, migrations, factories, seeders, JSON:API
//!   schemas/resources/authorizers/requests, controllers, routes, tests
//! - **Integration**: composer autoload, host routes, aggregate seeder
//! - **Staged writes**: a generation run is committed or rolled back as a whole
//! - **Inspection, docs and removal** for existing modules
//!

// ============================================================================
// Modules
// ============================================================================

pub mod context;
pub mod docs;
pub mod foreign_keys;
pub mod generator;
pub mod inspect;
pub mod integration;
pub mod migrations;
pub mod php;
pub mod removal;
pub mod resolver;
pub mod sorter;
pub mod staging;
pub mod templates;
pub mod views;

#[cfg(test)]
mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use context::{EntityInfo, GenerationContext};
pub use generator::{GenerationSummary, Generator, summarize};
pub use resolver::RelationMethod;
pub use sorter::{CyclePolicy, SortOutcome};
pub use staging::{CommitReport, Transaction};
pub use templates::{StubKind, StubRenderer};

use blueprint_core::EngineResult;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

// ============================================================================
// GeneratorConfig
// ============================================================================

/// Configuration for the code generator
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Root of the host application (where `composer.json` lives)
    pub app_root: PathBuf,

    /// Directory holding modules, relative to the app root
    pub modules_dir: String,

    /// Directory with `<kind>.stub` overrides
    pub stubs_dir: Option<PathBuf>,

    /// What to do when foreign keys form a cycle
    pub cycle_policy: CyclePolicy,

    /// Whether to generate feature tests
    pub generate_tests: bool,

    /// Whether to generate model factories
    pub generate_factories: bool,

    /// Whether to generate seeders
    pub generate_seeders: bool,

    /// Whether to overwrite existing files
    pub overwrite: bool,

    /// Fixed timestamp for migration file names (current time when absent)
    pub timestamp: Option<NaiveDateTime>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            app_root: PathBuf::from("."),
            modules_dir: "Modules".to_string(),
            stubs_dir: None,
            cycle_policy: CyclePolicy::Fail,
            generate_tests: true,
            generate_factories: true,
            generate_seeders: true,
            overwrite: false,
            timestamp: None,
        }
    }
}

impl GeneratorConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host application root
    pub fn with_app_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.app_root = dir.into();
        self
    }

    /// Set the modules directory (relative to the app root)
    pub fn with_modules_dir(mut self, dir: impl Into<String>) -> Self {
        self.modules_dir = dir.into();
        self
    }

    /// Read stub overrides from a directory
    pub fn with_stubs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stubs_dir = Some(dir.into());
        self
    }

    /// Force-place entities on dependency cycles instead of failing
    pub fn allow_cycles(mut self) -> Self {
        self.cycle_policy = CyclePolicy::ForcePlace;
        self
    }

    /// Disable test generation
    pub fn without_tests(mut self) -> Self {
        self.generate_tests = false;
        self
    }

    /// Disable factory generation
    pub fn without_factories(mut self) -> Self {
        self.generate_factories = false;
        self
    }

    /// Disable seeder generation
    pub fn without_seeders(mut self) -> Self {
        self.generate_seeders = false;
        self
    }

    /// Allow overwriting existing files
    pub fn allow_overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    /// Pin the migration timestamp
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Module directory relative to the app root (e.g. "Modules/Inventory")
    pub fn module_rel_dir(&self, module: &str) -> PathBuf {
        Path::new(&self.modules_dir).join(module)
    }

    /// Absolute module directory
    pub fn module_dir(&self, module: &str) -> PathBuf {
        self.app_root.join(self.module_rel_dir(module))
    }

    /// Root PHP namespace of modules ("Modules")
    pub fn namespace_root(&self) -> String {
        let last = Path::new(&self.modules_dir)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Modules".to_string());
        blueprint_core::naming::pascal(&last)
    }
}

// ============================================================================
// GeneratedFile
// ============================================================================

/// Represents a single generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the app root
    pub path: PathBuf,

    /// File content
    pub content: String,

    /// File type for categorization
    pub file_type: FileType,
}

impl GeneratedFile {
    /// Create a new generated file
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            file_type,
        }
    }

    /// Create a PHP source file
    pub fn php(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::new(path, content, FileType::Php)
    }

    /// Create a JSON file
    pub fn json(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::new(path, content, FileType::Json)
    }

    /// Create a Markdown file
    pub fn markdown(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self::new(path, content, FileType::Markdown)
    }

    /// Get the file extension
    pub fn extension(&self) -> &str {
        self.file_type.extension()
    }

    /// Whether this is a migration (matched by the `_create_<table>_table.php` suffix)
    pub fn migration_suffix(&self) -> Option<String> {
        let name = self.path.file_name()?.to_str()?;
        let idx = name.find("_create_")?;
        if self.path.to_string_lossy().contains("Migrations") {
            Some(name[idx..].to_string())
        } else {
            None
        }
    }
}

/// Type of generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Php,
    Json,
    Markdown,
    Other,
}

impl FileType {
    /// Get the file extension for this type
    pub fn extension(&self) -> &str {
        match self {
            FileType::Php => "php",
            FileType::Json => "json",
            FileType::Markdown => "md",
            FileType::Other => "txt",
        }
    }
}

// ============================================================================
// GeneratedModule
// ============================================================================

/// Collection of all generated files for a module
#[derive(Debug, Clone, Default)]
pub struct GeneratedModule {
    /// Module name
    pub name: String,

    /// All generated files, in emission order
    pub files: Vec<GeneratedFile>,

    /// Host files edited to register the module
    pub integration: Vec<GeneratedFile>,

    /// Entities placed despite unmet dependencies
    pub forced: Vec<String>,

    /// Warnings generated during code generation
    pub warnings: Vec<String>,
}

impl GeneratedModule {
    /// Create a new generated module
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a file to the module
    pub fn add_file(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }

    /// Add a warning
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Get the number of files
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Get files by type
    pub fn files_by_type(&self, file_type: FileType) -> Vec<&GeneratedFile> {
        self.files
            .iter()
            .filter(|f| f.file_type == file_type)
            .collect()
    }

    /// Find a file by its path relative to the app root
    pub fn file(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        self.files.iter().find(|f| f.path == path.as_ref())
    }

    /// Migration files in emission order
    pub fn migrations(&self) -> Vec<&GeneratedFile> {
        self.files
            .iter()
            .filter(|f| f.migration_suffix().is_some())
            .collect()
    }

    /// Write all files (module and integration) atomically below `base_dir`
    pub fn write_to_disk(
        &self,
        base_dir: impl AsRef<Path>,
        overwrite: bool,
    ) -> EngineResult<CommitReport> {
        let mut tx = Transaction::begin(base_dir.as_ref())?;
        for file in &self.files {
            tx.stage(&file.path, &file.content, overwrite)?;
        }
        for file in &self.integration {
            tx.stage(&file.path, &file.content, true)?;
        }
        tx.commit()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generator_config_default() {
        let config = GeneratorConfig::default();
        assert!(config.generate_tests);
        assert!(config.generate_factories);
        assert!(!config.overwrite);
        assert_eq!(config.cycle_policy, CyclePolicy::Fail);
        assert_eq!(config.namespace_root(), "Modules");
    }

    #[test]
    fn test_generator_config_builder() {
        let config = GeneratorConfig::new()
            .with_app_root("/srv/app")
            .without_tests()
            .allow_cycles()
            .allow_overwrite();

        assert_eq!(config.module_dir("Inventory"), PathBuf::from("/srv/app/Modules/Inventory"));
        assert!(!config.generate_tests);
        assert!(config.overwrite);
        assert_eq!(config.cycle_policy, CyclePolicy::ForcePlace);
    }

    #[test]
    fn test_generated_file() {
        let file = GeneratedFile::php("Modules/Inventory/app/Models/Warehouse.php", "<?php");
        assert_eq!(file.extension(), "php");
        assert_eq!(file.migration_suffix(), None);

        let migration = GeneratedFile::php(
            "Modules/Inventory/Database/Migrations/2024_01_15_000001_create_warehouses_table.php",
            "<?php",
        );
        assert_eq!(
            migration.migration_suffix().as_deref(),
            Some("_create_warehouses_table.php")
        );
    }

    #[test]
    fn test_generated_module() {
        let mut module = GeneratedModule::new("Inventory");
        module.add_file(GeneratedFile::php("a.php", "<?php"));
        module.add_file(GeneratedFile::json("module.json", "{}"));

        assert_eq!(module.file_count(), 2);
        assert_eq!(module.files_by_type(FileType::Php).len(), 1);
        assert!(module.file("module.json").is_some());
    }

    #[test]
    fn test_write_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut module = GeneratedModule::new("Inventory");
        module.add_file(GeneratedFile::php("Modules/Inventory/routes/api.php", "<?php\n"));
        module.write_to_disk(dir.path(), false).unwrap();
        assert!(dir.path().join("Modules/Inventory/routes/api.php").exists());

        // second write without overwrite refuses to clobber
        assert!(module.write_to_disk(dir.path(), false).is_err());
        module.write_to_disk(dir.path(), true).unwrap();
    }
}
