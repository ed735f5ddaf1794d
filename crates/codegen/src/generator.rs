//! # Code Generator Orchestrator
//!
//! The `Generator` is the top-level entry point for module generation. It
//! takes a [`Blueprint`] and a [`GeneratorConfig`], builds a
//! [`GenerationContext`], and delegates to the migration and PHP emitters to
//! produce a complete [`GeneratedModule`].
//!
//! ## Pipeline
//!
//! ```text
//! Blueprint + GeneratorConfig
//!         │
//!         ▼
//!   Validator::validate()            → errors abort, warnings are kept
//!         │
//!         ▼
//!   GenerationContext::new()         → dependency order, relationship accessors
//!         │
//!         ├──► migrations::generate_migrations()   → Vec<GeneratedFile>
//!         ├──► php::generate_php_sources()         → Vec<GeneratedFile>
//!         ├──► module.json snapshot
//!         ├──► integration::plan_register()        → host file edits
//!         │
//!         ▼
//!   GeneratedModule { files, integration, warnings }
//!         │
//!         ▼
//!   Transaction::commit()            → all or nothing
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blueprint_codegen::{Generator, GeneratorConfig};
//! use blueprint_ir::load_config;
//!
//! let blueprint = load_config("inventory.json")?;
//! let config = GeneratorConfig::new().with_app_root("/srv/app");
//!
//! let module = Generator::new(config).generate_and_write(&blueprint)?;
//! println!("Generated {} files", module.file_count());
//! ```

use blueprint_core::{EngineError, EngineResult};
use blueprint_ir::{Blueprint, SNAPSHOT_FILE, Validator, snapshot_to_string};
use std::path::Path;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::context::GenerationContext;
use crate::integration::{self, IntegrationTarget};
use crate::migrations;
use crate::php;
use crate::templates::StubRenderer;
use crate::views::ModuleViews;
use crate::{FileType, GeneratedFile, GeneratedModule, GeneratorConfig};

// ============================================================================
// Generator
// ============================================================================

/// Top-level module generator.
///
/// The `Generator` is stateless aside from its configuration. Call
/// [`generate`](Generator::generate) to render a module in memory, or
/// [`generate_and_write`](Generator::generate_and_write) to also commit it
/// below the configured app root.
#[derive(Debug, Clone)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    // ====================================================================
    // Construction
    // ====================================================================

    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(GeneratorConfig::default())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    // ====================================================================
    // Generation
    // ====================================================================

    /// Render every file of a module and plan the host integration.
    ///
    /// # Errors
    ///
    /// Validation errors, unresolved or cyclic dependencies (unless cycles
    /// are allowed), duplicate accessor names, broken stub overrides and
    /// unreadable host files.
    pub fn generate(&self, blueprint: &Blueprint) -> EngineResult<GeneratedModule> {
        // ── 1. Validate ──────────────────────────────────────────────────
        let mut normalized = blueprint.clone();
        normalized.normalize();
        let validation = Validator::with_default_rules().validate(&normalized);
        let warnings: Vec<String> = validation.warnings.iter().map(|w| w.to_string()).collect();
        validation.to_result()?;

        // ── 2. Build context ─────────────────────────────────────────────
        let ctx = GenerationContext::new(&normalized, &self.config)?;
        let stubs = StubRenderer::new(self.config.stubs_dir.as_deref())?;
        let views = ModuleViews::new(&ctx);

        // ── 3. Render ────────────────────────────────────────────────────
        let mut output = GeneratedModule::new(ctx.module());
        for file in migrations::generate_migrations(&ctx, &views, &stubs)? {
            output.add_file(file);
        }
        for file in php::generate_php_sources(&ctx, &views, &stubs)? {
            output.add_file(file);
        }
        output.add_file(GeneratedFile::json(
            ctx.module_path(SNAPSHOT_FILE),
            snapshot_to_string(&ctx.blueprint)?,
        ));

        // ── 4. Plan integration ──────────────────────────────────────────
        let target = IntegrationTarget::new(&self.config, ctx.module());
        output.integration = integration::plan_register(&self.config.app_root, &target)?;

        // ── 5. Warnings ──────────────────────────────────────────────────
        for warning in warnings {
            output.add_warning(warning);
        }
        for name in &ctx.forced {
            output.add_warning(format!(
                "Entity '{}' is part of a dependency cycle and was placed before its dependencies",
                name
            ));
        }
        output.forced = ctx.forced.clone();

        info!(
            module = %output.name,
            files = output.file_count(),
            integration = output.integration.len(),
            warnings = output.warnings.len(),
            "Module generation complete"
        );

        Ok(output)
    }

    /// Generate a module and commit it below the app root.
    ///
    /// Existing files fail the run with `OutputExists` unless overwriting
    /// is allowed. An existing migration of the same table is replaced in
    /// place (keeping its timestamp) when overwriting.
    pub fn generate_and_write(&self, blueprint: &Blueprint) -> EngineResult<GeneratedModule> {
        let mut output = self.generate(blueprint)?;
        self.reuse_existing_migrations(&mut output)?;
        let report = output.write_to_disk(&self.config.app_root, self.config.overwrite)?;
        info!(
            app_root = %self.config.app_root.display(),
            created = report.created.len(),
            replaced = report.replaced.len(),
            "Module written"
        );
        Ok(output)
    }

    /// Write only the files of a module that do not exist yet, and repair
    /// the host integration. Existing files are never touched.
    pub fn generate_missing(&self, blueprint: &Blueprint) -> EngineResult<GeneratedModule> {
        let mut output = self.generate(blueprint)?;
        let module_dir = self.config.module_dir(&output.name);
        let root = &self.config.app_root;

        output.files.retain(|file| match file.migration_suffix() {
            Some(suffix) => migrations::find_existing(&module_dir, &suffix).is_none(),
            None => !root.join(&file.path).exists(),
        });

        for file in &output.files {
            debug!(path = %file.path.display(), "Restoring missing file");
        }
        output.write_to_disk(&self.config.app_root, false)?;
        Ok(output)
    }

    /// Point migrations at existing files of the same table
    fn reuse_existing_migrations(&self, output: &mut GeneratedModule) -> EngineResult<()> {
        let module_dir = self.config.module_dir(&output.name);
        for file in &mut output.files {
            let Some(suffix) = file.migration_suffix() else {
                continue;
            };
            let Some(existing) = migrations::find_existing(&module_dir, &suffix) else {
                continue;
            };
            if !self.config.overwrite {
                return Err(EngineError::OutputExists(existing));
            }
            if let Ok(rel) = existing.strip_prefix(&self.config.app_root) {
                warn!(path = %rel.display(), "Replacing existing migration");
                file.path = rel.to_path_buf();
            }
        }
        Ok(())
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// GenerationSummary — human-readable report
// ============================================================================

/// A human-readable summary of a completed generation run.
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub module_name: String,
    pub total_files: usize,
    pub php_files: usize,
    pub migration_files: usize,
    pub other_files: usize,
    /// Host files edited to register the module
    pub integration_files: usize,
    pub warning_count: usize,
    pub total_bytes: usize,
}

impl GenerationSummary {
    pub fn from_module(module: &GeneratedModule) -> Self {
        let migration_files = module.migrations().len();
        let php_files = module.files_by_type(FileType::Php).len() - migration_files;
        let other_files = module.file_count() - php_files - migration_files;
        let total_bytes: usize = module.files.iter().map(|f| f.content.len()).sum();

        Self {
            module_name: module.name.clone(),
            total_files: module.file_count(),
            php_files,
            migration_files,
            other_files,
            integration_files: module.integration.len(),
            warning_count: module.warnings.len(),
            total_bytes,
        }
    }

    /// Format the summary as a human-readable string.
    pub fn display(&self) -> String {
        let mut out = String::with_capacity(640);

        out.push_str("╔══════════════════════════════════════════════════╗\n");
        out.push_str("║         Module Generation Complete               ║\n");
        out.push_str("╠══════════════════════════════════════════════════╣\n");
        out.push_str(&format!("║  Module:      {:<35}║\n", self.module_name));
        out.push_str(&format!("║  Total Files: {:<35}║\n", self.total_files));
        out.push_str(&format!("║    PHP:       {:<35}║\n", self.php_files));
        out.push_str(&format!("║    Migrations:{:<35}║\n", self.migration_files));
        out.push_str(&format!("║    Other:     {:<35}║\n", self.other_files));
        out.push_str(&format!("║  Host Edits:  {:<35}║\n", self.integration_files));
        out.push_str(&format!("║  Warnings:    {:<35}║\n", self.warning_count));

        let size_str = if self.total_bytes < 1024 {
            format!("{} B", self.total_bytes)
        } else if self.total_bytes < 1024 * 1024 {
            format!("{:.1} KB", self.total_bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", self.total_bytes as f64 / (1024.0 * 1024.0))
        };
        out.push_str(&format!("║  Total Size:  {:<35}║\n", size_str));
        out.push_str("╚══════════════════════════════════════════════════╝\n");

        out
    }
}

impl std::fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Produce a [`GenerationSummary`] from a [`GeneratedModule`].
pub fn summarize(module: &GeneratedModule) -> GenerationSummary {
    GenerationSummary::from_module(module)
}

/// Whether `module_dir` looks like a generated module
pub fn is_module_dir(module_dir: &Path) -> bool {
    module_dir.join(SNAPSHOT_FILE).is_file()
}

/// Names of every generated module below the modules directory, sorted
pub fn discover_modules(config: &GeneratorConfig) -> Vec<String> {
    let modules_root = config.app_root.join(&config.modules_dir);
    let mut names: Vec<String> = WalkDir::new(&modules_root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir() && is_module_dir(e.path()))
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fixed_timestamp, inventory};
    use blueprint_core::{FieldType, ReferentialAction};
    use blueprint_ir::{Entity, Field, Relationship, load_snapshot};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn config(root: &Path) -> GeneratorConfig {
        GeneratorConfig::new()
            .with_app_root(root)
            .with_timestamp(fixed_timestamp())
    }

    #[test]
    fn test_generate_in_memory() {
        let dir = tempdir().unwrap();
        let module = Generator::new(config(dir.path())).generate(&inventory()).unwrap();

        assert_eq!(module.name, "Inventory");
        assert_eq!(module.migrations().len(), 6);
        assert!(module.file("Modules/Inventory/module.json").is_some());
        assert_eq!(module.integration.len(), 3);
        assert!(!dir.path().join("Modules").exists());
    }

    #[test]
    fn test_generate_and_write_commits_everything() {
        let dir = tempdir().unwrap();
        let module = Generator::new(config(dir.path()))
            .generate_and_write(&inventory())
            .unwrap();

        for file in &module.files {
            assert!(dir.path().join(&file.path).is_file(), "{}", file.path.display());
        }
        let composer = fs::read_to_string(dir.path().join("composer.json")).unwrap();
        assert!(composer.contains("Modules\\\\Inventory\\\\"));

        let snapshot = load_snapshot(dir.path().join("Modules/Inventory")).unwrap();
        assert_eq!(snapshot.entities.len(), 5);
        assert!(is_module_dir(&dir.path().join("Modules/Inventory")));
    }

    #[test]
    fn test_second_run_needs_force() {
        let dir = tempdir().unwrap();
        Generator::new(config(dir.path()))
            .generate_and_write(&inventory())
            .unwrap();

        let err = Generator::new(config(dir.path()))
            .generate_and_write(&inventory())
            .unwrap_err();
        assert!(matches!(err, EngineError::OutputExists(_)));
    }

    #[test]
    fn test_force_reuses_migration_names() {
        let dir = tempdir().unwrap();
        Generator::new(config(dir.path()))
            .generate_and_write(&inventory())
            .unwrap();

        let later = fixed_timestamp() + chrono::Duration::days(30);
        let forced = GeneratorConfig::new()
            .with_app_root(dir.path())
            .with_timestamp(later)
            .allow_overwrite();
        let module = Generator::new(forced).generate_and_write(&inventory()).unwrap();

        let migrations = dir.path().join("Modules/Inventory/Database/Migrations");
        assert_eq!(fs::read_dir(&migrations).unwrap().count(), 6);
        assert!(module.migrations()[0]
            .path
            .to_string_lossy()
            .contains("2024_01_15_"));

        // integration stays single
        let routes = fs::read_to_string(dir.path().join("routes/api.php")).unwrap();
        assert_eq!(routes.matches("Modules/Inventory/routes/api.php").count(), 1);
    }

    #[test]
    fn test_failed_run_leaves_no_partial_module() {
        let dir = tempdir().unwrap();
        // a file where the module directory should go
        fs::create_dir_all(dir.path().join("Modules")).unwrap();
        fs::write(dir.path().join("Modules/Inventory"), "not a directory").unwrap();

        assert!(Generator::new(config(dir.path())).generate_and_write(&inventory()).is_err());
        assert!(!dir.path().join("composer.json").exists());
        assert!(!dir.path().join("routes").exists());
    }

    #[test]
    fn test_cycle_fails_unless_allowed() {
        let blueprint = Blueprint::new("Loop")
            .with_entity(Entity::new("Alpha").with_field(Field::new("name", FieldType::String)))
            .with_entity(Entity::new("Beta").with_field(Field::new("name", FieldType::String)))
            .with_entity(Entity::new("Gamma").with_field(Field::new("name", FieldType::String)))
            .with_relationship(Relationship::one_to_many("Alpha", "Beta"))
            .with_relationship(Relationship::one_to_many("Beta", "Gamma"))
            .with_relationship(Relationship::one_to_many("Gamma", "Alpha"));
        let dir = tempdir().unwrap();

        let err = Generator::new(config(dir.path())).generate(&blueprint).unwrap_err();
        assert!(matches!(err, EngineError::DependencyCycle(_)));

        let module = Generator::new(config(dir.path()).allow_cycles())
            .generate(&blueprint)
            .unwrap();
        assert_eq!(module.forced, vec!["Alpha"]);
        assert!(module.has_warnings());
    }

    #[test]
    fn test_set_null_foreign_key_must_be_nullable() {
        let blueprint = |warehouse_id: Field| {
            Blueprint::new("Storage")
                .with_entity(Entity::new("Warehouse").with_field(Field::new("name", FieldType::String)))
                .with_entity(Entity::new("Location").with_field(warehouse_id))
                .with_relationship(
                    Relationship::one_to_many("Warehouse", "Location")
                        .on_delete(ReferentialAction::SetNull),
                )
        };
        let dir = tempdir().unwrap();
        let generator = Generator::new(config(dir.path()));

        let err = generator
            .generate(&blueprint(Field::new("warehouse_id", FieldType::Integer)))
            .unwrap_err();
        assert!(err.is_validation(), "{}", err);
        assert!(err.to_string().contains("warehouse_id"));

        let module = generator
            .generate(&blueprint(Field::new("warehouse_id", FieldType::Integer).nullable()))
            .unwrap();
        let migration = module
            .migrations()
            .into_iter()
            .find(|f| f.path.to_string_lossy().ends_with("_create_locations_table.php"))
            .unwrap();
        assert!(migration.content.contains(
            "$table->foreignId('warehouse_id')->nullable()->constrained('warehouses')->nullOnDelete();"
        ));
    }

    #[test]
    fn test_generate_missing_only_fills_gaps() {
        let dir = tempdir().unwrap();
        let generator = Generator::new(config(dir.path()));
        generator.generate_and_write(&inventory()).unwrap();

        let model = dir.path().join("Modules/Inventory/app/Models/Warehouse.php");
        let migration = dir
            .path()
            .join("Modules/Inventory/Database/Migrations/2024_01_15_000002_create_locations_table.php");
        fs::write(&model, "<?php // edited").unwrap();
        fs::remove_file(&migration).unwrap();
        fs::remove_file(dir.path().join("routes/api.php")).unwrap();

        let repaired = generator.generate_missing(&inventory()).unwrap();
        assert_eq!(repaired.file_count(), 1);
        assert!(migration.is_file());
        assert_eq!(fs::read_to_string(&model).unwrap(), "<?php // edited");
        assert!(dir.path().join("routes/api.php").is_file());
    }

    #[test]
    fn test_discover_modules() {
        let dir = tempdir().unwrap();
        assert!(discover_modules(&config(dir.path())).is_empty());

        Generator::new(config(dir.path()))
            .generate_and_write(&inventory())
            .unwrap();
        fs::create_dir_all(dir.path().join("Modules/Scratch")).unwrap();

        assert_eq!(discover_modules(&config(dir.path())), vec!["Inventory"]);
    }

    #[test]
    fn test_summary_display() {
        let dir = tempdir().unwrap();
        let module = Generator::new(config(dir.path())).generate(&inventory()).unwrap();
        let summary = summarize(&module);
        assert_eq!(summary.migration_files, 6);
        assert_eq!(summary.other_files, 1);
        assert_eq!(
            summary.total_files,
            summary.php_files + summary.migration_files + summary.other_files
        );
        let text = summary.display();
        assert!(text.contains("Module Generation Complete"));
        assert!(text.contains("Inventory"));
    }
}
