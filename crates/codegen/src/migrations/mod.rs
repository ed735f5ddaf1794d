//! # Migration Generation
//!
//! One `create_<table>` migration per entity, in dependency order, followed
//! by one migration per pivot table. Files are named
//!
//! ```text
//! Database/Migrations/{YYYY_MM_DD}_{NNNNNN}_create_{table}_table.php
//! ```
//!
//! where `NNNNNN` is the 1-based position of the migration in the run, so
//! the host's migrator runs referenced tables first.
//!
//! Because the date prefix changes between runs, an existing migration is
//! identified by its `_create_<table>_table.php` suffix alone.

use crate::GeneratedFile;
use crate::context::GenerationContext;
use crate::templates::{StubKind, StubRenderer};
use crate::views::ModuleViews;
use blueprint_core::{EngineError, EngineResult, naming};
use minijinja::context;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Module-relative migrations directory
pub const MIGRATIONS_DIR: &str = "Database/Migrations";

/// Pivot table columns handed to the pivot stub
#[derive(Debug, Clone, Serialize)]
pub struct PivotView {
    pub table: String,
    pub first_key: String,
    pub first_table: String,
    pub second_key: String,
    pub second_table: String,
}

/// Suffix identifying the migration of `table` regardless of its timestamp
pub fn migration_suffix(table: &str) -> String {
    format!("_create_{}_table.php", table)
}

/// Generate entity migrations followed by pivot migrations
pub fn generate_migrations(
    ctx: &GenerationContext,
    views: &ModuleViews,
    stubs: &StubRenderer,
) -> EngineResult<Vec<GeneratedFile>> {
    let dir = ctx.module_path(MIGRATIONS_DIR);
    let mut files = Vec::new();
    let mut sequence = 0;

    for (_, entity) in views.pairs(ctx) {
        sequence += 1;
        let content = stubs.render(StubKind::Migration, context! { entity => entity })?;
        files.push(GeneratedFile::php(
            dir.join(ctx.migration_file_name(sequence, &entity.table)),
            content,
        ));
    }

    for pivot in pivot_views(ctx)? {
        sequence += 1;
        let content = stubs.render(StubKind::PivotMigration, context! { pivot => &pivot })?;
        files.push(GeneratedFile::php(
            dir.join(ctx.migration_file_name(sequence, &pivot.table)),
            content,
        ));
    }

    Ok(files)
}

/// Pivot tables of every many-to-many relationship, deduplicated by name
pub fn pivot_views(ctx: &GenerationContext) -> EngineResult<Vec<PivotView>> {
    let mut pivots: Vec<PivotView> = Vec::new();
    for rel in ctx.blueprint.pivot_relationships() {
        let Some(table) = rel.pivot_table() else {
            continue;
        };
        if pivots.iter().any(|p| p.table == table) {
            continue;
        }
        let first = ctx.blueprint.require_entity(&rel.entity_a)?;
        let second = ctx.blueprint.require_entity(&rel.entity_b)?;
        if first.name == second.name {
            return Err(EngineError::RelationshipValidation(format!(
                "Many-to-many relationship of '{}' with itself needs distinct pivot keys",
                first.name
            )));
        }
        pivots.push(PivotView {
            table,
            first_key: naming::foreign_key_for(&first.name),
            first_table: first.table_name.clone(),
            second_key: naming::foreign_key_for(&second.name),
            second_table: second.table_name.clone(),
        });
    }
    Ok(pivots)
}

/// Existing migration of the module ending in `suffix`
pub fn find_existing(module_dir: &Path, suffix: &str) -> Option<PathBuf> {
    let dir = module_dir.join(MIGRATIONS_DIR);
    let entries = std::fs::read_dir(dir).ok()?;
    let mut matches: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(suffix))
        })
        .collect();
    matches.sort();
    matches.into_iter().next()
}
