//! Markdown API reference of one module
//!
//! Rendered from the `api_docs` stub. The permission matrix is laid out
//! here because its column count depends on the configured roles.

use super::load_module;
use crate::context::GenerationContext;
use crate::templates::{StubKind, StubRenderer};
use crate::views::ModuleViews;
use crate::{GeneratedFile, GeneratorConfig, Transaction};
use blueprint_core::EngineResult;
use blueprint_ir::{Blueprint, PermissionConfig};
use minijinja::context;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

/// Module-relative path of the rendered reference
pub const DOCS_FILE: &str = "docs/API.md";

/// Permission table: one row per permission, one column per role
#[derive(Debug, Clone, Serialize)]
struct PermissionMatrix {
    prefix: String,
    header: String,
    divider: String,
    rows: Vec<String>,
}

impl PermissionMatrix {
    fn new(perms: &PermissionConfig) -> Self {
        let roles = perms.roles.roles();

        let mut header = String::from("| Permission |");
        let mut divider = String::from("|---|");
        for role in &roles {
            header.push_str(&format!(" {} |", role));
            divider.push_str("---|");
        }

        let mut rows = Vec::new();
        for resource in &perms.resources {
            for action in &perms.actions {
                let mut row = format!("| `{}` |", perms.permission_name(resource, action));
                for role in &roles {
                    let granted = if perms.role_has_action(role, action) { "yes" } else { "-" };
                    row.push_str(&format!(" {} |", granted));
                }
                rows.push(row);
            }
        }

        Self {
            prefix: perms.prefix.clone(),
            header,
            divider,
            rows,
        }
    }
}

/// Render `docs/API.md` for a blueprint
pub fn render_module_docs(
    blueprint: &Blueprint,
    config: &GeneratorConfig,
) -> EngineResult<GeneratedFile> {
    let ctx = GenerationContext::new(blueprint, config)?;
    let views = ModuleViews::new(&ctx);
    let stubs = StubRenderer::new(config.stubs_dir.as_deref())?;
    let permissions = ctx.permissions().map(PermissionMatrix::new);

    let content = stubs.render(
        StubKind::ApiDocs,
        context! {
            module => &views.module,
            entities => &views.entities,
            permissions => permissions,
        },
    )?;
    Ok(GeneratedFile::markdown(ctx.module_path(DOCS_FILE), content))
}

/// Render the reference of an existing module and write it, replacing any
/// previous version. Returns the path relative to the app root.
pub fn write_module_docs(config: &GeneratorConfig, module: &str) -> EngineResult<PathBuf> {
    let blueprint = load_module(config, module)?;
    let file = render_module_docs(&blueprint, config)?;

    let mut tx = Transaction::begin(&config.app_root)?;
    tx.stage(&file.path, &file.content, true)?;
    tx.commit()?;

    info!(module = %module, path = %file.path.display(), "Module documentation written");
    Ok(file.path)
}
