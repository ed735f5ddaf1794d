//! Seeder generation
//!
//! - one seeder per entity, seeding through its factory
//! - `<Module>DatabaseSeeder` calling the entity seeders in dependency order
//! - `<Module>PermissionSeeder` creating permissions and role grants, when
//!   the blueprint configures permissions

use crate::GeneratedFile;
use crate::context::GenerationContext;
use crate::templates::{StubKind, StubRenderer};
use crate::views::ModuleViews;
use blueprint_core::EngineResult;
use minijinja::context;
use serde::Serialize;

/// Records each entity seeder creates
pub const SEED_COUNT: usize = 10;

/// Guard the permissions are created for
const GUARD: &str = "web";

#[derive(Debug, Serialize)]
struct RoleView {
    name: String,
    permissions: Vec<String>,
}

/// Generate entity, module and permission seeders
pub fn generate_seeders(
    ctx: &GenerationContext,
    views: &ModuleViews,
    stubs: &StubRenderer,
) -> EngineResult<Vec<GeneratedFile>> {
    let mut files = Vec::new();
    let mut seeders = Vec::new();

    // entity seeders call factories
    if ctx.config.generate_seeders && ctx.config.generate_factories {
        for (info, entity) in views.pairs(ctx) {
            let content = stubs.render(
                StubKind::Seeder,
                context! {
                    module => &views.module,
                    entity => entity,
                    seed_count => SEED_COUNT,
                },
            )?;
            files.push(GeneratedFile::php(info.seeder_path(), content));
            seeders.push(format!("{}Seeder", entity.name));
        }
    }

    let content = stubs.render(
        StubKind::ModuleSeeder,
        context! { module => &views.module, seeders => seeders },
    )?;
    files.push(GeneratedFile::php(
        ctx.module_path(&format!("Database/Seeders/{}.php", ctx.module_seeder_class())),
        content,
    ));

    if let Some(perms) = ctx.permissions() {
        let roles: Vec<RoleView> = perms
            .role_permissions()
            .into_iter()
            .map(|(name, permissions)| RoleView { name, permissions })
            .collect();
        let content = stubs.render(
            StubKind::PermissionSeeder,
            context! {
                module => &views.module,
                permissions => perms.permission_names(),
                roles => roles,
                guard => GUARD,
            },
        )?;
        files.push(GeneratedFile::php(
            ctx.module_path(&format!(
                "Database/Seeders/{}.php",
                ctx.permission_seeder_class()
            )),
            content,
        ));
    }

    Ok(files)
}
