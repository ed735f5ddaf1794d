//! JSON:API layer generation
//!
//! Per entity, under `app/JsonApi/V1/<Plural>/`:
//! - `<Entity>Schema`: fields, filters, sorting and pagination
//! - `<Entity>Resource`: camelCase attributes and relationships
//! - `<Entity>Authorizer`: permission checks per action
//! - `<Entity>Request`: validation rules
//!
//! Plus one `app/JsonApi/V1/Server.php` listing every schema.

use crate::GeneratedFile;
use crate::context::GenerationContext;
use crate::templates::{StubKind, StubRenderer};
use crate::views::ModuleViews;
use blueprint_core::EngineResult;
use minijinja::context;

/// Stub and class-name suffix of each per-entity class
const ENTITY_CLASSES: &[(StubKind, &str)] = &[
    (StubKind::Schema, "Schema"),
    (StubKind::Resource, "Resource"),
    (StubKind::Authorizer, "Authorizer"),
    (StubKind::Request, "Request"),
];

/// Generate the JSON:API classes of every entity and the module server
pub fn generate_json_api(
    ctx: &GenerationContext,
    views: &ModuleViews,
    stubs: &StubRenderer,
) -> EngineResult<Vec<GeneratedFile>> {
    let mut files = Vec::with_capacity(views.entities.len() * ENTITY_CLASSES.len() + 1);

    for (info, entity) in views.pairs(ctx) {
        for (kind, suffix) in ENTITY_CLASSES {
            let content = stubs.render(*kind, context! { module => &views.module, entity => entity })?;
            files.push(GeneratedFile::php(info.json_api_path(suffix), content));
        }
    }

    let content = stubs.render(
        StubKind::Server,
        context! { module => &views.module, entities => &views.entities },
    )?;
    files.push(GeneratedFile::php(ctx.module_path("app/JsonApi/V1/Server.php"), content));

    Ok(files)
}
