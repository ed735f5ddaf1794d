//! Module route file generation
//!
//! Every entity is registered as a JSON:API resource on the module's server
//! (named after the snake_case module) under the `v1` prefix, behind
//! `auth:sanctum`. The host application includes the file through the
//! integration writer.

use crate::GeneratedFile;
use crate::context::GenerationContext;
use crate::templates::{StubKind, StubRenderer};
use crate::views::ModuleViews;
use blueprint_core::EngineResult;
use minijinja::context;

/// Module-relative path of the route file
pub const ROUTES_FILE: &str = "routes/api.php";

/// Generate `routes/api.php` of the module
pub fn generate_routes(
    ctx: &GenerationContext,
    views: &ModuleViews,
    stubs: &StubRenderer,
) -> EngineResult<Vec<GeneratedFile>> {
    let content = stubs.render(
        StubKind::Routes,
        context! { module => &views.module, entities => &views.entities },
    )?;
    Ok(vec![GeneratedFile::php(ctx.module_path(ROUTES_FILE), content)])
}
