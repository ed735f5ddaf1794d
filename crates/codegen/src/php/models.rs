//! Eloquent model generation

use crate::GeneratedFile;
use crate::context::GenerationContext;
use crate::templates::{StubKind, StubRenderer};
use crate::views::ModuleViews;
use blueprint_core::EngineResult;
use minijinja::context;

/// Generate `app/Models/<Entity>.php` for every entity
pub fn generate_models(
    ctx: &GenerationContext,
    views: &ModuleViews,
    stubs: &StubRenderer,
) -> EngineResult<Vec<GeneratedFile>> {
    views
        .pairs(ctx)
        .map(|(info, entity)| {
            let content = stubs.render(
                StubKind::Model,
                context! {
                    module => &views.module,
                    entity => entity,
                    generate_factories => ctx.config.generate_factories,
                },
            )?;
            Ok(GeneratedFile::php(info.model_path(), content))
        })
        .collect()
}
