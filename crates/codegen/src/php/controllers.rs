//! API controller generation

use crate::GeneratedFile;
use crate::context::GenerationContext;
use crate::templates::{StubKind, StubRenderer};
use crate::views::ModuleViews;
use blueprint_core::EngineResult;
use minijinja::context;

/// Generate `app/Http/Controllers/Api/V1/<Entity>Controller.php` for every entity
pub fn generate_controllers(
    ctx: &GenerationContext,
    views: &ModuleViews,
    stubs: &StubRenderer,
) -> EngineResult<Vec<GeneratedFile>> {
    views
        .pairs(ctx)
        .map(|(info, entity)| {
            let content = stubs.render(
                StubKind::Controller,
                context! { module => &views.module, entity => entity },
            )?;
            Ok(GeneratedFile::php(info.controller_path(), content))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::inventory_ctx;

    #[test]
    fn test_controller_uses_json_api_actions() {
        let ctx = inventory_ctx();
        let views = ModuleViews::new(&ctx);
        let stubs = StubRenderer::embedded().unwrap();
        let files = generate_controllers(&ctx, &views, &stubs).unwrap();
        assert_eq!(files.len(), 5);

        let controller = &files[0];
        assert!(controller.path.ends_with(
            "Modules/Inventory/app/Http/Controllers/Api/V1/WarehouseController.php"
        ));
        assert!(controller.content.contains("namespace Modules\\Inventory\\Http\\Controllers\\Api\\V1;"));
        assert!(controller.content.contains("class WarehouseController extends Controller"));
        assert!(controller.content.contains("use Actions\\FetchMany;"));
        assert!(controller.content.contains("use Actions\\Destroy;"));
    }
}
