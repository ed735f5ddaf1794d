//! Model factory generation

use crate::GeneratedFile;
use crate::context::GenerationContext;
use crate::templates::{StubKind, StubRenderer};
use crate::views::ModuleViews;
use blueprint_core::EngineResult;
use minijinja::context;

/// Generate `Database/Factories/<Entity>Factory.php` for every entity
///
/// Foreign keys to entities of the module chain the related factory, so
/// creating a `Location` creates its `Warehouse` first.
pub fn generate_factories(
    ctx: &GenerationContext,
    views: &ModuleViews,
    stubs: &StubRenderer,
) -> EngineResult<Vec<GeneratedFile>> {
    views
        .pairs(ctx)
        .map(|(info, entity)| {
            let content = stubs.render(
                StubKind::Factory,
                context! { module => &views.module, entity => entity },
            )?;
            Ok(GeneratedFile::php(info.factory_path(), content))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::inventory_ctx;

    fn factories() -> Vec<GeneratedFile> {
        let ctx = inventory_ctx();
        let views = ModuleViews::new(&ctx);
        let stubs = StubRenderer::embedded().unwrap();
        generate_factories(&ctx, &views, &stubs).unwrap()
    }

    fn factory(name: &str) -> String {
        factories()
            .into_iter()
            .find(|f| f.path.ends_with(format!("{}Factory.php", name)))
            .unwrap()
            .content
    }

    #[test]
    fn test_factory_definition() {
        let content = factory("Warehouse");
        assert!(content.contains("namespace Modules\\Inventory\\Database\\Factories;"));
        assert!(content.contains("use Modules\\Inventory\\Models\\Warehouse;"));
        assert!(content.contains("protected $model = Warehouse::class;"));
        assert!(content.contains("'name' => fake()->words(3, true),"));
        assert!(content.contains("'code' => fake()->unique()->words(3, true),"));
        assert!(!content.contains("App\\Models\\User"));
    }

    #[test]
    fn test_foreign_keys_chain_factories() {
        let location = factory("Location");
        assert!(location.contains("'warehouse_id' => Warehouse::factory(),"));
        assert!(location.contains("use Modules\\Inventory\\Models\\Warehouse;"));

        let stock = factory("StockLevel");
        assert!(stock.contains("'product_id' => Product::factory(),"));
        assert!(stock.contains("'location_id' => Location::factory(),"));
        assert!(stock.contains("use Modules\\Inventory\\Models\\Location;\nuse Modules\\Inventory\\Models\\Product;\n"));
    }

    #[test]
    fn test_one_factory_per_entity() {
        assert_eq!(factories().len(), 5);
    }
}
