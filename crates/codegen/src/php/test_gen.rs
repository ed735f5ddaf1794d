//! Feature test generation
//!
//! Five test classes per entity, one per CRUD action. Together they pin the
//! contract of the generated API: 401 for guests, 403 without the action's
//! permission (only when the entity is guarded), 404 for unknown ids and a
//! second delete, 422 with a `source.pointer` for invalid payloads.

use crate::GeneratedFile;
use crate::context::GenerationContext;
use crate::templates::{StubKind, StubRenderer};
use crate::views::{EntityView, ModuleViews};
use blueprint_core::EngineResult;
use minijinja::context;

/// A CRUD action covered by one test class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestAction {
    Index,
    Show,
    Store,
    Update,
    Destroy,
}

impl TestAction {
    pub fn all() -> &'static [TestAction] {
        &[
            TestAction::Index,
            TestAction::Show,
            TestAction::Store,
            TestAction::Update,
            TestAction::Destroy,
        ]
    }

    /// Class-name fragment (e.g. "Store" in `WarehouseStoreTest`)
    pub fn label(&self) -> &'static str {
        match self {
            TestAction::Index => "Index",
            TestAction::Show => "Show",
            TestAction::Store => "Store",
            TestAction::Update => "Update",
            TestAction::Destroy => "Destroy",
        }
    }

    fn stub(&self) -> StubKind {
        match self {
            TestAction::Index => StubKind::TestIndex,
            TestAction::Show => StubKind::TestShow,
            TestAction::Store => StubKind::TestStore,
            TestAction::Update => StubKind::TestUpdate,
            TestAction::Destroy => StubKind::TestDestroy,
        }
    }

    /// Permission guarding the action, if the entity is guarded
    fn permission<'a>(&self, entity: &'a EntityView) -> Option<&'a str> {
        let perms = entity.permissions.as_ref()?;
        Some(match self {
            TestAction::Index => &perms.view_any,
            TestAction::Show => &perms.view,
            TestAction::Store => &perms.create,
            TestAction::Update => &perms.update,
            TestAction::Destroy => &perms.delete,
        })
    }
}

/// Generate `Tests/Feature/<Entity><Action>Test.php` for every entity and action
pub fn generate_tests(
    ctx: &GenerationContext,
    views: &ModuleViews,
    stubs: &StubRenderer,
) -> EngineResult<Vec<GeneratedFile>> {
    let mut files = Vec::with_capacity(views.entities.len() * TestAction::all().len());

    for (info, entity) in views.pairs(ctx) {
        let required_attribute = entity
            .fields
            .iter()
            .find(|f| !f.nullable)
            .map(|f| f.attribute.as_str());

        for action in TestAction::all() {
            let content = stubs.render(
                action.stub(),
                context! {
                    module => &views.module,
                    entity => entity,
                    permission => action.permission(entity),
                    required_attribute => required_attribute,
                },
            )?;
            files.push(GeneratedFile::php(info.test_path(action.label()), content));
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::inventory_ctx;

    fn tests() -> Vec<GeneratedFile> {
        let ctx = inventory_ctx();
        let views = ModuleViews::new(&ctx);
        let stubs = StubRenderer::embedded().unwrap();
        generate_tests(&ctx, &views, &stubs).unwrap()
    }

    fn test_class(suffix: &str) -> String {
        tests()
            .into_iter()
            .find(|f| f.path.ends_with(suffix))
            .unwrap()
            .content
    }

    #[test]
    fn test_five_classes_per_entity() {
        let files = tests();
        assert_eq!(files.len(), 25);
        assert!(files[0].path.ends_with("Modules/Inventory/Tests/Feature/WarehouseIndexTest.php"));
    }

    #[test]
    fn test_guarded_entity_checks_permission() {
        let index = test_class("WarehouseIndexTest.php");
        assert!(index.contains("namespace Modules\\Inventory\\Tests\\Feature;"));
        assert!(index.contains("use RefreshDatabase;"));
        assert!(index.contains("Permission::findOrCreate('inventory.warehouses.viewAny', 'web')"));
        assert!(index.contains("->assertStatus(403);"));
        assert!(index.contains("->assertStatus(401);"));
        assert!(index.contains("->get('/api/v1/warehouses')"));
    }

    #[test]
    fn test_unguarded_entity_has_no_forbidden_case() {
        let index = test_class("LocationIndexTest.php");
        assert!(!index.contains("Spatie\\Permission"));
        assert!(!index.contains("assertStatus(403)"));
    }

    #[test]
    fn test_store_payload_and_validation() {
        let store = test_class("LocationStoreTest.php");
        assert!(store.contains("'code' => 'Sample value',"));
        assert!(store.contains("'aisle' => 42,"));
        assert!(store.contains("'warehouseId' => Warehouse::factory()->create()->getKey(),"));
        assert!(store.contains("use Modules\\Inventory\\Models\\Warehouse;"));
        assert!(store.contains("->assertStatus(422)"));
        assert!(store.contains("['pointer' => '/data/attributes/code']"));
    }

    #[test]
    fn test_destroy_twice_is_not_found() {
        let destroy = test_class("ProductDestroyTest.php");
        assert!(destroy.contains("->assertNoContent();"));
        assert!(destroy.contains("->assertNotFound();"));
        assert!(destroy.contains("'inventory.products.delete'"));
    }

    #[test]
    fn test_update_skips_foreign_keys() {
        let update = test_class("StockLevelUpdateTest.php");
        assert!(update.contains("'quantity' => 84,"));
        assert!(!update.contains("'productId' =>"));
    }

    #[test]
    fn test_index_sorts_by_first_required_numeric_column() {
        let index = test_class("ProductIndexTest.php");
        assert!(index.contains("public function test_it_sorts_product_resources_by_price(): void"));
        assert!(index.contains("$high = Product::factory()->create(['price' => 20.5]);"));
        assert!(index.contains("$low = Product::factory()->create(['price' => 10.5]);"));
        assert!(index.contains("->sort('price')"));
        assert!(index.contains("->sort('-price')"));
        assert!(index.contains("->assertFetchedManyInOrder([$low, $high]);"));
        assert!(index.contains("->assertFetchedManyInOrder([$high, $low]);"));
    }

    #[test]
    fn test_index_sort_falls_back_to_created_at() {
        // capacity is nullable, so no required numeric column remains
        let index = test_class("WarehouseIndexTest.php");
        assert!(index.contains("create(['created_at' => '2024-01-10 08:00:00'])"));
        assert!(index.contains("->sort('-createdAt')"));
    }

    #[test]
    fn test_show_checks_computed_attributes() {
        let show = test_class("ProductShowTest.php");
        assert!(show.contains("public function test_product_computed_attributes_match_their_columns(): void"));
        assert!(show.contains("(float) ($model->price * 1.16),"));
        assert!(show.contains("(float) $response->json('data.attributes.grossPrice'),"));

        let plain = test_class("TagShowTest.php");
        assert!(!plain.contains("computed_attributes"));
    }

    #[test]
    fn test_show_compares_plain_attributes() {
        let show = test_class("ProductShowTest.php");
        assert!(show.contains("assertJsonPath('data.attributes.sku', $model->sku);"));
        assert!(!show.contains("data.attributes.attributes"));
    }
}
