//! Foreign-key column → referenced table
//!
//! Common ERP keys resolve through a static table; anything else falls
//! back to stripping `_id` and re-pluralizing the stem
//! (`parent_category_id` → `parent_categories`).

use blueprint_core::naming;
use blueprint_ir::{Blueprint, Entity, Field};
use regex::Regex;
use std::sync::LazyLock;

/// Well-known foreign keys of the host application
pub const STATIC_TABLES: &[(&str, &str)] = &[
    ("user_id", "users"),
    ("product_id", "products"),
    ("warehouse_id", "warehouses"),
    ("location_id", "locations"),
    ("customer_id", "customers"),
    ("supplier_id", "suppliers"),
    ("category_id", "categories"),
    ("order_id", "orders"),
    ("sales_order_id", "sales_orders"),
    ("product_batch_id", "product_batches"),
    ("batch_id", "product_batches"),
    ("unit_id", "units"),
    ("currency_id", "currencies"),
];

static FK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][a-z0-9_]*?)_id$").expect("valid foreign key pattern"));

/// Static table lookup only
pub fn static_table(column: &str) -> Option<&'static str> {
    STATIC_TABLES
        .iter()
        .find(|(key, _)| *key == column)
        .map(|(_, table)| *table)
}

/// Table referenced by a `*_id` column; `None` for other columns
pub fn resolve_table(column: &str) -> Option<String> {
    if let Some(table) = static_table(column) {
        return Some(table.to_string());
    }
    let captures = FK_PATTERN.captures(column)?;
    let stem = captures.get(1)?.as_str();
    let studly = naming::pascal(&naming::singularize(stem));
    Some(naming::table_name(&studly))
}

/// Table a foreign-key field of `entity` points at
///
/// A relationship foreign key always references the owning entity's table;
/// other `*_id` fields go through [`resolve_table`].
pub fn referenced_table(blueprint: &Blueprint, entity: &Entity, field: &Field) -> Option<String> {
    let by_relationship = blueprint.relationships.iter().find(|r| {
        r.foreign_key_holder() == Some(entity.name.as_str())
            && r.foreign_key().as_deref() == Some(field.name.as_str())
    });
    if let Some(rel) = by_relationship {
        if let Some(owner) = blueprint.entity(&rel.entity_a) {
            return Some(owner.table_name.clone());
        }
    }
    resolve_table(&field.name)
}

/// Entity of the blueprint a foreign-key field points at; `None` when the
/// table is external to the module
pub fn referenced_entity<'a>(
    blueprint: &'a Blueprint,
    entity: &Entity,
    field: &Field,
) -> Option<&'a Entity> {
    let table = referenced_table(blueprint, entity, field)?;
    blueprint.entity_by_table(&table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_ir::{FieldType, Relationship};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_static_keys() {
        assert_eq!(resolve_table("user_id").as_deref(), Some("users"));
        assert_eq!(resolve_table("batch_id").as_deref(), Some("product_batches"));
        assert_eq!(resolve_table("currency_id").as_deref(), Some("currencies"));
    }

    #[test]
    fn test_regex_fallback() {
        assert_eq!(resolve_table("parent_category_id").as_deref(), Some("parent_categories"));
        assert_eq!(resolve_table("stock_movement_id").as_deref(), Some("stock_movements"));
        assert_eq!(resolve_table("address_id").as_deref(), Some("addresses"));
        assert_eq!(resolve_table("bus_id").as_deref(), Some("buses"));
        assert_eq!(resolve_table("school_buses_id").as_deref(), Some("school_buses"));
    }

    #[test]
    fn test_non_foreign_keys() {
        assert_eq!(resolve_table("name"), None);
        assert_eq!(resolve_table("_id"), None);
        assert_eq!(resolve_table("Warehouse_id"), None);
    }

    #[test]
    fn test_relationship_key_wins() {
        let blueprint = Blueprint::new("Inventory")
            .with_entity(Entity::new("Depot").with_table_name("storage_depots"))
            .with_entity(
                Entity::new("Bin").with_field(Field::new("depot_id", FieldType::Integer)),
            )
            .with_relationship(Relationship::one_to_many("Depot", "Bin"));
        let bin = &blueprint.entities[1];
        let field = &bin.fields[0];

        assert_eq!(
            referenced_table(&blueprint, bin, field).as_deref(),
            Some("storage_depots")
        );
        assert_eq!(
            referenced_entity(&blueprint, bin, field).map(|e| e.name.as_str()),
            Some("Depot")
        );
    }

    #[test]
    fn test_external_table() {
        let blueprint = Blueprint::new("Sales").with_entity(
            Entity::new("Order").with_field(Field::new("user_id", FieldType::Integer)),
        );
        let order = &blueprint.entities[0];
        assert_eq!(
            referenced_table(&blueprint, order, &order.fields[0]).as_deref(),
            Some("users")
        );
        assert!(referenced_entity(&blueprint, order, &order.fields[0]).is_none());
    }
}
