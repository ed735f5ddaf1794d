//! Shared fixtures for unit tests

use crate::GeneratorConfig;
use crate::context::GenerationContext;
use blueprint_core::{FieldType, ReferentialAction};
use blueprint_ir::{Blueprint, Entity, Field, PermissionConfig, Relationship, RoleGrants};
use chrono::{NaiveDate, NaiveDateTime};

pub fn fixed_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(10, 30, 0)
        .unwrap()
}

pub fn fixed_config() -> GeneratorConfig {
    GeneratorConfig::new().with_timestamp(fixed_timestamp())
}

/// Warehouse → Location (one-to-many, cascade), Product ↔ Tag (pivot),
/// Product's computed gross price, StockLevel referencing Product and
/// Location by field, permissions on warehouses and products.
pub fn inventory() -> Blueprint {
    Blueprint::new("Inventory")
        .with_entity(
            Entity::new("Warehouse")
                .with_field(Field::new("name", FieldType::String))
                .with_field(Field::new("code", FieldType::String).unique())
                .with_field(Field::new("capacity", FieldType::Decimal).nullable()),
        )
        .with_entity(
            Entity::new("Location")
                .with_field(Field::new("code", FieldType::String))
                .with_field(Field::new("aisle", FieldType::Integer).nullable()),
        )
        .with_entity(
            Entity::new("Product")
                .with_field(Field::new("name", FieldType::String))
                .with_field(Field::new("sku", FieldType::String).unique())
                .with_field(Field::new("price", FieldType::Decimal))
                .with_field(Field::new("active", FieldType::Boolean))
                .with_field(Field::new("attributes", FieldType::Json).nullable())
                .with_computed("gross_price", "price * 1.16"),
        )
        .with_entity(Entity::new("Tag").with_field(Field::new("name", FieldType::String)))
        .with_entity(
            Entity::new("StockLevel")
                .with_field(Field::new("quantity", FieldType::Integer))
                .with_field(Field::new("product_id", FieldType::Integer))
                .with_field(Field::new("location_id", FieldType::Integer)),
        )
        .with_relationship(
            Relationship::one_to_many("Warehouse", "Location").on_delete(ReferentialAction::Cascade),
        )
        .with_relationship(Relationship::many_to_many("Product", "Tag"))
        .with_permissions(
            PermissionConfig::new("inventory")
                .with_resource("warehouses")
                .with_resource("products")
                .with_roles(RoleGrants::All(vec!["admin".into()])),
        )
}

pub fn inventory_ctx() -> GenerationContext {
    GenerationContext::new(&inventory(), &fixed_config()).unwrap()
}

pub fn ctx_with(config: GeneratorConfig) -> GenerationContext {
    GenerationContext::new(&inventory(), &config.with_timestamp(fixed_timestamp())).unwrap()
}
