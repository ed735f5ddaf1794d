//! The root container of a module description
//!
//! A `Blueprint` holds the module name, its entities in declaration order,
//! the relationships between them and an optional permission block. In
//! JSON the entities are a map keyed by entity name; key order is kept.

use crate::entity::Entity;
use crate::permissions::PermissionConfig;
use crate::relationship::Relationship;
use blueprint_core::naming;
use blueprint_core::{EngineError, EngineResult};
use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================================================
// Blueprint
// ============================================================================

/// Module description consumed by the generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
    /// Module name (PascalCase, e.g. "Inventory")
    #[serde(default)]
    pub module: String,

    /// Entities in declaration order
    #[serde(default, with = "entity_map")]
    pub entities: Vec<Entity>,

    /// Relationships between entities
    #[serde(default)]
    pub relationships: Vec<Relationship>,

    /// Optional permission block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<PermissionConfig>,
}

impl Blueprint {
    /// Create an empty blueprint for a module
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            ..Self::default()
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }

    pub fn with_permissions(mut self, permissions: PermissionConfig) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Apply defaults left implicit by a config: PascalCase module name,
    /// entity table names, permission prefix and resources
    pub fn normalize(&mut self) {
        self.module = naming::pascal(&self.module);
        for entity in &mut self.entities {
            let key = entity.name.clone();
            entity.normalize(&key);
        }
        let prefix = self.module_snake();
        let tables: Vec<String> = self.entities.iter().map(|e| e.table_name.clone()).collect();
        if let Some(perms) = &mut self.permissions {
            if perms.prefix.trim().is_empty() {
                perms.prefix = prefix;
            }
            if perms.resources.is_empty() {
                perms.resources = tables;
            }
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Get an entity by name
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Get an entity by name or fail with `EntityNotFound`
    pub fn require_entity(&self, name: &str) -> EngineResult<&Entity> {
        self.entity(name)
            .ok_or_else(|| EngineError::EntityNotFound(name.to_string()))
    }

    /// Get an entity by its table name
    pub fn entity_by_table(&self, table: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.table_name == table)
    }

    /// Entity names in declaration order
    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }

    /// Relationships an entity takes part in
    pub fn relationships_for(&self, entity: &str) -> Vec<&Relationship> {
        self.relationships
            .iter()
            .filter(|r| r.involves(entity))
            .collect()
    }

    /// Many-to-many relationships
    pub fn pivot_relationships(&self) -> Vec<&Relationship> {
        self.relationships
            .iter()
            .filter(|r| r.is_many_to_many())
            .collect()
    }

    /// snake_case module name (e.g. "inventory")
    pub fn module_snake(&self) -> String {
        naming::snake(&self.module)
    }

    /// Whether the blueprint declares anything to generate
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

// ============================================================================
// Entity map (de)serialization
// ============================================================================

mod entity_map {
    use super::*;

    pub fn serialize<S: Serializer>(entities: &[Entity], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(entities.len()))?;
        for entity in entities {
            map.serialize_entry(&entity.name, entity)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Entity>, D::Error> {
        deserializer.deserialize_any(EntityMapVisitor)
    }

    struct EntityMapVisitor;

    impl<'de> Visitor<'de> for EntityMapVisitor {
        type Value = Vec<Entity>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of entity name to entity, or a list of entities")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut entities = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((key, mut entity)) = access.next_entry::<String, Entity>()? {
                entity.normalize(&key);
                entities.push(entity);
            }
            Ok(entities)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut entities = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(mut entity) = access.next_element::<Entity>()? {
                let key = entity.name.clone();
                entity.normalize(&key);
                entities.push(entity);
            }
            Ok(entities)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use blueprint_core::FieldType;
    use pretty_assertions::assert_eq;

    const CONFIG: &str = r#"{
        "module": "inventory",
        "entities": {
            "Warehouse": {"name": "Warehouse", "tableName": "warehouses", "fields": [{"name": "name", "type": "string"}]},
            "Location": {"fields": [{"name": "code", "type": "string", "unique": true}]},
            "Aisle": {"name": "Aisle", "fields": []}
        },
        "relationships": [
            {"entityA": "Warehouse", "entityB": "Location", "type": "one-to-many"}
        ],
        "permissions": {"roles": ["admin"]}
    }"#;

    #[test]
    fn test_entity_map_keeps_declaration_order() {
        let blueprint: Blueprint = serde_json::from_str(CONFIG).unwrap();
        assert_eq!(blueprint.entity_names(), vec!["Warehouse", "Location", "Aisle"]);
        assert_eq!(blueprint.entity("Location").unwrap().table_name, "locations");
    }

    #[test]
    fn test_normalize_fills_permission_defaults() {
        let mut blueprint: Blueprint = serde_json::from_str(CONFIG).unwrap();
        blueprint.normalize();
        assert_eq!(blueprint.module, "Inventory");
        let perms = blueprint.permissions.as_ref().unwrap();
        assert_eq!(perms.prefix, "inventory");
        assert_eq!(perms.resources, vec!["warehouses", "locations", "aisles"]);
    }

    #[test]
    fn test_entities_as_list() {
        let blueprint: Blueprint = serde_json::from_str(
            r#"{"entities": [{"name": "Unit", "fields": [{"name": "symbol", "type": "string"}]}]}"#,
        )
        .unwrap();
        assert_eq!(blueprint.entities[0].table_name, "units");
    }

    #[test]
    fn test_serialize_as_map() {
        let blueprint = Blueprint::new("Inventory")
            .with_entity(Entity::new("Warehouse").with_field(Field::new("name", FieldType::String)));
        let json = serde_json::to_value(&blueprint).unwrap();
        assert_eq!(json["entities"]["Warehouse"]["tableName"], "warehouses");
        let back: Blueprint = serde_json::from_value(json).unwrap();
        assert_eq!(back, blueprint);
    }

    #[test]
    fn test_lookups() {
        let blueprint: Blueprint = serde_json::from_str(CONFIG).unwrap();
        assert!(blueprint.require_entity("Warehouse").is_ok());
        assert!(matches!(
            blueprint.require_entity("Shelf"),
            Err(EngineError::EntityNotFound(_))
        ));
        assert_eq!(blueprint.entity_by_table("warehouses").unwrap().name, "Warehouse");
        assert_eq!(blueprint.relationships_for("Location").len(), 1);
        assert!(blueprint.relationships_for("Aisle").is_empty());
        assert!(blueprint.pivot_relationships().is_empty());
    }
}
