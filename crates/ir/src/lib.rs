//! # Blueprint IR (Intermediate Representation)
//!
//! This crate provides the intermediate representation of a module
//! blueprint: the normalized description the generator consumes, however
//! it was supplied (JSON config, inline field list or interactive prompts).
//!
//! ## Core Concepts
//!
//! - **Entity**: A model that maps to a database table (e.g., Warehouse, Location)
//! - **Field**: A column of an entity (e.g., code, capacity)
//! - **ComputedField**: A read-only attribute derived from numeric columns
//! - **Relationship**: A directionless pair plus cardinality (one-to-one, one-to-many, many-to-many)
//! - **PermissionConfig**: Permission names and role grants for the module
//! - **Blueprint**: The root container that holds all module data
//!

// Module declarations
pub mod blueprint;
pub mod computed;
pub mod entity;
pub mod field;
pub mod field_spec;
pub mod interactive;
pub mod permissions;
pub mod relationship;
pub mod serialization;
pub mod validation;

// Re-export commonly used types at crate root
pub use blueprint::Blueprint;
pub use computed::ComputedField;
pub use entity::Entity;
pub use field::Field;
pub use field_spec::{parse_field, parse_fields};
pub use interactive::{LinePrompter, Prompter, collect_blueprint};
pub use permissions::{DEFAULT_ACTIONS, PermissionConfig, RoleGrants};
pub use relationship::Relationship;
pub use serialization::{
    SNAPSHOT_FILE, load_config, load_snapshot, parse_config, save_snapshot, snapshot_from_str,
    snapshot_to_string,
};
pub use validation::{ValidationResult, ValidationRule, Validator, validate_blueprint};

// Re-export core types that are commonly used with IR
pub use blueprint_core::{
    Cardinality, EngineError, EngineResult, FieldType, ReferentialAction, RelationKind,
};

/// Current schema version for module snapshots
pub const SCHEMA_VERSION: u32 = 1;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Prelude Module
// ============================================================================

/// Convenient re-exports for common usage
pub mod prelude {
    pub use crate::{
        Blueprint,
        // Re-exported from core
        Cardinality,
        EngineError,
        EngineResult,
        // Core types
        Entity,
        Field,
        FieldType,
        PermissionConfig,
        ReferentialAction,
        RelationKind,
        Relationship,
        // Parsing
        load_config,
        parse_fields,
        validate_blueprint,
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version() {
        assert_eq!(SCHEMA_VERSION, 1);
    }

    #[test]
    fn test_prelude_builds_blueprint() {
        use crate::prelude::*;
        let blueprint = Blueprint::new("Sales")
            .with_entity(Entity::new("Customer").with_field(Field::new("name", FieldType::String)));
        assert!(validate_blueprint(&blueprint).valid);
    }
}
