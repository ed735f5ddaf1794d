//! Field definitions for entity properties
//!
//! This module contains the `Field` struct describing one column of a
//! generated entity. The field type drives the migration column, the
//! request validation rule, the JSON:API schema field, the model cast and
//! the factory faker expression.

use blueprint_core::naming;
use blueprint_core::{EngineError, EngineResult, FieldType, Validatable};
use serde::{Deserialize, Serialize};

// ============================================================================
// Field
// ============================================================================

/// Represents a field within an entity (maps to a database column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name (snake_case)
    pub name: String,

    /// Primitive type
    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Whether the column accepts NULL
    #[serde(default)]
    pub nullable: bool,

    /// Whether the column carries a unique index
    #[serde(default)]
    pub unique: bool,
}

impl Field {
    /// Create a new non-null, non-unique field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            nullable: false,
            unique: false,
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Mark the field as nullable
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark the field as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    // ========================================================================
    // Utility methods
    // ========================================================================

    /// A field named `*_id` is a foreign key column
    pub fn is_foreign_key(&self) -> bool {
        self.name.ends_with("_id") && self.name.len() > 3
    }

    /// Name without the `_id` suffix (e.g. "warehouse_id" → "warehouse")
    pub fn foreign_key_stem(&self) -> Option<&str> {
        if self.is_foreign_key() {
            self.name.strip_suffix("_id")
        } else {
            None
        }
    }

    /// Full request validation rule (e.g. `required|string|max:255`)
    pub fn validation_rule(&self) -> String {
        let presence = if self.nullable { "nullable" } else { "required" };
        format!("{}|{}", presence, self.field_type.validation_rule())
    }

    /// Human label ("unit_cost" → "Unit Cost")
    pub fn display_label(&self) -> String {
        self.name
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Validatable for Field {
    fn validate(&self) -> EngineResult<()> {
        // Field name must not be empty
        if self.name.is_empty() {
            return Err(EngineError::validation("Field name cannot be empty"));
        }

        // Field name must be valid identifier
        if !naming::is_identifier(&self.name) {
            return Err(EngineError::validation(format!(
                "Field name '{}' is not a valid identifier",
                self.name
            )));
        }

        // Reserved by the generated migration
        if matches!(self.name.as_str(), "id" | "created_at" | "updated_at") {
            return Err(EngineError::validation(format!(
                "Field name '{}' is reserved",
                self.name
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_field_builder() {
        let field = Field::new("sku", FieldType::String).unique();
        assert!(field.unique);
        assert!(!field.nullable);

        let field = Field::new("notes", FieldType::Text).nullable();
        assert!(field.nullable);
    }

    #[test]
    fn test_foreign_key_detection() {
        let fk = Field::new("warehouse_id", FieldType::Integer);
        assert!(fk.is_foreign_key());
        assert_eq!(fk.foreign_key_stem(), Some("warehouse"));

        let plain = Field::new("name", FieldType::String);
        assert!(!plain.is_foreign_key());
        assert_eq!(plain.foreign_key_stem(), None);

        assert!(!Field::new("_id", FieldType::Integer).is_foreign_key());
    }

    #[test]
    fn test_validation_rule() {
        let field = Field::new("name", FieldType::String);
        assert_eq!(field.validation_rule(), "required|string|max:255");

        let field = Field::new("unit_cost", FieldType::Decimal).nullable();
        assert_eq!(field.validation_rule(), "nullable|numeric");
    }

    #[test]
    fn test_display_label() {
        assert_eq!(
            Field::new("unit_cost", FieldType::Decimal).display_label(),
            "Unit Cost"
        );
    }

    #[test]
    fn test_field_validation() {
        assert!(Field::new("code", FieldType::String).is_valid());
        assert!(!Field::new("", FieldType::String).is_valid());
        assert!(!Field::new("2fa", FieldType::String).is_valid());
        assert!(!Field::new("created_at", FieldType::DateTime).is_valid());
    }

    #[test]
    fn test_field_deserialize_defaults() {
        let field: Field = serde_json::from_str(r#"{"name": "code", "type": "string"}"#).unwrap();
        assert_eq!(field, Field::new("code", FieldType::String));

        let field: Field = serde_json::from_str(
            r#"{"name": "expires_on", "type": "date", "nullable": true, "unique": false}"#,
        )
        .unwrap();
        assert!(field.nullable);
        assert_eq!(field.field_type, FieldType::Date);
    }
}
