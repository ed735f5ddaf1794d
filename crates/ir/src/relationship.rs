//! Relationship definitions between entities
//!
//! A `Relationship` is stored directionless as a pair plus a cardinality.
//! `entity_a` is the owning side; for one-to-one and one-to-many the
//! foreign key `snake(entity_a)_id` lives on `entity_b`. Many-to-many pairs
//! are carried by a pivot table instead.

use crate::field::Field;
use blueprint_core::naming;
use blueprint_core::{
    Cardinality, EngineError, EngineResult, FieldType, ReferentialAction, Validatable,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Relationship
// ============================================================================

/// Represents a relationship between two entities
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Owning side (e.g. "Warehouse" in Warehouse 1─* Location)
    #[serde(rename = "entityA", alias = "entity_a")]
    pub entity_a: String,

    /// Referenced side; holds the foreign key unless many-to-many
    #[serde(rename = "entityB", alias = "entity_b")]
    pub entity_b: String,

    /// Cardinality
    #[serde(rename = "type", alias = "cardinality")]
    pub cardinality: Cardinality,

    /// Referential action on delete of the owning row
    #[serde(rename = "onDelete", alias = "on_delete", default)]
    pub on_delete: ReferentialAction,
}

impl Relationship {
    /// Create a new relationship between two entities
    pub fn new(
        entity_a: impl Into<String>,
        entity_b: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            entity_a: entity_a.into(),
            entity_b: entity_b.into(),
            cardinality,
            on_delete: ReferentialAction::default(),
        }
    }

    /// Create a one-to-one relationship
    pub fn one_to_one(entity_a: impl Into<String>, entity_b: impl Into<String>) -> Self {
        Self::new(entity_a, entity_b, Cardinality::OneToOne)
    }

    /// Create a one-to-many relationship
    pub fn one_to_many(entity_a: impl Into<String>, entity_b: impl Into<String>) -> Self {
        Self::new(entity_a, entity_b, Cardinality::OneToMany)
    }

    /// Create a many-to-one relationship; stored as one-to-many with the pair swapped
    pub fn many_to_one(many: impl Into<String>, one: impl Into<String>) -> Self {
        Self::new(one, many, Cardinality::OneToMany)
    }

    /// Create a many-to-many relationship
    pub fn many_to_many(entity_a: impl Into<String>, entity_b: impl Into<String>) -> Self {
        Self::new(entity_a, entity_b, Cardinality::ManyToMany)
    }

    /// Set the on-delete action
    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    // ========================================================================
    // Query methods
    // ========================================================================

    /// Check if this is a many-to-many relationship
    pub fn is_many_to_many(&self) -> bool {
        self.cardinality.requires_pivot()
    }

    /// Check if both ends are the same entity
    pub fn is_self_referencing(&self) -> bool {
        self.entity_a == self.entity_b
    }

    /// Foreign key column name (None for many-to-many)
    pub fn foreign_key(&self) -> Option<String> {
        if self.is_many_to_many() {
            None
        } else {
            Some(naming::foreign_key_for(&self.entity_a))
        }
    }

    /// Entity whose table holds the foreign key (None for many-to-many)
    pub fn foreign_key_holder(&self) -> Option<&str> {
        if self.is_many_to_many() {
            None
        } else {
            Some(&self.entity_b)
        }
    }

    /// Pivot table name (only for many-to-many)
    pub fn pivot_table(&self) -> Option<String> {
        if self.is_many_to_many() {
            Some(naming::pivot_table(&self.entity_a, &self.entity_b))
        } else {
            None
        }
    }

    /// Column the foreign key migration adds to the holder's table
    pub fn foreign_key_field(&self) -> Option<Field> {
        self.foreign_key().map(|fk| {
            let field = Field::new(fk, FieldType::Integer);
            if self.on_delete == ReferentialAction::SetNull {
                field.nullable()
            } else {
                field
            }
        })
    }

    /// Check if an entity participates in this relationship
    pub fn involves(&self, entity: &str) -> bool {
        self.entity_a == entity || self.entity_b == entity
    }

    /// Unordered pair key used to detect duplicate relationships
    pub fn pair_key(&self) -> (String, String) {
        if self.entity_a <= self.entity_b {
            (self.entity_a.clone(), self.entity_b.clone())
        } else {
            (self.entity_b.clone(), self.entity_a.clone())
        }
    }

    /// Short label (e.g. "Warehouse 1─* Location")
    pub fn display_label(&self) -> String {
        let arrow = match self.cardinality {
            Cardinality::OneToOne => "1─1",
            Cardinality::OneToMany => "1─*",
            Cardinality::ManyToMany => "*─*",
        };
        format!("{} {} {}", self.entity_a, arrow, self.entity_b)
    }
}

impl Validatable for Relationship {
    fn validate(&self) -> EngineResult<()> {
        if self.entity_a.is_empty() || self.entity_b.is_empty() {
            return Err(EngineError::RelationshipValidation(
                "Relationship must name both entities".to_string(),
            ));
        }

        if self.is_many_to_many() && self.is_self_referencing() {
            return Err(EngineError::RelationshipValidation(format!(
                "Many-to-many relationship of '{}' with itself is not supported",
                self.entity_a
            )));
        }

        if self.is_many_to_many() && self.on_delete == ReferentialAction::SetNull {
            return Err(EngineError::RelationshipValidation(format!(
                "onDelete 'set-null' has no meaning for many-to-many ({})",
                self.display_label()
            )));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
