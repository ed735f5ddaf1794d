//! Core types used throughout Module Blueprint
//!
//! This module contains the primitive field types, relationship
//! cardinalities and ORM relation kinds that the IR and every artifact
//! emitter share. Each type knows how it maps onto the host framework:
//! migration column, validation rule, JSON:API schema field, model cast,
//! factory expression and OpenAPI type.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Field Types
// ============================================================================

/// Primitive field types supported by the blueprint config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Short string (VARCHAR 255)
    #[default]
    #[serde(alias = "str")]
    String,
    /// Long-form text
    #[serde(alias = "longtext")]
    Text,
    /// Integer
    #[serde(alias = "int", alias = "bigint")]
    Integer,
    /// Fixed-point decimal (15, 4)
    #[serde(alias = "float", alias = "double", alias = "number")]
    Decimal,
    /// Boolean flag
    #[serde(alias = "bool")]
    Boolean,
    /// Date without time
    Date,
    /// Date and time
    #[serde(alias = "dateTime", alias = "timestamp")]
    DateTime,
    /// JSON document
    #[serde(alias = "array")]
    Json,
}

impl FieldType {
    /// Schema builder method used in migrations (`$table->{method}(...)`)
    pub fn migration_method(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "dateTime",
            FieldType::Json => "json",
        }
    }

    /// Extra positional arguments after the column name
    pub fn migration_args(&self) -> &'static str {
        match self {
            FieldType::Decimal => ", 15, 4",
            _ => "",
        }
    }

    /// Type portion of a request validation rule
    pub fn validation_rule(&self) -> &'static str {
        match self {
            FieldType::String => "string|max:255",
            FieldType::Text => "string",
            FieldType::Integer => "integer",
            FieldType::Decimal => "numeric",
            FieldType::Boolean => "boolean",
            FieldType::Date | FieldType::DateTime => "date",
            FieldType::Json => "array",
        }
    }

    /// JSON:API schema field class
    pub fn schema_field(&self) -> &'static str {
        match self {
            FieldType::String | FieldType::Text => "Str",
            FieldType::Integer | FieldType::Decimal => "Number",
            FieldType::Boolean => "Boolean",
            FieldType::Date | FieldType::DateTime => "DateTime",
            FieldType::Json => "ArrayHash",
        }
    }

    /// Eloquent attribute cast, if the type needs one
    pub fn model_cast(&self) -> Option<&'static str> {
        match self {
            FieldType::String | FieldType::Text => None,
            FieldType::Integer => Some("integer"),
            FieldType::Decimal => Some("decimal:4"),
            FieldType::Boolean => Some("boolean"),
            FieldType::Date => Some("date"),
            FieldType::DateTime => Some("datetime"),
            FieldType::Json => Some("array"),
        }
    }

    /// Faker expression used by factories
    pub fn faker(&self, unique: bool) -> String {
        let generator = match self {
            FieldType::String => "words(3, true)",
            FieldType::Text => "paragraph()",
            FieldType::Integer => "numberBetween(1, 1000)",
            FieldType::Decimal => "randomFloat(4, 1, 10000)",
            FieldType::Boolean => "boolean()",
            FieldType::Date => "date()",
            FieldType::DateTime => "dateTime()",
            FieldType::Json => return "[]".to_string(),
        };
        if unique {
            format!("fake()->unique()->{}", generator)
        } else {
            format!("fake()->{}", generator)
        }
    }

    /// PHP literal used as a sample value in generated tests
    pub fn sample_literal(&self) -> &'static str {
        match self {
            FieldType::String => "'Sample value'",
            FieldType::Text => "'Sample description text'",
            FieldType::Integer => "42",
            FieldType::Decimal => "25.5",
            FieldType::Boolean => "true",
            FieldType::Date => "'2024-01-15'",
            FieldType::DateTime => "'2024-01-15T10:00:00.000000Z'",
            FieldType::Json => "['key' => 'value']",
        }
    }

    /// OpenAPI `(type, format)` pair
    pub fn openapi_type(&self) -> (&'static str, Option<&'static str>) {
        match self {
            FieldType::String | FieldType::Text => ("string", None),
            FieldType::Integer => ("integer", None),
            FieldType::Decimal => ("number", Some("decimal")),
            FieldType::Boolean => ("boolean", None),
            FieldType::Date => ("string", Some("date")),
            FieldType::DateTime => ("string", Some("date-time")),
            FieldType::Json => ("object", None),
        }
    }

    /// Canonical config name
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Text => "text",
            FieldType::Integer => "integer",
            FieldType::Decimal => "decimal",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Json => "json",
        }
    }

    /// Get all field types
    pub fn all() -> &'static [FieldType] {
        &[
            FieldType::String,
            FieldType::Text,
            FieldType::Integer,
            FieldType::Decimal,
            FieldType::Boolean,
            FieldType::Date,
            FieldType::DateTime,
            FieldType::Json,
        ]
    }
}

impl FromStr for FieldType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" => Ok(FieldType::String),
            "text" | "longtext" => Ok(FieldType::Text),
            "integer" | "int" | "bigint" => Ok(FieldType::Integer),
            "decimal" | "float" | "double" | "number" => Ok(FieldType::Decimal),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            "date" => Ok(FieldType::Date),
            "datetime" | "timestamp" => Ok(FieldType::DateTime),
            "json" | "array" => Ok(FieldType::Json),
            other => Err(EngineError::validation(format!(
                "Unknown field type '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Cardinality
// ============================================================================

/// Relationship cardinality between two entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Cardinality {
    /// One record relates to exactly one other record
    #[serde(rename = "one-to-one", alias = "oneToOne", alias = "one_to_one")]
    OneToOne,
    /// One record relates to many others (e.g. Warehouse has many Locations)
    #[default]
    #[serde(rename = "one-to-many", alias = "oneToMany", alias = "one_to_many")]
    OneToMany,
    /// Many-to-many through a pivot table
    #[serde(rename = "many-to-many", alias = "manyToMany", alias = "many_to_many")]
    ManyToMany,
}

impl Cardinality {
    /// Config name
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::OneToOne => "one-to-one",
            Cardinality::OneToMany => "one-to-many",
            Cardinality::ManyToMany => "many-to-many",
        }
    }

    /// Whether a pivot table carries this relationship
    pub fn requires_pivot(&self) -> bool {
        matches!(self, Cardinality::ManyToMany)
    }
}

impl FromStr for Cardinality {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "onetoone" | "11" => Ok(Cardinality::OneToOne),
            "onetomany" | "1n" => Ok(Cardinality::OneToMany),
            "manytomany" | "nn" | "mn" => Ok(Cardinality::ManyToMany),
            _ => Err(EngineError::RelationshipValidation(format!(
                "Unknown relationship type '{}'",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Relation Kinds
// ============================================================================

/// Eloquent relation kind produced for one side of a relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    HasOne,
    HasMany,
    BelongsTo,
    BelongsToMany,
}

impl RelationKind {
    /// Builder method on the model (`$this->hasMany(...)`)
    pub fn eloquent_method(&self) -> &'static str {
        match self {
            RelationKind::HasOne => "hasOne",
            RelationKind::HasMany => "hasMany",
            RelationKind::BelongsTo => "belongsTo",
            RelationKind::BelongsToMany => "belongsToMany",
        }
    }

    /// Relation class name, shared by Eloquent return types and JSON:API
    /// schema relation fields
    pub fn class_name(&self) -> &'static str {
        match self {
            RelationKind::HasOne => "HasOne",
            RelationKind::HasMany => "HasMany",
            RelationKind::BelongsTo => "BelongsTo",
            RelationKind::BelongsToMany => "BelongsToMany",
        }
    }

    /// Whether the relation yields a collection
    pub fn is_to_many(&self) -> bool {
        matches!(self, RelationKind::HasMany | RelationKind::BelongsToMany)
    }
}

impl std::fmt::Display for RelationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.eloquent_method())
    }
}

// ============================================================================
// Referential Actions
// ============================================================================

/// Actions for foreign key constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReferentialAction {
    /// Delete related records when parent is deleted
    Cascade,
    /// Prevent deletion if related records exist
    #[default]
    Restrict,
    /// Set foreign key to NULL when parent is deleted
    #[serde(alias = "set_null", alias = "setNull", alias = "null")]
    SetNull,
    /// Do nothing (database default)
    #[serde(alias = "no_action", alias = "noAction")]
    NoAction,
}

impl ReferentialAction {
    /// Foreign key definition modifier for the schema builder
    pub fn migration_modifier(&self) -> Option<&'static str> {
        match self {
            ReferentialAction::Cascade => Some("cascadeOnDelete()"),
            ReferentialAction::Restrict => Some("restrictOnDelete()"),
            ReferentialAction::SetNull => Some("nullOnDelete()"),
            ReferentialAction::NoAction => None,
        }
    }
}

impl std::fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReferentialAction::Cascade => "cascade",
            ReferentialAction::Restrict => "restrict",
            ReferentialAction::SetNull => "set-null",
            ReferentialAction::NoAction => "no-action",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// Tests
// ============================================================================
