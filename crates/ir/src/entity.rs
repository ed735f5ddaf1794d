//! Entity definitions for data models
//!
//! This module contains the `Entity` struct: one model of a generated
//! module, mapped to one database table.

use crate::computed::ComputedField;
use crate::field::Field;
use blueprint_core::naming;
use blueprint_core::{EngineError, EngineResult, Validatable};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ============================================================================
// Entity
// ============================================================================

/// Represents a data entity (maps to a database table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity name (PascalCase, e.g. "Warehouse", "ProductBatch")
    #[serde(default)]
    pub name: String,

    /// Database table name (snake_case plural, e.g. "product_batches")
    #[serde(
        rename = "tableName",
        alias = "table_name",
        alias = "table",
        default
    )]
    pub table_name: String,

    /// Fields (columns) in declaration order
    #[serde(default)]
    pub fields: Vec<Field>,

    /// Mass-assignable attributes; all fields when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fillable: Option<Vec<String>>,

    /// Read-only attributes derived from the columns
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub computed: Vec<ComputedField>,
}

impl Entity {
    /// Create a new entity with the given name and its default table name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let table_name = naming::table_name(&name);
        Self {
            name,
            table_name,
            fields: Vec::new(),
            fillable: None,
            computed: Vec::new(),
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set a custom table name
    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Add a field (builder)
    pub fn with_field(mut self, field: Field) -> Self {
        self.add_field(field);
        self
    }

    /// Add a computed attribute (builder)
    pub fn with_computed(mut self, name: impl Into<String>, expression: impl Into<String>) -> Self {
        self.computed.push(ComputedField::new(name, expression));
        self
    }

    /// Restrict the fillable list
    pub fn with_fillable<I, S>(mut self, fillable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fillable = Some(fillable.into_iter().map(Into::into).collect());
        self
    }

    /// Fill in the name and table name when they were left out of a config
    pub fn normalize(&mut self, key: &str) {
        if self.name.trim().is_empty() {
            self.name = key.to_string();
        }
        if self.table_name.trim().is_empty() {
            self.table_name = naming::table_name(&self.name);
        }
    }

    // ========================================================================
    // Field management
    // ========================================================================

    /// Add a field to the end of the field list
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Get a field by name
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check whether a field with this name exists
    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    /// Fields whose name ends in `_id`
    pub fn foreign_keys(&self) -> Vec<&Field> {
        self.fields.iter().filter(|f| f.is_foreign_key()).collect()
    }

    /// Effective fillable list
    pub fn fillable(&self) -> Vec<&str> {
        match &self.fillable {
            Some(list) => list.iter().map(String::as_str).collect(),
            None => self.fields.iter().map(|f| f.name.as_str()).collect(),
        }
    }

    /// `(field, cast)` pairs for fields that need an attribute cast
    pub fn casts(&self) -> Vec<(&str, &'static str)> {
        self.fields
            .iter()
            .filter_map(|f| f.field_type.model_cast().map(|c| (f.name.as_str(), c)))
            .collect()
    }

    // ========================================================================
    // Naming
    // ========================================================================

    /// snake_case name (e.g. "sales_order")
    pub fn snake_name(&self) -> String {
        naming::snake(&self.name)
    }

    /// camelCase name (e.g. "salesOrder")
    pub fn camel_name(&self) -> String {
        naming::camel(&self.name)
    }

    /// Plural StudlyCase name used for JSON:API directories (e.g. "SalesOrders")
    pub fn plural_studly(&self) -> String {
        naming::plural_studly(&self.name)
    }

    /// JSON:API resource type (e.g. "sales-orders")
    pub fn resource_type(&self) -> String {
        naming::resource_type(&self.name)
    }

    /// Foreign key column other tables use to reference this entity
    pub fn foreign_key(&self) -> String {
        naming::foreign_key_for(&self.name)
    }
}

impl Validatable for Entity {
    fn validate(&self) -> EngineResult<()> {
        // Entity name must not be empty
        if self.name.is_empty() {
            return Err(EngineError::entity_validation(
                &self.name,
                "Entity name cannot be empty",
            ));
        }

        // Entity name must be valid identifier
        if !naming::is_identifier(&self.name) {
            return Err(EngineError::entity_validation(
                &self.name,
                format!("Entity name '{}' is not a valid identifier", self.name),
            ));
        }

        // Entity name should be PascalCase
        if !self
            .name
            .chars()
            .next()
            .map(|c| c.is_ascii_uppercase())
            .unwrap_or(false)
        {
            return Err(EngineError::entity_validation(
                &self.name,
                "Entity name should start with an uppercase letter",
            ));
        }

        if !naming::is_identifier(&self.table_name) {
            return Err(EngineError::entity_validation(
                &self.name,
                format!("Table name '{}' is not a valid identifier", self.table_name),
            ));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            field.validate().map_err(|e| {
                EngineError::field_validation(&self.name, &field.name, e.to_string())
            })?;
            if !seen.insert(field.name.as_str()) {
                return Err(EngineError::DuplicateField {
                    entity: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        if let Some(fillable) = &self.fillable {
            for name in fillable {
                if !self.has_field(name) {
                    return Err(EngineError::FieldNotFound {
                        entity: self.name.clone(),
                        field: name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
