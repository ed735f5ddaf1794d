//! Validation rules and utilities for blueprints
//!
//! This module provides rule-based validation of a parsed `Blueprint`:
//! module and entity names, fields, relationships and permissions. Every
//! rule reports all the problems it finds instead of stopping at the first.

use crate::Blueprint;
use blueprint_core::naming;
use blueprint_core::{EngineError, EngineResult, FieldType, ReferentialAction, Validatable};
use std::collections::{HashMap, HashSet};

// ============================================================================
// ValidationResult
// ============================================================================

/// Result of a validation operation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub valid: bool,

    /// List of errors (empty if valid)
    pub errors: Vec<ValidationError>,

    /// List of warnings (non-fatal issues)
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Create a failed validation result with an error
    pub fn error(error: ValidationError) -> Self {
        Self {
            valid: false,
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, error: ValidationError) {
        self.valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the result
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Check whether an error with this code was reported
    pub fn has_error_code(&self, code: ValidationErrorCode) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Convert to EngineResult (fails if any errors)
    pub fn to_result(self) -> EngineResult<()> {
        if self.valid {
            Ok(())
        } else {
            let msg = self
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            Err(EngineError::validation(msg))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

// ============================================================================
// ValidationError
// ============================================================================

/// A validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Error code for programmatic handling
    pub code: ValidationErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Path to the problematic element (e.g., "entities.Warehouse.fields.code")
    pub path: Option<String>,

    /// Suggested fix
    pub suggestion: Option<String>,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
            suggestion: None,
        }
    }

    /// Add a path to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add a suggestion to the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] {}", path, self.message)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

// ============================================================================
// ValidationErrorCode
// ============================================================================

/// Error codes for validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCode {
    // Module errors
    EmptyModuleName,
    InvalidModuleName,

    // Entity errors
    EmptyEntityName,
    InvalidEntityName,
    DuplicateEntityName,
    DuplicateTableName,
    InvalidTableName,

    // Field errors
    EmptyFieldName,
    InvalidFieldName,
    ReservedFieldName,
    DuplicateFieldName,
    UnknownFillable,
    NotNullableSetNull,
    InvalidComputedField,

    // Relationship errors
    InvalidRelationship,
    OrphanRelationship,
    DuplicateRelationship,

    // Permission errors
    InvalidPermissions,

    // Generic
    Custom,
}

// ============================================================================
// ValidationWarning
// ============================================================================

/// A validation warning (non-fatal issue)
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Warning code
    pub code: ValidationWarningCode,

    /// Human-readable warning message
    pub message: String,

    /// Path to the element
    pub path: Option<String>,
}

impl ValidationWarning {
    /// Create a new warning
    pub fn new(code: ValidationWarningCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    /// Add a path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "[{}] Warning: {}", path, self.message)
        } else {
            write!(f, "Warning: {}", self.message)
        }
    }
}

// ============================================================================
// ValidationWarningCode
// ============================================================================

/// Warning codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationWarningCode {
    NoFields,
    NoRelationships,
    ExternalForeignKey,
    ForeignKeyNotInteger,
    UnknownPermissionResource,
    Custom,
}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// Trait for validation rules
pub trait ValidationRule {
    /// Get the rule name
    fn name(&self) -> &'static str;

    /// Get the rule description
    fn description(&self) -> &'static str;

    /// Validate a blueprint and return the result
    fn validate(&self, blueprint: &Blueprint) -> ValidationResult;
}

// ============================================================================
// Validator
// ============================================================================

/// Blueprint validator that runs multiple validation rules
#[derive(Default)]
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a new validator
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a validator with default rules
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.add_rule(Box::new(ModuleNameRule));
        validator.add_rule(Box::new(EntityNamesRule));
        validator.add_rule(Box::new(EntityFieldsRule));
        validator.add_rule(Box::new(RelationshipsRule));
        validator.add_rule(Box::new(ForeignKeysRule));
        validator.add_rule(Box::new(ComputedFieldsRule));
        validator.add_rule(Box::new(PermissionsRule));
        validator
    }

    /// Add a validation rule
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Validate a blueprint with all rules
    pub fn validate(&self, blueprint: &Blueprint) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for rule in &self.rules {
            let rule_result = rule.validate(blueprint);
            result.merge(rule_result);
        }

        result
    }

    /// Validate and return Result
    pub fn validate_result(&self, blueprint: &Blueprint) -> EngineResult<()> {
        self.validate(blueprint).to_result()
    }
}

/// Validate a blueprint with the default rules
pub fn validate_blueprint(blueprint: &Blueprint) -> ValidationResult {
    Validator::with_default_rules().validate(blueprint)
}

// ============================================================================
// Built-in Validation Rules
// ============================================================================

/// Rule: Validate the module name
pub struct ModuleNameRule;

impl ValidationRule for ModuleNameRule {
    fn name(&self) -> &'static str {
        "module_name"
    }

    fn description(&self) -> &'static str {
        "Validates that the module name is a valid StudlyCase identifier"
    }

    fn validate(&self, blueprint: &Blueprint) -> ValidationResult {
        if blueprint.module.trim().is_empty() {
            return ValidationResult::error(
                ValidationError::new(ValidationErrorCode::EmptyModuleName, "Module name cannot be empty")
                    .with_path("module"),
            );
        }
        if !naming::is_identifier(&blueprint.module) {
            return ValidationResult::error(
                ValidationError::new(
                    ValidationErrorCode::InvalidModuleName,
                    format!("Module name '{}' is not a valid identifier", blueprint.module),
                )
                .with_path("module")
                .with_suggestion("Use StudlyCase with only letters and numbers"),
            );
        }
        ValidationResult::ok()
    }
}

/// Rule: Validate entity names
pub struct EntityNamesRule;

impl ValidationRule for EntityNamesRule {
    fn name(&self) -> &'static str {
        "entity_names"
    }

    fn description(&self) -> &'static str {
        "Validates that entity and table names are valid and unique"
    }

    fn validate(&self, blueprint: &Blueprint) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut seen_names: HashSet<String> = HashSet::new();
        let mut seen_tables: HashSet<&str> = HashSet::new();

        for (index, entity) in blueprint.entities.iter().enumerate() {
            if entity.name.is_empty() {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::EmptyEntityName,
                        "Entity name cannot be empty",
                    )
                    .with_path(format!("entities.{}", index)),
                );
                continue;
            }

            let entity_path = format!("entities.{}", entity.name);

            let pascal = entity
                .name
                .chars()
                .next()
                .map(|c| c.is_ascii_uppercase())
                .unwrap_or(false);
            if !naming::is_identifier(&entity.name) || !pascal {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::InvalidEntityName,
                        format!("Entity name '{}' is not a valid identifier", entity.name),
                    )
                    .with_path(&entity_path)
                    .with_suggestion(format!(
                        "Use StudlyCase with only letters and numbers, e.g. '{}'",
                        naming::pascal(&entity.name)
                    )),
                );
            }

            let lower_name = entity.name.to_lowercase();
            if seen_names.contains(&lower_name) {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::DuplicateEntityName,
                        format!("Duplicate entity name: '{}'", entity.name),
                    )
                    .with_path(&entity_path),
                );
            }
            seen_names.insert(lower_name);

            if !naming::is_identifier(&entity.table_name) {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::InvalidTableName,
                        format!("Table name '{}' is not a valid identifier", entity.table_name),
                    )
                    .with_path(format!("{}.tableName", entity_path)),
                );
            } else if !seen_tables.insert(entity.table_name.as_str()) {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::DuplicateTableName,
                        format!("Table '{}' is used by more than one entity", entity.table_name),
                    )
                    .with_path(format!("{}.tableName", entity_path)),
                );
            }
        }

        result
    }
}

/// Rule: Validate entity fields
pub struct EntityFieldsRule;

impl ValidationRule for EntityFieldsRule {
    fn name(&self) -> &'static str {
        "entity_fields"
    }

    fn description(&self) -> &'static str {
        "Validates field names and fillable lists"
    }

    fn validate(&self, blueprint: &Blueprint) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for entity in &blueprint.entities {
            let entity_path = format!("entities.{}", entity.name);

            if entity.fields.is_empty() {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::NoFields,
                        format!("Entity '{}' has no fields", entity.name),
                    )
                    .with_path(&entity_path),
                );
            }

            let mut seen_fields: HashSet<String> = HashSet::new();
            for field in &entity.fields {
                let field_path = format!("{}.fields.{}", entity_path, field.name);

                if field.name.is_empty() {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::EmptyFieldName,
                            "Field name cannot be empty",
                        )
                        .with_path(&field_path),
                    );
                    continue;
                }

                if !naming::is_identifier(&field.name) {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::InvalidFieldName,
                            format!("Field name '{}' is not a valid identifier", field.name),
                        )
                        .with_path(&field_path)
                        .with_suggestion(format!("Use snake_case, e.g. '{}'", naming::snake(&field.name))),
                    );
                } else if !field.is_valid() {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::ReservedFieldName,
                            format!(
                                "Field name '{}' is reserved; the migration adds it automatically",
                                field.name
                            ),
                        )
                        .with_path(&field_path),
                    );
                }

                let lower_name = field.name.to_lowercase();
                if seen_fields.contains(&lower_name) {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::DuplicateFieldName,
                            format!("Duplicate field name: '{}'", field.name),
                        )
                        .with_path(&field_path),
                    );
                }
                seen_fields.insert(lower_name);
            }

            if let Some(fillable) = &entity.fillable {
                for name in fillable.iter().filter(|n| !entity.has_field(n)) {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::UnknownFillable,
                            format!(
                                "Fillable attribute '{}' is not a field of '{}'",
                                name, entity.name
                            ),
                        )
                        .with_path(format!("{}.fillable", entity_path)),
                    );
                }
            }
        }

        result
    }
}

/// Rule: Validate relationships
pub struct RelationshipsRule;

impl ValidationRule for RelationshipsRule {
    fn name(&self) -> &'static str {
        "relationships"
    }

    fn description(&self) -> &'static str {
        "Validates that relationships reference existing entities and are not repeated"
    }

    fn validate(&self, blueprint: &Blueprint) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let mut seen_pairs: HashMap<(String, String), usize> = HashMap::new();

        for (index, relationship) in blueprint.relationships.iter().enumerate() {
            let rel_path = format!("relationships.{}", index);

            for side in [&relationship.entity_a, &relationship.entity_b] {
                if blueprint.entity(side).is_none() {
                    result.add_error(
                        ValidationError::new(
                            ValidationErrorCode::OrphanRelationship,
                            format!(
                                "Relationship '{}' references non-existent entity '{}'",
                                relationship.display_label(),
                                side
                            ),
                        )
                        .with_path(&rel_path),
                    );
                }
            }

            if let Err(e) = relationship.validate() {
                result.add_error(
                    ValidationError::new(ValidationErrorCode::InvalidRelationship, e.to_string())
                        .with_path(&rel_path),
                );
            }

            if let Some(first) = seen_pairs.get(&relationship.pair_key()) {
                result.add_error(
                    ValidationError::new(
                        ValidationErrorCode::DuplicateRelationship,
                        format!(
                            "Relationship between '{}' and '{}' is declared more than once",
                            relationship.entity_a, relationship.entity_b
                        ),
                    )
                    .with_path(&rel_path)
                    .with_suggestion(format!("Remove either this entry or relationships.{}", first)),
                );
            } else {
                seen_pairs.insert(relationship.pair_key(), index);
            }
        }

        if blueprint.relationships.is_empty() && blueprint.entities.len() > 1 {
            result.add_warning(ValidationWarning::new(
                ValidationWarningCode::NoRelationships,
                "Module has multiple entities but no relationships defined",
            ));
        }

        result
    }
}

/// Rule: Check declared `_id` fields
pub struct ForeignKeysRule;

impl ValidationRule for ForeignKeysRule {
    fn name(&self) -> &'static str {
        "foreign_keys"
    }

    fn description(&self) -> &'static str {
        "Reports foreign key fields that point outside the module, have a non-integer type or cannot hold null on delete"
    }

    fn validate(&self, blueprint: &Blueprint) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for entity in &blueprint.entities {
            for field in entity.foreign_keys() {
                let field_path = format!("entities.{}.fields.{}", entity.name, field.name);

                if field.field_type != FieldType::Integer {
                    result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::ForeignKeyNotInteger,
                            format!(
                                "Foreign key '{}' is declared as {}; the migration uses foreignId",
                                field.name, field.field_type
                            ),
                        )
                        .with_path(&field_path),
                    );
                }

                let linked = blueprint.relationships.iter().find(|r| {
                    r.foreign_key_holder() == Some(entity.name.as_str())
                        && r.foreign_key().as_deref() == Some(field.name.as_str())
                });
                if let Some(rel) = linked {
                    if rel.on_delete == ReferentialAction::SetNull && !field.nullable {
                        result.add_error(
                            ValidationError::new(
                                ValidationErrorCode::NotNullableSetNull,
                                format!(
                                    "Foreign key '{}' is set to null when its {} is deleted but is not nullable",
                                    field.name, rel.entity_a
                                ),
                            )
                            .with_path(&field_path)
                            .with_suggestion(format!("Declare it as '{}:integer:nullable'", field.name)),
                        );
                    }
                    continue;
                }

                let stem = field.foreign_key_stem().unwrap_or_default();
                let table = naming::table_name(stem);
                if blueprint.entity_by_table(&table).is_none() {
                    result.add_warning(
                        ValidationWarning::new(
                            ValidationWarningCode::ExternalForeignKey,
                            format!(
                                "Foreign key '{}' references '{}', which is not part of module '{}'",
                                field.name, table, blueprint.module
                            ),
                        )
                        .with_path(&field_path),
                    );
                }
            }
        }

        result
    }
}

/// Rule: Validate computed attributes
pub struct ComputedFieldsRule;

impl ValidationRule for ComputedFieldsRule {
    fn name(&self) -> &'static str {
        "computed_fields"
    }

    fn description(&self) -> &'static str {
        "Validates computed attribute names and that their expressions only read numeric columns"
    }

    fn validate(&self, blueprint: &Blueprint) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for entity in &blueprint.entities {
            let mut seen: HashSet<&str> = HashSet::new();
            for computed in &entity.computed {
                let path = format!("entities.{}.computed.{}", entity.name, computed.name);
                let invalid = |message: String| {
                    ValidationError::new(ValidationErrorCode::InvalidComputedField, message)
                        .with_path(&path)
                };

                if !naming::is_identifier(&computed.name) {
                    result.add_error(
                        invalid(format!(
                            "Computed attribute name '{}' is not a valid identifier",
                            computed.name
                        ))
                        .with_suggestion(format!("Use snake_case, e.g. '{}'", naming::snake(&computed.name))),
                    );
                } else if entity.has_field(&computed.name) || !seen.insert(computed.name.as_str()) {
                    result.add_error(invalid(format!(
                        "Computed attribute '{}' clashes with another attribute of '{}'",
                        computed.name, entity.name
                    )));
                }

                let columns = match computed.columns() {
                    Ok(columns) => columns,
                    Err(err) => {
                        result.add_error(invalid(err.to_string()));
                        continue;
                    }
                };
                for column in columns {
                    match entity.get_field(&column) {
                        Some(field)
                            if matches!(field.field_type, FieldType::Integer | FieldType::Decimal) => {}
                        Some(field) => result.add_error(invalid(format!(
                            "Computed attribute '{}' reads '{}', which is {} rather than numeric",
                            computed.name, column, field.field_type
                        ))),
                        None => result.add_error(invalid(format!(
                            "Computed attribute '{}' reads unknown column '{}'",
                            computed.name, column
                        ))),
                    }
                }
            }
        }

        result
    }
}

/// Rule: Validate the permission block
pub struct PermissionsRule;

impl ValidationRule for PermissionsRule {
    fn name(&self) -> &'static str {
        "permissions"
    }

    fn description(&self) -> &'static str {
        "Validates permission prefix, actions and role grants"
    }

    fn validate(&self, blueprint: &Blueprint) -> ValidationResult {
        let mut result = ValidationResult::ok();
        let Some(perms) = &blueprint.permissions else {
            return result;
        };

        if let Err(e) = perms.validate() {
            result.add_error(
                ValidationError::new(ValidationErrorCode::InvalidPermissions, e.to_string())
                    .with_path("permissions"),
            );
        }

        for resource in &perms.resources {
            if blueprint.entity_by_table(resource).is_none() {
                result.add_warning(
                    ValidationWarning::new(
                        ValidationWarningCode::UnknownPermissionResource,
                        format!("Permission resource '{}' matches no entity table", resource),
                    )
                    .with_path("permissions.resources"),
                );
            }
        }

        result
    }
}

// ============================================================================
// Tests
// ============================================================================
