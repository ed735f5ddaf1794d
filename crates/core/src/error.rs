//! Errors raised while parsing, generating and writing modules
//!
//! Every library crate returns [`EngineResult`]. Variants are grouped by
//! the stage that raises them; the `is_*` predicates let callers branch on
//! the group without matching every variant.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    // ── blueprint ──────────────────────────────────────────────────────
    /// Blueprint rejected by the validator (messages joined with `; `)
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Entity validation failed for '{entity}': {message}")]
    EntityValidation { entity: String, message: String },

    #[error("Field validation failed for '{entity}.{field}': {message}")]
    FieldValidation {
        entity: String,
        field: String,
        message: String,
    },

    #[error("Relationship validation failed: {0}")]
    RelationshipValidation(String),

    /// `name:type[:modifier]` entry that does not parse
    #[error("Invalid field specification '{spec}': {message}")]
    InvalidFieldSpec { spec: String, message: String },

    #[error("Duplicate field name: '{field}' already exists in entity '{entity}'")]
    DuplicateField { entity: String, field: String },

    /// Two relationships resolve to the same accessor on one entity
    #[error("Duplicate relationship between '{from}' and '{to}'")]
    DuplicateRelationship { from: String, to: String },

    /// Foreign keys form a cycle; the path repeats its first entity
    #[error("Dependency cycle between entities: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    // ── lookups ────────────────────────────────────────────────────────
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    #[error("Field '{field}' not found in entity '{entity}'")]
    FieldNotFound { entity: String, field: String },

    /// No module directory (or no snapshot) under the modules dir
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Stub not found: {0}")]
    StubNotFound(String),

    // ── generation ─────────────────────────────────────────────────────
    #[error("Code generation failed: {0}")]
    CodeGeneration(String),

    #[error("Template rendering failed for '{template}': {message}")]
    TemplateRender { template: String, message: String },

    /// Target exists and overwriting was not requested
    #[error("Output file already exists: {0}")]
    OutputExists(PathBuf),

    // ── filesystem ─────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    // ── configuration and serialization ────────────────────────────────
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Malformed blueprint config, settings file or host file
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── other ──────────────────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),

    /// Input ended during an interactive session
    #[error("Operation cancelled")]
    Cancelled,

    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl EngineError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        EngineError::Validation(msg.into())
    }

    /// Create an entity validation error
    pub fn entity_validation(entity: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::EntityValidation {
            entity: entity.into(),
            message: msg.into(),
        }
    }

    /// Create a field validation error
    pub fn field_validation(
        entity: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        EngineError::FieldValidation {
            entity: entity.into(),
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Create an inline field spec error
    pub fn field_spec(spec: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::InvalidFieldSpec {
            spec: spec.into(),
            message: msg.into(),
        }
    }

    /// Create a code generation error
    pub fn codegen(msg: impl Into<String>) -> Self {
        EngineError::CodeGeneration(msg.into())
    }

    /// Create a template rendering error
    pub fn template(template: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::TemplateRender {
            template: template.into(),
            message: msg.into(),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        EngineError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        EngineError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::Validation(_)
                | EngineError::EntityValidation { .. }
                | EngineError::FieldValidation { .. }
                | EngineError::RelationshipValidation(_)
                | EngineError::InvalidFieldSpec { .. }
        )
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            EngineError::EntityNotFound(_)
                | EngineError::FieldNotFound { .. }
                | EngineError::ModuleNotFound(_)
                | EngineError::StubNotFound(_)
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            EngineError::Io(_)
                | EngineError::FileRead { .. }
                | EngineError::FileWrite { .. }
                | EngineError::DirectoryCreate { .. }
        )
    }
}

/// Result type alias using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T>;
}

impl<T, E: Into<EngineError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> EngineResult<T> {
        self.map_err(|e| {
            let err: EngineError = e.into();
            EngineError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
