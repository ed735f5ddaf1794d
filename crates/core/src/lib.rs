//! # Blueprint Core
//!
//! Core types, naming rules, traits and error handling for Module Blueprint.
//!
//! This crate provides the foundational building blocks used by the
//! parser, the code generator and the CLI:
//!
//! - **Types**: field types, relationship cardinalities, relation kinds
//! - **Naming**: case conversion, pluralization, table and pivot names
//! - **Traits**: `Validatable`
//! - **Errors**: unified error handling with `EngineError` and `EngineResult`
//!

pub mod error;
pub mod naming;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{EngineError, EngineResult, ResultExt};
pub use traits::Validatable;
pub use types::{Cardinality, FieldType, ReferentialAction, RelationKind};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
