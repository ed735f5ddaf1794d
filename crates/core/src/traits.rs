//! Shared traits
//!
//! `Validatable` is implemented by the parts of a blueprint that can check
//! themselves in isolation (entities, fields, permission blocks). Checks
//! that need the whole blueprint live in the rule engine of `blueprint_ir`.

use crate::error::EngineResult;

/// Self-contained consistency check
pub trait Validatable {
    /// First problem found, if any
    fn validate(&self) -> EngineResult<()>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    struct Column(&'static str);

    impl Validatable for Column {
        fn validate(&self) -> EngineResult<()> {
            if crate::naming::is_identifier(self.0) {
                Ok(())
            } else {
                Err(EngineError::validation(format!("'{}' is not a column name", self.0)))
            }
        }
    }

    #[test]
    fn test_is_valid_follows_validate() {
        assert!(Column("unit_price").is_valid());
        assert!(!Column("unit price").is_valid());
    }
}
