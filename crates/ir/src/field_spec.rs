//! Inline field list parser
//!
//! Parses the `<fields>` argument of `module:blueprint`:
//!
//! ```text
//! name:string,code:string:unique,capacity:decimal:nullable
//! ```
//!
//! Each entry is `name:type` followed by any of the `nullable` / `unique`
//! modifiers in any order. A missing type defaults to `string`.

use crate::field::Field;
use blueprint_core::naming;
use blueprint_core::{EngineError, EngineResult, FieldType};
use std::collections::HashSet;

/// Parse one `name:type[:modifier...]` entry
pub fn parse_field(entry: &str) -> EngineResult<Field> {
    let mut parts = entry.split(':').map(str::trim);

    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err(EngineError::field_spec(entry, "missing field name"));
    }
    if !naming::is_identifier(name) {
        return Err(EngineError::field_spec(
            entry,
            format!("'{}' is not a valid column name", name),
        ));
    }

    let field_type = match parts.next() {
        None | Some("") => FieldType::String,
        Some(t) => t
            .parse::<FieldType>()
            .map_err(|_| EngineError::field_spec(entry, format!("unknown type '{}'", t)))?,
    };

    let mut field = Field::new(name, field_type);
    for modifier in parts {
        match modifier.to_ascii_lowercase().as_str() {
            "nullable" | "null" => field.nullable = true,
            "unique" => field.unique = true,
            other => {
                return Err(EngineError::field_spec(
                    entry,
                    format!("unknown modifier '{}'", other),
                ));
            }
        }
    }
    Ok(field)
}

/// Parse a comma-separated field list
pub fn parse_fields(spec: &str) -> EngineResult<Vec<Field>> {
    let entries: Vec<&str> = spec
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect();

    if entries.is_empty() {
        return Err(EngineError::field_spec(spec, "no fields given"));
    }

    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(entries.len());
    for entry in entries {
        let field = parse_field(entry)?;
        if !seen.insert(field.name.clone()) {
            return Err(EngineError::field_spec(
                spec,
                format!("field '{}' is listed twice", field.name),
            ));
        }
        fields.push(field);
    }
    Ok(fields)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_list() {
        let fields = parse_fields("name:string,code:string:unique,capacity:decimal:nullable").unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[1], Field::new("code", FieldType::String).unique());
        assert_eq!(fields[2], Field::new("capacity", FieldType::Decimal).nullable());
    }

    #[test]
    fn test_modifiers_in_any_order() {
        let field = parse_field("sku:string:unique:nullable").unwrap();
        assert!(field.unique && field.nullable);
        let field = parse_field("sku:string:nullable:unique").unwrap();
        assert!(field.unique && field.nullable);
    }

    #[test]
    fn test_missing_type_defaults_to_string() {
        assert_eq!(parse_field("label").unwrap().field_type, FieldType::String);
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let fields = parse_fields(" name : string , active:boolean ,").unwrap();
        assert_eq!(fields[0].name, "name");
        assert_eq!(fields[1].field_type, FieldType::Boolean);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_fields(""),
            Err(EngineError::InvalidFieldSpec { .. })
        ));
        assert!(parse_field("price:money").is_err());
        assert!(parse_field("price:decimal:indexed").is_err());
        assert!(parse_field(":string").is_err());
        assert!(parse_field("unit-cost:decimal").is_err());
        assert!(parse_fields("name:string,name:text").is_err());
    }
}
