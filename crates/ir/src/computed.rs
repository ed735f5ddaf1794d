//! Computed attributes
//!
//! A computed attribute is a read-only value derived from numeric columns of
//! the same entity, e.g. `available_quantity = quantity - reserved_quantity`.
//! Expressions are plain arithmetic: column names, numeric literals,
//! `+ - * /` and parentheses.

use blueprint_core::naming;
use blueprint_core::{EngineError, EngineResult, FieldType};
use serde::{Deserialize, Serialize};

use crate::Entity;

/// A read-only attribute computed from other columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedField {
    /// Attribute name (snake_case, e.g. "total_value")
    pub name: String,

    /// Arithmetic over column names (e.g. "current_quantity * unit_cost")
    pub expression: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Column(String),
    Number(String),
    Operator(char),
    Open,
    Close,
}

impl ComputedField {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }

    /// camelCase JSON:API attribute name
    pub fn attribute(&self) -> String {
        naming::camel(&self.name)
    }

    /// Columns the expression reads, in order of first use
    pub fn columns(&self) -> EngineResult<Vec<String>> {
        let mut columns: Vec<String> = Vec::new();
        for token in self.tokens()? {
            if let Token::Column(name) = token {
                if !columns.contains(&name) {
                    columns.push(name);
                }
            }
        }
        Ok(columns)
    }

    /// PHP expression reading the columns from `subject` (e.g. `$this`)
    pub fn to_php(&self, subject: &str) -> EngineResult<String> {
        let parts: Vec<String> = self
            .tokens()?
            .into_iter()
            .map(|token| match token {
                Token::Column(name) => format!("{}->{}", subject, name),
                Token::Number(n) => n,
                Token::Operator(op) => op.to_string(),
                Token::Open => "(".to_string(),
                Token::Close => ")".to_string(),
            })
            .collect();

        let mut php = String::new();
        for (i, part) in parts.iter().enumerate() {
            let glued = part == ")" || (i > 0 && parts[i - 1] == "(");
            if i > 0 && !glued {
                php.push(' ');
            }
            php.push_str(part);
        }
        Ok(php)
    }

    /// Integer when every operand is an integer column or literal and no
    /// division is involved, decimal otherwise
    pub fn result_type(&self, entity: &Entity) -> EngineResult<FieldType> {
        for token in self.tokens()? {
            let decimal = match &token {
                Token::Operator('/') => true,
                Token::Number(n) => n.contains('.'),
                Token::Column(name) => entity
                    .get_field(name)
                    .is_some_and(|f| f.field_type != FieldType::Integer),
                _ => false,
            };
            if decimal {
                return Ok(FieldType::Decimal);
            }
        }
        Ok(FieldType::Integer)
    }

    fn error(&self, message: impl Into<String>) -> EngineError {
        EngineError::validation(format!(
            "Computed attribute '{}' ({}): {}",
            self.name,
            self.expression,
            message.into()
        ))
    }

    fn tokens(&self) -> EngineResult<Vec<Token>> {
        let tokens = self.scan()?;
        self.check_grammar(&tokens)?;
        Ok(tokens)
    }

    fn scan(&self) -> EngineResult<Vec<Token>> {
        let mut tokens = Vec::new();
        let mut chars = self.expression.chars().peekable();

        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
            } else if c.is_ascii_alphabetic() || c == '_' {
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        name.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Column(name));
            } else if c.is_ascii_digit() {
                let mut number = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        number.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if number.matches('.').count() > 1 || number.ends_with('.') {
                    return Err(self.error(format!("'{}' is not a number", number)));
                }
                tokens.push(Token::Number(number));
            } else {
                chars.next();
                tokens.push(match c {
                    '+' | '-' | '*' | '/' => Token::Operator(c),
                    '(' => Token::Open,
                    ')' => Token::Close,
                    other => return Err(self.error(format!("unexpected '{}'", other))),
                });
            }
        }

        if tokens.is_empty() {
            return Err(self.error("expression is empty"));
        }
        Ok(tokens)
    }

    /// Operands and operators must alternate; parentheses must balance
    fn check_grammar(&self, tokens: &[Token]) -> EngineResult<()> {
        let mut expect_operand = true;
        let mut depth = 0usize;

        for token in tokens {
            match token {
                Token::Column(_) | Token::Number(_) if expect_operand => expect_operand = false,
                Token::Open if expect_operand => depth += 1,
                Token::Operator(_) if !expect_operand => expect_operand = true,
                Token::Close if !expect_operand && depth > 0 => depth -= 1,
                _ => return Err(self.error("malformed expression")),
            }
        }

        if expect_operand || depth != 0 {
            return Err(self.error("incomplete expression"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;
    use pretty_assertions::assert_eq;

    fn batch() -> Entity {
        Entity::new("ProductBatch")
            .with_field(Field::new("current_quantity", FieldType::Decimal))
            .with_field(Field::new("unit_cost", FieldType::Decimal))
            .with_field(Field::new("quantity", FieldType::Integer))
            .with_field(Field::new("reserved_quantity", FieldType::Integer))
    }

    #[test]
    fn test_columns_in_first_use_order() {
        let computed = ComputedField::new("margin", "(unit_cost - quantity) * unit_cost");
        assert_eq!(computed.columns().unwrap(), vec!["unit_cost", "quantity"]);
    }

    #[test]
    fn test_to_php() {
        let total = ComputedField::new("total_value", "current_quantity * unit_cost");
        assert_eq!(
            total.to_php("$this").unwrap(),
            "$this->current_quantity * $this->unit_cost"
        );

        let nested = ComputedField::new("share", "(quantity-reserved_quantity)/ 2");
        assert_eq!(
            nested.to_php("$model").unwrap(),
            "($model->quantity - $model->reserved_quantity) / 2"
        );
    }

    #[test]
    fn test_result_type() {
        let entity = batch();
        let available = ComputedField::new("available_quantity", "quantity - reserved_quantity");
        assert_eq!(available.result_type(&entity).unwrap(), FieldType::Integer);

        let total = ComputedField::new("total_value", "current_quantity * unit_cost");
        assert_eq!(total.result_type(&entity).unwrap(), FieldType::Decimal);

        let half = ComputedField::new("half", "quantity / 2");
        assert_eq!(half.result_type(&entity).unwrap(), FieldType::Decimal);
    }

    #[test]
    fn test_malformed_expressions() {
        for expression in ["", "quantity -", "* quantity", "(quantity", "quantity)", "quantity % 2", "1.2.3"] {
            let computed = ComputedField::new("broken", expression);
            let err = computed.columns().unwrap_err();
            assert!(err.is_validation(), "{}: {}", expression, err);
        }
    }

    #[test]
    fn test_attribute_name() {
        assert_eq!(ComputedField::new("total_value", "1").attribute(), "totalValue");
    }

    #[test]
    fn test_serde_shape() {
        let computed: ComputedField =
            serde_json::from_str(r#"{ "name": "total_value", "expression": "a * b" }"#).unwrap();
        assert_eq!(computed, ComputedField::new("total_value", "a * b"));
    }
}
