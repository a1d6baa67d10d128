//! Turns a JSON parse tree into a [`serde_json::Value`].

use serde_json::{Map, Number, Value};

use crate::lexer::{Item, TokenKind};
use crate::parser::{Parsed, Production};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("malformed literal {token}: {reason}")]
    MalformedLiteral { token: Item, reason: String },

    #[error("expected {expected}, found {found}")]
    UnexpectedNode { expected: String, found: String },
}

pub fn build(tree: &Parsed) -> Result<Value, BuildError> {
    match tree {
        Parsed::Production(production) => visit(production),
        other => Err(unexpected("a production", other)),
    }
}

fn visit(production: &Production) -> Result<Value, BuildError> {
    match production.name.as_str() {
        "Value" => visit_value(production),
        "IntLiteral" => visit_int_literal(production),
        "StringLiteral" => visit_string_literal(production).map(Value::String),
        "BooleanLiteral" => visit_boolean_literal(production),
        "List" => visit_list(production),
        "Dict" => visit_dict(production),
        _ => Err(BuildError::UnexpectedNode {
            expected: "a JSON production".to_string(),
            found: production.name.clone(),
        }),
    }
}

fn visit_value(production: &Production) -> Result<Value, BuildError> {
    match production.productions().next() {
        Some(inner) => visit(inner),
        None => Err(BuildError::UnexpectedNode {
            expected: "a value".to_string(),
            found: production.to_string(),
        }),
    }
}

fn visit_int_literal(production: &Production) -> Result<Value, BuildError> {
    let item = only_item(production)?;
    item.value
        .parse::<i64>()
        .map(|i| Value::Number(Number::from(i)))
        .map_err(|e| BuildError::MalformedLiteral {
            token: item.clone(),
            reason: e.to_string(),
        })
}

fn visit_string_literal(production: &Production) -> Result<String, BuildError> {
    let item = only_item(production)?;
    match item
        .value
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
    {
        Some(inner) => Ok(inner.to_string()),
        None => Err(BuildError::MalformedLiteral {
            token: item.clone(),
            reason: "missing quotes".to_string(),
        }),
    }
}

fn visit_boolean_literal(production: &Production) -> Result<Value, BuildError> {
    let item = only_item(production)?;
    item.value
        .parse::<bool>()
        .map(Value::Bool)
        .map_err(|e| BuildError::MalformedLiteral {
            token: item.clone(),
            reason: e.to_string(),
        })
}

fn visit_list(production: &Production) -> Result<Value, BuildError> {
    production
        .children
        .filter(&[TokenKind::from('[')])
        .iter()
        .map(build)
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn visit_dict(production: &Production) -> Result<Value, BuildError> {
    let mut map = Map::new();
    for field in production.productions() {
        let (key, value) = visit_field(field)?;
        map.insert(key, value);
    }
    Ok(Value::Object(map))
}

fn visit_field(production: &Production) -> Result<(String, Value), BuildError> {
    let key = match production.named("key") {
        Some(Parsed::Production(key)) => visit_string_literal(key)?,
        other => return Err(missing("a field key", other)),
    };
    let value = match production.named("value") {
        Some(value) => build(value)?,
        None => return Err(missing("a field value", None)),
    };
    Ok((key, value))
}

fn only_item(production: &Production) -> Result<&Item, BuildError> {
    match production.children.first() {
        Some(Parsed::Item(item)) => Ok(item),
        other => Err(missing("a token", other)),
    }
}

fn unexpected(expected: &str, found: &Parsed) -> BuildError {
    BuildError::UnexpectedNode {
        expected: expected.to_string(),
        found: found.to_string(),
    }
}

fn missing(expected: &str, found: Option<&Parsed>) -> BuildError {
    match found {
        Some(found) => unexpected(expected, found),
        None => BuildError::UnexpectedNode {
            expected: expected.to_string(),
            found: "nothing".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json::lexer::INT_LITERAL;
    use crate::parser::Sequence;

    fn literal(name: &str, item: Item) -> Production {
        Production::new(name, Sequence::from(vec![Parsed::Item(item)]))
    }

    #[test]
    fn malformed_integer_is_a_structured_error() {
        let token = Item::new(INT_LITERAL, "12x");
        let error = visit(&literal("IntLiteral", token.clone())).unwrap_err();
        match error {
            BuildError::MalformedLiteral { token: bad, .. } => assert_eq!(bad, token),
            other => panic!("expected malformed literal, got {other:?}"),
        }
    }

    #[test]
    fn integer_out_of_range_is_malformed() {
        let token = Item::new(INT_LITERAL, "99999999999999999999999");
        assert!(matches!(
            visit(&literal("IntLiteral", token)),
            Err(BuildError::MalformedLiteral { .. })
        ));
    }

    #[test]
    fn unknown_production_is_rejected() {
        let production = Production::new("Mystery", Sequence::new());
        assert!(matches!(
            visit(&production),
            Err(BuildError::UnexpectedNode { .. })
        ));
    }
}
