//! Runtime value representation.
//!
//! Values live in variables, on the data stack and inside literal operands.
//! An uninitialized variable holds no value at all (`Option::None`), which
//! is distinct from [`Value::Nil`].

use crate::type_tag::TypeTag;
use std::fmt;

/// A tagged runtime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Signed 64-bit integer.
    Int(i64),
    /// Boolean.
    Bool(bool),
    /// Unicode text.
    Text(String),
    /// A type name literal (only appears as an operand).
    Type(TypeTag),
    /// A label name literal (only appears as an operand).
    Label(String),
    /// The nil value.
    Nil,
}

impl Value {
    /// Runtime type name, as reported by the TYPE instruction.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
            Value::Text(_) => "string",
            Value::Type(_) => "type",
            Value::Label(_) => "label",
            Value::Nil => "nil",
        }
    }

    /// Returns true for [`Value::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns true if both values have the same variant.
    pub fn same_type(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Renders the value the way WRITE prints it: nil is empty text.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Text(s) => f.write_str(s),
            Value::Type(t) => f.write_str(t.name()),
            Value::Label(l) => f.write_str(l),
            Value::Nil => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names() {
        assert_eq!(Value::Int(1).type_name(), "int");
        assert_eq!(Value::Bool(true).type_name(), "bool");
        assert_eq!(Value::Text(String::new()).type_name(), "string");
        assert_eq!(Value::Nil.type_name(), "nil");
        assert_eq!(Value::Type(TypeTag::Int).type_name(), "type");
        assert_eq!(Value::Label("x".into()).type_name(), "label");
    }

    #[test]
    fn display_matches_write_rendering() {
        assert_eq!(Value::Int(-42).to_string(), "-42");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Text("a b".into()).to_string(), "a b");
        assert_eq!(Value::Nil.to_string(), "");
    }

    #[test]
    fn same_type_ignores_payload() {
        assert!(Value::Int(1).same_type(&Value::Int(2)));
        assert!(!Value::Int(1).same_type(&Value::Bool(true)));
        assert!(Value::Nil.same_type(&Value::Nil));
    }

    #[test]
    fn equality_different_types() {
        assert_ne!(Value::Int(1), Value::Bool(true));
        assert_ne!(Value::Text("nil".into()), Value::Nil);
    }
}
