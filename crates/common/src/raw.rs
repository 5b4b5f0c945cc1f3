//! Raw instruction records, as supplied by a program loader.
//!
//! Records are unvalidated: opcode names are plain strings and argument
//! text is not yet parsed. `ippvm-verifier` checks their structure;
//! [`crate::Program::from_raw`] binds them to opcodes and operands.

use crate::error::LoadError;
use serde::{Deserialize, Serialize};

/// One argument slot of a raw instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArg {
    /// Positional slot, 1-based.
    pub slot: i64,
    /// Type tag: `int`, `bool`, `string`, `nil`, `var`, `label` or `type`.
    #[serde(rename = "type")]
    pub tag: String,
    /// Literal text or variable reference.
    #[serde(default)]
    pub value: String,
}

impl RawArg {
    pub fn new(slot: i64, tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            slot,
            tag: tag.into(),
            value: value.into(),
        }
    }
}

/// One raw instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInstruction {
    /// Sort key; must be positive and unique within a program.
    pub order: i64,
    pub opcode: String,
    #[serde(default)]
    pub args: Vec<RawArg>,
}

impl RawInstruction {
    pub fn new(order: i64, opcode: impl Into<String>, args: Vec<RawArg>) -> Self {
        Self {
            order,
            opcode: opcode.into(),
            args,
        }
    }
}

/// A loader's output: instruction records in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProgram {
    pub instructions: Vec<RawInstruction>,
}

impl RawProgram {
    pub fn new(instructions: Vec<RawInstruction>) -> Self {
        Self { instructions }
    }

    /// Parse the JSON program form.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        serde_json::from_str(text).map_err(|e| LoadError::Json {
            message: e.to_string(),
        })
    }

    /// Parse the IPPcode24 XML program form.
    pub fn from_xml(text: &str) -> Result<Self, LoadError> {
        crate::xml::parse_program(text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_json_minimal() {
        let json = r#"{"instructions":[
            {"order":1,"opcode":"DEFVAR","args":[{"slot":1,"type":"var","value":"GF@x"}]},
            {"order":2,"opcode":"BREAK"}
        ]}"#;
        let program = RawProgram::from_json(json).unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.instructions[0].args[0], RawArg::new(1, "var", "GF@x"));
        assert!(program.instructions[1].args.is_empty());
    }

    #[test]
    fn from_json_missing_value_is_empty_text() {
        let json = r#"{"instructions":[
            {"order":1,"opcode":"WRITE","args":[{"slot":1,"type":"string"}]}
        ]}"#;
        let program = RawProgram::from_json(json).unwrap();
        assert_eq!(program.instructions[0].args[0].value, "");
    }

    #[test]
    fn from_json_syntax_error() {
        let err = RawProgram::from_json("{\"instructions\": [").unwrap_err();
        assert!(matches!(err, LoadError::Json { .. }));
    }

    #[test]
    fn json_roundtrip() {
        let program = RawProgram::new(vec![RawInstruction::new(
            3,
            "PUSHS",
            vec![RawArg::new(1, "int", "5")],
        )]);
        assert_eq!(RawProgram::from_json(&program.to_json().unwrap()).unwrap(), program);
    }
}
