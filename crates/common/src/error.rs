//! Error kinds and load-time errors for IPPcode programs.
//!
//! [`ErrorKind`] is the single table mapping every failure class to its
//! process exit code. Each crate's error enum reports its kind through a
//! `kind()` method so the CLI can terminate with the right code.

use thiserror::Error;

/// Failure classes, each with a fixed process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad command-line usage.
    Parameter,
    /// Source or input file could not be opened.
    InputFile,
    /// Output could not be written.
    OutputFile,
    /// Source text, JSON or XML could not be parsed at all.
    SourceFormat,
    /// Malformed opcode, argument shape, literal or frame selector.
    SourceStructure,
    /// Duplicate label, undefined label, variable redefinition.
    Semantic,
    /// Operand types violate the instruction's contract.
    OperandType,
    /// Undeclared variable in an existing frame.
    VariableAccess,
    /// Missing local or temporary frame.
    FrameAccess,
    /// Uninitialized read, empty call or data stack.
    Value,
    /// Runtime value outside the allowed domain.
    OperandValue,
    /// Out-of-range character position or invalid code point.
    StringOperation,
    /// Engine-level failure not attributable to the program.
    Internal,
}

/// All error kinds, in exit-code order.
pub const ALL_ERROR_KINDS: [ErrorKind; 13] = [
    ErrorKind::Parameter,
    ErrorKind::InputFile,
    ErrorKind::OutputFile,
    ErrorKind::SourceFormat,
    ErrorKind::SourceStructure,
    ErrorKind::Semantic,
    ErrorKind::OperandType,
    ErrorKind::VariableAccess,
    ErrorKind::FrameAccess,
    ErrorKind::Value,
    ErrorKind::OperandValue,
    ErrorKind::StringOperation,
    ErrorKind::Internal,
];

impl ErrorKind {
    /// The process exit code for this kind.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorKind::Parameter => 10,
            ErrorKind::InputFile => 11,
            ErrorKind::OutputFile => 12,
            ErrorKind::SourceFormat => 31,
            ErrorKind::SourceStructure => 32,
            ErrorKind::Semantic => 52,
            ErrorKind::OperandType => 53,
            ErrorKind::VariableAccess => 54,
            ErrorKind::FrameAccess => 55,
            ErrorKind::Value => 56,
            ErrorKind::OperandValue => 57,
            ErrorKind::StringOperation => 58,
            ErrorKind::Internal => 99,
        }
    }
}

/// Errors raised while turning raw records into executable instructions.
///
/// `order` is the instruction's order number as supplied by the loader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Opcode name not in the vocabulary.
    #[error("instruction {order}: unknown opcode '{opcode}'")]
    UnknownOpcode { order: i64, opcode: String },

    /// Argument type tag is not one of int, bool, string, nil, var, label, type.
    #[error("instruction {order}: unknown argument type '{tag}'")]
    UnknownArgType { order: i64, tag: String },

    /// Integer literal did not match the hex, octal or decimal forms.
    #[error("instruction {order}: invalid int literal '{text}'")]
    InvalidInt { order: i64, text: String },

    /// Type literal is not one of int, bool, string.
    #[error("instruction {order}: invalid type literal '{text}'")]
    InvalidType { order: i64, text: String },

    /// Variable reference without `@`, with an unknown frame, or an empty name.
    #[error("instruction {order}: invalid variable reference '{text}'")]
    InvalidVariable { order: i64, text: String },

    /// Label literal is not an identifier.
    #[error("instruction {order}: invalid label name '{text}'")]
    InvalidLabel { order: i64, text: String },

    /// Wrong number of arguments for the opcode.
    #[error("instruction {order}: {opcode} expects {expected} argument(s), found {found}")]
    ArgumentCount {
        order: i64,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// Argument does not fit the opcode's slot.
    #[error("instruction {order}: {opcode} argument {slot} must be {expected}, found {found}")]
    ArgumentKind {
        order: i64,
        opcode: &'static str,
        slot: usize,
        expected: &'static str,
        found: String,
    },

    /// Program JSON could not be parsed.
    #[error("invalid program JSON: {message}")]
    Json { message: String },

    /// Program XML is not well-formed.
    #[error("invalid program XML: {message}")]
    Xml { message: String },

    /// Root element is not `<program language="IPPcode24">`.
    #[error("root element must be <program language=\"IPPcode24\">, found <{found}>")]
    XmlRoot { found: String },

    /// Element not allowed at this position.
    #[error("unexpected element <{name}> inside <{parent}>")]
    XmlElement { name: String, parent: String },

    /// Required attribute missing or malformed.
    #[error("<{element}> has invalid {attribute} attribute '{value}'")]
    XmlAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },
}

impl LoadError {
    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Json { .. } | LoadError::Xml { .. } => ErrorKind::SourceFormat,
            _ => ErrorKind::SourceStructure,
        }
    }
}
