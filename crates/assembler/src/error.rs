//! Error types for the IPPcode assembler.

use ippvm_common::ErrorKind;
use thiserror::Error;

/// Errors produced while assembling source text into raw records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// A `.`-prefixed line other than a leading `.IPPcode24`.
    #[error("line {line}: invalid header '{token}'")]
    InvalidHeader { line: usize, token: String },

    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// Wrong number of arguments for the opcode.
    #[error("line {line}: {opcode} expects {expected} argument(s), found {found}")]
    ArgumentCount {
        line: usize,
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// A token that does not fit its argument slot.
    #[error("line {line}: invalid argument '{token}', expected {expected}")]
    InvalidArgument {
        line: usize,
        token: String,
        expected: &'static str,
    },
}

impl AsmError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AsmError::UnknownOpcode { .. } => ErrorKind::SourceStructure,
            _ => ErrorKind::SourceFormat,
        }
    }

    /// 1-based source line of the error.
    pub fn line(&self) -> usize {
        match self {
            AsmError::InvalidHeader { line, .. }
            | AsmError::UnknownOpcode { line, .. }
            | AsmError::ArgumentCount { line, .. }
            | AsmError::InvalidArgument { line, .. } => *line,
        }
    }
}
