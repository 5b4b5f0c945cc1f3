//! Runtime errors for the IPPcode VM.
//!
//! Every variant raised during execution carries the index (`at`) of the
//! instruction in the sorted sequence. Each variant belongs to exactly one
//! [`ErrorKind`], which fixes the process exit code.

use crate::frame::FrameError;
use ippvm_common::{ErrorKind, Opcode};
use thiserror::Error;

/// Errors that terminate a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Two LABEL instructions with the same name.
    #[error("label '{label}' defined twice (second definition at instruction {at})")]
    DuplicateLabel { at: usize, label: String },

    /// Jump or call to a label that is not defined.
    #[error("undefined label '{label}' at instruction {at}")]
    UndefinedLabel { at: usize, label: String },

    /// Frame access, variable access or redefinition failure.
    #[error("{source} at instruction {at}")]
    Frame { at: usize, source: FrameError },

    /// Read of a declared variable that was never written.
    #[error("read of uninitialized variable {var} at instruction {at}")]
    Uninitialized { at: usize, var: String },

    /// RETURN with an empty call stack.
    #[error("RETURN with empty call stack at instruction {at}")]
    EmptyCallStack { at: usize },

    /// POPS with an empty data stack.
    #[error("POPS with empty data stack at instruction {at}")]
    EmptyDataStack { at: usize },

    /// Operand types violate the instruction's contract.
    #[error("{opcode} expects {expected} operand, found {found} at instruction {at}")]
    OperandType {
        at: usize,
        opcode: Opcode,
        expected: &'static str,
        found: &'static str,
    },

    /// Integer division by zero.
    #[error("division by zero at instruction {at}")]
    DivisionByZero { at: usize },

    /// EXIT with a code outside 0..=9.
    #[error("exit code {code} out of range 0..=9 at instruction {at}")]
    InvalidExitCode { at: usize, code: i64 },

    /// INT2CHAR with a value that is not a Unicode scalar value.
    #[error("{value} is not a valid code point at instruction {at}")]
    InvalidCodePoint { at: usize, value: i64 },

    /// Character position outside the string.
    #[error("{opcode} index {index} out of range (length {length}) at instruction {at}")]
    IndexOutOfRange {
        at: usize,
        opcode: Opcode,
        index: i64,
        length: usize,
    },

    /// SETCHAR with an empty replacement string.
    #[error("SETCHAR with empty replacement string at instruction {at}")]
    EmptyReplacement { at: usize },

    /// The output collaborator failed.
    #[error("output failed at instruction {at}: {message}")]
    Output { at: usize, message: String },

    /// The configured step limit was reached.
    #[error("step limit {limit} exceeded at instruction {at}")]
    StepLimitExceeded { at: usize, limit: u64 },

    /// Operand shape does not match the opcode signature.
    #[error("malformed operand {index} for {opcode} at instruction {at}")]
    MalformedOperand {
        at: usize,
        opcode: Opcode,
        index: usize,
    },
}

impl RuntimeError {
    /// The failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuntimeError::DuplicateLabel { .. } | RuntimeError::UndefinedLabel { .. } => {
                ErrorKind::Semantic
            }
            RuntimeError::Frame { source, .. } => source.kind(),
            RuntimeError::Uninitialized { .. }
            | RuntimeError::EmptyCallStack { .. }
            | RuntimeError::EmptyDataStack { .. } => ErrorKind::Value,
            RuntimeError::OperandType { .. } => ErrorKind::OperandType,
            RuntimeError::DivisionByZero { .. } | RuntimeError::InvalidExitCode { .. } => {
                ErrorKind::OperandValue
            }
            RuntimeError::InvalidCodePoint { .. }
            | RuntimeError::IndexOutOfRange { .. }
            | RuntimeError::EmptyReplacement { .. } => ErrorKind::StringOperation,
            RuntimeError::Output { .. } => ErrorKind::OutputFile,
            RuntimeError::StepLimitExceeded { .. } => ErrorKind::Internal,
            RuntimeError::MalformedOperand { .. } => ErrorKind::SourceStructure,
        }
    }

    /// Index of the offending instruction.
    pub fn at(&self) -> usize {
        match self {
            RuntimeError::DuplicateLabel { at, .. }
            | RuntimeError::UndefinedLabel { at, .. }
            | RuntimeError::Frame { at, .. }
            | RuntimeError::Uninitialized { at, .. }
            | RuntimeError::EmptyCallStack { at }
            | RuntimeError::EmptyDataStack { at }
            | RuntimeError::OperandType { at, .. }
            | RuntimeError::DivisionByZero { at }
            | RuntimeError::InvalidExitCode { at, .. }
            | RuntimeError::InvalidCodePoint { at, .. }
            | RuntimeError::IndexOutOfRange { at, .. }
            | RuntimeError::EmptyReplacement { at }
            | RuntimeError::Output { at, .. }
            | RuntimeError::StepLimitExceeded { at, .. }
            | RuntimeError::MalformedOperand { at, .. } => *at,
        }
    }
}
