//! Verification errors for raw IPPcode records.
//!
//! Every error carries the record's position in the input (`at`) and its
//! declared `order`. The verifier collects ALL errors, not just the first.

use ippvm_common::ErrorKind;
use thiserror::Error;

/// Errors found while validating raw instruction records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    // --- Records ---
    /// Opcode text is empty or whitespace.
    #[error("empty opcode in record {at} (order {order})")]
    EmptyOpcode { at: usize, order: i64 },

    /// Order must be a positive integer.
    #[error("order {order} in record {at} is not positive")]
    NonPositiveOrder { at: usize, order: i64 },

    /// Two records share an order.
    #[error("order {order} in record {at} already used by record {first_at}")]
    DuplicateOrder {
        at: usize,
        order: i64,
        first_at: usize,
    },

    // --- Arguments ---
    /// Argument slot outside 1..=3.
    #[error("argument slot {slot} out of range 1..=3 in record {at} (order {order})")]
    SlotOutOfRange { at: usize, order: i64, slot: i64 },

    /// Two arguments in the same slot.
    #[error("argument slot {slot} used twice in record {at} (order {order})")]
    DuplicateSlot { at: usize, order: i64, slot: i64 },

    /// Arguments skip a slot, e.g. arg1 and arg3 without arg2.
    #[error("argument slot {slot} missing in record {at} (order {order})")]
    MissingSlot { at: usize, order: i64, slot: i64 },

    // --- Labels ---
    /// The same label name defined by two LABEL records.
    #[error("label '{label}' defined twice (record {at}, order {order})")]
    DuplicateLabel { at: usize, order: i64, label: String },
}

impl VerifyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VerifyError::DuplicateLabel { .. } => ErrorKind::Semantic,
            _ => ErrorKind::SourceStructure,
        }
    }

    /// Position of the offending record in the input.
    pub fn at(&self) -> usize {
        match self {
            VerifyError::EmptyOpcode { at, .. }
            | VerifyError::NonPositiveOrder { at, .. }
            | VerifyError::DuplicateOrder { at, .. }
            | VerifyError::SlotOutOfRange { at, .. }
            | VerifyError::DuplicateSlot { at, .. }
            | VerifyError::MissingSlot { at, .. }
            | VerifyError::DuplicateLabel { at, .. } => *at,
        }
    }
}
