//! IPPcode verifier: structural validation of raw instruction records.
//!
//! The verifier checks a [`RawProgram`] BEFORE it is bound into a
//! `Program`. It collects ALL errors (not just the first) and returns them.
//!
//! # Usage
//!
//! ```
//! use ippvm_common::{RawArg, RawInstruction, RawProgram};
//! use ippvm_verifier::verify;
//!
//! let program = RawProgram::new(vec![
//!     RawInstruction::new(1, "DEFVAR", vec![RawArg::new(1, "var", "GF@x")]),
//!     RawInstruction::new(2, "WRITE", vec![RawArg::new(1, "int", "1")]),
//! ]);
//!
//! assert!(verify(&program).is_ok());
//! ```
//!
//! # Passes
//!
//! 1. **Records**: non-empty opcode, positive and unique order
//! 2. **Arguments**: slots in 1..=3, no duplicates, no gaps
//! 3. **Labels**: no label defined twice

pub mod arguments;
pub mod error;
pub mod labels;
pub mod structural;

pub use error::VerifyError;

use ippvm_common::RawProgram;

/// Verify a raw program's structure.
///
/// Returns `Ok(())` if the program passes all checks, or
/// `Err(Vec<VerifyError>)` with all errors found, grouped by pass.
pub fn verify(program: &RawProgram) -> Result<(), Vec<VerifyError>> {
    let records = &program.instructions;
    let mut all_errors = Vec::new();

    // Pass 1: Records
    all_errors.extend(structural::check_records(records));

    // Pass 2: Arguments
    all_errors.extend(arguments::check_arguments(records));

    // Pass 3: Labels
    all_errors.extend(labels::check_labels(records));

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors)
    }
}
