//! Label definition check.

use crate::error::VerifyError;
use ippvm_common::{Opcode, RawInstruction};
use std::collections::HashSet;

/// Report every LABEL record that redefines an earlier name.
///
/// Records are visited in ascending order, the sequence the engine sees, so
/// the later definition is the one reported.
pub fn check_labels(records: &[RawInstruction]) -> Vec<VerifyError> {
    let mut sorted: Vec<(usize, &RawInstruction)> = records.iter().enumerate().collect();
    sorted.sort_by_key(|(_, record)| record.order);

    let mut defined = HashSet::new();
    let mut errors = Vec::new();

    for (at, record) in sorted {
        if Opcode::from_mnemonic(&record.opcode) != Some(Opcode::Label) {
            continue;
        }
        let Some(arg) = record.args.iter().find(|arg| arg.slot == 1) else {
            continue;
        };
        if !defined.insert(arg.value.as_str()) {
            errors.push(VerifyError::DuplicateLabel {
                at,
                order: record.order,
                label: arg.value.clone(),
            });
        }
    }

    errors
}
