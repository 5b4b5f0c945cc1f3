//! Record-level checks: opcode presence and order positivity/uniqueness.

use crate::error::VerifyError;
use ippvm_common::RawInstruction;
use std::collections::HashMap;

/// Run the record pass over every instruction.
pub fn check_records(records: &[RawInstruction]) -> Vec<VerifyError> {
    let mut errors = Vec::new();
    let mut seen: HashMap<i64, usize> = HashMap::new();

    for (at, record) in records.iter().enumerate() {
        let order = record.order;

        if record.opcode.trim().is_empty() {
            errors.push(VerifyError::EmptyOpcode { at, order });
        }

        if order < 1 {
            errors.push(VerifyError::NonPositiveOrder { at, order });
            continue;
        }

        if let Some(&first_at) = seen.get(&order) {
            errors.push(VerifyError::DuplicateOrder {
                at,
                order,
                first_at,
            });
        } else {
            seen.insert(order, at);
        }
    }

    errors
}
