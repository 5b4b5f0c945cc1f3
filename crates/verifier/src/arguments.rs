//! Argument slot checks: range, uniqueness, contiguity.

use crate::error::VerifyError;
use ippvm_common::RawInstruction;

/// Highest argument slot an instruction may use.
pub const MAX_SLOT: i64 = 3;

/// Check that every record's slots lie in 1..=3, appear once, and leave no gaps.
pub fn check_arguments(records: &[RawInstruction]) -> Vec<VerifyError> {
    let mut errors = Vec::new();

    for (at, record) in records.iter().enumerate() {
        let order = record.order;
        let mut used = [false; MAX_SLOT as usize];
        let mut in_range = true;

        for arg in &record.args {
            if !(1..=MAX_SLOT).contains(&arg.slot) {
                errors.push(VerifyError::SlotOutOfRange {
                    at,
                    order,
                    slot: arg.slot,
                });
                in_range = false;
                continue;
            }
            let index = (arg.slot - 1) as usize;
            if used[index] {
                errors.push(VerifyError::DuplicateSlot {
                    at,
                    order,
                    slot: arg.slot,
                });
            }
            used[index] = true;
        }

        // Contiguity only means something once every slot is in range.
        if in_range {
            let highest = used.iter().rposition(|&u| u).map_or(0, |i| i + 1);
            for (index, present) in used.iter().enumerate().take(highest) {
                if !present {
                    errors.push(VerifyError::MissingSlot {
                        at,
                        order,
                        slot: index as i64 + 1,
                    });
                }
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use ippvm_common::{ErrorKind, RawArg};

    fn record(slots: &[i64]) -> RawInstruction {
        RawInstruction::new(
            1,
            "JUMPIFEQ",
            slots
                .iter()
                .map(|&slot| RawArg::new(slot, "int", "1"))
                .collect(),
        )
    }

    #[test]
    fn contiguous_slots_pass_in_any_order() {
        assert!(check_arguments(&[record(&[3, 1, 2])]).is_empty());
        assert!(check_arguments(&[record(&[])]).is_empty());
    }

    #[test]
    fn slot_out_of_range() {
        assert_eq!(
            check_arguments(&[record(&[1, 4])]),
            vec![VerifyError::SlotOutOfRange {
                at: 0,
                order: 1,
                slot: 4
            }]
        );
        assert_eq!(
            check_arguments(&[record(&[0])]),
            vec![VerifyError::SlotOutOfRange {
                at: 0,
                order: 1,
                slot: 0
            }]
        );
    }

    #[test]
    fn slots_beyond_a_byte_and_negative_slots_are_out_of_range() {
        let errors = check_arguments(&[record(&[1, 256, -1])]);
        assert_eq!(
            errors,
            vec![
                VerifyError::SlotOutOfRange {
                    at: 0,
                    order: 1,
                    slot: 256
                },
                VerifyError::SlotOutOfRange {
                    at: 0,
                    order: 1,
                    slot: -1
                },
            ]
        );
        assert!(errors.iter().all(|e| e.kind() == ErrorKind::SourceStructure));
    }

    #[test]
    fn duplicate_slot() {
        assert_eq!(
            check_arguments(&[record(&[1, 1])]),
            vec![VerifyError::DuplicateSlot {
                at: 0,
                order: 1,
                slot: 1
            }]
        );
    }

    #[test]
    fn gap_in_slots() {
        assert_eq!(
            check_arguments(&[record(&[1, 3])]),
            vec![VerifyError::MissingSlot {
                at: 0,
                order: 1,
                slot: 2
            }]
        );
    }
}
