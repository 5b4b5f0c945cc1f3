//! Executable instructions: an opcode bound to parsed operands.

use crate::error::LoadError;
use crate::opcode::{ArgSlot, Opcode};
use crate::operand::{parse_operand, LiteralError, Operand};
use crate::raw::RawInstruction;
use crate::value::Value;

/// A single instruction. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Loader-supplied sort key. Not consulted after sorting.
    pub order: i64,
    /// Operands, positionally matching `opcode.signature()`.
    pub args: Vec<Operand>,
}

impl Instruction {
    /// Create an instruction without checking operands against the signature.
    pub fn new(opcode: Opcode, order: i64, args: Vec<Operand>) -> Self {
        Self {
            opcode,
            order,
            args,
        }
    }

    /// Bind a raw record: look up the opcode, parse every argument literal
    /// and check the operands against the opcode's signature.
    pub fn from_raw(raw: &RawInstruction) -> Result<Self, LoadError> {
        let order = raw.order;
        let opcode = Opcode::from_mnemonic(&raw.opcode).ok_or_else(|| LoadError::UnknownOpcode {
            order,
            opcode: raw.opcode.clone(),
        })?;

        let signature = opcode.signature();
        if raw.args.len() != signature.len() {
            return Err(LoadError::ArgumentCount {
                order,
                opcode: opcode.mnemonic(),
                expected: signature.len(),
                found: raw.args.len(),
            });
        }

        let mut raw_args: Vec<_> = raw.args.iter().collect();
        raw_args.sort_by_key(|arg| arg.slot);

        let mut args = Vec::with_capacity(signature.len());
        for (idx, (slot, arg)) in signature.iter().zip(raw_args).enumerate() {
            let operand = parse_operand(&arg.tag, &arg.value).map_err(|e| match e {
                LiteralError::UnknownType => LoadError::UnknownArgType {
                    order,
                    tag: arg.tag.clone(),
                },
                LiteralError::InvalidInt => LoadError::InvalidInt {
                    order,
                    text: arg.value.clone(),
                },
                LiteralError::InvalidType => LoadError::InvalidType {
                    order,
                    text: arg.value.clone(),
                },
                LiteralError::InvalidVariable => LoadError::InvalidVariable {
                    order,
                    text: arg.value.clone(),
                },
                LiteralError::InvalidLabel => LoadError::InvalidLabel {
                    order,
                    text: arg.value.clone(),
                },
            })?;

            if !fits_slot(*slot, &operand) {
                return Err(LoadError::ArgumentKind {
                    order,
                    opcode: opcode.mnemonic(),
                    slot: idx + 1,
                    expected: slot.describe(),
                    found: arg.tag.clone(),
                });
            }
            args.push(operand);
        }

        Ok(Self {
            opcode,
            order,
            args,
        })
    }

    /// Operand at a 0-based position.
    pub fn arg(&self, index: usize) -> Option<&Operand> {
        self.args.get(index)
    }
}

fn fits_slot(slot: ArgSlot, operand: &Operand) -> bool {
    match (slot, operand) {
        (ArgSlot::Var, Operand::Variable(_)) => true,
        (ArgSlot::Symb, Operand::Variable(_)) => true,
        (ArgSlot::Symb, Operand::Literal(v)) => {
            matches!(v, Value::Int(_) | Value::Bool(_) | Value::Text(_) | Value::Nil)
        }
        (ArgSlot::Label, Operand::Literal(Value::Label(_))) => true,
        (ArgSlot::Type, Operand::Literal(Value::Type(_))) => true,
        _ => false,
    }
}
