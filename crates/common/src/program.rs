//! Program representation: instructions sorted by order.

use crate::error::LoadError;
use crate::instruction::Instruction;
use crate::raw::RawProgram;

/// An executable program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// The instruction stream, ascending by `order`.
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Create a program, stable-sorting the instructions by `order`.
    pub fn new(mut instructions: Vec<Instruction>) -> Self {
        instructions.sort_by_key(|instr| instr.order);
        Self { instructions }
    }

    /// Bind every raw record and sort the result.
    ///
    /// Returns the first error in record order.
    pub fn from_raw(raw: &RawProgram) -> Result<Self, LoadError> {
        let instructions = raw
            .instructions
            .iter()
            .map(Instruction::from_raw)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(instructions))
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}
