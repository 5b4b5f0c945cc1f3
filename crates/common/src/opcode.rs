//! Opcode vocabulary and argument signatures.
//!
//! The vocabulary is closed: 35 opcodes, each with a fixed list of
//! argument slots. Mnemonics are matched case-insensitively.

use std::fmt;

/// What an argument slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgSlot {
    /// A variable reference (`GF@x`), written to.
    Var,
    /// A variable reference or a constant (`int`, `bool`, `string`, `nil`).
    Symb,
    /// A label name.
    Label,
    /// A type name (`int`, `bool`, `string`).
    Type,
}

impl ArgSlot {
    /// Human-readable slot name used in error messages.
    pub fn describe(self) -> &'static str {
        match self {
            ArgSlot::Var => "a variable",
            ArgSlot::Symb => "a variable or constant",
            ArgSlot::Label => "a label",
            ArgSlot::Type => "a type",
        }
    }
}

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Frames, calls
    /// Copy a value into a variable.
    Move,
    /// Open a fresh pending (temporary) frame.
    CreateFrame,
    /// Promote the pending frame to the top of the local frame stack.
    PushFrame,
    /// Demote the top local frame back to pending.
    PopFrame,
    /// Declare a variable.
    DefVar,
    /// Push the return address and jump to a label.
    Call,
    /// Pop a return address and jump to it.
    Return,

    // Data stack
    /// Push a value onto the data stack.
    PushS,
    /// Pop the data stack into a variable.
    PopS,

    // Arithmetic, relational, boolean, conversions
    /// Integer addition.
    Add,
    /// Integer subtraction.
    Sub,
    /// Integer multiplication.
    Mul,
    /// Integer division.
    IDiv,
    /// Less-than.
    Lt,
    /// Greater-than.
    Gt,
    /// Equality.
    Eq,
    /// Boolean conjunction.
    And,
    /// Boolean disjunction.
    Or,
    /// Boolean negation.
    Not,
    /// Code point to one-character string.
    Int2Char,
    /// Code point of the character at a position.
    Stri2Int,

    // I/O
    /// Read a value of a given type from input.
    Read,
    /// Write a value to output.
    Write,

    // Strings
    /// Concatenate two strings.
    Concat,
    /// Length of a string in code points.
    StrLen,
    /// Character at a position.
    GetChar,
    /// Replace the character at a position.
    SetChar,

    // Types
    /// Runtime type name of a value.
    Type,

    // Control flow
    /// Jump target marker.
    Label,
    /// Unconditional jump.
    Jump,
    /// Jump if equal.
    JumpIfEq,
    /// Jump if not equal.
    JumpIfNeq,
    /// Terminate with a code in 0..=9.
    Exit,

    // Debugging
    /// Print a value to the diagnostic sink.
    DPrint,
    /// Print engine state to the diagnostic sink.
    Break,
}

/// All opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 35] = [
    Opcode::Move,
    Opcode::CreateFrame,
    Opcode::PushFrame,
    Opcode::PopFrame,
    Opcode::DefVar,
    Opcode::Call,
    Opcode::Return,
    Opcode::PushS,
    Opcode::PopS,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::IDiv,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Eq,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Int2Char,
    Opcode::Stri2Int,
    Opcode::Read,
    Opcode::Write,
    Opcode::Concat,
    Opcode::StrLen,
    Opcode::GetChar,
    Opcode::SetChar,
    Opcode::Type,
    Opcode::Label,
    Opcode::Jump,
    Opcode::JumpIfEq,
    Opcode::JumpIfNeq,
    Opcode::Exit,
    Opcode::DPrint,
    Opcode::Break,
];

use ArgSlot::{Label as L, Symb as S, Type as T, Var as V};

impl Opcode {
    /// Canonical (uppercase) mnemonic.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Move => "MOVE",
            Opcode::CreateFrame => "CREATEFRAME",
            Opcode::PushFrame => "PUSHFRAME",
            Opcode::PopFrame => "POPFRAME",
            Opcode::DefVar => "DEFVAR",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::PushS => "PUSHS",
            Opcode::PopS => "POPS",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::IDiv => "IDIV",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Eq => "EQ",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Not => "NOT",
            Opcode::Int2Char => "INT2CHAR",
            Opcode::Stri2Int => "STRI2INT",
            Opcode::Read => "READ",
            Opcode::Write => "WRITE",
            Opcode::Concat => "CONCAT",
            Opcode::StrLen => "STRLEN",
            Opcode::GetChar => "GETCHAR",
            Opcode::SetChar => "SETCHAR",
            Opcode::Type => "TYPE",
            Opcode::Label => "LABEL",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfEq => "JUMPIFEQ",
            Opcode::JumpIfNeq => "JUMPIFNEQ",
            Opcode::Exit => "EXIT",
            Opcode::DPrint => "DPRINT",
            Opcode::Break => "BREAK",
        }
    }

    /// Look up an opcode by mnemonic, ignoring ASCII case.
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(name))
            .copied()
    }

    /// The argument slots this opcode takes, in positional order.
    pub fn signature(self) -> &'static [ArgSlot] {
        match self {
            Opcode::CreateFrame
            | Opcode::PushFrame
            | Opcode::PopFrame
            | Opcode::Return
            | Opcode::Break => &[],

            Opcode::DefVar | Opcode::PopS => &[V],
            Opcode::Call | Opcode::Label | Opcode::Jump => &[L],
            Opcode::PushS | Opcode::Write | Opcode::Exit | Opcode::DPrint => &[S],

            Opcode::Move
            | Opcode::Not
            | Opcode::Int2Char
            | Opcode::StrLen
            | Opcode::Type => &[V, S],
            Opcode::Read => &[V, T],

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::IDiv
            | Opcode::Lt
            | Opcode::Gt
            | Opcode::Eq
            | Opcode::And
            | Opcode::Or
            | Opcode::Stri2Int
            | Opcode::Concat
            | Opcode::GetChar
            | Opcode::SetChar => &[V, S, S],

            Opcode::JumpIfEq | Opcode::JumpIfNeq => &[L, S, S],
        }
    }

    /// Returns true if executing this opcode may move the instruction
    /// pointer somewhere other than the next instruction.
    pub fn is_control_transfer(self) -> bool {
        matches!(
            self,
            Opcode::Call | Opcode::Return | Opcode::Jump | Opcode::JumpIfEq | Opcode::JumpIfNeq
        )
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonic_lookup_roundtrip() {
        for op in ALL_OPCODES {
            assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
        }
    }

    #[test]
    fn mnemonic_lookup_ignores_case() {
        assert_eq!(Opcode::from_mnemonic("jumpifeq"), Some(Opcode::JumpIfEq));
        assert_eq!(Opcode::from_mnemonic("CreateFrame"), Some(Opcode::CreateFrame));
    }

    #[test]
    fn unknown_mnemonic() {
        assert_eq!(Opcode::from_mnemonic("HALT"), None);
        assert_eq!(Opcode::from_mnemonic(""), None);
    }

    #[test]
    fn mnemonics_are_unique() {
        let mut names: Vec<&str> = ALL_OPCODES.iter().map(|op| op.mnemonic()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ALL_OPCODES.len());
    }

    #[test]
    fn signatures_have_at_most_three_slots() {
        for op in ALL_OPCODES {
            assert!(op.signature().len() <= 3, "{op}");
        }
    }

    #[test]
    fn writers_start_with_var_slot() {
        for op in [Opcode::Move, Opcode::Add, Opcode::Read, Opcode::SetChar, Opcode::Type] {
            assert_eq!(op.signature()[0], ArgSlot::Var, "{op}");
        }
    }

    #[test]
    fn conditional_jumps_take_label_and_two_symbols() {
        assert_eq!(
            Opcode::JumpIfEq.signature(),
            &[ArgSlot::Label, ArgSlot::Symb, ArgSlot::Symb]
        );
    }
}
