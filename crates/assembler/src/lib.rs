//! IPPcode assembler: source text ↔ instruction records.
//!
//! The assembler is the textual program loader. It produces unvalidated
//! [`RawProgram`] records, the same form the JSON loader yields, so both
//! paths share the verifier and `Program::from_raw`.
//!
//! # Usage
//!
//! ```
//! use ippvm_assembler::{assemble, disassemble};
//! use ippvm_common::Program;
//!
//! let text = ".IPPcode24\nDEFVAR GF@x\nMOVE GF@x int@42\nWRITE GF@x\n";
//! let raw = assemble(text).unwrap();
//! let program = Program::from_raw(&raw).unwrap();
//! assert_eq!(disassemble(&program), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! For a program whose orders are 1..=n, `assemble(disassemble(program))`
//! binds back to an equal program. The disassembler outputs canonical text;
//! the assembler also accepts non-canonical input (lowercase opcodes, hex
//! and octal ints, comments, a missing header).

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use error::AsmError;

use ippvm_common::{Program, RawProgram};
use lexer::{is_valid_header, tokenize_line, Line};
use parser::parse_line;

/// Assemble source text into raw instruction records.
///
/// Orders are assigned 1, 2, ... in line order. Returns the first error
/// encountered.
pub fn assemble(text: &str) -> Result<RawProgram, AsmError> {
    let mut instructions = Vec::new();
    let mut seen_content = false;

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        match tokenize_line(line) {
            Line::Empty => continue,
            Line::Header(tokens) => {
                if seen_content || !is_valid_header(&tokens) {
                    return Err(AsmError::InvalidHeader {
                        line: line_num,
                        token: tokens.join(" "),
                    });
                }
            }
            Line::Instruction(tokens) => {
                let order = instructions.len() as i64 + 1;
                instructions.push(parse_line(&tokens, line_num, order)?);
            }
        }
        seen_content = true;
    }

    Ok(RawProgram::new(instructions))
}

/// Disassemble a loaded program into canonical source text.
pub fn disassemble(program: &Program) -> String {
    disassembler::disassemble(program)
}
