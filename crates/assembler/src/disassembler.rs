//! Disassembler: loaded program → canonical IPPcode24 text.
//!
//! Output is the header followed by one instruction per line in execution
//! sequence. No indentation, no comments, no blank lines.

use crate::lexer::HEADER;
use ippvm_common::operand::escape_string;
use ippvm_common::{Operand, Program, Value};

/// Disassemble a program into canonical source text.
///
/// Reassembling the output yields the same instructions, renumbered with
/// orders 1, 2, ...
pub fn disassemble(program: &Program) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');

    for instr in &program.instructions {
        out.push_str(instr.opcode.mnemonic());
        for arg in &instr.args {
            out.push(' ');
            out.push_str(&render_operand(arg));
        }
        out.push('\n');
    }

    out
}

/// Render one operand in source form.
fn render_operand(operand: &Operand) -> String {
    match operand {
        Operand::Variable(var) => var.to_string(),
        Operand::Literal(Value::Int(n)) => format!("int@{n}"),
        Operand::Literal(Value::Bool(b)) => format!("bool@{b}"),
        Operand::Literal(Value::Text(s)) => format!("string@{}", escape_string(s)),
        Operand::Literal(Value::Nil) => "nil@nil".to_string(),
        Operand::Literal(Value::Label(name)) => name.clone(),
        Operand::Literal(Value::Type(tag)) => tag.name().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ippvm_common::{Instruction, Opcode, Scope, TypeTag, VarRef};

    #[test]
    fn empty_program_is_header_only() {
        assert_eq!(disassemble(&Program::new(vec![])), ".IPPcode24\n");
    }

    #[test]
    fn operands_render_in_source_form() {
        let program = Program::new(vec![
            Instruction::new(
                Opcode::Read,
                1,
                vec![
                    Operand::Variable(VarRef::new(Scope::Temporary, "in")),
                    Operand::Literal(Value::Type(TypeTag::Int)),
                ],
            ),
            Instruction::new(
                Opcode::JumpIfNeq,
                2,
                vec![
                    Operand::Literal(Value::Label("loop".into())),
                    Operand::Literal(Value::Int(-3)),
                    Operand::Literal(Value::Nil),
                ],
            ),
            Instruction::new(
                Opcode::Write,
                3,
                vec![Operand::Literal(Value::Text("a b#\\".into()))],
            ),
            Instruction::new(Opcode::Break, 4, vec![]),
        ]);
        assert_eq!(
            disassemble(&program),
            ".IPPcode24\n\
             READ TF@in int\n\
             JUMPIFNEQ loop int@-3 nil@nil\n\
             WRITE string@a\\032b\\035\\092\n\
             BREAK\n"
        );
    }
}
