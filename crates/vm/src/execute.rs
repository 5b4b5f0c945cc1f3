//! Main execution loop and opcode dispatch for the IPPcode VM.

use crate::error::RuntimeError;
use crate::machine::{Flow, Outcome, Vm};
use ippvm_common::{Instruction, Opcode, Operand, Value};
use std::cmp::Ordering;
use tracing::{debug, trace, warn};

impl<'a> Vm<'a> {
    /// Execute the program until it runs off the end, exits, or fails.
    pub fn execute(&mut self) -> Result<Outcome, RuntimeError> {
        loop {
            if let Some(outcome) = self.step()? {
                return Ok(outcome);
            }
        }
    }

    /// Execute one instruction.
    ///
    /// Returns `Some` once the run has ended. An instruction that does not
    /// transfer control advances the pointer by one; a taken jump, CALL or
    /// RETURN leaves it at the target.
    pub fn step(&mut self) -> Result<Option<Outcome>, RuntimeError> {
        let program = self.program;
        let Some(instr) = program.instructions.get(self.ip) else {
            debug!(steps = self.steps, "program completed");
            return Ok(Some(Outcome::Completed));
        };

        if let Some(limit) = self.config.max_steps {
            if self.steps >= limit {
                warn!(limit, ip = self.ip, "step limit reached");
                return Err(RuntimeError::StepLimitExceeded { at: self.ip, limit });
            }
        }
        self.steps += 1;
        trace!(ip = self.ip, opcode = %instr.opcode, "execute");

        match self.dispatch(instr)? {
            Flow::Next => self.ip += 1,
            Flow::Jump(target) => self.ip = target,
            Flow::Exit(code) => {
                debug!(code, steps = self.steps, "program exited");
                return Ok(Some(Outcome::Exited(code)));
            }
        }
        Ok(None)
    }

    fn dispatch(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let op = instr.opcode;
        match op {
            // Frames and calls
            Opcode::Move => self.exec_move(instr),
            Opcode::CreateFrame => {
                self.frames.create_frame();
                Ok(Flow::Next)
            }
            Opcode::PushFrame => {
                self.frames.push_frame().map_err(|e| self.frame_error(e))?;
                Ok(Flow::Next)
            }
            Opcode::PopFrame => {
                self.frames.pop_frame().map_err(|e| self.frame_error(e))?;
                Ok(Flow::Next)
            }
            Opcode::DefVar => self.exec_defvar(instr),
            Opcode::Call => self.exec_call(instr),
            Opcode::Return => self.exec_return(),

            // Data stack
            Opcode::PushS => self.exec_pushs(instr),
            Opcode::PopS => self.exec_pops(instr),

            // Arithmetic
            Opcode::Add => self.exec_arith(instr, |a, b| Some(a.wrapping_add(b))),
            Opcode::Sub => self.exec_arith(instr, |a, b| Some(a.wrapping_sub(b))),
            Opcode::Mul => self.exec_arith(instr, |a, b| Some(a.wrapping_mul(b))),
            Opcode::IDiv => self.exec_arith(instr, |a, b| {
                if b == 0 {
                    None
                } else {
                    Some(a.wrapping_div(b))
                }
            }),

            // Relational and boolean
            Opcode::Lt => self.exec_relational(instr, Ordering::Less),
            Opcode::Gt => self.exec_relational(instr, Ordering::Greater),
            Opcode::Eq => self.exec_eq(instr),
            Opcode::And => self.exec_logic(instr, |a, b| a && b),
            Opcode::Or => self.exec_logic(instr, |a, b| a || b),
            Opcode::Not => self.exec_not(instr),

            // Conversions and strings
            Opcode::Int2Char => self.exec_int2char(instr),
            Opcode::Stri2Int => self.exec_stri2int(instr),
            Opcode::Concat => self.exec_concat(instr),
            Opcode::StrLen => self.exec_strlen(instr),
            Opcode::GetChar => self.exec_getchar(instr),
            Opcode::SetChar => self.exec_setchar(instr),
            Opcode::Type => self.exec_type(instr),

            // I/O
            Opcode::Read => self.exec_read(instr),
            Opcode::Write => self.exec_write(instr),

            // Control flow
            Opcode::Label => Ok(Flow::Next),
            Opcode::Jump => {
                let label = self.label_arg(instr, 0)?;
                Ok(Flow::Jump(self.jump_target(label)?))
            }
            Opcode::JumpIfEq => self.exec_conditional_jump(instr, true),
            Opcode::JumpIfNeq => self.exec_conditional_jump(instr, false),
            Opcode::Exit => self.exec_exit(instr),

            // Debugging
            Opcode::DPrint => self.exec_dprint(instr),
            Opcode::Break => {
                let summary = self.state_summary();
                self.diagnostic(&summary)?;
                Ok(Flow::Next)
            }
        }
    }

    // ---- Frames, calls, data stack ----

    fn exec_move(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let value = self.read(self.symb_arg(instr, 1)?)?;
        self.store(dest, value)?;
        Ok(Flow::Next)
    }

    fn exec_defvar(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let var = self.var_arg(instr, 0)?;
        self.frames.declare(var).map_err(|e| self.frame_error(e))?;
        Ok(Flow::Next)
    }

    fn exec_call(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let label = self.label_arg(instr, 0)?;
        let target = self.jump_target(label)?;
        self.call_stack.push(self.ip + 1);
        trace!(label, depth = self.call_stack.len(), "call");
        Ok(Flow::Jump(target))
    }

    fn exec_return(&mut self) -> Result<Flow, RuntimeError> {
        let address = self
            .call_stack
            .pop()
            .map_err(|_| RuntimeError::EmptyCallStack { at: self.ip })?;
        Ok(Flow::Jump(address))
    }

    fn exec_pushs(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let value = self.read(self.symb_arg(instr, 0)?)?;
        self.data_stack.push(value);
        Ok(Flow::Next)
    }

    fn exec_pops(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let value = self
            .data_stack
            .pop()
            .map_err(|_| RuntimeError::EmptyDataStack { at: self.ip })?;
        self.store(dest, value)?;
        Ok(Flow::Next)
    }

    // ---- Arithmetic, relational, boolean ----

    /// Integer arithmetic. `op` returns `None` for division by zero.
    fn exec_arith(
        &mut self,
        instr: &Instruction,
        op: fn(i64, i64) -> Option<i64>,
    ) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let a = self.read_int(instr.opcode, self.symb_arg(instr, 1)?)?;
        let b = self.read_int(instr.opcode, self.symb_arg(instr, 2)?)?;
        let result = op(a, b).ok_or(RuntimeError::DivisionByZero { at: self.ip })?;
        self.store(dest, Value::Int(result))?;
        Ok(Flow::Next)
    }

    /// Order two values of the same non-nil type.
    fn compare(&self, opcode: Opcode, a: &Value, b: &Value) -> Result<Ordering, RuntimeError> {
        if a.is_nil() {
            return Err(self.type_error(opcode, "non-nil", a));
        }
        if b.is_nil() {
            return Err(self.type_error(opcode, "non-nil", b));
        }
        match (a, b) {
            (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
            (Value::Bool(x), Value::Bool(y)) => Ok(x.cmp(y)),
            (Value::Text(x), Value::Text(y)) => Ok(x.cmp(y)),
            _ => Err(self.type_error(opcode, a.type_name(), b)),
        }
    }

    /// Equality: nil equals only nil; otherwise both sides must share a type.
    fn equals(&self, opcode: Opcode, a: &Value, b: &Value) -> Result<bool, RuntimeError> {
        if a.is_nil() || b.is_nil() {
            return Ok(a.is_nil() && b.is_nil());
        }
        if !a.same_type(b) {
            return Err(self.type_error(opcode, a.type_name(), b));
        }
        Ok(a == b)
    }

    fn exec_relational(&mut self, instr: &Instruction, wanted: Ordering) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let a = self.read(self.symb_arg(instr, 1)?)?;
        let b = self.read(self.symb_arg(instr, 2)?)?;
        let ordering = self.compare(instr.opcode, &a, &b)?;
        self.store(dest, Value::Bool(ordering == wanted))?;
        Ok(Flow::Next)
    }

    fn exec_eq(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let a = self.read(self.symb_arg(instr, 1)?)?;
        let b = self.read(self.symb_arg(instr, 2)?)?;
        let equal = self.equals(instr.opcode, &a, &b)?;
        self.store(dest, Value::Bool(equal))?;
        Ok(Flow::Next)
    }

    fn exec_logic(&mut self, instr: &Instruction, op: fn(bool, bool) -> bool) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let a = self.read_bool(instr.opcode, self.symb_arg(instr, 1)?)?;
        let b = self.read_bool(instr.opcode, self.symb_arg(instr, 2)?)?;
        self.store(dest, Value::Bool(op(a, b)))?;
        Ok(Flow::Next)
    }

    fn exec_not(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let a = self.read_bool(instr.opcode, self.symb_arg(instr, 1)?)?;
        self.store(dest, Value::Bool(!a))?;
        Ok(Flow::Next)
    }

    // ---- Conversions and strings ----

    /// Character at a code-point position, or an out-of-range error.
    fn char_at(&self, opcode: Opcode, text: &str, index: i64) -> Result<char, RuntimeError> {
        let out_of_range = || RuntimeError::IndexOutOfRange {
            at: self.ip,
            opcode,
            index,
            length: text.chars().count(),
        };
        let position = usize::try_from(index).map_err(|_| out_of_range())?;
        text.chars().nth(position).ok_or_else(out_of_range)
    }

    fn exec_int2char(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let code = self.read_int(instr.opcode, self.symb_arg(instr, 1)?)?;
        let c = u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .ok_or(RuntimeError::InvalidCodePoint {
                at: self.ip,
                value: code,
            })?;
        self.store(dest, Value::Text(c.to_string()))?;
        Ok(Flow::Next)
    }

    fn exec_stri2int(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let text = self.read_text(instr.opcode, self.symb_arg(instr, 1)?)?;
        let index = self.read_int(instr.opcode, self.symb_arg(instr, 2)?)?;
        let c = self.char_at(instr.opcode, &text, index)?;
        self.store(dest, Value::Int(i64::from(u32::from(c))))?;
        Ok(Flow::Next)
    }

    fn exec_concat(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let mut a = self.read_text(instr.opcode, self.symb_arg(instr, 1)?)?;
        let b = self.read_text(instr.opcode, self.symb_arg(instr, 2)?)?;
        a.push_str(&b);
        self.store(dest, Value::Text(a))?;
        Ok(Flow::Next)
    }

    fn exec_strlen(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let text = self.read_text(instr.opcode, self.symb_arg(instr, 1)?)?;
        self.store(dest, Value::Int(text.chars().count() as i64))?;
        Ok(Flow::Next)
    }

    fn exec_getchar(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let text = self.read_text(instr.opcode, self.symb_arg(instr, 1)?)?;
        let index = self.read_int(instr.opcode, self.symb_arg(instr, 2)?)?;
        let c = self.char_at(instr.opcode, &text, index)?;
        self.store(dest, Value::Text(c.to_string()))?;
        Ok(Flow::Next)
    }

    /// Replace the character at a position in the destination's string with
    /// the first character of the third operand.
    fn exec_setchar(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        let target = match self.read(&Operand::Variable(dest.clone()))? {
            Value::Text(s) => s,
            other => return Err(self.type_error(instr.opcode, "string", &other)),
        };
        let index = self.read_int(instr.opcode, self.symb_arg(instr, 1)?)?;
        let replacement = self.read_text(instr.opcode, self.symb_arg(instr, 2)?)?;

        self.char_at(instr.opcode, &target, index)?;
        let new_char = replacement
            .chars()
            .next()
            .ok_or(RuntimeError::EmptyReplacement { at: self.ip })?;

        let updated: String = target
            .chars()
            .enumerate()
            .map(|(i, c)| if i as i64 == index { new_char } else { c })
            .collect();
        self.store(dest, Value::Text(updated))?;
        Ok(Flow::Next)
    }

    fn exec_type(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let name = self
            .read_raw(self.symb_arg(instr, 1)?)?
            .map(|v| v.type_name())
            .unwrap_or("");
        self.store(dest, Value::Text(name.to_string()))?;
        Ok(Flow::Next)
    }

    // ---- I/O ----

    fn exec_read(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let dest = self.var_arg(instr, 0)?;
        self.check_dest(dest)?;
        let ty = self.type_arg(instr, 1)?;
        let value = self.input.read_value(ty).unwrap_or(Value::Nil);
        self.store(dest, value)?;
        Ok(Flow::Next)
    }

    fn exec_write(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let value = self.read(self.symb_arg(instr, 0)?)?;
        let at = self.ip;
        self.output
            .write_value(&value)
            .map_err(|e| RuntimeError::Output {
                at,
                message: e.to_string(),
            })?;
        Ok(Flow::Next)
    }

    fn diagnostic(&mut self, text: &str) -> Result<(), RuntimeError> {
        let at = self.ip;
        self.output
            .write_diagnostic(text)
            .map_err(|e| RuntimeError::Output {
                at,
                message: e.to_string(),
            })
    }

    fn exec_dprint(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let text = self
            .read_raw(self.symb_arg(instr, 0)?)?
            .map(|v| v.to_string())
            .unwrap_or_default();
        self.diagnostic(&text)?;
        Ok(Flow::Next)
    }

    // ---- Control flow ----

    /// JUMPIFEQ (`on_equal == true`) and JUMPIFNEQ. The operands are
    /// compared first, so a type mismatch fails whether or not the jump
    /// would be taken. The label is resolved only when the jump is taken.
    fn exec_conditional_jump(&mut self, instr: &Instruction, on_equal: bool) -> Result<Flow, RuntimeError> {
        let label = self.label_arg(instr, 0)?;
        let a = self.read(self.symb_arg(instr, 1)?)?;
        let b = self.read(self.symb_arg(instr, 2)?)?;
        if self.equals(instr.opcode, &a, &b)? == on_equal {
            Ok(Flow::Jump(self.jump_target(label)?))
        } else {
            Ok(Flow::Next)
        }
    }

    fn exec_exit(&mut self, instr: &Instruction) -> Result<Flow, RuntimeError> {
        let code = self.read_int(instr.opcode, self.symb_arg(instr, 0)?)?;
        match u8::try_from(code) {
            Ok(c) if c <= 9 => Ok(Flow::Exit(c)),
            _ => Err(RuntimeError::InvalidExitCode { at: self.ip, code }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{CapturedOutput, NoInput};
    use ippvm_common::{Program, Scope, VarRef};

    fn gf(name: &str) -> Operand {
        Operand::Variable(VarRef::new(Scope::Global, name))
    }

    fn int(n: i64) -> Operand {
        Operand::Literal(Value::Int(n))
    }

    fn program(instrs: Vec<(Opcode, Vec<Operand>)>) -> Program {
        Program::new(
            instrs
                .into_iter()
                .enumerate()
                .map(|(i, (op, args))| Instruction::new(op, i as i64 + 1, args))
                .collect(),
        )
    }

    #[test]
    fn step_advances_pointer_for_plain_instructions() {
        let program = program(vec![
            (Opcode::DefVar, vec![gf("x")]),
            (Opcode::Move, vec![gf("x"), int(1)]),
        ]);
        let mut input = NoInput;
        let mut output = CapturedOutput::new();
        let mut vm = Vm::new(&program, &mut input, &mut output).unwrap();

        assert_eq!(vm.step(), Ok(None));
        assert_eq!(vm.ip(), 1);
        assert_eq!(vm.step(), Ok(None));
        assert_eq!(vm.ip(), 2);
        assert_eq!(vm.step(), Ok(Some(Outcome::Completed)));
        assert_eq!(vm.steps(), 2);
    }

    #[test]
    fn failed_pops_leaves_stack_untouched() {
        let program = program(vec![
            (Opcode::PushS, vec![int(1)]),
            (Opcode::PopS, vec![gf("missing")]),
        ]);
        let mut input = NoInput;
        let mut output = CapturedOutput::new();
        let mut vm = Vm::new(&program, &mut input, &mut output).unwrap();

        let err = vm.execute().unwrap_err();
        assert_eq!(err.kind(), ippvm_common::ErrorKind::VariableAccess);
        assert_eq!(vm.data_stack().len(), 1);
    }

    #[test]
    fn failed_call_leaves_call_stack_untouched() {
        let program = program(vec![(
            Opcode::Call,
            vec![Operand::Literal(Value::Label("nowhere".into()))],
        )]);
        let mut input = NoInput;
        let mut output = CapturedOutput::new();
        let mut vm = Vm::new(&program, &mut input, &mut output).unwrap();

        assert!(matches!(
            vm.execute(),
            Err(RuntimeError::UndefinedLabel { at: 0, .. })
        ));
        assert!(vm.call_stack().is_empty());
    }

    #[test]
    fn malformed_operand_is_reported() {
        let program = program(vec![(Opcode::DefVar, vec![int(3)])]);
        let mut input = NoInput;
        let mut output = CapturedOutput::new();
        let mut vm = Vm::new(&program, &mut input, &mut output).unwrap();

        assert_eq!(
            vm.execute(),
            Err(RuntimeError::MalformedOperand {
                at: 0,
                opcode: Opcode::DefVar,
                index: 0,
            })
        );
    }
}
