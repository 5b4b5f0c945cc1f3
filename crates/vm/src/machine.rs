//! VM state management: frames, stacks, labels, instruction pointer.

use crate::config::VmConfig;
use crate::error::RuntimeError;
use crate::frame::{FrameError, FrameHandler};
use crate::io::{Input, Output};
use crate::stack::Stack;
use ippvm_common::{Instruction, Opcode, Operand, Program, TypeTag, Value, VarRef};
use std::collections::HashMap;
use tracing::debug;

/// How a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The instruction pointer ran past the last instruction.
    Completed,
    /// EXIT with a code in 0..=9.
    Exited(u8),
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Completed => 0,
            Outcome::Exited(code) => code as i32,
        }
    }
}

/// Where execution continues after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Fall through to the next instruction.
    Next,
    /// Continue at this index.
    Jump(usize),
    /// Terminate the run.
    Exit(u8),
}

/// Map every LABEL name to its index in the sorted sequence.
pub fn build_labels(program: &Program) -> Result<HashMap<String, usize>, RuntimeError> {
    let mut labels = HashMap::new();

    for (index, instr) in program.instructions.iter().enumerate() {
        if instr.opcode != Opcode::Label {
            continue;
        }
        let Some(Operand::Literal(Value::Label(name))) = instr.arg(0) else {
            return Err(RuntimeError::MalformedOperand {
                at: index,
                opcode: Opcode::Label,
                index: 0,
            });
        };
        if labels.insert(name.clone(), index).is_some() {
            return Err(RuntimeError::DuplicateLabel {
                at: index,
                label: name.clone(),
            });
        }
    }

    Ok(labels)
}

/// The IPPcode virtual machine.
pub struct Vm<'a> {
    /// The program being executed, sorted by order.
    pub(crate) program: &'a Program,
    /// Label name to instruction index.
    pub(crate) labels: HashMap<String, usize>,
    /// Index of the instruction to execute next.
    pub(crate) ip: usize,
    pub(crate) frames: FrameHandler,
    /// Return addresses pushed by CALL.
    pub(crate) call_stack: Stack<usize>,
    /// Values pushed by PUSHS.
    pub(crate) data_stack: Stack<Value>,
    pub(crate) input: &'a mut dyn Input,
    pub(crate) output: &'a mut dyn Output,
    pub(crate) config: VmConfig,
    /// Number of instructions executed so far.
    pub(crate) steps: u64,
}

impl<'a> Vm<'a> {
    /// Create a VM for `program` and build its label map.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::DuplicateLabel`] if a label is defined twice.
    pub fn new(
        program: &'a Program,
        input: &'a mut dyn Input,
        output: &'a mut dyn Output,
    ) -> Result<Self, RuntimeError> {
        Self::with_config(program, input, output, VmConfig::default())
    }

    /// Like [`Vm::new`], with explicit limits.
    pub fn with_config(
        program: &'a Program,
        input: &'a mut dyn Input,
        output: &'a mut dyn Output,
        config: VmConfig,
    ) -> Result<Self, RuntimeError> {
        let labels = build_labels(program)?;
        debug!(
            instructions = program.len(),
            labels = labels.len(),
            "program loaded"
        );

        Ok(Self {
            program,
            labels,
            ip: 0,
            frames: FrameHandler::new(),
            call_stack: Stack::new(),
            data_stack: Stack::new(),
            input,
            output,
            config,
            steps: 0,
        })
    }

    /// Index of the next instruction to execute.
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Number of instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn frames(&self) -> &FrameHandler {
        &self.frames
    }

    pub fn data_stack(&self) -> &Stack<Value> {
        &self.data_stack
    }

    pub fn call_stack(&self) -> &Stack<usize> {
        &self.call_stack
    }

    /// Instruction index of a label, if defined.
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.labels.get(label).copied()
    }

    /// Value of a variable, `None` if uninitialized.
    pub fn variable(&self, var: &VarRef) -> Result<Option<&Value>, FrameError> {
        self.frames.lookup(var).map(|v| v.value())
    }

    // ---- Operand access ----

    fn malformed(&self, instr: &Instruction, index: usize) -> RuntimeError {
        RuntimeError::MalformedOperand {
            at: self.ip,
            opcode: instr.opcode,
            index,
        }
    }

    pub(crate) fn frame_error(&self, source: FrameError) -> RuntimeError {
        RuntimeError::Frame { at: self.ip, source }
    }

    /// The variable reference in slot `index`.
    pub(crate) fn var_arg<'i>(
        &self,
        instr: &'i Instruction,
        index: usize,
    ) -> Result<&'i VarRef, RuntimeError> {
        match instr.arg(index) {
            Some(Operand::Variable(var)) => Ok(var),
            _ => Err(self.malformed(instr, index)),
        }
    }

    /// The symbol (variable or constant) in slot `index`.
    pub(crate) fn symb_arg<'i>(
        &self,
        instr: &'i Instruction,
        index: usize,
    ) -> Result<&'i Operand, RuntimeError> {
        instr.arg(index).ok_or_else(|| self.malformed(instr, index))
    }

    /// The label name in slot `index`.
    pub(crate) fn label_arg<'i>(
        &self,
        instr: &'i Instruction,
        index: usize,
    ) -> Result<&'i str, RuntimeError> {
        match instr.arg(index) {
            Some(Operand::Literal(Value::Label(name))) => Ok(name),
            _ => Err(self.malformed(instr, index)),
        }
    }

    /// The type name in slot `index`.
    pub(crate) fn type_arg(&self, instr: &Instruction, index: usize) -> Result<TypeTag, RuntimeError> {
        match instr.arg(index) {
            Some(Operand::Literal(Value::Type(tag))) => Ok(*tag),
            _ => Err(self.malformed(instr, index)),
        }
    }

    /// Resolve an operand to its current value, or `None` for an
    /// uninitialized variable. Resolution happens on every execution.
    pub(crate) fn read_raw(&self, operand: &Operand) -> Result<Option<Value>, RuntimeError> {
        match operand {
            Operand::Literal(value) => Ok(Some(value.clone())),
            Operand::Variable(var) => {
                let variable = self.frames.lookup(var).map_err(|e| self.frame_error(e))?;
                Ok(variable.value().cloned())
            }
        }
    }

    /// Resolve an operand that must be initialized.
    pub(crate) fn read(&self, operand: &Operand) -> Result<Value, RuntimeError> {
        self.read_raw(operand)?
            .ok_or_else(|| RuntimeError::Uninitialized {
                at: self.ip,
                var: operand.describe(),
            })
    }

    pub(crate) fn type_error(&self, opcode: Opcode, expected: &'static str, found: &Value) -> RuntimeError {
        RuntimeError::OperandType {
            at: self.ip,
            opcode,
            expected,
            found: found.type_name(),
        }
    }

    pub(crate) fn read_int(&self, opcode: Opcode, operand: &Operand) -> Result<i64, RuntimeError> {
        match self.read(operand)? {
            Value::Int(n) => Ok(n),
            other => Err(self.type_error(opcode, "int", &other)),
        }
    }

    pub(crate) fn read_bool(&self, opcode: Opcode, operand: &Operand) -> Result<bool, RuntimeError> {
        match self.read(operand)? {
            Value::Bool(b) => Ok(b),
            other => Err(self.type_error(opcode, "bool", &other)),
        }
    }

    pub(crate) fn read_text(&self, opcode: Opcode, operand: &Operand) -> Result<String, RuntimeError> {
        match self.read(operand)? {
            Value::Text(s) => Ok(s),
            other => Err(self.type_error(opcode, "string", &other)),
        }
    }

    /// Fail unless the destination variable exists. Called before any
    /// state is mutated so a failing instruction leaves no partial effect.
    pub(crate) fn check_dest(&self, var: &VarRef) -> Result<(), RuntimeError> {
        self.frames
            .lookup(var)
            .map(|_| ())
            .map_err(|e| self.frame_error(e))
    }

    /// Assign a value to a variable.
    pub(crate) fn store(&mut self, var: &VarRef, value: Value) -> Result<(), RuntimeError> {
        let at = self.ip;
        let variable = self
            .frames
            .lookup_mut(var)
            .map_err(|source| RuntimeError::Frame { at, source })?;
        variable.set(value);
        Ok(())
    }

    /// Index of a label, failing if it is not defined.
    pub(crate) fn jump_target(&self, label: &str) -> Result<usize, RuntimeError> {
        self.label_index(label)
            .ok_or_else(|| RuntimeError::UndefinedLabel {
                at: self.ip,
                label: label.to_string(),
            })
    }

    /// One-line summary of the engine state, printed by BREAK.
    pub(crate) fn state_summary(&self) -> String {
        let order = self
            .program
            .instructions
            .get(self.ip)
            .map(|instr| instr.order)
            .unwrap_or_default();
        format!(
            "BREAK at instruction {} (order {}): {} executed, {} global variable(s), \
             {} local frame(s), temporary frame {}, data stack {}, call stack {}",
            self.ip,
            order,
            self.steps,
            self.frames.global().len(),
            self.frames.local_depth(),
            if self.frames.temporary().is_some() {
                "present"
            } else {
                "absent"
            },
            self.data_stack.len(),
            self.call_stack.len(),
        )
    }
}
