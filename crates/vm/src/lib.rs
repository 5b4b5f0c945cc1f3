//! IPPcode virtual machine: executes loaded instruction sequences.
//!
//! The VM is a tree-walking interpreter with:
//! - A global frame, an optional temporary frame and a stack of local frames
//! - A data stack for PUSHS/POPS
//! - A call stack of return addresses for CALL/RETURN
//! - A label map built once before execution
//!
//! # Usage
//!
//! ```
//! use ippvm_common::{Program, RawArg, RawInstruction, RawProgram};
//! use ippvm_vm::io::{CapturedOutput, NoInput};
//! use ippvm_vm::{run, Outcome};
//!
//! let raw = RawProgram::new(vec![
//!     RawInstruction::new(1, "WRITE", vec![RawArg::new(1, "string", "hi")]),
//! ]);
//! let program = Program::from_raw(&raw).unwrap();
//!
//! let mut output = CapturedOutput::new();
//! let outcome = run(&program, &mut NoInput, &mut output).unwrap();
//! assert_eq!(outcome, Outcome::Completed);
//! assert_eq!(output.stdout, "hi");
//! ```

pub mod config;
pub mod error;
pub mod execute;
pub mod frame;
pub mod io;
pub mod machine;
pub mod stack;

pub use config::VmConfig;
pub use error::RuntimeError;
pub use frame::{Frame, FrameError, FrameHandler, Variable};
pub use machine::{build_labels, Outcome, Vm};
pub use stack::{EmptyStack, Stack};

use io::{Input, Output};
use ippvm_common::Program;

/// Execute a program with default limits.
///
/// # Errors
///
/// Returns [`RuntimeError`] if the label map cannot be built or any
/// instruction fails. Output written before the failure stays written.
pub fn run(
    program: &Program,
    input: &mut dyn Input,
    output: &mut dyn Output,
) -> Result<Outcome, RuntimeError> {
    run_with_config(program, input, output, VmConfig::default())
}

/// Execute a program with explicit limits.
pub fn run_with_config(
    program: &Program,
    input: &mut dyn Input,
    output: &mut dyn Output,
    config: VmConfig,
) -> Result<Outcome, RuntimeError> {
    let mut vm = Vm::with_config(program, input, output, config)?;
    vm.execute()
}
