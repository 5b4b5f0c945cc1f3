//! IPPcode common types.
//!
//! This crate provides the foundational data structures shared by the
//! loader, verifier and virtual machine:
//!
//! - [`Opcode`]: the 35-opcode vocabulary and argument signatures
//! - [`TypeTag`]: `int`, `bool`, `string` type names
//! - [`Value`]: runtime values
//! - [`Operand`]: argument descriptors (literal or variable reference)
//! - [`Instruction`] / [`Program`]: bound, order-sorted instructions
//! - [`RawProgram`]: unvalidated loader records (JSON via serde, XML via roxmltree)
//! - [`ErrorKind`]: the exit-code table, and [`LoadError`]

pub mod error;
pub mod instruction;
pub mod opcode;
pub mod operand;
pub mod program;
pub mod raw;
pub mod type_tag;
pub mod value;
mod xml;

// Re-export commonly used types at the crate root.
pub use error::{ErrorKind, LoadError};
pub use instruction::Instruction;
pub use opcode::{ArgSlot, Opcode};
pub use operand::{Operand, Scope, VarRef};
pub use program::Program;
pub use raw::{RawArg, RawInstruction, RawProgram};
pub use type_tag::TypeTag;
pub use value::Value;
