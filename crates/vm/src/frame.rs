//! Variables, frames and the frame handler.
//!
//! There is exactly one global frame, at most one pending (temporary)
//! frame, and a stack of local frames whose top is the innermost scope.
//! The three scopes are disjoint namespaces.

use crate::stack::Stack;
use ippvm_common::{ErrorKind, Scope, Value, VarRef};
use std::collections::HashMap;
use thiserror::Error;
use tracing::trace;

/// Failures while declaring or resolving variables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// `LF@..` used while the local frame stack is empty.
    #[error("local frame does not exist")]
    NoLocalFrame,

    /// `TF@..` used, or PUSHFRAME executed, with no pending frame.
    #[error("temporary frame does not exist")]
    NoTemporaryFrame,

    /// DEFVAR of a name already present in the target frame.
    #[error("variable {0} is already defined")]
    Redefinition(String),

    /// Reference to a name missing from an existing frame.
    #[error("variable {0} is not defined")]
    Undefined(String),
}

impl FrameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameError::NoLocalFrame | FrameError::NoTemporaryFrame => ErrorKind::FrameAccess,
            FrameError::Redefinition(_) => ErrorKind::Semantic,
            FrameError::Undefined(_) => ErrorKind::VariableAccess,
        }
    }
}

/// A named, possibly uninitialized value cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    value: Option<Value>,
}

impl Variable {
    /// A declared but never written variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value, `None` until first written.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn set(&mut self, value: Value) {
        self.value = Some(value);
    }

    pub fn is_initialized(&self) -> bool {
        self.value.is_some()
    }
}

/// A mapping from variable name to variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    variables: HashMap<String, Variable>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new, uninitialized variable.
    pub fn declare(&mut self, name: &str) -> Result<(), FrameError> {
        if self.variables.contains_key(name) {
            return Err(FrameError::Redefinition(name.to_string()));
        }
        self.variables.insert(name.to_string(), Variable::new(name));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Variable, FrameError> {
        self.variables
            .get(name)
            .ok_or_else(|| FrameError::Undefined(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Variable, FrameError> {
        self.variables
            .get_mut(name)
            .ok_or_else(|| FrameError::Undefined(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Owns every frame and resolves `<scope>@<name>` references.
#[derive(Debug, Clone, Default)]
pub struct FrameHandler {
    global: Frame,
    temporary: Option<Frame>,
    locals: Stack<Frame>,
}

impl FrameHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn frame(&self, scope: Scope) -> Result<&Frame, FrameError> {
        match scope {
            Scope::Global => Ok(&self.global),
            Scope::Local => self.locals.peek().map_err(|_| FrameError::NoLocalFrame),
            Scope::Temporary => self.temporary.as_ref().ok_or(FrameError::NoTemporaryFrame),
        }
    }

    fn frame_mut(&mut self, scope: Scope) -> Result<&mut Frame, FrameError> {
        match scope {
            Scope::Global => Ok(&mut self.global),
            Scope::Local => self.locals.peek_mut().map_err(|_| FrameError::NoLocalFrame),
            Scope::Temporary => self.temporary.as_mut().ok_or(FrameError::NoTemporaryFrame),
        }
    }

    /// Declare `var` in its scope's frame.
    pub fn declare(&mut self, var: &VarRef) -> Result<(), FrameError> {
        self.frame_mut(var.scope)?
            .declare(&var.name)
            .map_err(|_| FrameError::Redefinition(var.to_string()))
    }

    /// Resolve `var` to its variable.
    pub fn lookup(&self, var: &VarRef) -> Result<&Variable, FrameError> {
        self.frame(var.scope)?
            .get(&var.name)
            .map_err(|_| FrameError::Undefined(var.to_string()))
    }

    /// Resolve `var` to its variable, mutably.
    pub fn lookup_mut(&mut self, var: &VarRef) -> Result<&mut Variable, FrameError> {
        self.frame_mut(var.scope)?
            .get_mut(&var.name)
            .map_err(|_| FrameError::Undefined(var.to_string()))
    }

    /// Replace any pending frame with a fresh empty one.
    pub fn create_frame(&mut self) {
        self.temporary = Some(Frame::new());
        trace!("temporary frame created");
    }

    /// Move the pending frame onto the local frame stack.
    pub fn push_frame(&mut self) -> Result<(), FrameError> {
        let frame = self.temporary.take().ok_or(FrameError::NoTemporaryFrame)?;
        self.locals.push(frame);
        trace!(depth = self.locals.len(), "frame pushed");
        Ok(())
    }

    /// Move the top local frame back to pending, replacing any pending frame.
    pub fn pop_frame(&mut self) -> Result<(), FrameError> {
        let frame = self.locals.pop().map_err(|_| FrameError::NoLocalFrame)?;
        self.temporary = Some(frame);
        trace!(depth = self.locals.len(), "frame popped");
        Ok(())
    }

    pub fn global(&self) -> &Frame {
        &self.global
    }

    pub fn temporary(&self) -> Option<&Frame> {
        self.temporary.as_ref()
    }

    /// Number of local frames on the stack.
    pub fn local_depth(&self) -> usize {
        self.locals.len()
    }
}
