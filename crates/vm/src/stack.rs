//! Generic LIFO used for the call stack, the data stack and local frames.
//!
//! Pop and peek on an empty stack return [`EmptyStack`]; callers decide
//! which runtime error that becomes.

use thiserror::Error;

/// Pop or peek on an empty stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("stack is empty")]
pub struct EmptyStack;

/// An unbounded stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Push an item. Always succeeds.
    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    /// Remove and return the top item.
    pub fn pop(&mut self) -> Result<T, EmptyStack> {
        self.items.pop().ok_or(EmptyStack)
    }

    /// Borrow the top item without removing it.
    pub fn peek(&self) -> Result<&T, EmptyStack> {
        self.items.last().ok_or(EmptyStack)
    }

    /// Mutably borrow the top item without removing it.
    pub fn peek_mut(&mut self) -> Result<&mut T, EmptyStack> {
        self.items.last_mut().ok_or(EmptyStack)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}
