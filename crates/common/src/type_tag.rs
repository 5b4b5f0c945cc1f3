//! Type names usable as `type` literals (READ's second argument).

use std::fmt;

/// A primitive type name: `int`, `bool` or `string`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Signed 64-bit integer.
    Int,
    /// Boolean.
    Bool,
    /// Unicode text.
    String,
}

/// All type tags, in definition order.
pub const ALL_TYPE_TAGS: [TypeTag; 3] = [TypeTag::Int, TypeTag::Bool, TypeTag::String];

impl TypeTag {
    /// Source-level name of this type.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Int => "int",
            TypeTag::Bool => "bool",
            TypeTag::String => "string",
        }
    }

    /// Look up a type by its exact source-level name.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_TYPE_TAGS.iter().find(|tt| tt.name() == name).copied()
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
