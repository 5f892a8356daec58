//! Datum tags.
//!
//! Every [`Datum`](crate::Datum) carries exactly one tag. Tags are used in
//! diagnostics and by the typed accessors to report what was expected and
//! what was actually found.

use std::fmt;

/// Identifies the variant of a [`Datum`](crate::Datum).
///
/// The discriminants match the type codes of the original bytecode
/// interpreter so that dumps and diagnostics stay comparable.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// No value.
    None = 0,
    /// An opcode record from the instruction stream.
    Instruction = 1,
    /// Signed 64-bit integer.
    Integer = 2,
    /// IEEE 754 double.
    Real = 3,
    /// Code address plus captured scope.
    Function = 4,
    /// Immutable cons list or the empty sentinel.
    List = 5,
    /// Handle to an environment frame.
    Scope = 6,
}

/// All tags, in discriminant order.
pub const ALL_TAGS: [Tag; 7] = [
    Tag::None,
    Tag::Instruction,
    Tag::Integer,
    Tag::Real,
    Tag::Function,
    Tag::List,
    Tag::Scope,
];

impl Tag {
    /// Lowercase name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Tag::None => "none",
            Tag::Instruction => "instruction",
            Tag::Integer => "integer",
            Tag::Real => "real",
            Tag::Function => "function",
            Tag::List => "list",
            Tag::Scope => "scope",
        }
    }

    /// Returns true for the tags arithmetic operators accept.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Tag::Integer | Tag::Real)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
