//! Value-level errors shared by the loader and the interpreter.

use crate::tag::Tag;
use thiserror::Error;

/// Errors that occur while decoding an opcode id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The id is not part of the instruction set.
    #[error("unknown opcode id {0}")]
    UnknownOpcode(u32),
}

/// A typed accessor was applied to a datum of another tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("type mismatch: expected {expected}, found {found}")]
pub struct TypeMismatch {
    /// The tag the accessor requires.
    pub expected: Tag,
    /// The tag the datum actually carries.
    pub found: Tag,
}

/// Failures of a scope-chain lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScopeError {
    /// No frame on the chain has a slot at this index.
    #[error("unresolved slot {index}")]
    Unresolved { index: usize },

    /// The slot exists but was never written.
    #[error("uninitialized slot {index}")]
    Uninitialized { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_opcode() {
        assert_eq!(
            DecodeError::UnknownOpcode(99).to_string(),
            "unknown opcode id 99"
        );
    }

    #[test]
    fn display_type_mismatch() {
        let e = TypeMismatch {
            expected: Tag::Integer,
            found: Tag::Real,
        };
        assert_eq!(e.to_string(), "type mismatch: expected integer, found real");
    }

    #[test]
    fn display_scope_errors() {
        assert_eq!(
            ScopeError::Unresolved { index: 3 }.to_string(),
            "unresolved slot 3"
        );
        assert_eq!(
            ScopeError::Uninitialized { index: 0 }.to_string(),
            "uninitialized slot 0"
        );
    }
}
