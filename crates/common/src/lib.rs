//! calcvm common types.
//!
//! This crate provides the value model shared by the loader and the
//! interpreter:
//!
//! - [`Datum`]: tagged runtime value, with [`Function`] closures and
//!   immutable [`List`]s
//! - [`Tag`]: the variant names used in diagnostics
//! - [`Instruction`] / [`Opcode`]: opcode records and the opcode table
//! - [`Scope`]: the reference-counted lexical scope chain
//! - [`Program`]: the flat instruction array
//!
//! # Dependencies
//!
//! This crate uses `thiserror` and has no other dependencies.

pub mod datum;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod scope;
pub mod tag;

// Re-export commonly used types at the crate root.
pub use datum::{Datum, Function, List};
pub use error::{DecodeError, ScopeError, TypeMismatch};
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use program::{
    Program, ProgramBuilder, FUNCTION_HEADER_LEN, HEADER_PARAMETERS, HEADER_VARIADIC,
    MAX_PROGRAM_SIZE,
};
pub use scope::Scope;
pub use tag::Tag;

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_opcode() -> impl Strategy<Value = Opcode> {
        prop::sample::select(&opcode::ALL_OPCODES[..])
    }

    proptest! {
        /// Every defined opcode survives a trip through its raw id.
        #[test]
        fn opcode_id_roundtrip(op in arb_opcode()) {
            let instr = Instruction::bare(op);
            prop_assert_eq!(instr.opcode(), Ok(op));
        }

        /// Arbitrary ids either decode to an opcode with that id or are
        /// reported back unchanged.
        #[test]
        fn arbitrary_id_decode(id in any::<u32>()) {
            match Opcode::try_from(id) {
                Ok(op) => prop_assert_eq!(op as u32, id),
                Err(DecodeError::UnknownOpcode(bad)) => prop_assert_eq!(bad, id),
            }
        }

        /// Writes through `set` are visible from any descendant frame.
        #[test]
        fn set_visible_from_descendants(
            index in 0usize..32,
            value in any::<i64>(),
            depth in 0usize..8,
        ) {
            let global = Scope::global();
            global.set(index, Datum::Integer(value));
            let mut scope = global.clone();
            for _ in 0..depth {
                scope = scope.child();
            }
            prop_assert_eq!(scope.get(index), Ok(Datum::Integer(value)));
        }

        /// Integer truthiness is exactly "non-zero".
        #[test]
        fn integer_truthiness(value in any::<i64>()) {
            prop_assert_eq!(Datum::Integer(value).is_truthy(), value != 0);
        }
    }
}
