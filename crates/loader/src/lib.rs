//! calcvm bytecode loader: textual records ↔ instruction array.
//!
//! The loader is a mechanical 1:1 translation between the record text the
//! calculator compiler writes and the [`Program`] the interpreter runs.
//!
//! # Usage
//!
//! ```
//! use calcvm_common::Datum;
//! use calcvm_loader::{dump, load};
//!
//! let text = "ist 1 1 main\nint 42\nist 19 1 main\nsource\n";
//! let program = load(text).unwrap();
//! assert_eq!(program.code[1], Datum::Integer(42));
//! assert_eq!(dump(&program).unwrap(), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `load(dump(program)) == program` holds for every program made of
//! integers, reals, instruction records and `none`.

pub mod error;

mod decoder;
mod encoder;
mod lexer;

pub use error::FormatError;

use calcvm_common::{Program, MAX_PROGRAM_SIZE};
use decoder::Decoder;

/// Decode record text into a program of at most [`MAX_PROGRAM_SIZE`] datums.
///
/// Returns the first error encountered.
pub fn load(text: &str) -> Result<Program, FormatError> {
    load_with_capacity(text, MAX_PROGRAM_SIZE)
}

/// Decode record text with an explicit capacity.
pub fn load_with_capacity(text: &str, capacity: usize) -> Result<Program, FormatError> {
    let program = Decoder::new(text).decode(capacity)?;
    tracing::debug!(
        datums = program.len(),
        instructions = program.instruction_count(),
        "loaded program"
    );
    Ok(program)
}

/// Encode a program into canonical record text.
pub fn dump(program: &Program) -> Result<String, FormatError> {
    encoder::encode(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcvm_common::{Datum, Opcode, ProgramBuilder};

    #[test]
    fn load_minimal() {
        let program = load("ist 19 1 main\nsource\n").unwrap();
        assert_eq!(program.len(), 1);
        let instr = program.code[0].as_instruction().unwrap();
        assert_eq!(instr.opcode(), Ok(Opcode::End));
    }

    #[test]
    fn dump_minimal() {
        let program = ProgramBuilder::new().op(Opcode::End).build();
        assert_eq!(dump(&program).unwrap(), "ist 19 0 ?\nsource\n");
    }

    #[test]
    fn roundtrip_dump_then_load() {
        let original = ProgramBuilder::new()
            .constant(2i64)
            .constant(0.1f64)
            .op_at(Opcode::Add, 3, "sum.calc")
            .op(Opcode::End)
            .build();
        let text = dump(&original).unwrap();
        assert_eq!(load(&text).unwrap(), original);
    }

    #[test]
    fn roundtrip_load_then_dump_then_load() {
        let text = "bytecode 0 0 0 (unstable)\nist 1 0 ?\nflt 1e300\nist 19 0 ?\nsource\n";
        let first = load(text).unwrap();
        let canonical = dump(&first).unwrap();
        let second = load(&canonical).unwrap();
        assert_eq!(first, second);
        assert_eq!(second.code[1], Datum::Real(1e300));
    }

    #[test]
    fn str_record_decodes_to_none_and_dumps_as_nul() {
        let program = load("str name source").unwrap();
        assert_eq!(program.code, vec![Datum::None]);
        assert_eq!(dump(&program).unwrap(), "nul\nsource\n");
    }

    #[test]
    fn default_capacity_is_enforced() {
        let mut text = "int 0\n".repeat(MAX_PROGRAM_SIZE);
        text.push_str("source\n");
        assert_eq!(load(&text).unwrap().len(), MAX_PROGRAM_SIZE);

        let mut text = "int 0\n".repeat(MAX_PROGRAM_SIZE + 1);
        text.push_str("source\n");
        assert_eq!(
            load(&text).unwrap_err(),
            FormatError::CapacityExceeded {
                capacity: MAX_PROGRAM_SIZE
            }
        );
    }

    #[test]
    fn error_reports_first_unknown_record() {
        let err = load("int 1\nfoo\nbar\nsource").unwrap_err();
        assert!(matches!(err, FormatError::UnknownRecord { record: 1, line: 2, .. }));
    }
}
