//! Instruction records.
//!
//! An instruction record names an opcode and remembers where in the
//! calculator source it was compiled from. The opcode id is kept raw: an id
//! the table does not know survives loading and is only rejected when the
//! interpreter actually fetches it.

use crate::error::DecodeError;
use crate::opcode::Opcode;
use std::fmt;
use std::rc::Rc;

/// A single opcode record from the instruction stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Raw opcode id as written by the compiler.
    pub id: u32,
    /// Source line the instruction was compiled from (0 when unknown).
    pub line: u32,
    /// Source file name (`?` when unknown).
    pub file: Rc<str>,
}

impl Instruction {
    /// Create an instruction record from a raw id.
    pub fn new(id: u32, line: u32, file: impl Into<Rc<str>>) -> Self {
        Self {
            id,
            line,
            file: file.into(),
        }
    }

    /// Create an instruction record for a known opcode with no source location.
    pub fn bare(opcode: Opcode) -> Self {
        Self::new(opcode as u32, 0, "?")
    }

    /// Decode the opcode id.
    pub fn opcode(&self) -> Result<Opcode, DecodeError> {
        Opcode::try_from(self.id)
    }
}

impl From<Opcode> for Instruction {
    fn from(opcode: Opcode) -> Self {
        Self::bare(opcode)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {}]", self.id, self.line, self.file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_known_opcode() {
        let instr = Instruction::new(2, 7, "main.calc");
        assert_eq!(instr.opcode(), Ok(Opcode::Add));
        assert_eq!(instr.line, 7);
        assert_eq!(&*instr.file, "main.calc");
    }

    #[test]
    fn unknown_id_survives_construction() {
        let instr = Instruction::new(4242, 1, "x");
        assert_eq!(instr.opcode(), Err(DecodeError::UnknownOpcode(4242)));
    }

    #[test]
    fn bare_has_placeholder_location() {
        let instr = Instruction::bare(Opcode::End);
        assert_eq!(instr.id, 19);
        assert_eq!(instr.line, 0);
        assert_eq!(&*instr.file, "?");
    }

    #[test]
    fn display_format() {
        assert_eq!(Instruction::new(19, 3, "f").to_string(), "[19 3 f]");
    }

    #[test]
    fn equality_compares_file_contents() {
        let a = Instruction::new(1, 1, Rc::from("a"));
        let b = Instruction::new(1, 1, "a");
        assert_eq!(a, b);
        assert_ne!(a, Instruction::new(1, 2, "a"));
    }
}
