//! Program representation: the flat instruction array.
//!
//! Opcode records and their immediate operands share one array. A CONSTANT
//! record is followed by the literal it pushes, a JUMP by its target, and
//! so on; the interpreter consumes those extra slots as it goes.
//!
//! A function value points at a header rather than at its first
//! instruction:
//!
//! | Offset | Datum |
//! |---|---|
//! | 0 | `NOTHING`, the jump landing |
//! | 1 | name (a `str` record, so `None`) |
//! | 2 | parameter count |
//! | 3 | variadic flag |
//! | 4 | macro flag |
//!
//! The body starts at offset [`FUNCTION_HEADER_LEN`].

use crate::datum::Datum;
use crate::instruction::Instruction;
use crate::opcode::Opcode;

/// Capacity of the instruction array, in datums.
pub const MAX_PROGRAM_SIZE: usize = 4096;

/// Datums between a function's address and its first body instruction.
pub const FUNCTION_HEADER_LEN: usize = 5;

/// Header offset of the parameter count.
pub const HEADER_PARAMETERS: usize = 2;

/// Header offset of the variadic flag.
pub const HEADER_VARIADIC: usize = 3;

/// A loaded program.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// The instruction stream.
    pub code: Vec<Datum>,
}

impl Program {
    /// Create a program from an instruction array.
    pub fn new(code: Vec<Datum>) -> Self {
        Self { code }
    }

    /// Number of datums in the instruction array.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns true if the program has no datums.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// The datum at `address`, if in range.
    pub fn get(&self, address: usize) -> Option<&Datum> {
        self.code.get(address)
    }

    /// Number of opcode records (as opposed to immediate operands).
    pub fn instruction_count(&self) -> usize {
        self.code
            .iter()
            .filter(|datum| matches!(datum, Datum::Instruction(_)))
            .count()
    }
}

/// Incremental builder for hand-assembled programs.
///
/// Used by tests and tooling; the compiler-produced path goes through the
/// loader instead.
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    code: Vec<Datum>,
}

impl ProgramBuilder {
    /// Start an empty program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Address the next pushed datum will occupy.
    pub fn here(&self) -> usize {
        self.code.len()
    }

    /// Append an opcode record with no source location.
    pub fn op(mut self, opcode: Opcode) -> Self {
        self.code.push(Datum::Instruction(Instruction::bare(opcode)));
        self
    }

    /// Append an opcode record with a source location.
    pub fn op_at(mut self, opcode: Opcode, line: u32, file: &str) -> Self {
        self.code
            .push(Datum::Instruction(Instruction::new(opcode as u32, line, file)));
        self
    }

    /// Append a raw datum (immediate operand or literal).
    pub fn datum(mut self, datum: impl Into<Datum>) -> Self {
        self.code.push(datum.into());
        self
    }

    /// Append an opcode followed by one integer operand.
    pub fn op_with(self, opcode: Opcode, operand: i64) -> Self {
        self.op(opcode).datum(operand)
    }

    /// Append `CONSTANT` followed by its literal.
    pub fn constant(self, literal: impl Into<Datum>) -> Self {
        self.op(Opcode::Constant).datum(literal)
    }

    /// Append a function header for a non-macro function.
    pub fn function_header(self, parameters: i64, variadic: bool) -> Self {
        self.op(Opcode::Nothing)
            .datum(Datum::None)
            .datum(parameters)
            .datum(i64::from(variadic))
            .datum(0i64)
    }

    /// Finish the program.
    pub fn build(self) -> Program {
        Program::new(self.code)
    }
}
