//! Runtime errors for the calcvm interpreter.
//!
//! [`RuntimeError`] says what went wrong; [`Fault`] adds where. Every
//! runtime error is fatal: execution stops and the fault is returned.

use calcvm_common::{DecodeError, Instruction, ScopeError, Tag, TypeMismatch};
use std::fmt;
use thiserror::Error;

/// Coarse classification of runtime failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The instruction stream itself is malformed or uses unsupported opcodes.
    InvalidProgram,
    /// An operator was applied to operands of the wrong tags.
    OperatorTypeError,
    /// A typed accessor met a datum of another tag.
    TypeMismatch,
    /// The machine itself ran out of room or lost its footing.
    ExecutionFault,
    /// A mathematically undefined or unrepresentable result.
    DomainError,
    /// A slot lookup found no frame covering the index.
    UnresolvedSlot,
    /// A slot lookup found a frame covering the index but it was never written.
    UninitializedSlot,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorClass::InvalidProgram => "invalid program",
            ErrorClass::OperatorTypeError => "operator type error",
            ErrorClass::TypeMismatch => "type mismatch",
            ErrorClass::ExecutionFault => "execution fault",
            ErrorClass::DomainError => "domain error",
            ErrorClass::UnresolvedSlot => "unresolved slot",
            ErrorClass::UninitializedSlot => "uninitialized slot",
        };
        f.write_str(name)
    }
}

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// The instruction pointer left the instruction array.
    #[error("instruction pointer {ip} is outside the program (length {len})")]
    PointerOutOfRange { ip: usize, len: usize },

    /// The pointer landed on a datum that is not an instruction record.
    #[error("expected an instruction, found {found}")]
    NotAnInstruction { found: Tag },

    /// The record's opcode id is not in the instruction set.
    #[error(transparent)]
    UnknownOpcode(#[from] DecodeError),

    /// The opcode is recognised but this interpreter does not implement it.
    #[error("unsupported opcode {mnemonic}")]
    Unsupported { mnemonic: &'static str },

    /// An immediate operand runs past the end of the program.
    #[error("missing immediate operand")]
    MissingOperand,

    /// An immediate operand is not a valid address, count or index.
    #[error("invalid immediate operand {value}")]
    InvalidOperand { value: i64 },

    /// A binary operator met an unsupported pairing of tags.
    #[error("{operator} is not defined for {left} and {right}")]
    BinaryOperands {
        operator: &'static str,
        left: Tag,
        right: Tag,
    },

    /// A unary operator met an unsupported tag.
    #[error("{operator} is not defined for {operand}")]
    UnaryOperand { operator: &'static str, operand: Tag },

    /// The callee of a call is not a function.
    #[error("cannot call a value of type {found}")]
    NotCallable { found: Tag },

    /// A function address does not lead to a well-formed header.
    #[error("malformed function header at address {address}")]
    MalformedHeader { address: usize },

    /// Argument count differs from a fixed parameter count.
    #[error("function takes {expected} arguments, {found} given")]
    ArityMismatch { expected: usize, found: usize },

    /// A variadic function received fewer than its fixed arguments.
    #[error("function takes at least {minimum} arguments, {found} given")]
    TooFewArguments { minimum: usize, found: usize },

    /// A typed accessor failed.
    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),

    /// Pop on an empty operand stack.
    #[error("stack underflow")]
    StackUnderflow,

    /// Push on a full operand stack.
    #[error("stack overflow (capacity {capacity})")]
    StackOverflow { capacity: usize },

    /// Too many nested calls.
    #[error("call depth exceeded limit {limit}")]
    CallDepthExceeded { limit: usize },

    /// RETURN with no activation to return to.
    #[error("RETURN outside of a function call")]
    ReturnOutsideCall,

    /// Assignment target is not a slot address.
    #[error("invalid slot address {value}")]
    InvalidSlotAddress { value: i64 },

    /// Division or remainder with a zero divisor.
    #[error("division by zero")]
    DivisionByZero,

    /// An integer result does not fit in 64 bits.
    #[error("integer overflow in {operator}")]
    IntegerOverflow { operator: &'static str },

    /// Factorial of a negative integer.
    #[error("factorial of negative number {value}")]
    NegativeFactorial { value: i64 },

    /// A slot lookup failed.
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

impl RuntimeError {
    /// Map this error onto the coarse taxonomy.
    pub fn class(&self) -> ErrorClass {
        match self {
            RuntimeError::PointerOutOfRange { .. }
            | RuntimeError::NotAnInstruction { .. }
            | RuntimeError::UnknownOpcode(_)
            | RuntimeError::Unsupported { .. }
            | RuntimeError::MissingOperand
            | RuntimeError::InvalidOperand { .. }
            | RuntimeError::MalformedHeader { .. } => ErrorClass::InvalidProgram,
            RuntimeError::BinaryOperands { .. }
            | RuntimeError::UnaryOperand { .. }
            | RuntimeError::NotCallable { .. }
            | RuntimeError::ArityMismatch { .. }
            | RuntimeError::TooFewArguments { .. } => ErrorClass::OperatorTypeError,
            RuntimeError::TypeMismatch(_) => ErrorClass::TypeMismatch,
            RuntimeError::StackUnderflow
            | RuntimeError::StackOverflow { .. }
            | RuntimeError::CallDepthExceeded { .. }
            | RuntimeError::ReturnOutsideCall
            | RuntimeError::InvalidSlotAddress { .. } => ErrorClass::ExecutionFault,
            RuntimeError::DivisionByZero
            | RuntimeError::IntegerOverflow { .. }
            | RuntimeError::NegativeFactorial { .. } => ErrorClass::DomainError,
            RuntimeError::Scope(ScopeError::Unresolved { .. }) => ErrorClass::UnresolvedSlot,
            RuntimeError::Scope(ScopeError::Uninitialized { .. }) => {
                ErrorClass::UninitializedSlot
            }
        }
    }
}

/// A runtime error together with the point of failure.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    /// What went wrong.
    pub error: RuntimeError,
    /// Address of the instruction that failed.
    pub ip: usize,
    /// The failing instruction record, when the pointer reached one.
    pub instruction: Option<Instruction>,
}

impl Fault {
    /// Shorthand for `self.error.class()`.
    pub fn class(&self) -> ErrorClass {
        self.error.class()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} at address {}", self.class(), self.error, self.ip)?;
        if let Some(instr) = &self.instruction {
            match instr.opcode() {
                Ok(opcode) => write!(f, " ({}", opcode.mnemonic())?,
                Err(_) => write!(f, " (opcode {}", instr.id)?,
            }
            write!(f, ", {} line {})", instr.file, instr.line)?;
        }
        Ok(())
    }
}

impl std::error::Error for Fault {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
