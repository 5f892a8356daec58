//! calcvm interpreter: executes loaded instruction streams.
//!
//! The interpreter is a stack machine with:
//! - An operand stack for intermediate values
//! - A lexical scope chain shared with closures
//! - A call stack of saved return addresses and caller scopes
//!
//! # Usage
//!
//! ```
//! use calcvm_common::{Datum, Opcode, ProgramBuilder};
//! use calcvm_vm::run;
//!
//! let program = ProgramBuilder::new()
//!     .constant(2i64)
//!     .constant(3i64)
//!     .op(Opcode::Add)
//!     .op(Opcode::End)
//!     .build();
//!
//! assert_eq!(run(&program).unwrap(), vec![Datum::Integer(5)]);
//! ```
//!
//! `Datum` values hold `Rc` handles, so an interpreter stays on the thread
//! that created it. Separate threads run separate interpreters.

pub mod error;
pub mod execute;
pub mod machine;
mod ops;

pub use error::{ErrorClass, Fault, RuntimeError};
pub use machine::{
    CallFrame, Interpreter, Limits, Status, DEFAULT_MAX_CALL_DEPTH, DEFAULT_MAX_SLOTS,
    DEFAULT_STACK_CAPACITY,
};

use calcvm_common::{Datum, Program};

/// Execute a program from address 0 and return the final operand stack.
///
/// # Errors
///
/// Returns a [`Fault`] for the first runtime error (bad opcode, type
/// error, division by zero, stack or call depth exhaustion, etc.).
pub fn run(program: &Program) -> Result<Vec<Datum>, Fault> {
    let mut vm = Interpreter::new(program);
    vm.run()?;
    Ok(vm.into_stack())
}
