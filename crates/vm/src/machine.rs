//! Interpreter state: operand stack, call stack, scope chain, limits.

use crate::error::{Fault, RuntimeError};
use calcvm_common::{
    Datum, Instruction, Program, Scope, FUNCTION_HEADER_LEN, HEADER_PARAMETERS, HEADER_VARIADIC,
};

/// Default operand stack capacity, in datums.
pub const DEFAULT_STACK_CAPACITY: usize = 4096;

/// Default maximum number of live call frames.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Default number of addressable slots per frame.
pub const DEFAULT_MAX_SLOTS: usize = 65_536;

/// Resource limits for one interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum operand stack depth.
    pub stack_capacity: usize,
    /// Maximum call stack depth.
    pub max_call_depth: usize,
    /// Assignments to slot indices at or above this fail.
    pub max_slots: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            stack_capacity: DEFAULT_STACK_CAPACITY,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            max_slots: DEFAULT_MAX_SLOTS,
        }
    }
}

/// Saved caller state for one activation.
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// Address to resume at after RETURN.
    pub return_address: usize,
    /// The caller's scope, restored on RETURN.
    pub scope: Scope,
}

/// Parameter layout decoded from a function header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Signature {
    /// Declared parameters; for variadic functions the last one collects
    /// the extra arguments.
    pub parameters: usize,
    pub variadic: bool,
    /// Address of the first body instruction.
    pub entry: usize,
}

/// Outcome of a single [`Interpreter::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// More instructions remain.
    Running,
    /// END was executed.
    Halted,
}

/// The calcvm interpreter.
///
/// Borrows its program and owns everything else. Dropping the interpreter
/// clears the global scope so closures stored in globals release it.
pub struct Interpreter<'a> {
    pub(crate) program: &'a Program,
    pub(crate) stack: Vec<Datum>,
    pub(crate) call_stack: Vec<CallFrame>,
    pub(crate) ip: usize,
    pub(crate) scope: Scope,
    pub(crate) global: Scope,
    pub(crate) limits: Limits,
    pub(crate) halted: bool,
    pub(crate) deprecation_reported: bool,
}

impl<'a> Interpreter<'a> {
    /// Create an interpreter with default limits, positioned at address 0.
    pub fn new(program: &'a Program) -> Self {
        Self::with_limits(program, Limits::default())
    }

    /// Create an interpreter with explicit limits.
    pub fn with_limits(program: &'a Program, limits: Limits) -> Self {
        let global = Scope::global();
        Self {
            program,
            stack: Vec::new(),
            call_stack: Vec::new(),
            ip: 0,
            scope: global.clone(),
            global,
            limits,
            halted: false,
            deprecation_reported: false,
        }
    }

    /// Run until END or the first fault.
    pub fn run(&mut self) -> Result<(), Fault> {
        while self.step()? == Status::Running {}
        Ok(())
    }

    /// Fetch, decode and execute one instruction.
    ///
    /// Stepping a halted interpreter is a no-op.
    pub fn step(&mut self) -> Result<Status, Fault> {
        if self.halted {
            return Ok(Status::Halted);
        }
        let at = self.ip;
        let instruction = self.fetch().map_err(|error| Fault {
            error,
            ip: at,
            instruction: None,
        })?;
        let status = self.execute(instruction).map_err(|error| Fault {
            error,
            ip: at,
            instruction: Some(instruction.clone()),
        })?;
        self.halted = status == Status::Halted;
        Ok(status)
    }

    /// The operand stack, bottom first.
    pub fn stack(&self) -> &[Datum] {
        &self.stack
    }

    /// Consume the interpreter, returning the operand stack.
    pub fn into_stack(mut self) -> Vec<Datum> {
        std::mem::take(&mut self.stack)
    }

    /// Current instruction pointer.
    pub fn ip(&self) -> usize {
        self.ip
    }

    /// Number of live call frames.
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    /// Returns true once END has executed.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// The root scope.
    pub fn global_scope(&self) -> &Scope {
        &self.global
    }

    /// The scope of the running activation.
    pub fn current_scope(&self) -> &Scope {
        &self.scope
    }

    pub(crate) fn push(&mut self, value: Datum) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.limits.stack_capacity {
            return Err(RuntimeError::StackOverflow {
                capacity: self.limits.stack_capacity,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<Datum, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    pub(crate) fn top(&self) -> Result<&Datum, RuntimeError> {
        self.stack.last().ok_or(RuntimeError::StackUnderflow)
    }

    /// The instruction record at the current pointer.
    pub(crate) fn fetch(&self) -> Result<&'a Instruction, RuntimeError> {
        let program: &'a Program = self.program;
        match program.get(self.ip) {
            Some(Datum::Instruction(instr)) => Ok(instr),
            Some(other) => Err(RuntimeError::NotAnInstruction { found: other.tag() }),
            None => Err(RuntimeError::PointerOutOfRange {
                ip: self.ip,
                len: program.len(),
            }),
        }
    }

    /// Read the datum at the pointer as an immediate operand and advance.
    pub(crate) fn immediate(&mut self) -> Result<&'a Datum, RuntimeError> {
        let program: &'a Program = self.program;
        let datum = program.get(self.ip).ok_or(RuntimeError::MissingOperand)?;
        self.ip += 1;
        Ok(datum)
    }

    /// Decode the header of the function at `address`.
    ///
    /// The macro flag is not read; macros never reach the interpreter.
    pub(crate) fn signature(&self, address: usize) -> Result<Signature, RuntimeError> {
        let malformed = RuntimeError::MalformedHeader { address };
        let field = |offset: usize| match address
            .checked_add(offset)
            .and_then(|at| self.program.get(at))
        {
            Some(Datum::Integer(value)) => Ok(*value),
            _ => Err(malformed.clone()),
        };
        let parameters = usize::try_from(field(HEADER_PARAMETERS)?).map_err(|_| malformed.clone())?;
        let variadic = field(HEADER_VARIADIC)? != 0;
        if variadic && parameters == 0 {
            return Err(malformed);
        }
        let entry = address
            .checked_add(FUNCTION_HEADER_LEN)
            .ok_or_else(|| malformed.clone())?;
        Ok(Signature {
            parameters,
            variadic,
            entry,
        })
    }

    /// Read a non-negative integer immediate (address, count, index).
    pub(crate) fn immediate_index(&mut self) -> Result<usize, RuntimeError> {
        let value = self.immediate()?.as_integer()?;
        usize::try_from(value).map_err(|_| RuntimeError::InvalidOperand { value })
    }
}

impl Drop for Interpreter<'_> {
    fn drop(&mut self) {
        self.global.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcvm_common::{Opcode, ProgramBuilder, Tag};

    #[test]
    fn fresh_interpreter_state() {
        let program = ProgramBuilder::new().op(Opcode::End).build();
        let vm = Interpreter::new(&program);
        assert_eq!(vm.ip(), 0);
        assert!(vm.stack().is_empty());
        assert_eq!(vm.call_depth(), 0);
        assert!(vm.current_scope().ptr_eq(vm.global_scope()));
        assert!(!vm.is_halted());
    }

    #[test]
    fn push_respects_capacity() {
        let program = Program::default();
        let limits = Limits {
            stack_capacity: 2,
            ..Limits::default()
        };
        let mut vm = Interpreter::with_limits(&program, limits);
        vm.push(Datum::Integer(1)).unwrap();
        vm.push(Datum::Integer(2)).unwrap();
        assert_eq!(
            vm.push(Datum::Integer(3)),
            Err(RuntimeError::StackOverflow { capacity: 2 })
        );
    }

    #[test]
    fn pop_empty_underflows() {
        let program = Program::default();
        let mut vm = Interpreter::new(&program);
        assert_eq!(vm.pop(), Err(RuntimeError::StackUnderflow));
        assert_eq!(vm.top(), Err(RuntimeError::StackUnderflow));
    }

    #[test]
    fn fetch_rejects_non_instruction() {
        let program = Program::new(vec![Datum::Integer(5)]);
        let vm = Interpreter::new(&program);
        assert_eq!(
            vm.fetch(),
            Err(RuntimeError::NotAnInstruction { found: Tag::Integer })
        );
    }

    #[test]
    fn fetch_past_end() {
        let program = Program::default();
        let vm = Interpreter::new(&program);
        assert_eq!(
            vm.fetch(),
            Err(RuntimeError::PointerOutOfRange { ip: 0, len: 0 })
        );
    }

    #[test]
    fn immediate_index_rejects_negative() {
        let program = Program::new(vec![Datum::Integer(-1)]);
        let mut vm = Interpreter::new(&program);
        assert_eq!(
            vm.immediate_index(),
            Err(RuntimeError::InvalidOperand { value: -1 })
        );
    }

    #[test]
    fn signature_reads_header() {
        let program = ProgramBuilder::new()
            .op(Opcode::End)
            .function_header(3, true)
            .build();
        let vm = Interpreter::new(&program);
        assert_eq!(
            vm.signature(1),
            Ok(Signature {
                parameters: 3,
                variadic: true,
                entry: 6,
            })
        );
    }

    #[test]
    fn signature_rejects_truncated_or_untyped_header() {
        let program = ProgramBuilder::new()
            .constant(1i64)
            .op(Opcode::End)
            .function_header(1, false)
            .build();
        let vm = Interpreter::new(&program);
        assert_eq!(
            vm.signature(0),
            Err(RuntimeError::MalformedHeader { address: 0 })
        );
        assert_eq!(
            vm.signature(6),
            Err(RuntimeError::MalformedHeader { address: 6 })
        );
        assert_eq!(
            vm.signature(usize::MAX),
            Err(RuntimeError::MalformedHeader { address: usize::MAX })
        );
    }

    #[test]
    fn immediate_past_end_is_missing() {
        let program = Program::default();
        let mut vm = Interpreter::new(&program);
        assert_eq!(vm.immediate(), Err(RuntimeError::MissingOperand));
    }
}
