//! Opcode dispatch for the calcvm interpreter.

use crate::error::RuntimeError;
use crate::machine::{CallFrame, Interpreter, Status};
use crate::ops;
use calcvm_common::{Datum, Function, Instruction, List, Opcode};

impl<'a> Interpreter<'a> {
    /// Decode and execute one instruction record whose address is `self.ip`.
    pub(crate) fn execute(&mut self, instr: &Instruction) -> Result<Status, RuntimeError> {
        let opcode = instr.opcode()?;
        tracing::trace!(
            ip = self.ip,
            opcode = opcode.mnemonic(),
            stack = self.stack.len(),
            "execute"
        );
        self.ip += 1;

        match opcode {
            Opcode::Nothing => {}
            Opcode::End => return Ok(Status::Halted),

            Opcode::Constant => {
                let literal = self.immediate()?.clone();
                self.push(literal)?;
            }

            Opcode::Add
            | Opcode::Sub
            | Opcode::Mul
            | Opcode::Div
            | Opcode::Mod
            | Opcode::Pow
            | Opcode::And
            | Opcode::Or => {
                let right = self.pop()?;
                let left = self.pop()?;
                let result = ops::binary(opcode, &left, &right)?;
                self.push(result)?;
            }

            Opcode::Not => {
                let operand = self.pop()?;
                self.push(Datum::Integer(i64::from(!operand.is_truthy())))?;
            }
            Opcode::Negate => {
                let operand = self.pop()?;
                self.push(ops::negate(&operand)?)?;
            }
            Opcode::Factorial => {
                let operand = self.pop()?;
                self.push(ops::factorial(&operand)?)?;
            }

            Opcode::Less
            | Opcode::More
            | Opcode::LessEq
            | Opcode::MoreEq
            | Opcode::Equal
            | Opcode::NotEqual => {
                let right = self.pop()?;
                let left = self.pop()?;
                let holds = ops::compare(opcode, &left, &right)?;
                self.push(Datum::Integer(i64::from(holds)))?;
            }
            Opcode::CmpLess
            | Opcode::CmpMore
            | Opcode::CmpLessEq
            | Opcode::CmpMoreEq
            | Opcode::CmpEqual
            | Opcode::CmpNotEqual => self.exec_chained_compare(opcode)?,

            Opcode::Call | Opcode::CallNoCache => self.exec_call(false)?,
            Opcode::CallTail => self.exec_call(true)?,
            Opcode::Return => self.exec_return()?,
            Opcode::Function => {
                let address = self.immediate_index()?;
                let closure = Function {
                    address,
                    scope: self.scope.clone(),
                };
                self.push(Datum::Function(closure))?;
            }

            Opcode::Jump => self.ip = self.immediate_index()?,
            Opcode::JumpIfTrue => self.exec_conditional_jump(true)?,
            Opcode::JumpIfFalse => self.exec_conditional_jump(false)?,

            Opcode::Duplicate => {
                let value = self.top()?.clone();
                self.push(value)?;
            }
            Opcode::Discard => {
                self.pop()?;
            }
            Opcode::Swap => {
                let right = self.pop()?;
                let left = self.pop()?;
                self.push(right)?;
                self.push(left)?;
            }

            Opcode::Assignment => self.exec_assignment()?,
            Opcode::AccessGlobal => {
                let index = self.immediate_index()?;
                // Name operand; kept in the stream for diagnostics only.
                self.immediate()?;
                let value = self.global.get(index)?;
                self.push(value)?;
            }
            Opcode::AccessLocal => {
                let index = self.immediate_index()?;
                let value = self.scope.get(index)?;
                self.push(value)?;
            }
            Opcode::AccessSemi => {
                let depth = self.immediate_index()?;
                let index = self.immediate_index()?;
                let value = self.scope.get_at(depth, index)?;
                self.push(value)?;
            }
            Opcode::Unload => {
                let index = self.immediate_index()?;
                self.global.unset(index);
            }

            Opcode::ConstantEmptyArray => {
                if !self.deprecation_reported {
                    tracing::warn!(
                        ip = self.ip - 1,
                        "CONSTANT_EMPTY_ARRAY is deprecated, compile with LIST_CREATE_EMPTY"
                    );
                    self.deprecation_reported = true;
                }
                self.push(Datum::List(List::Empty))?;
            }
            Opcode::ListCreateEmpty => self.push(Datum::List(List::Empty))?,

            Opcode::JumpIfMacro
            | Opcode::Word
            | Opcode::FunctionMacro
            | Opcode::StoreInCache
            | Opcode::AccessArrayElement
            | Opcode::BeginProtectedGlobalBlock
            | Opcode::EndProtectedGlobalBlock
            | Opcode::DeclareSymbol
            | Opcode::ListExtractFirst
            | Opcode::ListExtractRest
            | Opcode::ListPrepend
            | Opcode::ListConcat
            | Opcode::PushErrorStopgap
            | Opcode::ConstantString
            | Opcode::ConstantGlyph => {
                return Err(RuntimeError::Unsupported {
                    mnemonic: opcode.mnemonic(),
                })
            }
        }

        Ok(Status::Running)
    }

    fn exec_conditional_jump(&mut self, when: bool) -> Result<(), RuntimeError> {
        let target = self.immediate_index()?;
        let condition = self.pop()?;
        if condition.is_truthy() == when {
            self.ip = target;
        }
        Ok(())
    }

    /// One link of `a < b < c`: the accumulated truth value sits below the
    /// operands, and the right operand stays for the next link.
    fn exec_chained_compare(&mut self, opcode: Opcode) -> Result<(), RuntimeError> {
        let right = self.pop()?;
        let left = self.pop()?;
        let holds = ops::compare(opcode, &left, &right)?;
        let accumulated = self.pop()?;
        self.push(Datum::Integer(i64::from(accumulated.is_truthy() && holds)))?;
        self.push(right)
    }

    fn exec_assignment(&mut self) -> Result<(), RuntimeError> {
        let address = self.pop()?.as_integer()?;
        let index = usize::try_from(address)
            .ok()
            .filter(|&index| index < self.limits.max_slots)
            .ok_or(RuntimeError::InvalidSlotAddress { value: address })?;
        let value = self.pop()?;
        self.scope.set(index, value);
        Ok(())
    }

    fn exec_call(&mut self, tail: bool) -> Result<(), RuntimeError> {
        let argc = self.immediate_index()?;
        if argc >= self.stack.len() {
            return Err(RuntimeError::StackUnderflow);
        }
        let mut arguments: Vec<Datum> =
            (0..argc).map(|_| self.pop()).collect::<Result<_, _>>()?;

        let callee = match self.pop()? {
            Datum::Function(function) => function,
            other => return Err(RuntimeError::NotCallable { found: other.tag() }),
        };
        let signature = self.signature(callee.address)?;

        let scope = if signature.variadic {
            let fixed = signature.parameters - 1;
            if argc < fixed {
                return Err(RuntimeError::TooFewArguments {
                    minimum: fixed,
                    found: argc,
                });
            }
            let rest: List = arguments.split_off(fixed).into_iter().collect();
            arguments.push(Datum::List(rest));
            callee.scope.child()
        } else if argc != signature.parameters {
            return Err(RuntimeError::ArityMismatch {
                expected: signature.parameters,
                found: argc,
            });
        } else if argc == 0 {
            // Free variables of a thunk are numbered from its defining frame.
            callee.scope.transparent_child()
        } else {
            callee.scope.child()
        };
        for (index, argument) in arguments.into_iter().enumerate() {
            scope.define(index, argument);
        }

        if tail && !self.call_stack.is_empty() {
            // The current frame's return address is reused.
            tracing::debug!(address = callee.address, argc, "tail call");
        } else {
            if self.call_stack.len() >= self.limits.max_call_depth {
                return Err(RuntimeError::CallDepthExceeded {
                    limit: self.limits.max_call_depth,
                });
            }
            self.call_stack.push(CallFrame {
                return_address: self.ip,
                scope: self.scope.clone(),
            });
            tracing::debug!(
                address = callee.address,
                argc,
                depth = self.call_stack.len(),
                "call"
            );
        }

        self.scope = scope;
        self.ip = signature.entry;
        Ok(())
    }

    fn exec_return(&mut self) -> Result<(), RuntimeError> {
        let value = self.pop()?;
        let frame = self
            .call_stack
            .pop()
            .ok_or(RuntimeError::ReturnOutsideCall)?;
        tracing::debug!(
            return_address = frame.return_address,
            depth = self.call_stack.len(),
            "return"
        );
        self.ip = frame.return_address;
        self.scope = frame.scope;
        self.push(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcvm_common::{Program, ProgramBuilder};

    fn step_all(program: &Program) -> Interpreter<'_> {
        let mut vm = Interpreter::new(program);
        vm.run().unwrap();
        vm
    }

    #[test]
    fn end_advances_past_itself() {
        let program = ProgramBuilder::new().op(Opcode::Nothing).op(Opcode::End).build();
        let vm = step_all(&program);
        assert_eq!(vm.ip(), 2);
        assert!(vm.is_halted());
    }

    #[test]
    fn call_pushes_frame_and_return_pops_it() {
        let program = ProgramBuilder::new()
            .op_with(Opcode::Jump, 10) // 0
            .function_header(0, false) // 2
            .constant(7i64) // 7
            .op(Opcode::Return) // 9
            .op_with(Opcode::Function, 2) // 10
            .op_with(Opcode::Call, 0) // 12
            .op(Opcode::End) // 14
            .build();
        let mut vm = Interpreter::new(&program);
        for _ in 0..3 {
            vm.step().unwrap();
        }
        assert_eq!(vm.call_depth(), 1);
        assert_eq!(vm.ip(), 7);
        assert!(!vm.current_scope().ptr_eq(vm.global_scope()));
        assert!(vm.current_scope().is_transparent());
        vm.run().unwrap();
        assert_eq!(vm.call_depth(), 0);
        assert!(vm.current_scope().ptr_eq(vm.global_scope()));
        assert_eq!(vm.stack(), &[Datum::Integer(7)]);
    }

    #[test]
    fn variadic_call_collects_extra_arguments() {
        let program = ProgramBuilder::new()
            .op_with(Opcode::Jump, 10) // 0
            .function_header(2, true) // 2
            .op_with(Opcode::AccessLocal, 1) // 7
            .op(Opcode::Return) // 9
            .op_with(Opcode::Function, 2) // 10
            .constant(10i64) // 12
            .constant(20i64) // 14
            .constant(30i64) // 16
            .op_with(Opcode::Call, 3) // 18
            .op(Opcode::End) // 20
            .build();
        let vm = step_all(&program);
        let rest: List = vec![Datum::Integer(20), Datum::Integer(10)]
            .into_iter()
            .collect();
        assert_eq!(vm.stack(), &[Datum::List(rest)]);
    }

    #[test]
    fn chained_compare_keeps_right_operand() {
        let program = ProgramBuilder::new()
            .constant(1i64)
            .constant(2i64)
            .constant(3i64)
            .op(Opcode::CmpLess)
            .op(Opcode::End)
            .build();
        let vm = step_all(&program);
        assert_eq!(vm.stack(), &[Datum::Integer(1), Datum::Integer(3)]);
    }

    #[test]
    fn deprecated_empty_array_still_pushes() {
        let program = ProgramBuilder::new()
            .op(Opcode::ConstantEmptyArray)
            .op(Opcode::ConstantEmptyArray)
            .op(Opcode::End)
            .build();
        let vm = step_all(&program);
        assert_eq!(vm.stack().len(), 2);
        assert!(vm.deprecation_reported);
    }
}
