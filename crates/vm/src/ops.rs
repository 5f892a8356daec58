//! Operator semantics on datums, independent of the stack machine.
//!
//! Two Integers use checked 64-bit integer arithmetic. Any Real operand
//! promotes both sides to f64. Everything else is an operator type error.

use crate::error::RuntimeError;
use calcvm_common::{Datum, Opcode};
use std::cmp::Ordering;

/// Numeric operands after promotion.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Numbers {
    Integers(i64, i64),
    Reals(f64, f64),
}

fn numbers(operator: Opcode, left: &Datum, right: &Datum) -> Result<Numbers, RuntimeError> {
    match (left, right) {
        (Datum::Integer(a), Datum::Integer(b)) => Ok(Numbers::Integers(*a, *b)),
        (Datum::Integer(_) | Datum::Real(_), Datum::Integer(_) | Datum::Real(_)) => {
            Ok(Numbers::Reals(left.to_real()?, right.to_real()?))
        }
        _ => Err(RuntimeError::BinaryOperands {
            operator: operator.mnemonic(),
            left: left.tag(),
            right: right.tag(),
        }),
    }
}

/// Apply a binary arithmetic or logical operator.
pub(crate) fn binary(operator: Opcode, left: &Datum, right: &Datum) -> Result<Datum, RuntimeError> {
    let overflow = || RuntimeError::IntegerOverflow {
        operator: operator.mnemonic(),
    };
    let operands = numbers(operator, left, right)?;

    let result = match (operator, operands) {
        (Opcode::And, _) => logical(operands, left.is_truthy() && right.is_truthy()),
        (Opcode::Or, _) => logical(operands, left.is_truthy() || right.is_truthy()),

        (Opcode::Add, Numbers::Integers(a, b)) => Datum::Integer(a.checked_add(b).ok_or_else(overflow)?),
        (Opcode::Sub, Numbers::Integers(a, b)) => Datum::Integer(a.checked_sub(b).ok_or_else(overflow)?),
        (Opcode::Mul, Numbers::Integers(a, b)) => Datum::Integer(a.checked_mul(b).ok_or_else(overflow)?),
        (Opcode::Add, Numbers::Reals(a, b)) => Datum::Real(a + b),
        (Opcode::Sub, Numbers::Reals(a, b)) => Datum::Real(a - b),
        (Opcode::Mul, Numbers::Reals(a, b)) => Datum::Real(a * b),

        (Opcode::Div | Opcode::Mod, Numbers::Integers(_, 0)) => {
            return Err(RuntimeError::DivisionByZero)
        }
        (Opcode::Div | Opcode::Mod, Numbers::Reals(_, b)) if b == 0.0 => {
            return Err(RuntimeError::DivisionByZero)
        }
        (Opcode::Div, Numbers::Integers(a, b)) => Datum::Integer(a.checked_div(b).ok_or_else(overflow)?),
        // i64::MIN % -1 is mathematically 0; only the checked form reports it.
        (Opcode::Mod, Numbers::Integers(a, b)) => Datum::Integer(a.wrapping_rem(b)),
        (Opcode::Div, Numbers::Reals(a, b)) => Datum::Real(a / b),
        (Opcode::Mod, Numbers::Reals(a, b)) => Datum::Real(a % b),

        (Opcode::Pow, Numbers::Integers(0, b)) if b < 0 => return Err(RuntimeError::DivisionByZero),
        (Opcode::Pow, Numbers::Integers(a, b)) if b < 0 => Datum::Real((a as f64).powf(b as f64)),
        (Opcode::Pow, Numbers::Integers(a, b)) => Datum::Integer(integer_pow(a, b).ok_or_else(overflow)?),
        (Opcode::Pow, Numbers::Reals(a, b)) => Datum::Real(a.powf(b)),

        _ => {
            return Err(RuntimeError::Unsupported {
                mnemonic: operator.mnemonic(),
            })
        }
    };
    Ok(result)
}

fn logical(operands: Numbers, truth: bool) -> Datum {
    match operands {
        Numbers::Integers(..) => Datum::Integer(i64::from(truth)),
        Numbers::Reals(..) => Datum::Real(if truth { 1.0 } else { 0.0 }),
    }
}

/// `base` raised to a non-negative `exponent`, or `None` on overflow.
fn integer_pow(base: i64, exponent: i64) -> Option<i64> {
    match (base, u32::try_from(exponent)) {
        (_, Ok(exponent)) => base.checked_pow(exponent),
        (0 | 1, Err(_)) => Some(base),
        (-1, Err(_)) => Some(if exponent % 2 == 0 { 1 } else { -1 }),
        _ => None,
    }
}

/// Evaluate a comparison operator (plain or chained form).
pub(crate) fn compare(operator: Opcode, left: &Datum, right: &Datum) -> Result<bool, RuntimeError> {
    let ordering = match numbers(operator, left, right)? {
        Numbers::Integers(a, b) => Some(a.cmp(&b)),
        Numbers::Reals(a, b) => a.partial_cmp(&b),
    };
    let holds = match operator {
        Opcode::Less | Opcode::CmpLess => ordering == Some(Ordering::Less),
        Opcode::More | Opcode::CmpMore => ordering == Some(Ordering::Greater),
        Opcode::LessEq | Opcode::CmpLessEq => {
            matches!(ordering, Some(Ordering::Less | Ordering::Equal))
        }
        Opcode::MoreEq | Opcode::CmpMoreEq => {
            matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
        }
        Opcode::Equal | Opcode::CmpEqual => ordering == Some(Ordering::Equal),
        Opcode::NotEqual | Opcode::CmpNotEqual => ordering != Some(Ordering::Equal),
        _ => {
            return Err(RuntimeError::Unsupported {
                mnemonic: operator.mnemonic(),
            })
        }
    };
    Ok(holds)
}

/// Arithmetic negation.
pub(crate) fn negate(operand: &Datum) -> Result<Datum, RuntimeError> {
    match operand {
        Datum::Integer(v) => v
            .checked_neg()
            .map(Datum::Integer)
            .ok_or(RuntimeError::IntegerOverflow {
                operator: Opcode::Negate.mnemonic(),
            }),
        Datum::Real(v) => Ok(Datum::Real(-v)),
        other => Err(RuntimeError::UnaryOperand {
            operator: Opcode::Negate.mnemonic(),
            operand: other.tag(),
        }),
    }
}

/// Integer factorial.
pub(crate) fn factorial(operand: &Datum) -> Result<Datum, RuntimeError> {
    let Datum::Integer(n) = *operand else {
        return Err(RuntimeError::UnaryOperand {
            operator: Opcode::Factorial.mnemonic(),
            operand: operand.tag(),
        });
    };
    if n < 0 {
        return Err(RuntimeError::NegativeFactorial { value: n });
    }
    (2..=n)
        .try_fold(1i64, |acc, k| acc.checked_mul(k))
        .map(Datum::Integer)
        .ok_or(RuntimeError::IntegerOverflow {
            operator: Opcode::Factorial.mnemonic(),
        })
}
