//! Runtime values.
//!
//! A [`Datum`] is what lives on the operand stack, in scope slots and in the
//! instruction stream itself. The enum is matched exhaustively everywhere;
//! the typed accessors exist for call sites that require one specific tag.

use crate::error::TypeMismatch;
use crate::instruction::Instruction;
use crate::scope::Scope;
use crate::tag::Tag;
use std::fmt;
use std::rc::Rc;

/// Tagged runtime value.
#[derive(Debug, Clone)]
pub enum Datum {
    /// No value. Also what the reserved `str` record decodes to.
    None,
    /// Signed 64-bit integer.
    Integer(i64),
    /// IEEE 754 double.
    Real(f64),
    /// Opcode record. Only found in the instruction stream.
    Instruction(Instruction),
    /// Closure.
    Function(Function),
    /// Immutable cons list.
    List(List),
    /// Environment handle.
    Scope(Scope),
}

/// A code address paired with the scope that was current when it was declared.
#[derive(Debug, Clone)]
pub struct Function {
    /// Address of the function header; see [`crate::program::FUNCTION_HEADER_LEN`].
    pub address: usize,
    /// Captured scope, shared with every other holder.
    pub scope: Scope,
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address && self.scope.ptr_eq(&other.scope)
    }
}

/// Immutable cons list.
///
/// `List::Empty` is the canonical empty sentinel and is distinct from
/// [`Datum::None`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum List {
    /// The empty list.
    #[default]
    Empty,
    /// An item followed by the rest of the list.
    Cons(Rc<(Datum, List)>),
}

impl List {
    /// Prepend `item` to `next`.
    pub fn cons(item: Datum, next: List) -> Self {
        List::Cons(Rc::new((item, next)))
    }

    /// Returns true for the empty sentinel.
    pub fn is_empty(&self) -> bool {
        matches!(self, List::Empty)
    }

    /// First item, if any.
    pub fn head(&self) -> Option<&Datum> {
        match self {
            List::Empty => None,
            List::Cons(cell) => Some(&cell.0),
        }
    }

    /// Everything after the first item, if any.
    pub fn tail(&self) -> Option<&List> {
        match self {
            List::Empty => None,
            List::Cons(cell) => Some(&cell.1),
        }
    }

    /// Iterate the items front to back.
    pub fn iter(&self) -> impl Iterator<Item = &Datum> {
        std::iter::successors(Some(self), |list| list.tail()).filter_map(List::head)
    }
}

impl FromIterator<Datum> for List {
    fn from_iter<I: IntoIterator<Item = Datum>>(iter: I) -> Self {
        let items: Vec<Datum> = iter.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(List::Empty, |next, item| List::cons(item, next))
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("]")
    }
}

// Reals compare by bit pattern, so NaN equals an identical NaN and +0.0
// differs from -0.0. Numeric equality for the comparison opcodes lives in
// the interpreter, not here.
impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Datum::None, Datum::None) => true,
            (Datum::Integer(a), Datum::Integer(b)) => a == b,
            (Datum::Real(a), Datum::Real(b)) => a.to_bits() == b.to_bits(),
            (Datum::Instruction(a), Datum::Instruction(b)) => a == b,
            (Datum::Function(a), Datum::Function(b)) => a == b,
            (Datum::List(a), Datum::List(b)) => a == b,
            (Datum::Scope(a), Datum::Scope(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl Datum {
    /// Returns the tag for this datum.
    pub fn tag(&self) -> Tag {
        match self {
            Datum::None => Tag::None,
            Datum::Integer(_) => Tag::Integer,
            Datum::Real(_) => Tag::Real,
            Datum::Instruction(_) => Tag::Instruction,
            Datum::Function(_) => Tag::Function,
            Datum::List(_) => Tag::List,
            Datum::Scope(_) => Tag::Scope,
        }
    }

    fn mismatch(&self, expected: Tag) -> TypeMismatch {
        TypeMismatch {
            expected,
            found: self.tag(),
        }
    }

    /// The integer payload.
    pub fn as_integer(&self) -> Result<i64, TypeMismatch> {
        match self {
            Datum::Integer(value) => Ok(*value),
            other => Err(other.mismatch(Tag::Integer)),
        }
    }

    /// The real payload. Integers are not promoted; see [`Datum::to_real`].
    pub fn as_real(&self) -> Result<f64, TypeMismatch> {
        match self {
            Datum::Real(value) => Ok(*value),
            other => Err(other.mismatch(Tag::Real)),
        }
    }

    /// Numeric payload promoted to `f64`.
    pub fn to_real(&self) -> Result<f64, TypeMismatch> {
        match self {
            Datum::Integer(value) => Ok(*value as f64),
            Datum::Real(value) => Ok(*value),
            other => Err(other.mismatch(Tag::Real)),
        }
    }

    /// The instruction payload.
    pub fn as_instruction(&self) -> Result<&Instruction, TypeMismatch> {
        match self {
            Datum::Instruction(instr) => Ok(instr),
            other => Err(other.mismatch(Tag::Instruction)),
        }
    }

    /// The function payload.
    pub fn as_function(&self) -> Result<&Function, TypeMismatch> {
        match self {
            Datum::Function(function) => Ok(function),
            other => Err(other.mismatch(Tag::Function)),
        }
    }

    /// The list payload.
    pub fn as_list(&self) -> Result<&List, TypeMismatch> {
        match self {
            Datum::List(list) => Ok(list),
            other => Err(other.mismatch(Tag::List)),
        }
    }

    /// The scope payload.
    pub fn as_scope(&self) -> Result<&Scope, TypeMismatch> {
        match self {
            Datum::Scope(scope) => Ok(scope),
            other => Err(other.mismatch(Tag::Scope)),
        }
    }

    /// Truthiness used by logical operators and conditional jumps.
    ///
    /// `None`, zero, `0.0` and the empty list are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Datum::None => false,
            Datum::Integer(value) => *value != 0,
            Datum::Real(value) => *value != 0.0,
            Datum::List(list) => !list.is_empty(),
            Datum::Instruction(_) | Datum::Function(_) | Datum::Scope(_) => true,
        }
    }
}

impl From<i64> for Datum {
    fn from(value: i64) -> Self {
        Datum::Integer(value)
    }
}

impl From<f64> for Datum {
    fn from(value: f64) -> Self {
        Datum::Real(value)
    }
}

impl From<Instruction> for Datum {
    fn from(instr: Instruction) -> Self {
        Datum::Instruction(instr)
    }
}

impl From<Function> for Datum {
    fn from(function: Function) -> Self {
        Datum::Function(function)
    }
}

impl From<List> for Datum {
    fn from(list: List) -> Self {
        Datum::List(list)
    }
}

impl From<Scope> for Datum {
    fn from(scope: Scope) -> Self {
        Datum::Scope(scope)
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::None => f.write_str("none"),
            Datum::Integer(value) => write!(f, "{value}"),
            Datum::Real(value) => write!(f, "{value:.6}"),
            Datum::Instruction(instr) => write!(f, "{instr}"),
            Datum::Function(function) => write!(f, "[function @{}]", function.address),
            Datum::List(list) => write!(f, "{list}"),
            Datum::Scope(_) => f.write_str("[scope]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    #[test]
    fn tags() {
        assert_eq!(Datum::None.tag(), Tag::None);
        assert_eq!(Datum::Integer(1).tag(), Tag::Integer);
        assert_eq!(Datum::Real(1.0).tag(), Tag::Real);
        assert_eq!(
            Datum::Instruction(Instruction::bare(Opcode::End)).tag(),
            Tag::Instruction
        );
        assert_eq!(
            Datum::Function(Function {
                address: 0,
                scope: Scope::global()
            })
            .tag(),
            Tag::Function
        );
        assert_eq!(Datum::List(List::Empty).tag(), Tag::List);
        assert_eq!(Datum::Scope(Scope::global()).tag(), Tag::Scope);
    }

    #[test]
    fn accessor_mismatch_reports_both_tags() {
        assert_eq!(
            Datum::Real(2.0).as_integer(),
            Err(TypeMismatch {
                expected: Tag::Integer,
                found: Tag::Real
            })
        );
        assert_eq!(
            Datum::None.as_function().unwrap_err(),
            TypeMismatch {
                expected: Tag::Function,
                found: Tag::None
            }
        );
        assert!(Datum::Integer(3).as_real().is_err());
        assert!(Datum::Integer(3).as_list().is_err());
        assert!(Datum::Integer(3).as_scope().is_err());
        assert!(Datum::Integer(3).as_instruction().is_err());
    }

    #[test]
    fn accessor_match() {
        assert_eq!(Datum::Integer(-4).as_integer(), Ok(-4));
        assert_eq!(Datum::Real(0.5).as_real(), Ok(0.5));
        assert_eq!(Datum::Integer(3).to_real(), Ok(3.0));
        assert_eq!(Datum::List(List::Empty).as_list(), Ok(&List::Empty));
    }

    #[test]
    fn empty_list_is_not_none() {
        assert_ne!(Datum::List(List::Empty), Datum::None);
        assert_eq!(Datum::List(List::default()), Datum::List(List::Empty));
    }

    #[test]
    fn real_equality_is_bitwise() {
        assert_eq!(Datum::Real(f64::NAN), Datum::Real(f64::NAN));
        assert_ne!(Datum::Real(0.0), Datum::Real(-0.0));
        assert_ne!(Datum::Real(1.0), Datum::Integer(1));
    }

    #[test]
    fn function_equality_is_address_and_scope_identity() {
        let scope = Scope::global();
        let a = Function {
            address: 3,
            scope: scope.clone(),
        };
        let b = Function {
            address: 3,
            scope: scope.clone(),
        };
        let c = Function {
            address: 3,
            scope: Scope::global(),
        };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn truthiness() {
        assert!(!Datum::None.is_truthy());
        assert!(!Datum::Integer(0).is_truthy());
        assert!(Datum::Integer(-1).is_truthy());
        assert!(!Datum::Real(0.0).is_truthy());
        assert!(Datum::Real(0.1).is_truthy());
        assert!(!Datum::List(List::Empty).is_truthy());
        assert!(Datum::List(List::cons(Datum::None, List::Empty)).is_truthy());
    }

    #[test]
    fn list_from_iter_preserves_order() {
        let list: List = vec![Datum::Integer(1), Datum::Integer(2), Datum::Integer(3)]
            .into_iter()
            .collect();
        let items: Vec<&Datum> = list.iter().collect();
        assert_eq!(
            items,
            vec![&Datum::Integer(1), &Datum::Integer(2), &Datum::Integer(3)]
        );
        assert_eq!(list.head(), Some(&Datum::Integer(1)));
        assert_eq!(list.tail().and_then(List::head), Some(&Datum::Integer(2)));
    }

    #[test]
    fn display_rendering() {
        assert_eq!(Datum::None.to_string(), "none");
        assert_eq!(Datum::Integer(-12).to_string(), "-12");
        assert_eq!(Datum::Real(5.0).to_string(), "5.000000");
        assert_eq!(
            Datum::Function(Function {
                address: 17,
                scope: Scope::global()
            })
            .to_string(),
            "[function @17]"
        );
        assert_eq!(
            Datum::Instruction(Instruction::new(2, 4, "a.calc")).to_string(),
            "[2 4 a.calc]"
        );
        assert_eq!(Datum::List(List::Empty).to_string(), "[]");
        let list: List = vec![Datum::Integer(1), Datum::Real(0.5)].into_iter().collect();
        assert_eq!(Datum::List(list).to_string(), "[1, 0.500000]");
        assert_eq!(Datum::Scope(Scope::global()).to_string(), "[scope]");
    }

    #[test]
    fn conversions() {
        assert_eq!(Datum::from(3i64), Datum::Integer(3));
        assert_eq!(Datum::from(2.5f64), Datum::Real(2.5));
        assert_eq!(Datum::from(List::Empty), Datum::List(List::Empty));
    }
}
