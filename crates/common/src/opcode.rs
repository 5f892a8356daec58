//! Opcode table for the calculator instruction stream.
//!
//! Ids are fixed by the compiler that produces the bytecode, which is why
//! the numbering has gaps (10, 32, 42, 43, 47-49, 51, 52, 55, 56 were retired
//! upstream and are rejected as unknown).

use crate::error::DecodeError;

/// Identifies the operation an instruction record performs.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// No operation. Compilers emit it as a jump landing pad.
    Nothing = 0,
    /// Push the next stream datum.
    Constant = 1,

    // Binary arithmetic
    /// Pop two values, push their sum.
    Add = 2,
    /// Pop two values, push (left - right).
    Sub = 3,
    /// Pop two values, push their product.
    Mul = 4,
    /// Pop two values, push the quotient. Zero divisor is a domain error.
    Div = 5,
    /// Pop two values, push the remainder (sign of the dividend).
    Mod = 6,
    /// Pop two values, push left raised to right.
    Pow = 7,
    /// Logical AND of the operands' truthiness.
    And = 8,
    /// Logical OR of the operands' truthiness.
    Or = 9,

    // Unary
    /// Logical negation.
    Not = 11,
    /// Arithmetic negation.
    Negate = 12,
    /// Integer factorial.
    Factorial = 13,

    /// Jump if the top value is a macro. Reserved.
    JumpIfMacro = 14,
    /// Call the function below `n` arguments. Operand: argument count.
    Call = 15,
    /// Legacy name lookup. Reserved.
    Word = 16,
    /// Pop slot address, pop value, store into the scope chain.
    Assignment = 17,
    /// Swap the two top values.
    Swap = 18,
    /// Halt. The operand stack is the result.
    End = 19,
    /// Declare a macro. Reserved.
    FunctionMacro = 20,
    /// Push a closure. Operand: code address.
    Function = 21,
    /// Return from the current activation.
    Return = 22,

    // Control flow
    /// Unconditional jump. Operand: target address.
    Jump = 23,
    /// Pop condition, jump if truthy. Operand: target address.
    JumpIfTrue = 24,
    /// Pop condition, jump if falsy. Operand: target address.
    JumpIfFalse = 25,

    // Stack manipulation
    /// Duplicate the top value.
    Duplicate = 26,
    /// Discard the top value.
    Discard = 27,

    // Comparison
    /// Pop two, push 1 if left < right.
    Less = 28,
    /// Pop two, push 1 if left > right.
    More = 29,
    /// Pop two, push 1 if left <= right.
    LessEq = 30,
    /// Pop two, push 1 if left >= right.
    MoreEq = 31,
    /// Pop two, push 1 if equal.
    Equal = 33,
    /// Pop two, push 1 if not equal.
    NotEqual = 34,

    // Chained comparison
    /// Chain step for `<`.
    CmpLess = 35,
    /// Chain step for `>`.
    CmpMore = 36,
    /// Chain step for `<=`.
    CmpLessEq = 37,
    /// Chain step for `>=`.
    CmpMoreEq = 38,
    /// Chain step for `==`.
    CmpEqual = 39,
    /// Chain step for `!=`.
    CmpNotEqual = 40,

    /// Store a call result in the call cache. Reserved.
    StoreInCache = 41,

    // Variable access
    /// Push a global slot. Operands: index, name.
    AccessGlobal = 44,
    /// Push a slot resolved through the scope chain. Operand: index.
    AccessLocal = 45,
    /// Push a slot at an exact depth. Operands: depth, index.
    AccessSemi = 46,

    /// Push the empty list. Deprecated spelling of `ListCreateEmpty`.
    ConstantEmptyArray = 50,
    /// Index into an array. Reserved.
    AccessArrayElement = 53,
    /// Call without consulting the call cache. Operand: argument count.
    CallNoCache = 54,
    /// Begin a protected global block. Reserved.
    BeginProtectedGlobalBlock = 57,
    /// End a protected global block. Reserved.
    EndProtectedGlobalBlock = 58,
    /// Bind a symbolic variable. Reserved.
    DeclareSymbol = 59,

    // Lists
    /// Push the empty list.
    ListCreateEmpty = 60,
    /// Head of a list. Reserved.
    ListExtractFirst = 61,
    /// Tail of a list. Reserved.
    ListExtractRest = 62,
    /// Prepend to a list. Reserved.
    ListPrepend = 63,
    /// Concatenate lists. Reserved.
    ListConcat = 64,

    /// Call in tail position, reusing the current activation. Operand: argument count.
    CallTail = 65,
    /// Install an error handler. Reserved.
    PushErrorStopgap = 66,
    /// Push a string constant. Reserved.
    ConstantString = 67,
    /// Push a glyph constant. Reserved.
    ConstantGlyph = 68,
    /// Reset a global slot to uninitialised. Operand: index.
    Unload = 69,
}

/// All defined opcodes, in id order.
pub const ALL_OPCODES: [Opcode; 59] = [
    Opcode::Nothing,
    Opcode::Constant,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Mod,
    Opcode::Pow,
    Opcode::And,
    Opcode::Or,
    Opcode::Not,
    Opcode::Negate,
    Opcode::Factorial,
    Opcode::JumpIfMacro,
    Opcode::Call,
    Opcode::Word,
    Opcode::Assignment,
    Opcode::Swap,
    Opcode::End,
    Opcode::FunctionMacro,
    Opcode::Function,
    Opcode::Return,
    Opcode::Jump,
    Opcode::JumpIfTrue,
    Opcode::JumpIfFalse,
    Opcode::Duplicate,
    Opcode::Discard,
    Opcode::Less,
    Opcode::More,
    Opcode::LessEq,
    Opcode::MoreEq,
    Opcode::Equal,
    Opcode::NotEqual,
    Opcode::CmpLess,
    Opcode::CmpMore,
    Opcode::CmpLessEq,
    Opcode::CmpMoreEq,
    Opcode::CmpEqual,
    Opcode::CmpNotEqual,
    Opcode::StoreInCache,
    Opcode::AccessGlobal,
    Opcode::AccessLocal,
    Opcode::AccessSemi,
    Opcode::ConstantEmptyArray,
    Opcode::AccessArrayElement,
    Opcode::CallNoCache,
    Opcode::BeginProtectedGlobalBlock,
    Opcode::EndProtectedGlobalBlock,
    Opcode::DeclareSymbol,
    Opcode::ListCreateEmpty,
    Opcode::ListExtractFirst,
    Opcode::ListExtractRest,
    Opcode::ListPrepend,
    Opcode::ListConcat,
    Opcode::CallTail,
    Opcode::PushErrorStopgap,
    Opcode::ConstantString,
    Opcode::ConstantGlyph,
    Opcode::Unload,
];

impl TryFrom<u32> for Opcode {
    type Error = DecodeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        ALL_OPCODES
            .iter()
            .copied()
            .find(|op| *op as u32 == value)
            .ok_or(DecodeError::UnknownOpcode(value))
    }
}

impl Opcode {
    /// Returns the upper-case mnemonic used in diagnostics and traces.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Nothing => "NOTHING",
            Opcode::Constant => "CONSTANT",
            Opcode::Add => "BIN_ADD",
            Opcode::Sub => "BIN_SUB",
            Opcode::Mul => "BIN_MUL",
            Opcode::Div => "BIN_DIV",
            Opcode::Mod => "BIN_MOD",
            Opcode::Pow => "BIN_POW",
            Opcode::And => "BIN_AND",
            Opcode::Or => "BIN_OR",
            Opcode::Not => "UNR_NOT",
            Opcode::Negate => "UNR_MIN",
            Opcode::Factorial => "UNR_FAC",
            Opcode::JumpIfMacro => "JUMP_IF_MACRO",
            Opcode::Call => "ARG_LIST_END",
            Opcode::Word => "WORD",
            Opcode::Assignment => "ASSIGNMENT",
            Opcode::Swap => "STACK_SWAP",
            Opcode::End => "END",
            Opcode::FunctionMacro => "FUNCTION_MACRO",
            Opcode::Function => "FUNCTION_NORMAL",
            Opcode::Return => "RETURN",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfTrue => "JUMP_IF_TRUE",
            Opcode::JumpIfFalse => "JUMP_IF_FALSE",
            Opcode::Duplicate => "DUPLICATE",
            Opcode::Discard => "DISCARD",
            Opcode::Less => "BIN_LESS",
            Opcode::More => "BIN_MORE",
            Opcode::LessEq => "BIN_L_EQ",
            Opcode::MoreEq => "BIN_M_EQ",
            Opcode::Equal => "BIN_EQUL",
            Opcode::NotEqual => "BIN_N_EQ",
            Opcode::CmpLess => "CMP_LESS",
            Opcode::CmpMore => "CMP_MORE",
            Opcode::CmpLessEq => "CMP_L_EQ",
            Opcode::CmpMoreEq => "CMP_M_EQ",
            Opcode::CmpEqual => "CMP_EQUL",
            Opcode::CmpNotEqual => "CMP_N_EQ",
            Opcode::StoreInCache => "STORE_IN_CACHE",
            Opcode::AccessGlobal => "ACCESS_GLOBAL",
            Opcode::AccessLocal => "ACCESS_LOCAL",
            Opcode::AccessSemi => "ACCESS_SEMI",
            Opcode::ConstantEmptyArray => "CONSTANT_EMPTY_ARRAY",
            Opcode::AccessArrayElement => "ACCESS_ARRAY_ELEMENT",
            Opcode::CallNoCache => "ARG_LIST_END_NO_CACHE",
            Opcode::BeginProtectedGlobalBlock => "BEGIN_PROTECTED_GLOBAL_BLOCK",
            Opcode::EndProtectedGlobalBlock => "END_PROTECTED_GLOBAL_BLOCK",
            Opcode::DeclareSymbol => "DECLARE_SYMBOL",
            Opcode::ListCreateEmpty => "LIST_CREATE_EMPTY",
            Opcode::ListExtractFirst => "LIST_EXTRACT_FIRST",
            Opcode::ListExtractRest => "LIST_EXTRACT_REST",
            Opcode::ListPrepend => "LIST_PREPEND",
            Opcode::ListConcat => "LIST_CONCAT",
            Opcode::CallTail => "ARG_LIST_END_WITH_TCO",
            Opcode::PushErrorStopgap => "PUSH_ERROR_STOPGAP",
            Opcode::ConstantString => "CONSTANT_STRING",
            Opcode::ConstantGlyph => "CONSTANT_GLYPH",
            Opcode::Unload => "UNLOAD",
        }
    }

    /// Opcodes that exist in the instruction set but have no runtime
    /// behaviour here (macros, non-empty lists, strings, the call cache,
    /// protected assignment, symbols, error handlers).
    pub fn is_reserved(&self) -> bool {
        matches!(
            self,
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
                | Opcode::ConstantGlyph
        )
    }
}
