//! Abstract instruction definitions shared between the compiler and the
//! runtime.
//!
//! Operands are symbolic: names are strings resolved by the executing scope
//! and constants are carried inline. The assembler is responsible for
//! interning names and pooling constants when it serializes a unit.

use crate::constant::Const;

/// Arithmetic, comparison and boolean binary operators.
///
/// Pops two values (right then left), pushes the result.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// Unary operators. Pops one value, pushes the result.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnOp {
    Neg,
    Not,
}

/// A single abstract stack-machine instruction.
#[derive(Debug, PartialEq, Clone)]
pub enum Instr {
    /// Sets the current source line for subsequent instructions.
    /// No stack effect.
    SetLine(u32),

    /// Pushes a constant.
    LoadConst(Const),

    /// Pushes the value of a block-local variable.
    LoadLocal(String),
    /// Pops a value and stores it into a block-local variable.
    StoreLocal(String),

    /// Pushes the value bound to a name, resolved dynamically through the
    /// executing scope. Used inside bound-expression units whose scope is
    /// supplied by the reactive runtime.
    LoadName(String),
    /// Pops a value and binds it to a name in the executing scope.
    StoreName(String),

    /// Pushes the value bound to a name at module level.
    LoadGlobal(String),

    /// Pushes the named runtime helper function. See [`crate::helper`].
    LoadHelper(String),

    /// Pops an object, pushes the value of the named attribute.
    LoadAttr(String),

    /// Calls a callable with `argc` positional arguments. Pops the arguments
    /// and the callable, pushes the result.
    Call(u16),
    /// Calls a callable with `argc` positional arguments followed by one
    /// sequence value of additional arguments. Pops `argc + 2`, pushes the
    /// result.
    CallVar(u16),

    /// Pops a code constant, pushes a callable closed over nothing.
    MakeFunction,

    /// Pushes a new empty map.
    BuildMap,
    /// Pops a key then a value, stores the pair into the map below them.
    /// The map remains on the stack.
    StoreMap,

    /// Duplicates the value on top of the stack.
    DupTop,
    /// Swaps the two values on top of the stack. No net stack effect.
    RotTwo,
    /// Pops and discards the value on top of the stack.
    PopTop,

    /// Applies a binary operator. Pops two, pushes one.
    Binary(BinOp),
    /// Applies a unary operator. Pops one, pushes one.
    Unary(UnOp),

    /// Pops a declarative type descriptor, pushes a fresh descriptor derived
    /// from it, tagged with the original type name and the declaring module.
    /// Storage slots added through `add_storage` land on the derived
    /// descriptor, leaving the base type untouched.
    DeriveType { type_name: String },

    /// Opens a failure-propagation region. A run-time failure raised before
    /// the matching [`Instr::ExitFailureRegion`] has its reported location
    /// rewritten to the given declarative-source line before it continues to
    /// propagate. No stack effect.
    EnterFailureRegion { line: u32 },
    /// Closes the innermost failure-propagation region. No stack effect.
    ExitFailureRegion,

    /// Pops a value and returns it from the unit.
    Return,
    /// Returns from the unit without a value.
    ReturnNone,
}
