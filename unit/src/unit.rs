//! The compiled code-unit representation.

use crate::instruction::Instr;

/// A compiled callable unit.
///
/// A unit is immutable once built: the compiler produces it through
/// [`crate::UnitBuilder`] and the runtime executes it with the arguments
/// bound positionally to `params`.
#[derive(Debug, PartialEq, Clone)]
pub struct CodeUnit {
    /// Display name used in failure reports.
    pub name: String,
    /// Ordered formal parameter names.
    pub params: Vec<String>,
    /// First source line of the code the unit was compiled from (1-indexed).
    pub first_line: u32,
    /// The instruction sequence.
    pub instructions: Vec<Instr>,
    /// The maximum operand-stack depth the instruction sequence reaches.
    pub max_stack: u16,
}
