//! Abstract program-unit format for Canopy generated code.
//!
//! A compiled block is a [`CodeUnit`]: an ordered sequence of abstract
//! stack-machine instructions plus the unit's formal parameters and stack
//! requirements. The assembler that serializes units into a loadable binary
//! lives with the runtime, not here; this crate only defines the shared
//! in-memory representation.

mod builder;
mod constant;
pub mod helper;
mod instruction;
mod unit;

pub use builder::UnitBuilder;
pub use constant::Const;
pub use instruction::{BinOp, Instr, UnOp};
pub use unit::CodeUnit;
