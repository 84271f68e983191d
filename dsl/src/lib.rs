//! Provides definitions of objects from the Canopy declarative object-tree
//! language and the diagnostics used to report problems with them.

pub mod ast;
pub mod core;
pub mod diagnostic;
pub mod expr;
