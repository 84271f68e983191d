//! Code generation for the Canopy declarative object-tree language.
//!
//! Turns parsed declarations into abstract stack-machine code units. The
//! generated code builds the declared node tree at run time, reaching all
//! dynamic behavior through named runtime helpers so the compiler itself
//! stays fully static.

mod block;
mod compile;
mod emit;
mod expr;
mod names;
mod scope;

pub use block::{BlockCompiler, NameResolver, NODE_MAP, SCOPE_KEY};
pub use compile::{compile_object_decl, compile_template_decl, ModuleResolver, TemplateResolver};
pub use emit::Emitter;
pub use expr::{compile_expr, compile_stmts, referenced_names, NameMode};
pub use names::NamePool;
pub use scope::isolate;
