//! Constant values carried inline by instructions.

use core::fmt;

use crate::unit::CodeUnit;

/// A constant operand.
///
/// `Code` constants hold nested compiled units, the way the original
/// host embeds code objects in enclosing code; the assembler flattens them
/// into a unit table when serializing.
#[derive(Debug, PartialEq, Clone)]
pub enum Const {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Tuple(Vec<Const>),
    Code(Box<CodeUnit>),
}

impl Const {
    pub fn str(value: &str) -> Const {
        Const::Str(String::from(value))
    }

    pub fn tuple_of_strs(values: &[&str]) -> Const {
        Const::Tuple(values.iter().map(|v| Const::str(v)).collect())
    }

    pub fn code(unit: CodeUnit) -> Const {
        Const::Code(Box::new(unit))
    }
}

impl fmt::Display for Const {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Const::None => write!(f, "None"),
            Const::Bool(v) => write!(f, "{}", v),
            Const::Int(v) => write!(f, "{}", v),
            Const::Float(v) => write!(f, "{}", v),
            Const::Str(v) => write!(f, "{:?}", v),
            Const::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Const::Code(unit) => write!(f, "<code {}>", unit.name),
        }
    }
}
