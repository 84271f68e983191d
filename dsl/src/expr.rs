//! Provides definitions of the embedded host-expression language.
//!
//! Attribute bindings and template arguments embed general-purpose
//! expressions and statement blocks in declarative source. The front end
//! parses those fragments into the types below; code generation compiles
//! them into standalone code units without interpreting them.

use crate::core::Id;

/// A value-producing expression.
#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    /// A reference to a name in the enclosing scope.
    Name(Id),
    /// A literal constant.
    Literal(Literal),
    /// A unary operation applied to a term.
    Unary { op: UnaryOp, term: Box<Expr> },
    /// A binary operation between two terms.
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Attribute access on the result of an expression.
    Attribute { value: Box<Expr>, attr: Id },
    /// A call of the result of an expression with positional arguments.
    Call { func: Box<Expr>, args: Vec<Expr> },
}

impl Expr {
    pub fn name(name: &str) -> Expr {
        Expr::Name(Id::from(name))
    }

    pub fn int(value: i64) -> Expr {
        Expr::Literal(Literal::Int(value))
    }

    pub fn str(value: &str) -> Expr {
        Expr::Literal(Literal::Str(String::from(value)))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn attribute(value: Expr, attr: &str) -> Expr {
        Expr::Attribute {
            value: Box::new(value),
            attr: Id::from(attr),
        }
    }

    pub fn call(func: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call {
            func: Box::new(func),
            args,
        }
    }
}

/// An elementary constant.
#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// Binary operators, covering arithmetic, comparison and boolean logic.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinaryOp {
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

/// A statement in an embedded statement block.
#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    /// Binds a name in the executing scope to the value of an expression.
    Assign { target: Id, value: Expr },
    /// Evaluates an expression for its side effects and discards the value.
    Expr(Expr),
}
