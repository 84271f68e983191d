//! Compiles embedded host expressions and statement blocks.
//!
//! Embedded fragments are compiled without interpretation: names are either
//! rewritten to fast locals (inside isolated scopes, where the referenced
//! values arrive as parameters) or left dynamic (inside bound-expression
//! units, where the reactive runtime supplies the scope).

use canopy_dsl::core::Id;
use canopy_dsl::expr::{BinaryOp, Expr, Literal, Stmt, UnaryOp};
use canopy_unit::{BinOp, Const, UnOp};

use crate::emit::Emitter;

/// How name references inside an embedded fragment compile.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NameMode {
    /// Names load from fast locals; the unit receives them as parameters.
    Param,
    /// Names resolve dynamically through the executing scope.
    Dynamic,
}

/// Compiles an expression, leaving its value on the stack.
pub fn compile_expr(emitter: &mut Emitter, expr: &Expr, mode: NameMode) {
    match expr {
        Expr::Name(id) => match mode {
            NameMode::Param => emitter.emit_load_local(id.as_str()),
            NameMode::Dynamic => emitter.emit_load_name(id.as_str()),
        },
        Expr::Literal(literal) => emitter.emit_load_const(literal_const(literal)),
        Expr::Unary { op, term } => {
            compile_expr(emitter, term, mode);
            emitter.emit_unary(unary_op(op));
        }
        Expr::Binary { op, left, right } => {
            compile_expr(emitter, left, mode);
            compile_expr(emitter, right, mode);
            emitter.emit_binary(binary_op(op));
        }
        Expr::Attribute { value, attr } => {
            compile_expr(emitter, value, mode);
            emitter.emit_load_attr(attr.as_str());
        }
        Expr::Call { func, args } => {
            compile_expr(emitter, func, mode);
            for arg in args {
                compile_expr(emitter, arg, mode);
            }
            emitter.emit_call(args.len());
        }
    }
}

/// Compiles a statement block. Assignments bind names in the executing
/// scope; bare expressions evaluate for effect and discard their value.
pub fn compile_stmts(emitter: &mut Emitter, stmts: &[Stmt]) {
    for stmt in stmts {
        match stmt {
            Stmt::Assign { target, value } => {
                compile_expr(emitter, value, NameMode::Dynamic);
                emitter.emit_store_name(target.as_str());
            }
            Stmt::Expr(expr) => {
                compile_expr(emitter, expr, NameMode::Dynamic);
                emitter.emit_pop_top();
            }
        }
    }
}

/// Collects the names an expression references, in first-reference order
/// with duplicates removed. Attribute names are not references.
pub fn referenced_names(expr: &Expr) -> Vec<Id> {
    let mut names = Vec::new();
    collect_names(expr, &mut names);
    names
}

fn collect_names(expr: &Expr, names: &mut Vec<Id>) {
    match expr {
        Expr::Name(id) => {
            if !names.contains(id) {
                names.push(id.clone());
            }
        }
        Expr::Literal(_) => {}
        Expr::Unary { term, .. } => collect_names(term, names),
        Expr::Binary { left, right, .. } => {
            collect_names(left, names);
            collect_names(right, names);
        }
        Expr::Attribute { value, .. } => collect_names(value, names),
        Expr::Call { func, args } => {
            collect_names(func, names);
            for arg in args {
                collect_names(arg, names);
            }
        }
    }
}

fn literal_const(literal: &Literal) -> Const {
    match literal {
        Literal::None => Const::None,
        Literal::Bool(v) => Const::Bool(*v),
        Literal::Int(v) => Const::Int(*v),
        Literal::Float(v) => Const::Float(*v),
        Literal::Str(v) => Const::str(v),
    }
}

fn unary_op(op: &UnaryOp) -> UnOp {
    match op {
        UnaryOp::Neg => UnOp::Neg,
        UnaryOp::Not => UnOp::Not,
    }
}

fn binary_op(op: &BinaryOp) -> BinOp {
    match op {
        BinaryOp::Add => BinOp::Add,
        BinaryOp::Sub => BinOp::Sub,
        BinaryOp::Mul => BinOp::Mul,
        BinaryOp::Div => BinOp::Div,
        BinaryOp::Mod => BinOp::Mod,
        BinaryOp::Eq => BinOp::Eq,
        BinaryOp::Ne => BinOp::Ne,
        BinaryOp::Lt => BinOp::Lt,
        BinaryOp::Le => BinOp::Le,
        BinaryOp::Gt => BinOp::Gt,
        BinaryOp::Ge => BinOp::Ge,
        BinaryOp::And => BinOp::And,
        BinaryOp::Or => BinOp::Or,
    }
}
