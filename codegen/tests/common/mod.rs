#![allow(dead_code)]

//! Shared builders for declaration trees used across the integration tests.

use canopy_dsl::ast::{
    Binding, BodyItem, ChildDef, EmbeddedExpr, EmbeddedKind, ObjectDecl, OperatorExpr,
    StorageExpr, StorageKind, TemplateDecl, TemplateInst, UnpackSpec,
};
use canopy_dsl::core::Id;
use canopy_dsl::expr::Expr;

pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn object_decl(
    name: &str,
    base: &str,
    identifier: Option<&str>,
    body: Vec<BodyItem>,
    line: u32,
) -> ObjectDecl {
    ObjectDecl {
        name: Id::from(name),
        base: Id::from(base),
        identifier: identifier.map(Id::from),
        body,
        line,
    }
}

pub fn template_decl(name: &str, params: &[&str], body: Vec<BodyItem>, line: u32) -> TemplateDecl {
    TemplateDecl {
        name: Id::from(name),
        params: params.iter().map(|p| Id::from(p)).collect(),
        body,
        line,
    }
}

pub fn child(type_name: &str, identifier: Option<&str>, body: Vec<BodyItem>, line: u32) -> BodyItem {
    BodyItem::ChildDef(ChildDef {
        type_name: Id::from(type_name),
        identifier: identifier.map(Id::from),
        body,
        line,
    })
}

pub fn embedded(ast: Expr, line: u32) -> EmbeddedExpr {
    EmbeddedExpr { ast, line }
}

pub fn op_expr(operator: &str, ast: Expr, line: u32) -> OperatorExpr {
    OperatorExpr {
        operator: String::from(operator),
        value: EmbeddedKind::Expression(embedded(ast, line)),
        line,
    }
}

pub fn binding(name: &str, operator: &str, ast: Expr, line: u32) -> BodyItem {
    BodyItem::Binding(Binding {
        name: Id::from(name),
        expr: op_expr(operator, ast, line),
        line,
    })
}

pub fn storage(
    name: &str,
    type_name: Option<&str>,
    kind: StorageKind,
    expr: Option<OperatorExpr>,
    line: u32,
) -> BodyItem {
    BodyItem::Storage(StorageExpr {
        name: Id::from(name),
        type_name: type_name.map(Id::from),
        kind,
        expr,
        line,
    })
}

pub fn inst(
    name: &str,
    args: Vec<EmbeddedExpr>,
    stararg: Option<EmbeddedExpr>,
    names: &[&str],
    starname: Option<&str>,
    line: u32,
) -> BodyItem {
    let identifiers = if names.is_empty() && starname.is_none() {
        None
    } else {
        Some(UnpackSpec {
            names: names.iter().map(|n| Id::from(n)).collect(),
            starname: starname.map(Id::from),
        })
    };
    BodyItem::TemplateInst(TemplateInst {
        name: Id::from(name),
        args,
        stararg,
        identifiers,
        line,
    })
}
