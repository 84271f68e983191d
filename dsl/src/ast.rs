//! Provides definitions of the declarative object-tree language elements.
//!
//! A Canopy source file declares named object trees. Each declaration has a
//! body of items: nested child definitions, template instantiations, storage
//! declarations and attribute bindings. Every node carries the source line
//! number on which it starts; generated code uses the line to annotate
//! run-time failures with declarative-source coordinates.

use crate::core::{Id, Located, SourceSpan};
use crate::expr::{Expr, Stmt};

/// A top-level named object definition.
///
/// Introduces a new declarative type named `name` that derives from the
/// type bound to `base` at module level.
#[derive(Debug, PartialEq, Clone)]
pub struct ObjectDecl {
    /// The name of the type this declaration introduces.
    pub name: Id,
    /// The name of the base declarative type.
    pub base: Id,
    /// Identifier under which the root node is visible inside the block.
    pub identifier: Option<Id>,
    /// The items declared in the body, in source order.
    pub body: Vec<BodyItem>,
    /// Line on which the declaration starts (1-indexed).
    pub line: u32,
}

/// A top-level parameterized block definition.
///
/// Instantiating the template evaluates the body once per instantiation,
/// with the parameters bound to the instantiation arguments.
#[derive(Debug, PartialEq, Clone)]
pub struct TemplateDecl {
    /// The name of the template.
    pub name: Id,
    /// The ordered formal parameter names.
    pub params: Vec<Id>,
    /// The items declared in the body, in source order.
    pub body: Vec<BodyItem>,
    /// Line on which the declaration starts (1-indexed).
    pub line: u32,
}

/// An item in the body of an object definition or template.
#[derive(Debug, PartialEq, Clone)]
pub enum BodyItem {
    ChildDef(ChildDef),
    TemplateInst(TemplateInst),
    Storage(StorageExpr),
    Binding(Binding),
}

/// A child object definition nested inside an enclosing definition.
#[derive(Debug, PartialEq, Clone)]
pub struct ChildDef {
    /// The name of the declarative type to instantiate.
    pub type_name: Id,
    /// Identifier under which the node is visible inside the block.
    pub identifier: Option<Id>,
    /// The items declared in the body, in source order.
    pub body: Vec<BodyItem>,
    /// Line on which the definition starts (1-indexed).
    pub line: u32,
}

impl ChildDef {
    /// Returns true if any direct body item declares storage. Such a
    /// definition requires a fresh derived type so instance-level slots do
    /// not pollute the shared base type.
    pub fn declares_storage(&self) -> bool {
        self.body
            .iter()
            .any(|item| matches!(item, BodyItem::Storage(_)))
    }
}

impl Located for ChildDef {
    fn span(&self) -> SourceSpan {
        self.type_name.span()
    }
}

/// An instantiation of a template inside a definition body.
#[derive(Debug, PartialEq, Clone)]
pub struct TemplateInst {
    /// The name of the template to instantiate.
    pub name: Id,
    /// Positional argument expressions, in call order.
    pub args: Vec<EmbeddedExpr>,
    /// Optional variadic argument expression (evaluates to a sequence).
    pub stararg: Option<EmbeddedExpr>,
    /// Optional identifiers into which the instantiation result unpacks.
    pub identifiers: Option<UnpackSpec>,
    /// Line on which the instantiation starts (1-indexed).
    pub line: u32,
}

/// The identifiers a template instantiation unpacks into.
#[derive(Debug, PartialEq, Clone)]
pub struct UnpackSpec {
    /// The fixed names, in declaration order.
    pub names: Vec<Id>,
    /// Optional starred tail name collecting the remaining nodes.
    pub starname: Option<Id>,
}

/// The kind of storage slot a storage declaration adds.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StorageKind {
    /// A data attribute slot.
    Attr,
    /// An event slot.
    Event,
}

impl StorageKind {
    /// The token the runtime helper contract uses for this kind.
    pub fn token(&self) -> &'static str {
        match self {
            StorageKind::Attr => "attr",
            StorageKind::Event => "event",
        }
    }
}

/// A declaration adding a named, optionally typed slot to the enclosing
/// definition's type.
#[derive(Debug, PartialEq, Clone)]
pub struct StorageExpr {
    /// The name of the slot to add.
    pub name: Id,
    /// Optional declared type name, resolved at run time.
    pub type_name: Option<Id>,
    /// Whether the slot is a data attribute or an event.
    pub kind: StorageKind,
    /// Optional binding applied to the freshly declared slot.
    pub expr: Option<OperatorExpr>,
    /// Line on which the declaration starts (1-indexed).
    pub line: u32,
}

/// A binding of an existing attribute to an expression.
#[derive(Debug, PartialEq, Clone)]
pub struct Binding {
    /// The name of the attribute being bound.
    pub name: Id,
    /// The operator and wrapped expression applied to the attribute.
    pub expr: OperatorExpr,
    /// Line on which the binding starts (1-indexed).
    pub line: u32,
}

/// An attribute binding through a named reactive operator.
///
/// The compiler is operator-agnostic: the token is threaded through to the
/// `run_operator` runtime helper, which dispatches on it.
#[derive(Debug, PartialEq, Clone)]
pub struct OperatorExpr {
    /// The operator token as written in source (e.g. `=`, `<<`, `::`).
    pub operator: String,
    /// The wrapped expression or statement block.
    pub value: EmbeddedKind,
    /// Line on which the operator appears (1-indexed).
    pub line: u32,
}

/// The embedded host-language fragment wrapped by an operator expression.
#[derive(Debug, PartialEq, Clone)]
pub enum EmbeddedKind {
    /// A value-producing expression.
    Expression(EmbeddedExpr),
    /// A side-effecting statement block.
    Block(EmbeddedBlock),
}

/// A parsed value-producing host expression.
#[derive(Debug, PartialEq, Clone)]
pub struct EmbeddedExpr {
    pub ast: Expr,
    /// Line on which the expression starts (1-indexed).
    pub line: u32,
}

/// A parsed sequence of host statements.
#[derive(Debug, PartialEq, Clone)]
pub struct EmbeddedBlock {
    pub stmts: Vec<Stmt>,
    /// Line on which the block starts (1-indexed).
    pub line: u32,
}
