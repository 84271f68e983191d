//! Runtime helper function names shared between the compiler and runtime.
//!
//! Generated code reaches everything that needs dynamic type information
//! through these named, fixed-arity helpers; the compiler itself is purely
//! static. The helper library is part of the runtime, not this crate.

/// `validate_declarative(type) -> type`
///
/// Raises if the value is not a declarative type; returns it unchanged.
pub const VALIDATE_DECLARATIVE: &str = "validate_declarative";

/// `add_storage(class, name, type_or_none, kind) -> None`
///
/// Appends a named, optionally typed storage slot to a derived type
/// descriptor. `kind` is a storage-kind token (`"attr"` or `"event"`).
pub const ADD_STORAGE: &str = "add_storage";

/// `declarative_node(class, identifier_or_none, scope_key) -> node`
///
/// Constructs the runtime node object for one object definition.
pub const DECLARATIVE_NODE: &str = "declarative_node";

/// `validate_template(template) -> template`
///
/// Raises if the value is not a template; returns it unchanged.
pub const VALIDATE_TEMPLATE: &str = "validate_template";

/// `validate_unpack_size(result, count, has_star) -> None`
///
/// Raises if a template instantiation result cannot unpack into `count`
/// fixed names (plus a starred tail when `has_star`).
pub const VALIDATE_UNPACK_SIZE: &str = "validate_unpack_size";

/// `template_inst_node(result, names, starred_name) -> node`
///
/// Wraps a template instantiation result in a compiler node. `names` is the
/// tuple of fixed unpack names and `starred_name` the starred tail name, or
/// the empty string when there is none.
pub const TEMPLATE_INST_NODE: &str = "template_inst_node";

/// `run_operator(node, attribute_name, operator_token, compiled_unit, scope) -> None`
///
/// Dispatches a reactive-binding operator. Every binding operator flows
/// through this single hook; the compiler threads the token and the
/// compiled unit through without interpreting either.
pub const RUN_OPERATOR: &str = "run_operator";

/// `make_scope() -> scope`
///
/// Constructs the fresh per-block scope object the preamble stores under
/// the block's scope key.
pub const MAKE_SCOPE: &str = "make_scope";

/// `template_node(scope) -> node`
///
/// Constructs the root compiler node a template body populates.
pub const TEMPLATE_NODE: &str = "template_node";
