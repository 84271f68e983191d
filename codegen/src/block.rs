//! Compiles one declaration block into an instruction sequence.
//!
//! A block is the body of a named object declaration or a template. The
//! compiler walks the body items in source order and emits code that builds
//! the node tree at run time, keeping four parallel stacks in step with the
//! nesting of the walk: the enclosing class temporaries, the enclosing node
//! temporaries, the attribute names currently being bound and the compiled
//! units awaiting a binding call. All four drain to empty by block exit.

use std::collections::HashSet;

use canopy_dsl::ast::{
    Binding, BodyItem, ChildDef, EmbeddedExpr, EmbeddedKind, ObjectDecl, OperatorExpr,
    StorageExpr, TemplateDecl, TemplateInst,
};
use canopy_dsl::core::{Id, Located};
use canopy_dsl::diagnostic::{Diagnostic, Label};
use canopy_problems::Problem;
use canopy_unit::{helper, CodeUnit, Const, UnitBuilder};

use crate::emit::Emitter;
use crate::expr::{compile_expr, compile_stmts, NameMode};
use crate::names::NamePool;
use crate::scope;

/// Local variable holding the per-block scope object.
pub const SCOPE_KEY: &str = "_[scope_key]";

/// Local variable holding the identifier-to-node map.
pub const NODE_MAP: &str = "_[node_map]";

/// Prefix reserved for compiler-generated variable names.
const RESERVED_PREFIX: &str = "_[";

/// Resolves name loads that the block itself cannot satisfy.
///
/// The block compiler handles names bound to block identifiers; everything
/// else depends on the kind of block being compiled, so the entry points
/// supply a resolver for it.
pub trait NameResolver {
    /// Emits instructions pushing the value of `name`.
    fn load_name(&self, emitter: &mut Emitter, name: &Id) -> Result<(), Diagnostic>;

    /// Names the resolver can satisfy from block-local storage. These are
    /// capturable by isolated template-argument scopes.
    fn local_names(&self) -> HashSet<String>;
}

pub struct BlockCompiler<'r> {
    resolver: &'r dyn NameResolver,
    emitter: Emitter,
    names: NamePool,
    class_stack: Vec<String>,
    node_stack: Vec<String>,
    bind_stack: Vec<String>,
    code_stack: Vec<CodeUnit>,
    /// Every identifier declared so far, for duplicate detection.
    declared: HashSet<String>,
    /// Identifiers backed by a fast local in the generated code.
    locals: HashSet<String>,
}

impl<'r> BlockCompiler<'r> {
    pub fn new(resolver: &'r dyn NameResolver) -> Self {
        BlockCompiler {
            resolver,
            emitter: Emitter::new(),
            names: NamePool::new(),
            class_stack: Vec::new(),
            node_stack: Vec::new(),
            bind_stack: Vec::new(),
            code_stack: Vec::new(),
            declared: HashSet::new(),
            locals: HashSet::new(),
        }
    }

    /// Emits the block preamble: the per-block scope object and the
    /// identifier node map, each stored under a reserved local.
    pub fn prepare_block(&mut self) {
        self.emitter.emit_load_helper(helper::MAKE_SCOPE);
        self.emitter.emit_call(0);
        self.emitter.emit_store_local(SCOPE_KEY);

        self.emitter.emit_build_map();
        self.emitter.emit_store_local(NODE_MAP);
    }

    /// Compiles the body of a named object declaration. The generated code
    /// builds the root node, populates it and returns it.
    pub fn compile_decl_root(&mut self, decl: &ObjectDecl) -> Result<(), Diagnostic> {
        let class_var = self.names.new_name();
        let node_var = self.names.new_name();

        self.emitter.emit_set_line(decl.line);
        self.load_name(&decl.base)?;

        // Validate the base is a declarative type.
        self.emitter.enter_failure_region(decl.line);
        self.emitter.emit_dup_top();
        self.emitter.emit_load_helper(helper::VALIDATE_DECLARATIVE);
        self.emitter.emit_rot_two();
        self.emitter.emit_call(1);
        self.emitter.emit_pop_top();
        self.emitter.exit_failure_region();

        // A named declaration always introduces a new derived type.
        self.emitter.emit_derive_type(decl.name.as_str());

        self.emitter.emit_dup_top();
        self.emitter.emit_store_local(&class_var);

        // Build the root node.
        self.emitter.emit_load_helper(helper::DECLARATIVE_NODE);
        self.emitter.emit_rot_two();
        self.emitter.emit_load_const(identifier_const(&decl.identifier));
        self.emitter.emit_load_local(SCOPE_KEY);
        self.emitter.emit_call(3);
        self.emitter.emit_store_local(&node_var);

        if let Some(id) = &decl.identifier {
            self.declare_identifier(id)?;
            self.store_identifier(&node_var, id);
        }

        // Populate the body.
        self.class_stack.push(class_var.clone());
        self.node_stack.push(node_var.clone());
        for item in &decl.body {
            self.compile_item(item)?;
        }
        self.class_stack.pop();
        self.node_stack.pop();

        // The unit returns the populated root node.
        self.emitter.emit_load_local(&node_var);
        self.emitter.emit_return();

        self.names.release(&class_var);
        self.names.release(&node_var);
        Ok(())
    }

    /// Compiles the body of a template declaration. The generated code
    /// builds a root compiler node, populates it and returns it.
    pub fn compile_template_root(&mut self, decl: &TemplateDecl) -> Result<(), Diagnostic> {
        let node_var = self.names.new_name();

        self.emitter.emit_set_line(decl.line);
        self.emitter.emit_load_helper(helper::TEMPLATE_NODE);
        self.emitter.emit_load_local(SCOPE_KEY);
        self.emitter.emit_call(1);
        self.emitter.emit_store_local(&node_var);

        self.node_stack.push(node_var.clone());
        for item in &decl.body {
            self.compile_item(item)?;
        }
        self.node_stack.pop();

        self.emitter.emit_load_local(&node_var);
        self.emitter.emit_return();

        self.names.release(&node_var);
        Ok(())
    }

    fn compile_item(&mut self, item: &BodyItem) -> Result<(), Diagnostic> {
        match item {
            BodyItem::ChildDef(node) => self.compile_child_def(node),
            BodyItem::TemplateInst(node) => self.compile_template_inst(node),
            BodyItem::Storage(node) => self.compile_storage_expr(node),
            BodyItem::Binding(node) => self.compile_binding(node),
        }
    }

    fn compile_child_def(&mut self, node: &ChildDef) -> Result<(), Diagnostic> {
        // Claim temporaries for the class and the constructed node.
        let class_var = self.names.new_name();
        let node_var = self.names.new_name();

        self.emitter.emit_set_line(node.line);
        self.load_name(&node.type_name)?;

        // Validate the type of the child.
        self.emitter.enter_failure_region(node.line);
        self.emitter.emit_dup_top();
        self.emitter.emit_load_helper(helper::VALIDATE_DECLARATIVE);
        self.emitter.emit_rot_two();
        self.emitter.emit_call(1);
        self.emitter.emit_pop_top();
        self.emitter.exit_failure_region();

        // Derive a fresh type when the body declares storage, so instance
        // slots do not land on the shared base type.
        if node.declares_storage() {
            self.emitter.emit_derive_type(node.type_name.as_str());
        }

        self.emitter.emit_dup_top();
        self.emitter.emit_store_local(&class_var);

        // Build the construct node for the child.
        self.emitter.emit_load_helper(helper::DECLARATIVE_NODE);
        self.emitter.emit_rot_two();
        self.emitter.emit_load_const(identifier_const(&node.identifier));
        self.emitter.emit_load_local(SCOPE_KEY);
        self.emitter.emit_call(3);
        self.emitter.emit_store_local(&node_var);

        if let Some(id) = &node.identifier {
            self.declare_identifier(id)?;
            self.store_identifier(&node_var, id);
        }

        // Populate the body of the child.
        self.class_stack.push(class_var.clone());
        self.node_stack.push(node_var.clone());
        for item in &node.body {
            self.compile_item(item)?;
        }
        self.class_stack.pop();
        self.node_stack.pop();

        // Append the child node to its parent node.
        let parent = self
            .node_stack
            .last()
            .expect("child definition requires an enclosing node")
            .clone();
        self.emitter.emit_load_local(&parent);
        self.emitter.emit_load_attr("children");
        self.emitter.emit_load_attr("append");
        self.emitter.emit_load_local(&node_var);
        self.emitter.emit_call(1);
        self.emitter.emit_pop_top();

        self.names.release(&class_var);
        self.names.release(&node_var);
        Ok(())
    }

    fn compile_template_inst(&mut self, node: &TemplateInst) -> Result<(), Diagnostic> {
        self.emitter.emit_set_line(node.line);
        self.load_name(&node.name)?;

        // Validate the name refers to a template. The helper returns the
        // template, leaving it in place as the callable.
        self.emitter.enter_failure_region(node.line);
        self.emitter.emit_load_helper(helper::VALIDATE_TEMPLATE);
        self.emitter.emit_rot_two();
        self.emitter.emit_call(1);
        self.emitter.exit_failure_region();

        // Evaluate the arguments in isolated scopes, leaving the values on
        // the stack in call order.
        for arg in &node.args {
            self.eval_isolated(arg, node.name.as_str())?;
        }
        if let Some(stararg) = &node.stararg {
            self.eval_isolated(stararg, node.name.as_str())?;
        }

        // Instantiate the template.
        self.emitter.enter_failure_region(node.line);
        let argc = node.args.len();
        if node.stararg.is_some() {
            self.emitter.emit_call_var(argc);
        } else {
            self.emitter.emit_call(argc);
        }
        self.emitter.exit_failure_region();

        // Validate the result unpacks into the declared identifiers. The
        // helper returns no value, so the result is duplicated around the
        // call.
        if let Some(spec) = &node.identifiers {
            self.emitter.enter_failure_region(node.line);
            self.emitter.emit_dup_top();
            self.emitter.emit_load_helper(helper::VALIDATE_UNPACK_SIZE);
            self.emitter.emit_rot_two();
            self.emitter
                .emit_load_const(Const::Int(spec.names.len() as i64));
            self.emitter
                .emit_load_const(Const::Bool(spec.starname.is_some()));
            self.emitter.emit_call(3);
            self.emitter.emit_pop_top();
            self.emitter.exit_failure_region();
        }

        // Wrap the instantiation in a compiler node.
        self.emitter.emit_load_helper(helper::TEMPLATE_INST_NODE);
        self.emitter.emit_rot_two();
        self.emitter.emit_load_const(unpack_names_const(node));
        self.emitter.emit_load_const(unpack_starname_const(node));
        self.emitter.emit_call(3);

        // Append the instantiation node to its parent node.
        let parent = self
            .node_stack
            .last()
            .expect("template instantiation requires an enclosing node")
            .clone();
        self.emitter.emit_load_local(&parent);
        self.emitter.emit_load_attr("children");
        self.emitter.emit_load_attr("append");
        self.emitter.emit_rot_two();
        self.emitter.emit_call(1);
        self.emitter.emit_pop_top();

        // The unpack identifiers are populated by the runtime through the
        // scope, not through fast locals, so they are recorded only for
        // conflict detection.
        if let Some(spec) = &node.identifiers {
            for id in &spec.names {
                self.declare_identifier(id)?;
            }
            if let Some(star) = &spec.starname {
                self.declare_identifier(star)?;
            }
        }
        Ok(())
    }

    fn compile_storage_expr(&mut self, node: &StorageExpr) -> Result<(), Diagnostic> {
        // Storage lands on the class at class-stack top; directly inside a
        // template body there is none.
        let class_var = match self.class_stack.last() {
            Some(class_var) => class_var.clone(),
            None => {
                return Err(Diagnostic::problem(
                    Problem::StorageOutsideObject,
                    Label::line(node.line, "Storage declaration"),
                )
                .with_context("name", node.name.as_str()));
            }
        };

        self.emitter.emit_set_line(node.line);

        self.emitter.enter_failure_region(node.line);
        self.emitter.emit_load_helper(helper::ADD_STORAGE);
        self.emitter.emit_load_local(&class_var);
        self.emitter.emit_load_const(Const::str(node.name.as_str()));
        match &node.type_name {
            Some(type_name) => self.load_name(type_name)?,
            None => self.emitter.emit_load_const(Const::None),
        }
        self.emitter.emit_load_const(Const::str(node.kind.token()));
        self.emitter.emit_call(4);
        self.emitter.emit_pop_top();
        self.emitter.exit_failure_region();

        // Bind the default expression to the freshly declared slot.
        if let Some(expr) = &node.expr {
            self.bind_stack.push(node.name.name.clone());
            self.compile_operator_expr(expr)?;
            self.bind_stack.pop();
        }
        Ok(())
    }

    fn compile_binding(&mut self, node: &Binding) -> Result<(), Diagnostic> {
        self.bind_stack.push(node.name.name.clone());
        self.compile_operator_expr(&node.expr)?;
        self.bind_stack.pop();
        Ok(())
    }

    fn compile_operator_expr(&mut self, node: &OperatorExpr) -> Result<(), Diagnostic> {
        self.compile_embedded(&node.value);
        let unit = self
            .code_stack
            .pop()
            .expect("operator expression requires a compiled unit");

        let node_var = self
            .node_stack
            .last()
            .expect("operator expression requires an enclosing node")
            .clone();
        let bind_name = self
            .bind_stack
            .last()
            .expect("operator expression requires an attribute being bound")
            .clone();

        // The operator token and the compiled unit pass through to the
        // runtime dispatch hook uninterpreted.
        self.emitter.emit_set_line(node.line);
        self.emitter.enter_failure_region(node.line);
        self.emitter.emit_load_helper(helper::RUN_OPERATOR);
        self.emitter.emit_load_local(&node_var);
        self.emitter.emit_load_const(Const::str(&bind_name));
        self.emitter.emit_load_const(Const::str(&node.operator));
        self.emitter.emit_load_const(Const::code(unit));
        self.emitter.emit_load_local(SCOPE_KEY);
        self.emitter.emit_call(5);
        self.emitter.emit_pop_top();
        self.emitter.exit_failure_region();
        Ok(())
    }

    /// Compiles an embedded fragment into a standalone unit, pushed onto the
    /// code stack. The unit is named after the attribute being bound and
    /// resolves names dynamically; the reactive runtime supplies its scope.
    fn compile_embedded(&mut self, value: &EmbeddedKind) {
        let bind_name = self
            .bind_stack
            .last()
            .expect("embedded code requires an attribute being bound")
            .clone();

        let unit = match value {
            EmbeddedKind::Expression(expr) => {
                let mut emitter = Emitter::new();
                emitter.emit_set_line(expr.line);
                compile_expr(&mut emitter, &expr.ast, NameMode::Dynamic);
                emitter.emit_return();
                let max_stack = emitter.max_stack_depth();
                UnitBuilder::new()
                    .name(&bind_name)
                    .first_line(expr.line)
                    .instructions(emitter.into_instructions())
                    .max_stack(max_stack)
                    .build()
            }
            EmbeddedKind::Block(block) => {
                let mut emitter = Emitter::new();
                emitter.emit_set_line(block.line);
                compile_stmts(&mut emitter, &block.stmts);
                emitter.emit_return_none();
                let max_stack = emitter.max_stack_depth();
                UnitBuilder::new()
                    .name(&bind_name)
                    .first_line(block.line)
                    .instructions(emitter.into_instructions())
                    .max_stack(max_stack)
                    .build()
            }
        };
        self.code_stack.push(unit);
    }

    /// Evaluates a template argument in an isolated scope, leaving the value
    /// on the stack. The argument compiles into its own unit parameterized
    /// on the names it references; the values are loaded here, in the
    /// enclosing block, and passed in.
    fn eval_isolated(&mut self, arg: &EmbeddedExpr, display_name: &str) -> Result<(), Diagnostic> {
        let lookup = self.visible_names();
        let (unit, captured) = scope::isolate(arg, display_name, &lookup)?;

        self.emitter.emit_load_const(Const::code(unit));
        self.emitter.emit_make_function();
        for id in &captured {
            self.load_name(id)?;
        }
        self.emitter.emit_call(captured.len());
        Ok(())
    }

    /// Emits instructions pushing the value of a name: block identifiers
    /// load from their fast local, everything else defers to the resolver.
    fn load_name(&mut self, name: &Id) -> Result<(), Diagnostic> {
        if self.locals.contains(name.as_str()) {
            self.emitter.emit_load_local(name.as_str());
            Ok(())
        } else {
            self.resolver.load_name(&mut self.emitter, name)
        }
    }

    /// The names an isolated scope may capture from this block.
    fn visible_names(&self) -> HashSet<String> {
        let mut names = self.resolver.local_names();
        names.extend(self.locals.iter().cloned());
        names
    }

    fn declare_identifier(&mut self, id: &Id) -> Result<(), Diagnostic> {
        if id.as_str().starts_with(RESERVED_PREFIX) {
            return Err(Diagnostic::problem(
                Problem::ReservedIdentifier,
                Label::span(id.span(), "Identifier"),
            )
            .with_context("identifier", id.as_str()));
        }
        if self.declared.contains(id.as_str())
            || self.resolver.local_names().contains(id.as_str())
        {
            return Err(Diagnostic::problem(
                Problem::DuplicateIdentifier,
                Label::span(id.span(), "Identifier"),
            )
            .with_context("identifier", id.as_str()));
        }
        self.declared.insert(String::from(id.as_str()));
        Ok(())
    }

    /// Records an identifier for the node held in `node_var`: once in the
    /// run-time node map and once as a fast local so later name loads and
    /// capture analysis reach the node directly.
    fn store_identifier(&mut self, node_var: &str, id: &Id) {
        self.emitter.emit_load_local(NODE_MAP);
        self.emitter.emit_load_local(node_var);
        self.emitter.emit_load_const(Const::str(id.as_str()));
        self.emitter.emit_store_map();
        self.emitter.emit_pop_top();

        self.emitter.emit_load_local(node_var);
        self.emitter.emit_store_local(id.as_str());
        self.locals.insert(String::from(id.as_str()));
    }

    /// Finishes the block, producing the compiled unit.
    ///
    /// By this point the walk has unwound completely, so all four parallel
    /// stacks must have drained and the operand stack must be balanced.
    pub fn finish(self, name: &str, params: Vec<String>, first_line: u32) -> CodeUnit {
        debug_assert!(self.class_stack.is_empty(), "class stack must drain by block exit");
        debug_assert!(self.node_stack.is_empty(), "node stack must drain by block exit");
        debug_assert!(self.bind_stack.is_empty(), "bind stack must drain by block exit");
        debug_assert!(self.code_stack.is_empty(), "code stack must drain by block exit");
        debug_assert_eq!(
            self.emitter.current_stack_depth(),
            0,
            "operand stack must be balanced at block exit"
        );

        let max_stack = self.emitter.max_stack_depth();
        UnitBuilder::new()
            .name(name)
            .params(params)
            .first_line(first_line)
            .instructions(self.emitter.into_instructions())
            .max_stack(max_stack)
            .build()
    }
}

fn identifier_const(identifier: &Option<Id>) -> Const {
    match identifier {
        Some(id) => Const::str(id.as_str()),
        None => Const::None,
    }
}

fn unpack_names_const(node: &TemplateInst) -> Const {
    match &node.identifiers {
        Some(spec) => Const::Tuple(spec.names.iter().map(|id| Const::str(id.as_str())).collect()),
        None => Const::Tuple(Vec::new()),
    }
}

fn unpack_starname_const(node: &TemplateInst) -> Const {
    match &node.identifiers {
        Some(spec) => match &spec.starname {
            Some(star) => Const::str(star.as_str()),
            None => Const::str(""),
        },
        None => Const::str(""),
    }
}
