//! Emits abstract instructions while tracking operand-stack depth.
//!
//! Every emit method records its stack effect so a finished sequence knows
//! the maximum depth it reaches and whether it left the stack balanced.

use canopy_unit::{BinOp, Const, Instr, UnOp};

pub struct Emitter {
    instructions: Vec<Instr>,
    /// Number of items currently on the operand stack.
    current_stack_depth: u16,
    /// Maximum size the operand stack reached.
    max_stack_depth: u16,
}

impl Emitter {
    pub fn new() -> Self {
        Emitter {
            instructions: Vec::new(),
            current_stack_depth: 0,
            max_stack_depth: 0,
        }
    }

    /// Sets the current source line for run-time failure annotation.
    pub fn emit_set_line(&mut self, line: u32) {
        self.instructions.push(Instr::SetLine(line));
    }

    /// Pushes a constant onto the stack.
    pub fn emit_load_const(&mut self, value: Const) {
        self.instructions.push(Instr::LoadConst(value));
        self.push_stack(1);
    }

    /// Pushes the value of a block-local variable.
    pub fn emit_load_local(&mut self, name: &str) {
        self.instructions.push(Instr::LoadLocal(String::from(name)));
        self.push_stack(1);
    }

    /// Pops the top of the stack into a block-local variable.
    pub fn emit_store_local(&mut self, name: &str) {
        self.instructions.push(Instr::StoreLocal(String::from(name)));
        self.pop_stack(1);
    }

    /// Pushes the value bound to a name in the executing scope.
    pub fn emit_load_name(&mut self, name: &str) {
        self.instructions.push(Instr::LoadName(String::from(name)));
        self.push_stack(1);
    }

    /// Pops the top of the stack into a name in the executing scope.
    pub fn emit_store_name(&mut self, name: &str) {
        self.instructions.push(Instr::StoreName(String::from(name)));
        self.pop_stack(1);
    }

    /// Pushes the value bound to a name at module level.
    pub fn emit_load_global(&mut self, name: &str) {
        self.instructions.push(Instr::LoadGlobal(String::from(name)));
        self.push_stack(1);
    }

    /// Pushes the named runtime helper function.
    pub fn emit_load_helper(&mut self, name: &str) {
        self.instructions.push(Instr::LoadHelper(String::from(name)));
        self.push_stack(1);
    }

    /// Replaces the object on top of the stack with its named attribute.
    pub fn emit_load_attr(&mut self, name: &str) {
        self.instructions.push(Instr::LoadAttr(String::from(name)));
        // Pops the object, pushes the attribute value.
    }

    /// Calls a callable with `argc` positional arguments.
    pub fn emit_call(&mut self, argc: usize) {
        let argc = operand_arity(argc);
        self.instructions.push(Instr::Call(argc));
        // Pops the arguments and the callable, pushes the result.
        self.pop_stack(argc);
        self.pop_stack(1);
        self.push_stack(1);
    }

    /// Calls a callable with `argc` positional arguments plus one sequence
    /// of additional arguments on top of them.
    pub fn emit_call_var(&mut self, argc: usize) {
        let argc = operand_arity(argc);
        self.instructions.push(Instr::CallVar(argc));
        self.pop_stack(argc);
        self.pop_stack(2);
        self.push_stack(1);
    }

    /// Replaces the code constant on top of the stack with a callable.
    pub fn emit_make_function(&mut self) {
        self.instructions.push(Instr::MakeFunction);
    }

    /// Pushes a new empty map.
    pub fn emit_build_map(&mut self) {
        self.instructions.push(Instr::BuildMap);
        self.push_stack(1);
    }

    /// Stores the key/value pair on top of the stack into the map below
    /// them, leaving the map on the stack.
    pub fn emit_store_map(&mut self) {
        self.instructions.push(Instr::StoreMap);
        self.pop_stack(2);
    }

    /// Duplicates the value on top of the stack.
    pub fn emit_dup_top(&mut self) {
        self.instructions.push(Instr::DupTop);
        self.push_stack(1);
    }

    /// Swaps the two values on top of the stack.
    pub fn emit_rot_two(&mut self) {
        self.instructions.push(Instr::RotTwo);
    }

    /// Pops and discards the value on top of the stack.
    pub fn emit_pop_top(&mut self) {
        self.instructions.push(Instr::PopTop);
        self.pop_stack(1);
    }

    /// Applies a binary operator to the two values on top of the stack.
    pub fn emit_binary(&mut self, op: BinOp) {
        self.instructions.push(Instr::Binary(op));
        self.pop_stack(2);
        self.push_stack(1);
    }

    /// Applies a unary operator to the value on top of the stack.
    pub fn emit_unary(&mut self, op: UnOp) {
        self.instructions.push(Instr::Unary(op));
    }

    /// Replaces the type descriptor on top of the stack with a freshly
    /// derived descriptor tagged with the given source type name.
    pub fn emit_derive_type(&mut self, type_name: &str) {
        self.instructions.push(Instr::DeriveType {
            type_name: String::from(type_name),
        });
    }

    /// Opens a failure-propagation region annotated with a source line.
    pub fn enter_failure_region(&mut self, line: u32) {
        self.instructions.push(Instr::EnterFailureRegion { line });
    }

    /// Closes the innermost failure-propagation region.
    pub fn exit_failure_region(&mut self) {
        self.instructions.push(Instr::ExitFailureRegion);
    }

    /// Pops the top of the stack and returns it from the unit.
    pub fn emit_return(&mut self) {
        self.instructions.push(Instr::Return);
        self.pop_stack(1);
    }

    /// Returns from the unit without a value.
    pub fn emit_return_none(&mut self) {
        self.instructions.push(Instr::ReturnNone);
    }

    /// The number of items currently on the operand stack.
    pub fn current_stack_depth(&self) -> u16 {
        self.current_stack_depth
    }

    /// The maximum operand-stack depth the emitted sequence reaches.
    pub fn max_stack_depth(&self) -> u16 {
        self.max_stack_depth
    }

    /// The instructions emitted so far.
    pub fn instructions(&self) -> &[Instr] {
        &self.instructions
    }

    /// Consumes the emitter, returning the emitted sequence.
    pub fn into_instructions(self) -> Vec<Instr> {
        self.instructions
    }

    fn push_stack(&mut self, count: u16) {
        self.current_stack_depth += count;
        if self.current_stack_depth > self.max_stack_depth {
            self.max_stack_depth = self.current_stack_depth;
        }
    }

    fn pop_stack(&mut self, count: u16) {
        debug_assert!(
            self.current_stack_depth >= count,
            "operand stack underflow in emitted code"
        );
        self.current_stack_depth = self.current_stack_depth.saturating_sub(count);
    }
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts a call arity into the instruction operand width. The operand is
/// 16 bits; an arity past that cannot be encoded and indicates a malformed
/// front end, not a user condition.
fn operand_arity(argc: usize) -> u16 {
    u16::try_from(argc).expect("call arity exceeds the instruction operand range")
}
