use crate::instruction::Instr;
use crate::unit::CodeUnit;

/// Fluent builder for constructing a [`CodeUnit`].
pub struct UnitBuilder {
    name: String,
    params: Vec<String>,
    first_line: u32,
    instructions: Vec<Instr>,
    max_stack: u16,
}

impl UnitBuilder {
    pub fn new() -> Self {
        UnitBuilder {
            name: String::new(),
            params: Vec::new(),
            first_line: 1,
            instructions: Vec::new(),
            max_stack: 0,
        }
    }

    /// Sets the display name used in failure reports.
    pub fn name(mut self, name: &str) -> Self {
        self.name = String::from(name);
        self
    }

    /// Sets the ordered formal parameter names.
    pub fn params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }

    /// Sets the first source line of the unit.
    pub fn first_line(mut self, line: u32) -> Self {
        self.first_line = line;
        self
    }

    /// Sets the instruction sequence.
    pub fn instructions(mut self, instructions: Vec<Instr>) -> Self {
        self.instructions = instructions;
        self
    }

    /// Sets the maximum operand-stack depth the sequence reaches.
    pub fn max_stack(mut self, depth: u16) -> Self {
        self.max_stack = depth;
        self
    }

    pub fn build(self) -> CodeUnit {
        CodeUnit {
            name: self.name,
            params: self.params,
            first_line: self.first_line,
            instructions: self.instructions,
            max_stack: self.max_stack,
        }
    }
}

impl Default for UnitBuilder {
    fn default() -> Self {
        Self::new()
    }
}
