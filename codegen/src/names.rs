//! Temporary variable names for generated code.

use std::collections::HashSet;

/// Generates and recycles private variable names for one compiled block.
///
/// Names use the reserved `_[` prefix so they can never collide with
/// identifiers written in declarative source.
pub struct NamePool {
    /// The pool of currently issued variable names.
    held: HashSet<String>,
}

impl NamePool {
    pub fn new() -> Self {
        NamePool {
            held: HashSet::new(),
        }
    }

    /// Gets a new private variable name.
    ///
    /// The name is guaranteed distinct from every name currently issued.
    /// The candidate index starts at the held count and probes forward, so
    /// stack-like release patterns reuse low indices.
    pub fn new_name(&mut self) -> String {
        let mut index = self.held.len();
        let mut name = format!("_[var_{}]", index);
        while self.held.contains(&name) {
            index += 1;
            name = format!("_[var_{}]", index);
        }
        self.held.insert(name.clone());
        name
    }

    /// Returns a variable name to the pool.
    ///
    /// Releasing a name that is not held is a no-op; double-release can
    /// occur on error-recovery paths.
    pub fn release(&mut self, name: &str) {
        self.held.remove(name);
    }
}

impl Default for NamePool {
    fn default() -> Self {
        Self::new()
    }
}
