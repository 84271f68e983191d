//! Entry points compiling top-level declarations into code units.

use std::collections::HashSet;

use canopy_dsl::ast::{ObjectDecl, TemplateDecl};
use canopy_dsl::core::Id;
use canopy_dsl::diagnostic::Diagnostic;
use canopy_unit::CodeUnit;
use log::debug;

use crate::block::{BlockCompiler, NameResolver};
use crate::emit::Emitter;

/// Resolves names for an object declaration block.
///
/// The block has no parameters, so everything the block itself does not
/// declare resolves at module level.
pub struct ModuleResolver;

impl NameResolver for ModuleResolver {
    fn load_name(&self, emitter: &mut Emitter, name: &Id) -> Result<(), Diagnostic> {
        emitter.emit_load_global(name.as_str());
        Ok(())
    }

    fn local_names(&self) -> HashSet<String> {
        HashSet::new()
    }
}

/// Resolves names for a template block.
///
/// Template parameters are bound as fast locals when the runtime invokes
/// the unit; everything else resolves at module level.
pub struct TemplateResolver {
    params: HashSet<String>,
}

impl TemplateResolver {
    pub fn new(params: &[Id]) -> Self {
        TemplateResolver {
            params: params.iter().map(|id| id.name.clone()).collect(),
        }
    }
}

impl NameResolver for TemplateResolver {
    fn load_name(&self, emitter: &mut Emitter, name: &Id) -> Result<(), Diagnostic> {
        if self.params.contains(name.as_str()) {
            emitter.emit_load_local(name.as_str());
        } else {
            emitter.emit_load_global(name.as_str());
        }
        Ok(())
    }

    fn local_names(&self) -> HashSet<String> {
        self.params.clone()
    }
}

/// Compiles a named object declaration.
///
/// The unit takes no parameters; invoking it builds and returns the root
/// node of the declared tree.
pub fn compile_object_decl(decl: &ObjectDecl) -> Result<CodeUnit, Diagnostic> {
    debug!("compiling object declaration {}", decl.name);

    let resolver = ModuleResolver;
    let mut block = BlockCompiler::new(&resolver);
    block.prepare_block();
    block.compile_decl_root(decl)?;
    Ok(block.finish(decl.name.as_str(), Vec::new(), decl.line))
}

/// Compiles a template declaration.
///
/// The unit takes the template parameters; invoking it with instantiation
/// arguments builds and returns the root compiler node of the expansion.
pub fn compile_template_decl(decl: &TemplateDecl) -> Result<CodeUnit, Diagnostic> {
    debug!(
        "compiling template declaration {} with {} parameter(s)",
        decl.name,
        decl.params.len()
    );

    let resolver = TemplateResolver::new(&decl.params);
    let mut block = BlockCompiler::new(&resolver);
    block.prepare_block();
    block.compile_template_root(decl)?;
    let params = decl.params.iter().map(|id| id.name.clone()).collect();
    Ok(block.finish(decl.name.as_str(), params, decl.line))
}
