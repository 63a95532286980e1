//! Semantic analysis
//!
//! Three passes over a parsed [`Program`], all reporting into one
//! [`Diagnostics`] accumulator:
//! - class hierarchy construction (`hierarchy`)
//! - symbol table population (`symbols`)
//! - type checking, one checker per user class (`typeck`)

mod hierarchy;
mod symbols;
mod typeck;

pub use hierarchy::{
    is_array_type, ClassDecl, ClassHierarchy, ClassId, ClassTreeNode, HierarchyBuilder,
    BUILTIN_FILE, MAIN_CLASS, MAIN_METHOD, NULL_TYPE, ROOT_CLASS,
};
pub use symbols::{
    is_reserved, MethodSig, ScopeGuard, SymbolTable, SymbolTableBuilder, RESERVED_NAMES,
};
pub use typeck::TypeChecker;

use crate::ast::Program;
use crate::common::{CompileError, CompileResult, Diagnostics};

/// Runs every semantic pass over one program
pub struct SemanticAnalyzer<'d> {
    diagnostics: &'d mut Diagnostics,
}

impl<'d> SemanticAnalyzer<'d> {
    pub fn new(diagnostics: &'d mut Diagnostics) -> Self {
        Self { diagnostics }
    }

    /// Analyze `program`, annotating its expressions with types.
    ///
    /// Fails with [`CompileError::Analysis`] if the accumulator holds any
    /// diagnostic afterwards, including ones reported before this call.
    pub fn analyze(&mut self, program: &mut Program) -> CompileResult<ClassHierarchy> {
        let hierarchy = self.run(program);

        if self.diagnostics.has_errors() {
            Err(CompileError::analysis(self.diagnostics.count()))
        } else {
            Ok(hierarchy)
        }
    }

    /// Run all passes and return the registry regardless of errors
    pub fn run(&mut self, program: &mut Program) -> ClassHierarchy {
        let mut hierarchy = HierarchyBuilder::new(program, self.diagnostics).build();
        SymbolTableBuilder::new(&mut hierarchy, program, self.diagnostics).build();

        for (id, node) in hierarchy.iter() {
            if let ClassDecl::User(index) = node.decl {
                TypeChecker::new(&hierarchy, id, self.diagnostics)
                    .check_class(&mut program.classes[index]);
            }
        }

        log::debug!(
            "semantic analysis finished with {} diagnostic(s)",
            self.diagnostics.count()
        );
        hierarchy
    }
}
