//! Symbol tables and scope management

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use super::hierarchy::{ClassDecl, ClassHierarchy, ClassId, ClassTreeNode};
use crate::ast::{Method, Member, Program};
use crate::common::{Diagnostics, Span};

/// Names that can never be declared by user code
pub const RESERVED_NAMES: [&str; 6] = ["null", "this", "super", "void", "int", "boolean"];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Signature of a declared method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub name: String,
    pub return_type: String,
    /// (type, name) pairs in declaration order
    pub formals: Vec<(String, String)>,
    pub span: Span,
}

impl MethodSig {
    pub fn param_types(&self) -> impl Iterator<Item = &str> {
        self.formals.iter().map(|(ty, _)| ty.as_str())
    }

    /// Same return type and parameter types
    pub fn same_signature(&self, other: &MethodSig) -> bool {
        self.return_type == other.return_type && self.param_types().eq(other.param_types())
    }
}

impl From<&Method> for MethodSig {
    fn from(method: &Method) -> Self {
        Self {
            name: method.name.clone(),
            return_type: method.return_type.clone(),
            formals: method
                .formals
                .iter()
                .map(|f| (f.ty.clone(), f.name.clone()))
                .collect(),
            span: method.span,
        }
    }
}

/// A stack of scopes, innermost last, optionally chained to the table
/// of a parent class.
#[derive(Debug, Clone)]
pub struct SymbolTable<T> {
    scopes: Vec<HashMap<String, T>>,
    parent: Option<ClassId>,
}

impl<T> SymbolTable<T> {
    pub fn new() -> Self {
        Self {
            scopes: Vec::new(),
            parent: None,
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Push a scope that is popped again when the guard is dropped
    pub fn enter_scope(&mut self) -> ScopeGuard<'_, T> {
        self.push_scope();
        ScopeGuard { table: self }
    }

    /// Bind `name` in the innermost scope, returning any previous binding
    /// from that same scope.
    pub fn add(&mut self, name: impl Into<String>, value: T) -> Option<T> {
        if self.scopes.is_empty() {
            self.push_scope();
        }
        self.scopes.last_mut()?.insert(name.into(), value)
    }

    /// Look in the innermost scope only
    pub fn peek(&self, name: &str) -> Option<&T> {
        self.scopes.last()?.get(name)
    }

    /// Look through every scope of this table, innermost first
    pub fn lookup_chain(&self, name: &str) -> Option<&T> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Look through this table, then the tables of its ancestors.
    ///
    /// `resolve` maps a parent class to its table of the same kind.
    pub fn lookup<'t, F>(&'t self, name: &str, resolve: F) -> Option<&'t T>
    where
        F: Fn(ClassId) -> &'t SymbolTable<T>,
    {
        let mut table = self;
        loop {
            if let Some(value) = table.lookup_chain(name) {
                return Some(value);
            }
            table = resolve(table.parent?);
        }
    }

    /// Number of open scopes
    pub fn size(&self) -> usize {
        self.scopes.len()
    }

    pub fn parent(&self) -> Option<ClassId> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: Option<ClassId>) {
        self.parent = parent;
    }

    /// Every binding in every scope, outermost scope first, each scope sorted by name
    pub fn bindings(&self) -> Vec<(&str, &T)> {
        let mut out = Vec::new();
        for scope in &self.scopes {
            let mut entries: Vec<_> = scope.iter().map(|(k, v)| (k.as_str(), v)).collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.extend(entries);
        }
        out
    }
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope opened by [`SymbolTable::enter_scope`]
pub struct ScopeGuard<'t, T> {
    table: &'t mut SymbolTable<T>,
}

impl<T> Deref for ScopeGuard<'_, T> {
    type Target = SymbolTable<T>;

    fn deref(&self) -> &Self::Target {
        self.table
    }
}

impl<T> DerefMut for ScopeGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.table
    }
}

impl<T> Drop for ScopeGuard<'_, T> {
    fn drop(&mut self) {
        self.table.pop_scope();
    }
}

// =============================================================================
// Symbol table builder
// =============================================================================

/// Fills the method and variable tables of every registered class
pub struct SymbolTableBuilder<'a> {
    hierarchy: &'a mut ClassHierarchy,
    program: &'a Program,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> SymbolTableBuilder<'a> {
    pub fn new(
        hierarchy: &'a mut ClassHierarchy,
        program: &'a Program,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            hierarchy,
            program,
            diagnostics,
        }
    }

    pub fn build(self) {
        let ids: Vec<ClassId> = self.hierarchy.ids().collect();

        for &id in &ids {
            let ClassTreeNode {
                decl, methods, vars, ..
            } = self.hierarchy.get_mut(id);
            let class = match decl {
                ClassDecl::Builtin(class) => &*class,
                ClassDecl::User(index) => &self.program.classes[*index],
            };
            log::debug!("building symbol tables for class {}", class.name);

            vars.push_scope();
            methods.push_scope();

            for member in &class.members {
                match member {
                    Member::Field(field) => {
                        if is_reserved(&field.name) {
                            self.diagnostics.semantic(
                                &class.file,
                                field.span,
                                format!("'{}' is a reserved name", field.name),
                            );
                        } else if vars.peek(&field.name).is_some() {
                            self.diagnostics.semantic(
                                &class.file,
                                field.span,
                                format!(
                                    "field '{}' is already defined in class '{}'",
                                    field.name, class.name
                                ),
                            );
                        } else {
                            vars.add(field.name.as_str(), field.ty.clone());
                        }
                    }
                    Member::Method(method) => {
                        if is_reserved(&method.name) {
                            self.diagnostics.semantic(
                                &class.file,
                                method.span,
                                format!("'{}' is a reserved name", method.name),
                            );
                        } else if methods.peek(&method.name).is_some() {
                            self.diagnostics.semantic(
                                &class.file,
                                method.span,
                                format!(
                                    "method '{}' is already defined in class '{}'",
                                    method.name, class.name
                                ),
                            );
                        } else {
                            methods.add(method.name.as_str(), MethodSig::from(method));
                        }

                        let mut params = vars.enter_scope();
                        for formal in &method.formals {
                            if is_reserved(&formal.name) {
                                self.diagnostics.semantic(
                                    &class.file,
                                    formal.span,
                                    format!("'{}' is a reserved name", formal.name),
                                );
                            } else if params.peek(&formal.name).is_some() {
                                self.diagnostics.semantic(
                                    &class.file,
                                    formal.span,
                                    format!(
                                        "parameter '{}' is already defined in method '{}'",
                                        formal.name, method.name
                                    ),
                                );
                            } else {
                                params.add(formal.name.as_str(), formal.ty.clone());
                            }
                        }
                    }
                }
            }
        }

        for &id in &ids {
            let node = self.hierarchy.get_mut(id);
            let parent = node.parent;
            node.vars.set_parent(parent);
            node.methods.set_parent(parent);
        }
    }
}
