//! Class registry and inheritance tree

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Write as _;

use super::symbols::{MethodSig, SymbolTable};
use crate::ast::{Class, Formal, Member, Method, Program};
use crate::common::{Diagnostics, Span};

pub const ROOT_CLASS: &str = "Object";
pub const MAIN_CLASS: &str = "Main";
pub const MAIN_METHOD: &str = "main";

/// Static type of the `null` constant
pub const NULL_TYPE: &str = "null";

/// File name recorded on built-in class declarations
pub const BUILTIN_FILE: &str = "<builtin>";

/// Index of a class in its [`ClassHierarchy`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(usize);

impl ClassId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Where a class's declaration lives
#[derive(Debug, Clone)]
pub enum ClassDecl {
    /// Synthetic declaration owned by the registry
    Builtin(Class),
    /// Index into `Program::classes`
    User(usize),
}

impl ClassDecl {
    pub fn resolve<'p>(&'p self, program: &'p Program) -> &'p Class {
        match self {
            ClassDecl::Builtin(class) => class,
            ClassDecl::User(index) => &program.classes[*index],
        }
    }
}

/// One class in the inheritance tree
#[derive(Debug, Clone)]
pub struct ClassTreeNode {
    pub name: String,
    pub decl: ClassDecl,
    pub builtin: bool,
    pub extendable: bool,
    /// `None` only for the root class
    pub parent: Option<ClassId>,
    pub children: BTreeSet<ClassId>,
    /// Number of classes below this one
    pub descendants: usize,
    pub methods: SymbolTable<MethodSig>,
    pub vars: SymbolTable<String>,
}

impl ClassTreeNode {
    fn new(name: impl Into<String>, decl: ClassDecl) -> Self {
        let builtin = matches!(decl, ClassDecl::Builtin(_));
        Self {
            name: name.into(),
            decl,
            builtin,
            extendable: true,
            parent: None,
            children: BTreeSet::new(),
            descendants: 0,
            methods: SymbolTable::new(),
            vars: SymbolTable::new(),
        }
    }
}

/// Registry of every class known to one analysis run
#[derive(Debug, Clone, Default)]
pub struct ClassHierarchy {
    nodes: Vec<ClassTreeNode>,
    by_name: HashMap<String, ClassId>,
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `Object`, `String`, `TextIO` and `Sys`; returns the root
    pub fn install_builtins(&mut self) -> ClassId {
        let root = match self.id_of(ROOT_CLASS) {
            Some(id) => id,
            None => {
                let object = builtin_class(
                    ROOT_CLASS,
                    &[
                        ("Object", "clone", &[]),
                        ("boolean", "equals", &[("Object", "o")]),
                        ("String", "toString", &[]),
                    ],
                );
                self.insert(ClassTreeNode::new(ROOT_CLASS, ClassDecl::Builtin(object)))
            }
        };

        let builtins: [(&str, &[BuiltinMethod]); 3] = [
            (
                "String",
                &[
                    ("int", "length", &[]),
                    ("boolean", "equals", &[("Object", "o")]),
                    ("String", "toString", &[]),
                    ("String", "substring", &[("int", "begin"), ("int", "end")]),
                    ("String", "concat", &[("String", "s")]),
                ],
            ),
            (
                "TextIO",
                &[
                    ("void", "readStdin", &[]),
                    ("void", "readFile", &[("String", "file")]),
                    ("void", "writeStdout", &[]),
                    ("void", "writeStderr", &[]),
                    ("void", "writeFile", &[("String", "file")]),
                    ("String", "getString", &[]),
                    ("int", "getInt", &[]),
                    ("TextIO", "putString", &[("String", "s")]),
                    ("TextIO", "putInt", &[("int", "i")]),
                ],
            ),
            (
                "Sys",
                &[
                    ("void", "exit", &[("int", "status")]),
                    ("int", "time", &[]),
                    ("int", "random", &[]),
                ],
            ),
        ];

        for (name, methods) in builtins {
            if self.id_of(name).is_some() {
                continue;
            }
            let decl = ClassDecl::Builtin(builtin_class(name, methods));
            let mut node = ClassTreeNode::new(name, decl);
            node.extendable = false;
            node.parent = Some(root);
            self.insert(node);
        }

        self.rebuild_tree();
        root
    }

    fn insert(&mut self, node: ClassTreeNode) -> ClassId {
        let id = ClassId(self.nodes.len());
        self.by_name.insert(node.name.clone(), id);
        self.nodes.push(node);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Class ids in registration order
    pub fn ids(&self) -> impl Iterator<Item = ClassId> + use<> {
        (0..self.nodes.len()).map(ClassId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassId, &ClassTreeNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (ClassId(i), n))
    }

    pub fn get(&self, id: ClassId) -> &ClassTreeNode {
        &self.nodes[id.0]
    }

    pub(crate) fn get_mut(&mut self, id: ClassId) -> &mut ClassTreeNode {
        &mut self.nodes[id.0]
    }

    pub fn id_of(&self, name: &str) -> Option<ClassId> {
        self.by_name.get(name).copied()
    }

    pub fn find(&self, name: &str) -> Option<&ClassTreeNode> {
        self.id_of(name).map(|id| self.get(id))
    }

    pub fn root(&self) -> Option<ClassId> {
        self.id_of(ROOT_CLASS)
    }

    pub fn parent_of(&self, id: ClassId) -> Option<ClassId> {
        self.get(id).parent
    }

    /// Ancestors of `id`, nearest first. Stops if the chain revisits a class.
    pub fn ancestors(&self, id: ClassId) -> Vec<ClassId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut current = self.get(id).parent;
        while let Some(next) = current {
            if !seen.insert(next) {
                break;
            }
            out.push(next);
            current = self.get(next).parent;
        }
        out
    }

    /// Reflexive subclass test on classes
    pub fn is_subclass_id(&self, sub: ClassId, sup: ClassId) -> bool {
        sub == sup || self.ancestors(sub).contains(&sup)
    }

    /// Subclass (assignment compatibility) test on type names.
    ///
    /// `null` converts to any class or array type and every array type
    /// converts to `Object`.
    pub fn is_subclass(&self, sub: &str, sup: &str) -> bool {
        if sub == sup {
            return true;
        }
        if sub == NULL_TYPE {
            return is_array_type(sup) || self.id_of(sup).is_some();
        }
        if is_array_type(sub) {
            return sup == ROOT_CLASS;
        }
        match (self.id_of(sub), self.id_of(sup)) {
            (Some(sub), Some(sup)) => self.is_subclass_id(sub, sup),
            _ => false,
        }
    }

    /// True for `int`, `boolean`, registered classes and arrays of those
    pub fn exists_type(&self, ty: &str) -> bool {
        let element = ty.strip_suffix("[]").unwrap_or(ty);
        if is_array_type(element) {
            return false;
        }
        matches!(element, "int" | "boolean") || self.id_of(element).is_some()
    }

    /// Field lookup through the class and its ancestors
    pub fn lookup_var(&self, class: ClassId, name: &str) -> Option<&String> {
        self.get(class).vars.lookup(name, |id| &self.get(id).vars)
    }

    /// Method lookup through the class and its ancestors
    pub fn lookup_method(&self, class: ClassId, name: &str) -> Option<&MethodSig> {
        self.get(class).methods.lookup(name, |id| &self.get(id).methods)
    }

    /// Recompute children sets and descendant counts from the parent links
    pub fn rebuild_tree(&mut self) {
        for node in &mut self.nodes {
            node.children.clear();
            node.descendants = 0;
        }
        for id in self.ids() {
            if let Some(parent) = self.nodes[id.0].parent {
                self.nodes[parent.0].children.insert(id);
            }
            for ancestor in self.ancestors(id) {
                self.nodes[ancestor.0].descendants += 1;
            }
        }
    }

    /// Indented rendering of the tree below the root
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if let Some(root) = self.root() {
            self.dump_node(root, 0, &mut out);
        }
        out
    }

    fn dump_node(&self, id: ClassId, depth: usize, out: &mut String) {
        let node = self.get(id);
        let _ = write!(out, "{}{}", "  ".repeat(depth), node.name);
        if node.builtin {
            out.push_str(" (builtin)");
        }
        if node.descendants > 0 {
            let _ = write!(out, " [{} descendant(s)]", node.descendants);
        }
        out.push('\n');
        for &child in &node.children {
            self.dump_node(child, depth + 1, out);
        }
    }
}

pub fn is_array_type(ty: &str) -> bool {
    ty.ends_with("[]")
}

type BuiltinMethod = (&'static str, &'static str, &'static [(&'static str, &'static str)]);

fn builtin_class(name: &str, methods: &[BuiltinMethod]) -> Class {
    let members = methods
        .iter()
        .map(|&(return_type, method, formals)| {
            let formals = formals
                .iter()
                .map(|&(ty, name)| Formal::new(ty, name, Span::synthetic()))
                .collect();
            Member::Method(Method::new(return_type, method, formals, Span::synthetic()))
        })
        .collect();
    Class::new(name, BUILTIN_FILE, Span::synthetic()).with_members(members)
}

// =============================================================================
// Hierarchy builder
// =============================================================================

/// Builds the class registry for one program
pub struct HierarchyBuilder<'a> {
    program: &'a Program,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> HierarchyBuilder<'a> {
    pub fn new(program: &'a Program, diagnostics: &'a mut Diagnostics) -> Self {
        Self {
            program,
            diagnostics,
        }
    }

    pub fn build(mut self) -> ClassHierarchy {
        let mut hierarchy = ClassHierarchy::new();
        let root = hierarchy.install_builtins();
        let program = self.program;

        let mut registered = Vec::new();
        for (index, class) in program.classes.iter().enumerate() {
            if hierarchy.id_of(&class.name).is_some() {
                self.diagnostics.semantic(
                    &class.file,
                    class.span,
                    format!("class '{}' is already defined", class.name),
                );
                continue;
            }
            let id = hierarchy.insert(ClassTreeNode::new(&class.name, ClassDecl::User(index)));
            registered.push((id, class));
        }

        for &(id, class) in &registered {
            let parent = match &class.parent {
                None => root,
                Some(name) => match hierarchy.id_of(name) {
                    None => {
                        self.diagnostics.semantic(
                            &class.file,
                            class.span,
                            format!("class '{}' extends undefined class '{}'", class.name, name),
                        );
                        root
                    }
                    Some(parent) if !hierarchy.get(parent).extendable => {
                        self.diagnostics.semantic(
                            &class.file,
                            class.span,
                            format!(
                                "class '{}' cannot extend built-in class '{}'",
                                class.name, name
                            ),
                        );
                        root
                    }
                    Some(parent) => parent,
                },
            };
            hierarchy.get_mut(id).parent = Some(parent);
        }

        // Collect every cyclic class before re-rooting any of them
        let cyclic: Vec<_> = registered
            .iter()
            .filter(|(id, _)| in_cycle(&hierarchy, *id))
            .collect();
        for &&(id, class) in &cyclic {
            self.diagnostics.semantic(
                &class.file,
                class.span,
                format!("class '{}' is part of an inheritance cycle", class.name),
            );
            hierarchy.get_mut(id).parent = Some(root);
        }

        hierarchy.rebuild_tree();
        self.check_main(&hierarchy);

        log::debug!(
            "class hierarchy built: {} class(es), {} user-defined",
            hierarchy.len(),
            registered.len()
        );
        hierarchy
    }

    fn check_main(&mut self, hierarchy: &ClassHierarchy) {
        let Some(main) = hierarchy.find(MAIN_CLASS) else {
            let file = self
                .program
                .classes
                .first()
                .map_or(BUILTIN_FILE, |c| c.file.as_str());
            self.diagnostics.semantic(
                file,
                Span::synthetic(),
                format!("missing class '{MAIN_CLASS}'"),
            );
            return;
        };

        let class = main.decl.resolve(self.program);
        let has_main = class
            .methods()
            .any(|m| m.name == MAIN_METHOD && m.formals.is_empty());
        if !has_main {
            self.diagnostics.semantic(
                &class.file,
                class.span,
                format!(
                    "class '{MAIN_CLASS}' is missing a '{MAIN_METHOD}' method with no parameters"
                ),
            );
        }
    }
}

/// True if following parent links from `start` leads back to `start`
fn in_cycle(hierarchy: &ClassHierarchy, start: ClassId) -> bool {
    let mut seen = HashSet::new();
    let mut current = hierarchy.parent_of(start);
    while let Some(id) = current {
        if id == start {
            return true;
        }
        if !seen.insert(id) {
            return false;
        }
        current = hierarchy.parent_of(id);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use pretty_assertions::assert_eq;

    fn build(source: &str) -> (ClassHierarchy, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let program = parse(source, "Test.btm", &mut diagnostics).unwrap();
        let hierarchy = HierarchyBuilder::new(&program, &mut diagnostics).build();
        (hierarchy, diagnostics)
    }

    const MAIN: &str = "class Main { void main() { } }\n";

    #[test]
    fn test_builtins_installed() {
        let mut hierarchy = ClassHierarchy::new();
        let root = hierarchy.install_builtins();

        assert_eq!(hierarchy.get(root).name, "Object");
        assert_eq!(hierarchy.get(root).parent, None);
        assert!(hierarchy.get(root).extendable);
        for name in ["String", "TextIO", "Sys"] {
            let node = hierarchy.find(name).unwrap();
            assert!(node.builtin);
            assert!(!node.extendable);
            assert_eq!(node.parent, Some(root));
        }
        assert_eq!(hierarchy.get(root).descendants, 3);
    }

    #[test]
    fn test_links_parents_and_children() {
        let (hierarchy, diagnostics) = build(&format!(
            "{MAIN}class A {{ }}\nclass B extends A {{ }}\nclass C extends B {{ }}"
        ));
        assert!(!diagnostics.has_errors(), "{:?}", diagnostics.messages());

        let a = hierarchy.id_of("A").unwrap();
        let b = hierarchy.id_of("B").unwrap();
        let c = hierarchy.id_of("C").unwrap();
        assert_eq!(hierarchy.parent_of(a), hierarchy.root());
        assert_eq!(hierarchy.parent_of(c), Some(b));
        assert!(hierarchy.get(a).children.contains(&b));
        assert_eq!(hierarchy.get(a).descendants, 2);
        assert_eq!(hierarchy.ancestors(c), vec![b, a, hierarchy.root().unwrap()]);
    }

    #[test]
    fn test_subclass_is_reflexive_transitive_not_symmetric() {
        let (hierarchy, _) = build(&format!(
            "{MAIN}class A {{ }}\nclass B extends A {{ }}\nclass C extends B {{ }}"
        ));

        for name in ["A", "B", "C", "Object"] {
            assert!(hierarchy.is_subclass(name, name));
        }
        assert!(hierarchy.is_subclass("C", "B"));
        assert!(hierarchy.is_subclass("B", "A"));
        assert!(hierarchy.is_subclass("C", "A"));
        assert!(hierarchy.is_subclass("C", "Object"));
        assert!(!hierarchy.is_subclass("A", "B"));
        assert!(!hierarchy.is_subclass("Object", "C"));
        assert!(!hierarchy.is_subclass("Main", "A"));
    }

    #[test]
    fn test_subclass_for_primitive_null_and_array_types() {
        let (hierarchy, _) = build(MAIN);
        assert!(hierarchy.is_subclass("int", "int"));
        assert!(!hierarchy.is_subclass("int", "boolean"));
        assert!(!hierarchy.is_subclass("int", "Object"));
        assert!(hierarchy.is_subclass("null", "Main"));
        assert!(hierarchy.is_subclass("null", "int[]"));
        assert!(!hierarchy.is_subclass("null", "int"));
        assert!(hierarchy.is_subclass("int[]", "Object"));
        assert!(!hierarchy.is_subclass("Main[]", "Object[]"));
    }

    #[test]
    fn test_exists_type() {
        let (hierarchy, _) = build(MAIN);
        for ty in ["int", "boolean", "Main", "String", "int[]", "Main[]"] {
            assert!(hierarchy.exists_type(ty), "{ty}");
        }
        for ty in ["void", "Missing", "Missing[]", "int[][]"] {
            assert!(!hierarchy.exists_type(ty), "{ty}");
        }
    }

    #[test]
    fn test_self_extension_is_cycle() {
        let (hierarchy, diagnostics) = build(&format!("{MAIN}class A extends A {{ }}"));
        assert_eq!(
            diagnostics.messages(),
            vec!["class 'A' is part of an inheritance cycle"]
        );
        let a = hierarchy.id_of("A").unwrap();
        assert_eq!(hierarchy.parent_of(a), hierarchy.root());
    }

    #[test]
    fn test_indirect_cycle_reports_every_member() {
        let (hierarchy, diagnostics) = build(&format!(
            "{MAIN}class A extends C {{ }}\nclass B extends A {{ }}\nclass C extends B {{ }}\nclass D extends A {{ }}"
        ));
        assert_eq!(
            diagnostics.messages(),
            vec![
                "class 'A' is part of an inheritance cycle",
                "class 'B' is part of an inheritance cycle",
                "class 'C' is part of an inheritance cycle",
            ]
        );
        for name in ["A", "B", "C"] {
            let id = hierarchy.id_of(name).unwrap();
            assert_eq!(hierarchy.parent_of(id), hierarchy.root());
        }
        let d = hierarchy.id_of("D").unwrap();
        assert!(hierarchy.is_subclass("D", "A"));
        assert_eq!(hierarchy.ancestors(d).len(), 2);
    }

    #[test]
    fn test_parent_errors_reroot_at_object() {
        let (hierarchy, diagnostics) = build(&format!(
            "{MAIN}class A extends Missing {{ }}\nclass B extends String {{ }}\nclass Object {{ }}"
        ));
        assert_eq!(
            diagnostics.messages(),
            vec![
                "class 'Object' is already defined",
                "class 'A' extends undefined class 'Missing'",
                "class 'B' cannot extend built-in class 'String'",
            ]
        );
        for name in ["A", "B"] {
            let id = hierarchy.id_of(name).unwrap();
            assert_eq!(hierarchy.parent_of(id), hierarchy.root());
        }
        assert_eq!(diagnostics.records()[1].line, 2);
    }

    #[test]
    fn test_main_class_present() {
        let (_, diagnostics) = build("class Main { void main() {} }");
        assert!(!diagnostics.has_errors(), "{:?}", diagnostics.messages());
    }

    #[test]
    fn test_main_method_missing() {
        let (_, diagnostics) = build("class Main { }");
        assert_eq!(
            diagnostics.messages(),
            vec!["class 'Main' is missing a 'main' method with no parameters"]
        );

        let (_, diagnostics) = build("class Main { void main(int argc) {} }");
        assert_eq!(diagnostics.count(), 1);
    }

    #[test]
    fn test_main_class_missing() {
        let (_, diagnostics) = build("class Other { void main() {} }");
        assert_eq!(diagnostics.messages(), vec!["missing class 'Main'"]);
        assert_eq!(diagnostics.records()[0].file, "Test.btm");
    }

    #[test]
    fn test_dump() {
        let (hierarchy, _) = build(&format!("{MAIN}class A {{ }}\nclass B extends A {{ }}"));
        let dump = hierarchy.dump();
        assert!(dump.starts_with("Object (builtin) [6 descendant(s)]\n"));
        assert!(dump.contains("\n  A [1 descendant(s)]\n    B\n"));
    }
}
