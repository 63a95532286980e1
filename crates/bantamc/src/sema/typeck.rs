//! Type checking of one class at a time

use super::hierarchy::{is_array_type, ClassHierarchy, ClassId, NULL_TYPE, ROOT_CLASS};
use super::symbols::{is_reserved, MethodSig, SymbolTable};
use crate::ast::*;
use crate::common::{Diagnostics, Span};

const INT: &str = "int";
const BOOLEAN: &str = "boolean";
const VOID: &str = "void";
const STRING: &str = "String";

/// Local variable environment of the method being checked
type Env = SymbolTable<String>;

/// Type checker for the members of a single user class.
///
/// Every expression visited gets its `ty` set, falling back to a
/// placeholder type when the expression is ill-typed.
pub struct TypeChecker<'a> {
    hierarchy: &'a ClassHierarchy,
    class: ClassId,
    diagnostics: &'a mut Diagnostics,
    file: String,
    method: String,
    return_type: String,
    loop_depth: usize,
}

impl<'a> TypeChecker<'a> {
    pub fn new(
        hierarchy: &'a ClassHierarchy,
        class: ClassId,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            hierarchy,
            class,
            diagnostics,
            file: String::new(),
            method: String::new(),
            return_type: VOID.to_string(),
            loop_depth: 0,
        }
    }

    pub fn check_class(&mut self, class: &mut Class) {
        log::debug!("type checking class {}", class.name);
        self.file = class.file.clone();

        for member in &mut class.members {
            match member {
                Member::Field(field) => self.check_field(field),
                Member::Method(method) => self.check_method(method),
            }
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.semantic(&self.file, span, message);
    }

    fn class_name(&self) -> &'a str {
        &self.hierarchy.get(self.class).name
    }

    fn parent_name(&self) -> &'a str {
        let hierarchy = self.hierarchy;
        match hierarchy.parent_of(self.class) {
            Some(parent) => &hierarchy.get(parent).name,
            None => ROOT_CLASS,
        }
    }

    /// Report a type that does not exist; `void` is rejected too
    fn check_type(&mut self, ty: &str, span: Span) -> bool {
        if ty == VOID {
            self.error(span, "'void' is only valid as a return type");
            false
        } else if !self.hierarchy.exists_type(ty) {
            self.error(span, format!("unknown type '{ty}'"));
            false
        } else {
            true
        }
    }

    fn conforms(&self, actual: &str, expected: &str) -> bool {
        self.hierarchy.is_subclass(actual, expected)
    }

    /// Bind a local, rejecting reserved names and redeclarations in the method
    fn declare_local(&mut self, env: &mut Env, name: &str, ty: &str, span: Span) {
        if is_reserved(name) {
            self.error(span, format!("'{name}' is a reserved name"));
        } else if env.lookup_chain(name).is_some() {
            self.error(
                span,
                format!("variable '{}' is already defined in method '{}'", name, self.method),
            );
        } else {
            env.add(name, ty.to_string());
        }
    }

    // =========================================================================
    // Members
    // =========================================================================

    fn check_field(&mut self, field: &mut Field) {
        let known = self.check_type(&field.ty, field.span);

        if let Some(init) = &mut field.init {
            let mut env = Env::new();
            env.push_scope();
            let actual = self.check_expr(init, &mut env);
            if known && !self.conforms(&actual, &field.ty) {
                self.error(
                    init.span,
                    format!(
                        "type '{}' of initializer is not compatible with declared type '{}' of field '{}'",
                        actual, field.ty, field.name
                    ),
                );
            }
        }
    }

    fn check_method(&mut self, method: &mut Method) {
        self.method = method.name.clone();
        self.return_type = method.return_type.clone();
        self.loop_depth = 0;

        if method.return_type != VOID && !self.hierarchy.exists_type(&method.return_type) {
            self.error(
                method.span,
                format!(
                    "unknown return type '{}' for method '{}'",
                    method.return_type, method.name
                ),
            );
        }

        self.check_override(method);

        let mut env = Env::new();
        env.push_scope();
        for formal in &method.formals {
            self.check_type(&formal.ty, formal.span);
            // Reserved and duplicate formals were reported with the symbol tables
            if !is_reserved(&formal.name) && env.peek(&formal.name).is_none() {
                env.add(formal.name.as_str(), formal.ty.clone());
            }
        }

        let mut body = env.enter_scope();
        for stmt in &mut method.body {
            self.check_stmt(stmt, &mut body);
        }
    }

    fn check_override(&mut self, method: &Method) {
        let hierarchy = self.hierarchy;
        let Some(parent) = hierarchy.parent_of(self.class) else {
            return;
        };
        let Some(inherited) = hierarchy.lookup_method(parent, &method.name) else {
            return;
        };

        if !MethodSig::from(method).same_signature(inherited) {
            self.error(
                method.span,
                format!(
                    "method '{}' overrides an inherited method with a different signature",
                    method.name
                ),
            );
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn check_stmt(&mut self, stmt: &mut Stmt, env: &mut Env) {
        let span = stmt.span;

        match &mut stmt.kind {
            StmtKind::Expr(expr) => {
                self.check_expr(expr, env);
            }
            StmtKind::Decl { ty, name, init } => {
                let known = self.check_type(ty, span);
                let actual = self.check_expr(init, env);
                if known && !self.conforms(&actual, ty) {
                    self.error(
                        init.span,
                        format!(
                            "type '{actual}' of initializer is not compatible with declared type '{ty}' of variable '{name}'"
                        ),
                    );
                }
                self.declare_local(env, name, ty, span);
            }
            StmtKind::Block(stmts) => {
                let mut scope = env.enter_scope();
                for stmt in stmts {
                    self.check_stmt(stmt, &mut scope);
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition, "if", env);
                self.check_scoped(then_branch, env);
                if let Some(else_branch) = else_branch {
                    self.check_scoped(else_branch, env);
                }
            }
            StmtKind::While { condition, body } => {
                self.check_condition(condition, "while", env);
                self.check_loop_body(body, env);
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.check_for_clause(init, "initialization", env);
                }
                if let Some(condition) = condition {
                    self.check_condition(condition, "for", env);
                }
                if let Some(update) = update {
                    self.check_for_clause(update, "update", env);
                }
                self.check_loop_body(body, env);
            }
            StmtKind::Break => {
                if self.loop_depth == 0 {
                    self.error(span, "'break' outside of a loop");
                }
            }
            StmtKind::Return(value) => self.check_return(value.as_mut(), span, env),
        }
    }

    fn check_scoped(&mut self, stmt: &mut Stmt, env: &mut Env) {
        let mut scope = env.enter_scope();
        self.check_stmt(stmt, &mut scope);
    }

    fn check_loop_body(&mut self, body: &mut Stmt, env: &mut Env) {
        self.loop_depth += 1;
        self.check_scoped(body, env);
        self.loop_depth -= 1;
    }

    fn check_condition(&mut self, condition: &mut Expr, construct: &str, env: &mut Env) {
        let ty = self.check_expr(condition, env);
        if ty != BOOLEAN {
            self.error(
                condition.span,
                format!("condition of '{construct}' must be boolean, found '{ty}'"),
            );
        }
    }

    fn check_for_clause(&mut self, clause: &mut Expr, which: &str, env: &mut Env) {
        let ty = self.check_expr(clause, env);
        if ty != INT {
            self.error(
                clause.span,
                format!("{which} of 'for' must be int, found '{ty}'"),
            );
        }
    }

    fn check_return(&mut self, value: Option<&mut Expr>, span: Span, env: &mut Env) {
        let expected = self.return_type.clone();

        match value {
            Some(value) => {
                let actual = self.check_expr(value, env);
                if expected == VOID {
                    self.error(value.span, "void method cannot return a value");
                } else if self.hierarchy.exists_type(&expected)
                    && !self.conforms(&actual, &expected)
                {
                    self.error(
                        value.span,
                        format!(
                            "return type '{actual}' is not compatible with declared type '{expected}'"
                        ),
                    );
                }
            }
            None if expected != VOID => {
                self.error(
                    span,
                    format!("missing return value in method returning '{expected}'"),
                );
            }
            None => {}
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    /// Type `expr`, record the result on the node and return it
    fn check_expr(&mut self, expr: &mut Expr, env: &mut Env) -> String {
        let ty = self.infer(&mut expr.kind, expr.span, env);
        expr.ty = Some(ty.clone());
        ty
    }

    fn infer(&mut self, kind: &mut ExprKind, span: Span, env: &mut Env) -> String {
        match kind {
            ExprKind::IntConst(_) => INT.to_string(),
            ExprKind::BoolConst(_) => BOOLEAN.to_string(),
            ExprKind::StrConst(_) => STRING.to_string(),
            ExprKind::Var(var) => self.check_var(var, span, false, env),
            ExprKind::Assign { target, value } => {
                let target_ty = self.check_var(target, span, true, env);
                let value_ty = self.check_expr(value, env);
                if !self.conforms(&value_ty, &target_ty) {
                    self.error(
                        value.span,
                        format!("cannot assign '{value_ty}' to variable of type '{target_ty}'"),
                    );
                }
                target_ty
            }
            ExprKind::Dispatch {
                receiver,
                method,
                args,
            } => self.check_dispatch(receiver.as_deref_mut(), method, args, span, env),
            ExprKind::New { class } => {
                if !is_array_type(class) && self.hierarchy.id_of(class).is_some() {
                    class.clone()
                } else {
                    self.error(span, format!("unknown type '{class}'"));
                    ROOT_CLASS.to_string()
                }
            }
            ExprKind::NewArray { element, size } => {
                let size_ty = self.check_expr(size, env);
                if size_ty != INT {
                    self.error(size.span, format!("array size must be int, found '{size_ty}'"));
                }
                if self.check_type(element, span) {
                    format!("{element}[]")
                } else {
                    ROOT_CLASS.to_string()
                }
            }
            ExprKind::InstanceOf { expr, ty } => {
                let actual = self.check_expr(expr, env);
                if self.check_type(ty, span) && !self.conforms(&actual, ty) {
                    self.error(
                        span,
                        format!("'instanceof' type '{ty}' is not a supertype of '{actual}'"),
                    );
                }
                BOOLEAN.to_string()
            }
            ExprKind::Cast { ty, expr } => {
                let actual = self.check_expr(expr, env);
                if !self.check_type(ty, span) {
                    return ROOT_CLASS.to_string();
                }
                if !self.conforms(&actual, ty) && !self.conforms(ty, &actual) {
                    self.error(span, format!("cannot cast '{actual}' to '{ty}'"));
                }
                ty.clone()
            }
            ExprKind::Binary { op, left, right } => {
                let left_ty = self.check_expr(left, env);
                let right_ty = self.check_expr(right, env);
                self.check_binary(*op, &left_ty, &right_ty, span)
            }
            ExprKind::Unary { op, operand } => {
                let operand_ty = self.check_expr(operand, env);
                self.check_unary(*op, operand, &operand_ty, span)
            }
        }
    }

    fn check_binary(&mut self, op: BinaryOp, left: &str, right: &str, span: Span) -> String {
        if op.is_equality() {
            if !self.conforms(left, right) && !self.conforms(right, left) {
                self.error(
                    span,
                    format!("operator '{}' cannot compare '{left}' and '{right}'", op.as_str()),
                );
            }
            return BOOLEAN.to_string();
        }

        let (operand, result) = if op.is_logical() {
            (BOOLEAN, BOOLEAN)
        } else if op.is_relational() {
            (INT, BOOLEAN)
        } else {
            (INT, INT)
        };

        if left != operand || right != operand {
            self.error(
                span,
                format!(
                    "operator '{}' requires {operand} operands, found '{left}' and '{right}'",
                    op.as_str()
                ),
            );
        }
        result.to_string()
    }

    fn check_unary(&mut self, op: UnaryOp, operand: &Expr, operand_ty: &str, span: Span) -> String {
        let (expected, result) = match op {
            UnaryOp::Not => (BOOLEAN, BOOLEAN),
            _ => (INT, INT),
        };

        if op.is_increment() && !matches!(operand.kind, ExprKind::Var(_)) {
            self.error(
                span,
                format!("operand of '{}' must be a variable", op.as_str()),
            );
        }
        if operand_ty != expected {
            self.error(
                span,
                format!(
                    "operator '{}' requires an operand of type {expected}, found '{operand_ty}'",
                    op.as_str()
                ),
            );
        }
        result.to_string()
    }

    /// Type of a variable reference; `assigning` is set for assignment targets
    fn check_var(
        &mut self,
        var: &mut VarRef,
        span: Span,
        assigning: bool,
        env: &mut Env,
    ) -> String {
        let qualifier = var.qualifier().map(str::to_string);
        let indexed = var.index.is_some();

        let ty = match var.reference.as_deref_mut() {
            None => {
                if assigning && !indexed && matches!(var.name.as_str(), "this" | "super" | "null") {
                    self.error(span, format!("cannot assign to '{}'", var.name));
                }
                self.resolve_name(&var.name, span, env)
            }
            Some(reference) => {
                let reference_ty = self.check_expr(reference, env);
                if assigning && !indexed && var.name == "length" && is_array_type(&reference_ty) {
                    self.error(span, "cannot assign to 'length'");
                }
                self.resolve_qualified(
                    qualifier.as_deref(),
                    &reference_ty,
                    &var.name,
                    indexed,
                    span,
                )
            }
        };

        let Some(index) = var.index.as_deref_mut() else {
            return ty;
        };

        let index_ty = self.check_expr(index, env);
        if index_ty != INT {
            self.error(index.span, format!("array index must be int, found '{index_ty}'"));
        }
        match ty.strip_suffix("[]") {
            Some(element) => element.to_string(),
            None => {
                self.error(span, format!("variable '{}' is not an array", var.name));
                ty
            }
        }
    }

    fn resolve_name(&mut self, name: &str, span: Span, env: &Env) -> String {
        match name {
            "this" => return self.class_name().to_string(),
            "super" => return self.parent_name().to_string(),
            "null" => return NULL_TYPE.to_string(),
            _ => {}
        }

        if let Some(ty) = env.lookup_chain(name) {
            return ty.clone();
        }
        if let Some(ty) = self.hierarchy.lookup_var(self.class, name) {
            return ty.clone();
        }

        self.error(span, format!("undeclared variable '{name}'"));
        ROOT_CLASS.to_string()
    }

    fn resolve_qualified(
        &mut self,
        qualifier: Option<&str>,
        reference_ty: &str,
        name: &str,
        indexed: bool,
        span: Span,
    ) -> String {
        let hierarchy = self.hierarchy;
        let owner = match qualifier {
            Some("this") => Some(self.class),
            Some("super") => hierarchy.parent_of(self.class),
            _ => None,
        };

        if let Some(owner) = owner {
            return match hierarchy.lookup_var(owner, name) {
                Some(ty) => ty.clone(),
                None => {
                    self.error(
                        span,
                        format!(
                            "class '{}' has no field '{name}'",
                            hierarchy.get(owner).name
                        ),
                    );
                    ROOT_CLASS.to_string()
                }
            };
        }

        if is_array_type(reference_ty) && name == "length" && !indexed {
            return INT.to_string();
        }

        self.error(span, "fields can only be accessed through 'this' or 'super'");
        ROOT_CLASS.to_string()
    }

    fn check_dispatch(
        &mut self,
        receiver: Option<&mut Expr>,
        method: &str,
        args: &mut [Expr],
        span: Span,
        env: &mut Env,
    ) -> String {
        let hierarchy = self.hierarchy;

        let class = match receiver {
            None => Some(self.class),
            Some(receiver) => {
                let receiver_ty = self.check_expr(receiver, env);
                let class = hierarchy.id_of(&receiver_ty);
                if class.is_none() {
                    self.error(
                        receiver.span,
                        format!("cannot call method '{method}' on type '{receiver_ty}'"),
                    );
                }
                class
            }
        };

        let mut arg_types = Vec::with_capacity(args.len());
        for arg in args.iter_mut() {
            arg_types.push(self.check_expr(arg, env));
        }

        let Some(class) = class else {
            return ROOT_CLASS.to_string();
        };
        let Some(sig) = hierarchy.lookup_method(class, method) else {
            self.error(
                span,
                format!("class '{}' has no method '{method}'", hierarchy.get(class).name),
            );
            return ROOT_CLASS.to_string();
        };

        if sig.formals.len() != args.len() {
            self.error(
                span,
                format!(
                    "method '{method}' expects {} argument(s), found {}",
                    sig.formals.len(),
                    args.len()
                ),
            );
        } else {
            for (position, (arg, expected)) in args.iter().zip(sig.param_types()).enumerate() {
                let actual = &arg_types[position];
                if !self.conforms(actual, expected) {
                    self.error(
                        arg.span,
                        format!(
                            "argument {} of method '{method}' has type '{actual}', expected '{expected}'",
                            position + 1
                        ),
                    );
                }
            }
        }

        sig.return_type.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::sema::SemanticAnalyzer;
    use pretty_assertions::assert_eq;

    const MAIN: &str = "class Main { void main() { } }\n";

    fn analyze(source: &str) -> (Program, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let mut program = parse(source, "Test.btm", &mut diagnostics).unwrap();
        SemanticAnalyzer::new(&mut diagnostics).run(&mut program);
        (program, diagnostics)
    }

    fn messages(source: &str) -> Vec<String> {
        let (_, diagnostics) = analyze(&format!("{MAIN}{source}"));
        diagnostics.iter().map(|d| d.message.clone()).collect()
    }

    /// Messages for a method body placed in class `A`
    fn body_messages(body: &str) -> Vec<String> {
        messages(&format!("class A {{ int n; int[] xs; void m(int p) {{ {body} }} }}"))
    }

    fn field_init(program: &Program, class: &str, field: &str) -> Expr {
        program
            .find_class(class)
            .and_then(|c| c.fields().find(|f| f.name == field))
            .and_then(|f| f.init.clone())
            .unwrap()
    }

    #[test]
    fn test_incompatible_initializer_reports_once() {
        assert_eq!(
            messages("class A { int x = true; }"),
            vec!["type 'boolean' of initializer is not compatible with declared type 'int' of field 'x'"]
        );
        assert!(messages("class A { int x = 5; }").is_empty());

        assert_eq!(
            body_messages("int x = true;"),
            vec!["type 'boolean' of initializer is not compatible with declared type 'int' of variable 'x'"]
        );
        assert!(body_messages("int x = 5;").is_empty());
    }

    #[test]
    fn test_arithmetic_on_bad_operands_still_types_int() {
        let (program, diagnostics) = analyze(&format!("{MAIN}class A {{ int x = \"5\" + true; }}"));
        assert_eq!(
            diagnostics.messages(),
            vec!["operator '+' requires int operands, found 'String' and 'boolean'"]
        );
        assert_eq!(field_init(&program, "A", "x").resolved_type(), Some("int"));
    }

    #[test]
    fn test_every_expression_is_annotated() {
        let source = format!("{MAIN}class A {{ boolean b = (1 < 2) && !(3 == 4); }}");
        let (program, _) = analyze(&source);
        let init = field_init(&program, "A", "b");
        assert_eq!(init.resolved_type(), Some("boolean"));
        let ExprKind::Binary { left, right, .. } = &init.kind else {
            panic!("expected binary expression");
        };
        assert_eq!(left.resolved_type(), Some("boolean"));
        assert_eq!(right.resolved_type(), Some("boolean"));
    }

    #[test]
    fn test_operator_rules() {
        assert_eq!(
            body_messages("boolean b = 1 < true; boolean i = !5; boolean c = 1 && true; int j = -false;"),
            vec![
                "operator '<' requires int operands, found 'int' and 'boolean'",
                "operator '!' requires an operand of type boolean, found 'int'",
                "operator '&&' requires boolean operands, found 'int' and 'boolean'",
                "operator '-' requires an operand of type int, found 'boolean'",
            ]
        );
    }

    #[test]
    fn test_equality_requires_related_types() {
        assert!(body_messages("boolean b = this == null; boolean c = 1 != 2;").is_empty());
        assert_eq!(
            body_messages("boolean b = 1 == true; boolean c = \"s\" == this;"),
            vec![
                "operator '==' cannot compare 'int' and 'boolean'",
                "operator '==' cannot compare 'String' and 'A'",
            ]
        );
    }

    #[test]
    fn test_increment_needs_int_variable() {
        assert!(body_messages("n++; --p; xs[0]++;").is_empty());
        assert_eq!(
            body_messages("5++;"),
            vec!["operand of '++' must be a variable"]
        );
    }

    #[test]
    fn test_variable_resolution() {
        assert!(body_messages("int a = n + p; int b = this.n; int c = xs.length; A me = this;").is_empty());
        assert_eq!(
            body_messages("int a = missing;"),
            vec![
                "undeclared variable 'missing'",
                "type 'Object' of initializer is not compatible with declared type 'int' of variable 'a'",
            ]
        );
        assert_eq!(
            messages("class A { void m() { B b = new B(); int i = b.x; } }\nclass B { int x; }"),
            vec![
                "fields can only be accessed through 'this' or 'super'",
                "type 'Object' of initializer is not compatible with declared type 'int' of variable 'i'",
            ]
        );
    }

    #[test]
    fn test_super_field_and_method() {
        assert!(messages(
            "class A { int n; int get() { return n; } }
             class B extends A { int m() { return super.n + super.get() + get(); } }"
        )
        .is_empty());
        assert_eq!(
            messages("class A { }\nclass B extends A { int m() { return super.n; } }"),
            vec!["class 'A' has no field 'n'", "return type 'Object' is not compatible with declared type 'int'"]
        );
    }

    #[test]
    fn test_arrays() {
        assert!(body_messages("int[] a = new int[3]; a[0] = 1; int v = a[p]; xs = a;").is_empty());
        assert_eq!(
            body_messages("int[] a = new int[true]; int v = n[0]; int w = xs[false];"),
            vec![
                "array size must be int, found 'boolean'",
                "variable 'n' is not an array",
                "array index must be int, found 'boolean'",
            ]
        );
    }

    #[test]
    fn test_new_and_unknown_types() {
        assert_eq!(
            body_messages("Missing m = new Missing(); Thing[] t = null;"),
            vec!["unknown type 'Missing'", "unknown type 'Missing'", "unknown type 'Thing[]'"]
        );
        assert_eq!(body_messages("void v = 1;"), vec!["'void' is only valid as a return type"]);
    }

    #[test]
    fn test_null_converts_to_references_only() {
        assert!(body_messages("A a = null; int[] b = null; String s = null;").is_empty());
        assert_eq!(
            body_messages("int i = null;"),
            vec!["type 'null' of initializer is not compatible with declared type 'int' of variable 'i'"]
        );
    }

    #[test]
    fn test_assignment() {
        assert!(body_messages("Object o = this; o = new A(); n = p = 3;").is_empty());
        assert_eq!(
            body_messages("n = true; A a = this; a = new Object();"),
            vec![
                "cannot assign 'boolean' to variable of type 'int'",
                "cannot assign 'Object' to variable of type 'A'",
            ]
        );
    }

    #[test]
    fn test_assignment_to_reserved_names_and_length() {
        assert_eq!(body_messages("this = null;"), vec!["cannot assign to 'this'"]);
        assert_eq!(
            body_messages("super = new Object(); null = null;"),
            vec!["cannot assign to 'super'", "cannot assign to 'null'"]
        );
        assert_eq!(
            body_messages("int[] a = new int[2]; a.length = 3; xs.length = n;"),
            vec!["cannot assign to 'length'", "cannot assign to 'length'"]
        );
        assert!(body_messages("int[] a = new int[2]; n = a.length; a[0] = xs.length;").is_empty());
    }

    #[test]
    fn test_conditions_and_loops() {
        assert!(body_messages("if (true) n = 1; else n = 2; while (n < 3) n++; for (n = 0; n < 3; n++) { break; }").is_empty());
        assert_eq!(
            body_messages("if (1) { } while (n) { } for (true; 1; false) { } break;"),
            vec![
                "condition of 'if' must be boolean, found 'int'",
                "condition of 'while' must be boolean, found 'int'",
                "initialization of 'for' must be int, found 'boolean'",
                "condition of 'for' must be boolean, found 'int'",
                "update of 'for' must be int, found 'boolean'",
                "'break' outside of a loop",
            ]
        );
    }

    #[test]
    fn test_locals_scoping() {
        assert!(body_messages("{ int a = 1; } { int a = 2; } int a = 3;").is_empty());
        assert_eq!(
            body_messages("int a = 1; { int a = 2; } int p = 0; int this = 0;"),
            vec![
                "variable 'a' is already defined in method 'm'",
                "variable 'p' is already defined in method 'm'",
                "'this' is a reserved name",
            ]
        );
        assert_eq!(
            body_messages("{ int a = 1; } int b = a;"),
            vec![
                "undeclared variable 'a'",
                "type 'Object' of initializer is not compatible with declared type 'int' of variable 'b'",
            ]
        );
    }

    #[test]
    fn test_returns() {
        assert!(messages("class A { int f() { return 1; } void g() { return; } A h() { return null; } }").is_empty());
        assert_eq!(
            messages("class A { int f() { return true; } void g() { return 1; } int h() { return; } }"),
            vec![
                "return type 'boolean' is not compatible with declared type 'int'",
                "void method cannot return a value",
                "missing return value in method returning 'int'",
            ]
        );
        assert_eq!(
            messages("class A { Missing f() { } }"),
            vec!["unknown return type 'Missing' for method 'f'"]
        );
    }

    #[test]
    fn test_dispatch() {
        assert!(messages(
            "class A { int twice(int x) { return x + x; } void m() {
                int a = twice(2);
                TextIO io = new TextIO();
                io.putString(\"hi\").putInt(this.twice(a));
                String s = \"ab\".concat(\"cd\");
                int n = s.length();
                boolean e = equals(null);
             } }"
        )
        .is_empty());

        assert_eq!(
            messages(
                "class A { int twice(int x) { return x; } void m() {
                    int a = twice();
                    int b = twice(true);
                    int c = nothing();
                    int d = a.twice(1);
                } }"
            ),
            vec![
                "method 'twice' expects 1 argument(s), found 0",
                "argument 1 of method 'twice' has type 'boolean', expected 'int'",
                "class 'A' has no method 'nothing'",
                "type 'Object' of initializer is not compatible with declared type 'int' of variable 'c'",
                "cannot call method 'twice' on type 'int'",
                "type 'Object' of initializer is not compatible with declared type 'int' of variable 'd'",
            ]
        );
    }

    #[test]
    fn test_cast_and_instanceof() {
        let classes = "class A { }\nclass B extends A { }\n";
        assert!(messages(&format!(
            "{classes}class C {{ void m() {{ A a = new B(); B b = cast(B, a); boolean t = b instanceof A; }} }}"
        ))
        .is_empty());
        assert_eq!(
            messages(&format!(
                "{classes}class C {{ void m() {{ A a = new A(); boolean t = a instanceof B; int i = cast(int, a); Object o = cast(Missing, a); }} }}"
            )),
            vec![
                "'instanceof' type 'B' is not a supertype of 'A'",
                "cannot cast 'A' to 'int'",
                "unknown type 'Missing'",
            ]
        );
    }

    #[test]
    fn test_override_must_keep_signature() {
        assert!(messages("class A { int f(int x) { return x; } }\nclass B extends A { int f(int y) { return y; } }").is_empty());
        assert_eq!(
            messages("class A { int f(int x) { return x; } }\nclass B extends A { boolean f(int y) { return true; } }"),
            vec!["method 'f' overrides an inherited method with a different signature"]
        );
    }
}
