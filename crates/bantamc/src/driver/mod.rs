//! One-shot compilation sessions: scan, parse or check a single source

use std::fs;
use std::path::Path;

use crate::ast::Program;
use crate::common::{CompileError, CompileResult, Diagnostics};
use crate::lexer::{Lexer, Token};
use crate::parser::parse;
use crate::sema::{ClassHierarchy, SemanticAnalyzer};

/// Debug output switches for a session
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub dump_hierarchy: bool,
    pub verbose: bool,
}

/// Result of a successful check
#[derive(Debug)]
pub struct Analysis {
    /// Program with every expression annotated with its type
    pub program: Program,
    pub hierarchy: ClassHierarchy,
}

/// A single source file and the diagnostics of the last run over it.
///
/// Each of [`scan`](Session::scan), [`parse`](Session::parse) and
/// [`check`](Session::check) starts from an empty diagnostics list.
pub struct Session {
    file: String,
    source: String,
    config: SessionConfig,
    diagnostics: Diagnostics,
}

impl Session {
    pub fn from_source(file: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            source: source.into(),
            config: SessionConfig::default(),
            diagnostics: Diagnostics::new(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> CompileResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        Ok(Self::from_source(path.display().to_string(), source))
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Tokenize the whole source, up to and including end of input
    pub fn scan(&mut self) -> Vec<Token> {
        self.diagnostics.clear();
        if self.config.verbose {
            log::info!("scanning {}", self.file);
        }

        let tokens = Lexer::new(&self.source, &self.file, &mut self.diagnostics).tokenize_all();

        if self.config.dump_tokens {
            eprintln!("=== Tokens ===");
            eprint!("{}", dump_tokens(&tokens));
            eprintln!("=== End Tokens ===\n");
        }

        tokens
    }

    /// Parse the source; stops at the first syntax error
    pub fn parse(&mut self) -> CompileResult<Program> {
        self.diagnostics.clear();
        if self.config.verbose {
            log::info!("parsing {}", self.file);
        }

        let program = parse(&self.source, &self.file, &mut self.diagnostics)?;

        if self.config.dump_ast {
            eprintln!("=== AST ===");
            eprintln!("{:#?}", program);
            eprintln!("=== End AST ===\n");
        }

        Ok(program)
    }

    /// Parse and run semantic analysis
    pub fn check(&mut self) -> CompileResult<Analysis> {
        let mut program = self.parse()?;
        if self.config.verbose {
            log::info!("analyzing {}", self.file);
        }

        let hierarchy = SemanticAnalyzer::new(&mut self.diagnostics).run(&mut program);

        if self.config.dump_hierarchy {
            eprintln!("=== Class Hierarchy ===");
            eprint!("{}", hierarchy.dump());
            eprintln!("=== End Class Hierarchy ===\n");
        }

        if self.diagnostics.has_errors() {
            return Err(CompileError::analysis(self.diagnostics.count()));
        }

        Ok(Analysis { program, hierarchy })
    }
}

/// One line per token: line number, kind and spelling
pub fn dump_tokens(tokens: &[Token]) -> String {
    let mut output = String::new();
    for token in tokens {
        output.push_str(&format!(
            "{:>4}  {:<18} {}\n",
            token.line,
            format!("{:?}", token.kind),
            token.spelling
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::DiagnosticKind;
    use crate::lexer::TokenKind;
    use pretty_assertions::assert_eq;

    const HELLO: &str = "class Main {\n    void main() {\n        TextIO io = new TextIO();\n        io.putString(\"Hello\\n\");\n    }\n}\n";

    #[test]
    fn test_scan_collects_lexical_errors() {
        let mut session = Session::from_source("Bad.btm", "int x = 5 # 3;");
        let tokens = session.scan();

        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        assert_eq!(session.diagnostics().count_of(DiagnosticKind::Lexical), 1);
    }

    #[test]
    fn test_parse_reports_first_syntax_error() {
        let mut session = Session::from_source("Bad.btm", "class Main { void main() { return } }");
        let result = session.parse();

        assert!(matches!(result, Err(CompileError::Syntax { .. })));
        assert_eq!(session.diagnostics().count(), 1);
        assert_eq!(session.diagnostics().records()[0].file, "Bad.btm");
    }

    #[test]
    fn test_check_valid_program() {
        let mut session = Session::from_source("Hello.btm", HELLO);
        let analysis = session.check().unwrap();

        assert!(!session.diagnostics().has_errors());
        assert!(analysis.hierarchy.find("Main").is_some());
        assert_eq!(analysis.program.classes.len(), 1);
    }

    #[test]
    fn test_check_reports_semantic_errors() {
        let source = "class Main { void main() { int x = true; } }";
        let mut session = Session::from_source("Oops.btm", source);
        let result = session.check();

        assert!(matches!(result, Err(CompileError::Analysis { count: 1 })));
        let record = &session.diagnostics().records()[0];
        assert_eq!(record.kind, DiagnosticKind::Semantic);
        assert_eq!(record.to_string(), format!("{} (Oops.btm:1)", record.message));
    }

    #[test]
    fn test_each_run_starts_clean() {
        let mut session = Session::from_source("Oops.btm", "class Main { }");
        assert!(session.check().is_err());
        assert_eq!(session.diagnostics().count(), 1);

        session.scan();
        assert!(!session.diagnostics().has_errors());
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = Session::from_path("does/not/exist.btm");
        assert!(matches!(result, Err(CompileError::Io(_))));
    }

    #[test]
    fn test_dump_tokens_format() {
        let mut session = Session::from_source("T.btm", "x = 1;");
        let dump = dump_tokens(&session.scan());
        let first = dump.lines().next().unwrap();
        assert_eq!(first, "   1  Identifier         x");
    }
}
