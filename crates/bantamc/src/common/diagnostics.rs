//! Diagnostic accumulation and reporting

use std::fmt;

use codespan_reporting::diagnostic::{Diagnostic as Report, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use super::Span;

/// Stage that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    Lexical,
    Syntax,
    Semantic,
}

impl DiagnosticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Lexical => "Lexical error",
            DiagnosticKind::Syntax => "Syntax error",
            DiagnosticKind::Semantic => "Semantic error",
        }
    }
}

/// One error record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub file: String,
    pub line: usize,
    pub span: Span,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}:{})", self.message, self.file, self.line)
    }
}

/// Ordered accumulator of diagnostics for one analysis run.
///
/// Records are kept in the order they were reported, which follows the
/// pipeline stages rather than source order.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(
        &mut self,
        kind: DiagnosticKind,
        file: &str,
        span: Span,
        message: impl Into<String>,
    ) {
        let message = message.into();
        log::debug!("{} at {}:{}: {}", kind.as_str(), file, span.line, message);
        self.records.push(Diagnostic {
            kind,
            file: file.to_string(),
            line: span.line,
            span,
            message,
        });
    }

    pub fn lexical(&mut self, file: &str, span: Span, message: impl Into<String>) {
        self.report(DiagnosticKind::Lexical, file, span, message);
    }

    pub fn syntax(&mut self, file: &str, span: Span, message: impl Into<String>) {
        self.report(DiagnosticKind::Syntax, file, span, message);
    }

    pub fn semantic(&mut self, file: &str, span: Span, message: impl Into<String>) {
        self.report(DiagnosticKind::Semantic, file, span, message);
    }

    pub fn has_errors(&self) -> bool {
        !self.records.is_empty()
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn count_of(&self, kind: DiagnosticKind) -> usize {
        self.records.iter().filter(|d| d.kind == kind).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter()
    }

    pub fn records(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Messages only, in accumulation order
    pub fn messages(&self) -> Vec<&str> {
        self.records.iter().map(|d| d.message.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    pub fn report(&self, file_id: usize, diagnostic: &Diagnostic) {
        let mut report = Report::error().with_message(diagnostic.kind.as_str());
        report = if diagnostic.span.is_synthetic() {
            report.with_notes(vec![diagnostic.message.clone()])
        } else {
            report.with_labels(vec![
                Label::primary(file_id, diagnostic.span.start..diagnostic.span.end)
                    .with_message(&diagnostic.message),
            ])
        };

        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, &report);
    }

    pub fn report_all(&self, file_id: usize, diagnostics: &Diagnostics) {
        for diagnostic in diagnostics {
            self.report(file_id, diagnostic);
        }
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
