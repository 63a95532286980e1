//! Common infrastructure shared by every front-end stage

mod diagnostics;
mod error;
mod span;

pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticReporter, Diagnostics};
pub use error::{CompileError, CompileResult, LexError};
pub use span::Span;
