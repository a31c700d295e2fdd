//! Diagnostic records shared across the analysis pipeline.
//!
//! Parser, analyzer, and workspace all report problems as [`Diagnostic`]
//! values accumulated per file. Nothing in the engine throws; a failed
//! analysis is an analysis with diagnostics attached.

use lang_position_tracking::Span;
use serde::{Deserialize, Serialize};

/// Diagnostic severity, ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Information,
    Hint,
}

impl Severity {
    /// The numeric severity the LSP wire format uses (1 = Error).
    pub fn lsp_code(&self) -> u8 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Information => 3,
            Severity::Hint => 4,
        }
    }
}

/// Which stage produced a diagnostic. Shown as the `source` field in the
/// editor's problems list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSource {
    /// Lexer or parser
    Syntax,
    /// Semantic analyzer or workspace
    Semantic,
}

impl DiagnosticSource {
    /// Wire string for the LSP `source` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticSource::Syntax => "syntax",
            DiagnosticSource::Semantic => "semantic",
        }
    }
}

/// One reported problem with a precise source span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Byte span the diagnostic covers
    pub span: Span,
    /// Severity shown to the client
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Producing stage
    pub source: DiagnosticSource,
    /// Structured payload, e.g. the search list of a failed import
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Diagnostic {
    /// A syntax error.
    pub fn syntax_error(span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            span,
            severity: Severity::Error,
            message: message.into(),
            source: DiagnosticSource::Syntax,
            data: None,
        }
    }

    /// A semantic diagnostic with the given severity.
    pub fn semantic(span: Span, severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic { span, severity, message: message.into(), source: DiagnosticSource::Semantic, data: None }
    }

    /// A semantic error.
    pub fn semantic_error(span: Span, message: impl Into<String>) -> Self {
        Self::semantic(span, Severity::Error, message)
    }

    /// A semantic warning.
    pub fn semantic_warning(span: Span, message: impl Into<String>) -> Self {
        Self::semantic(span, Severity::Warning, message)
    }

    /// An unexpected internal failure downgraded to a diagnostic so the
    /// server keeps running.
    pub fn internal_error(span: Span, message: impl Into<String>) -> Self {
        Self::semantic(span, Severity::Error, format!("internal error: {}", message.into()))
    }

    /// Attach a structured payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_wire_codes() {
        assert_eq!(Severity::Error.lsp_code(), 1);
        assert_eq!(Severity::Hint.lsp_code(), 4);
    }

    #[test]
    fn internal_error_is_prefixed() {
        let d = Diagnostic::internal_error(Span::new(0, 1), "walked past arena end");
        assert!(d.message.starts_with("internal error: "));
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.source, DiagnosticSource::Semantic);
    }

    #[test]
    fn source_strings() {
        assert_eq!(DiagnosticSource::Syntax.as_str(), "syntax");
        assert_eq!(DiagnosticSource::Semantic.as_str(), "semantic");
    }
}
