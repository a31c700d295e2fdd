//! Wire parameter shapes and byte ↔ UTF-16 conversion at the boundary.
//!
//! Byte spans reshape into wire ranges here and flow on through the
//! `lsp_types` payload structures before serialization, so outgoing
//! messages are schema-checked rather than hand-assembled JSON.

use lang_lsp_protocol::{WireDiagnostic, WirePosition, utf16_range};
use lang_position_tracking::utf16_position_to_offset;
use lang_semantic_analyzer::AnalysisResult;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct TextDocumentIdentifier {
    pub uri: String,
}

#[derive(Debug, Deserialize)]
pub struct VersionedTextDocumentIdentifier {
    pub uri: String,
    #[serde(default)]
    pub version: i64,
}

#[derive(Debug, Deserialize)]
pub struct TextDocumentItem {
    pub uri: String,
    #[serde(default)]
    pub version: i64,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct DidOpenParams {
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentItem,
}

#[derive(Debug, Deserialize)]
pub struct ContentChange {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct DidChangeParams {
    #[serde(rename = "textDocument")]
    pub text_document: VersionedTextDocumentIdentifier,
    #[serde(rename = "contentChanges")]
    pub content_changes: Vec<ContentChange>,
}

#[derive(Debug, Deserialize)]
pub struct DidCloseParams {
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentIdentifier,
}

#[derive(Debug, Deserialize)]
pub struct TextDocumentPositionParams {
    #[serde(rename = "textDocument")]
    pub text_document: TextDocumentIdentifier,
    pub position: WirePosition,
}

/// The wire position as a byte offset into the analyzed text.
pub fn offset_of(result: &AnalysisResult, position: WirePosition) -> usize {
    utf16_position_to_offset(&result.text, &result.line_table, position.line, position.character)
}

/// A byte span of the analyzed text as an `lsp_types` range.
pub fn range_of(result: &AnalysisResult, span: lang_position_tracking::Span) -> lsp_types::Range {
    utf16_range(&result.text, &result.line_table, span).into()
}

/// All diagnostics of a result in published shape.
pub fn lsp_diagnostics(result: &AnalysisResult) -> Vec<lsp_types::Diagnostic> {
    result
        .all_diagnostics()
        .into_iter()
        .map(|d| {
            WireDiagnostic {
                range: utf16_range(&result.text, &result.line_table, d.span),
                severity: d.severity.lsp_code(),
                source: d.source.as_str().to_string(),
                message: d.message,
                data: d.data,
            }
            .to_lsp()
        })
        .collect()
}

/// The `publishDiagnostics` params for one analysis.
pub fn publish_diagnostics_params(result: &AnalysisResult) -> Value {
    let diagnostics = lsp_diagnostics(result);
    match result.uri.parse::<lsp_types::Uri>() {
        Ok(uri) => {
            let params = lsp_types::PublishDiagnosticsParams {
                uri,
                diagnostics,
                version: Some(result.version as i32),
            };
            serde_json::to_value(params).unwrap_or(Value::Null)
        }
        // A URI the validator rejects still gets its diagnostics out.
        Err(_) => serde_json::json!({
            "uri": result.uri,
            "version": result.version,
            "diagnostics": diagnostics,
        }),
    }
}
