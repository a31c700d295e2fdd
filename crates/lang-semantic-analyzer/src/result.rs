//! The immutable per-file analysis bundle.

use lang_ast::{Ast, NodeId};
use lang_diagnostics::Diagnostic;
use lang_parser::ParseResult;
use lang_position_tracking::{LineTable, Span};
use lang_symbol_table::SymbolTable;
use lang_symbol_types::{ScopeId, SymbolId, TypeInfo};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Everything analysis produced for one file at one version.
///
/// Published by the workspace behind an `Arc` and replaced wholesale on
/// re-analysis; readers always see a complete bundle.
#[derive(Debug)]
pub struct AnalysisResult {
    /// Canonical URI of the file
    pub uri: String,
    /// Document version the analysis saw
    pub version: i64,
    /// The analyzed source text
    pub text: Arc<String>,
    /// Line-start table over `text`
    pub line_table: LineTable,
    /// CST, token stream, and syntax diagnostics
    pub parse: ParseResult,
    /// The tolerant AST
    pub ast: Ast,
    /// Scope tree and symbols
    pub symbols: SymbolTable,
    /// The file's module scope (child of the builtin global scope)
    pub module_scope: ScopeId,
    /// Semantic diagnostics
    pub diagnostics: Vec<Diagnostic>,
    /// Resolved symbol per AST node (identifier uses, declarations,
    /// member accesses, `new` expressions)
    pub node_symbol_map: FxHashMap<NodeId, SymbolId>,
    /// Inferred type per expression node
    pub expr_types: FxHashMap<NodeId, TypeInfo>,
    /// Source range of every scope, for position → scope queries
    pub scope_range_map: Vec<(Span, ScopeId)>,
    /// URIs of files this file imports, in source order
    pub imports: Vec<String>,
    /// False when analysis was abandoned (cancellation) or observed
    /// mid-analysis through an import cycle
    pub done: bool,
}

impl AnalysisResult {
    /// Syntax and semantic diagnostics together, for publication.
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.parse.diagnostics.clone();
        all.extend(self.diagnostics.iter().cloned());
        all
    }

    /// The innermost scope whose recorded range contains `offset`.
    pub fn scope_at(&self, offset: usize) -> ScopeId {
        let mut best = self.module_scope;
        let mut best_len = usize::MAX;
        for (span, scope) in &self.scope_range_map {
            if span.contains(offset) || span.end == offset {
                let len = span.len();
                if len < best_len {
                    best = *scope;
                    best_len = len;
                }
            }
        }
        best
    }
}
