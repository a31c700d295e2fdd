//! Semantic analysis for Lang.
//!
//! One post-order pass over the tolerant AST builds scopes, declares
//! symbols (two-phase for classes and functions so self-references
//! resolve), binds imports through the workspace, infers expression
//! types bottom-up, and accumulates diagnostics. The analyzer never
//! aborts: unknown constructs degrade to the `unknown` type plus a
//! diagnostic, and unexpected internal failures at item boundaries are
//! captured as "internal error" diagnostics.

mod analyzer;
mod imports;
mod infer;
mod resolver;
mod result;

pub use resolver::{CancelToken, ImportOutcome, ModuleResolver, NullResolver};
pub use result::AnalysisResult;

use rustc_hash::FxHashSet;

/// Analyze one file. `parse` and `ast` come from the parser adapter and
/// AST builder; `resolver` serves import requests (the workspace
/// implements it); `visited` is the in-stack URI set for cycle
/// tolerance; `cancel` is checked at item boundaries.
pub fn analyze(
    uri: &str,
    version: i64,
    text: std::sync::Arc<String>,
    parse: lang_parser::ParseResult,
    ast: lang_ast::Ast,
    resolver: &dyn ModuleResolver,
    visited: &mut FxHashSet<String>,
    cancel: &CancelToken,
) -> AnalysisResult {
    analyzer::Analyzer::run(uri, version, text, parse, ast, resolver, visited, cancel)
}

/// Convenience for single-file analysis without a workspace: parses,
/// builds, and analyzes `text` with imports unresolved.
pub fn analyze_standalone(uri: &str, version: i64, text: &str) -> AnalysisResult {
    let parse = lang_parser::parse_source(text);
    let ast = lang_ast_builder::build(&parse);
    let mut visited = FxHashSet::default();
    visited.insert(uri.to_string());
    analyze(
        uri,
        version,
        std::sync::Arc::new(text.to_string()),
        parse,
        ast,
        &NullResolver,
        &mut visited,
        &CancelToken::new(),
    )
}
