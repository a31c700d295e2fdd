//! Parser adapter for Lang.
//!
//! [`parse_source`] drives the lexer and the permissive parser over file
//! text and collects everything downstream passes need: the CST, the
//! owning token stream (both outlive the AST build), syntax diagnostics,
//! and the doc-comment side table. The adapter never fails: if the parser
//! itself dies, the failure becomes a diagnostic and an empty CST
//! placeholder.

mod cst;
mod parser;

pub use cst::{CstChild, CstKind, CstNode, CstNodeId, CstTree};

use lang_diagnostics::Diagnostic;
use lang_lexer::DocComment;
use lang_position_tracking::Span;
use lang_token::TokenStream;

/// The complete output of one parse of one file.
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// The concrete syntax tree
    pub tree: CstTree,
    /// The token stream the tree's token indices point into
    pub tokens: TokenStream,
    /// Syntax diagnostics from lexing and parsing
    pub diagnostics: Vec<Diagnostic>,
    /// `///` doc-comment runs, for attachment to declarations
    pub doc_comments: Vec<DocComment>,
}

/// Lex and parse `text`.
pub fn parse_source(text: &str) -> ParseResult {
    let parsed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let lexed = lang_lexer::lex(text);
        let mut diagnostics = lexed.diagnostics;
        let stream = TokenStream::new(lexed.tokens, text.len());
        let (tree, tokens, parse_diagnostics) = parser::Parser::new(stream).parse();
        diagnostics.extend(parse_diagnostics);
        ParseResult { tree, tokens, diagnostics, doc_comments: lexed.doc_comments }
    }));
    match parsed {
        Ok(result) => result,
        Err(_) => {
            tracing::error!(len = text.len(), "parser panicked; emitting placeholder tree");
            ParseResult {
                tree: CstTree::empty_unit(text.len()),
                tokens: TokenStream::new(Vec::new(), text.len()),
                diagnostics: vec![Diagnostic::syntax_error(
                    Span::new(0, text.len()),
                    "internal error: parser failure",
                )],
                doc_comments: Vec::new(),
            }
        }
    }
}
