//! Completion-context classification.

use lang_ast::{AstKind, NodeId};
use lang_lsp_navigation::find_node_for_completion;
use lang_semantic_analyzer::AnalysisResult;

/// What kind of completion the cursor position calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionContext {
    /// After `expr.` — complete members of the base's type
    DotAccess { base: NodeId },
    /// After `expr:` — complete methods of the base's type
    ColonAccess { base: NodeId },
    /// Inside `new …` — complete visible class names
    NewExpression,
    /// Inside a type annotation — complete type names
    TypeAnnotation,
    /// Inside a call's argument region — drive signature help
    Argument { callee: NodeId, index: usize },
    /// Inside an import statement — complete module paths
    Import,
    /// On a plain identifier — complete visible symbols by prefix
    Identifier { prefix: String },
    None,
}

/// Inspect the innermost node and its ancestors at `offset` and pick the
/// most specific context. The innermost match wins, so the cursor inside
/// `new P(x.` classifies as dot access, not as a `new` expression.
pub fn classify_completion_context(result: &AnalysisResult, offset: usize) -> CompletionContext {
    // When the cursor sits in whitespace after a token (`new |`), probe
    // at the end of that token so the node search lands inside the
    // construct being typed. A cursor inside a token probes as-is.
    let tokens = result.parse.tokens.tokens();
    let inside_token = tokens
        .iter()
        .any(|t| t.kind != lang_token::TokenKind::Eof && t.span.start < offset && offset <= t.span.end);
    let probe = if inside_token {
        offset
    } else {
        tokens
            .iter()
            .rev()
            .find(|t| t.kind != lang_token::TokenKind::Eof && t.span.end <= offset)
            .map(|t| t.span.end)
            .unwrap_or(offset)
    };
    let found = find_node_for_completion(&result.ast, probe);
    let chain: Vec<NodeId> =
        std::iter::once(found.node).chain(found.ancestors.iter().rev().copied()).collect();

    for &id in &chain {
        let node = result.ast.node(id);
        match &node.kind {
            AstKind::MemberAccessExpr { base, .. } => {
                // Only the dot/member side counts; inside the base the
                // base's own context applies.
                if offset > result.ast.node(*base).span.start {
                    return CompletionContext::DotAccess { base: *base };
                }
            }
            AstKind::ColonLookupExpr { base, .. } => {
                if offset > result.ast.node(*base).span.start {
                    return CompletionContext::ColonAccess { base: *base };
                }
            }
            AstKind::NewExpr { .. } => return CompletionContext::NewExpression,
            AstKind::TypeName { .. }
            | AstKind::ListTypeNode { .. }
            | AstKind::MapTypeNode { .. }
            | AstKind::UnionTypeNode { .. }
            | AstKind::ErrorType { .. } => return CompletionContext::TypeAnnotation,
            AstKind::CallExpr { callee, args } => {
                let callee_end = result.ast.node(*callee).span.end;
                if offset > callee_end {
                    let index = args
                        .iter()
                        .filter(|&&arg| result.ast.node(arg).span.end < offset)
                        .count();
                    return CompletionContext::Argument { callee: *callee, index };
                }
            }
            AstKind::ImportDecl { .. } => return CompletionContext::Import,
            AstKind::Identifier { name } => {
                let text = result.ast.name(*name);
                let span = node.span;
                let upto = offset.saturating_sub(span.start).min(text.len());
                return CompletionContext::Identifier { prefix: text[..upto].to_string() };
            }
            _ => {}
        }
    }
    CompletionContext::None
}
