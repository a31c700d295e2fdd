//! Completion item assembly per context.

use crate::context::CompletionContext;
use lang_semantic_analyzer::AnalysisResult;
use lang_lsp_navigation::find_visible_symbols;
use lang_symbol_table::Symbol;
use lang_symbol_types::{ScopeId, SymbolKind, TypeInfo};
use serde::Serialize;

/// One completion suggestion. `kind` is the numeric LSP
/// `CompletionItemKind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionItem {
    pub label: String,
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
}

impl CompletionItem {
    fn from_symbol(symbol: &Symbol) -> Self {
        CompletionItem {
            label: symbol.name.clone(),
            kind: symbol.kind.completion_item_kind(),
            detail: Some(symbol.ty.to_string()),
            documentation: symbol.documentation.clone(),
        }
    }

    fn keyword(label: &str) -> Self {
        CompletionItem { label: label.to_string(), kind: 14, detail: None, documentation: None }
    }
}

const TYPE_KEYWORDS: &[&str] = &[
    "any", "bool", "coroutine", "float", "function", "int", "list", "map", "null", "number",
    "string", "void",
];

/// Build completion items for a classified context. `module_candidates`
/// supplies import-path suggestions (the workspace computes them).
/// Completion never errors: unknown base types simply yield no items.
pub fn completion_items(
    result: &AnalysisResult,
    context: &CompletionContext,
    offset: usize,
    module_candidates: &[String],
) -> Vec<CompletionItem> {
    let mut items = match context {
        CompletionContext::DotAccess { base } => members_of_base(result, *base, false),
        CompletionContext::ColonAccess { base } => members_of_base(result, *base, true),
        CompletionContext::NewExpression => find_visible_symbols(result, offset)
            .into_iter()
            .filter(|(_, s)| s.kind == SymbolKind::Class)
            .map(|(_, s)| CompletionItem::from_symbol(s))
            .collect(),
        CompletionContext::TypeAnnotation => {
            let mut items: Vec<CompletionItem> =
                TYPE_KEYWORDS.iter().map(|k| CompletionItem::keyword(k)).collect();
            items.extend(
                find_visible_symbols(result, offset)
                    .into_iter()
                    .filter(|(_, s)| {
                        matches!(s.kind, SymbolKind::Class | SymbolKind::TypeAlias)
                    })
                    .map(|(_, s)| CompletionItem::from_symbol(s)),
            );
            items
        }
        CompletionContext::Import => module_candidates
            .iter()
            .map(|path| CompletionItem {
                label: path.clone(),
                kind: 17,
                detail: None,
                documentation: None,
            })
            .collect(),
        CompletionContext::Identifier { prefix } => find_visible_symbols(result, offset)
            .into_iter()
            .filter(|(_, s)| s.name.starts_with(prefix.as_str()))
            .map(|(_, s)| CompletionItem::from_symbol(s))
            .collect(),
        // Argument positions answer through signature help instead.
        CompletionContext::Argument { .. } | CompletionContext::None => Vec::new(),
    };
    items.sort_by(|a, b| a.label.cmp(&b.label));
    items.dedup_by(|a, b| a.label == b.label);
    items
}

fn members_of_base(result: &AnalysisResult, base: lang_ast::NodeId, methods_only: bool) -> Vec<CompletionItem> {
    let Some(base_ty) = result.expr_types.get(&base) else {
        return Vec::new();
    };
    let scope = match base_ty {
        TypeInfo::Class(class) => Some(class.scope),
        TypeInfo::Module(module) => Some(module.scope),
        _ => None,
    };
    match scope {
        Some(scope) => scope_members(result, scope, methods_only),
        // A map with a known value type has no named members to offer;
        // everything else (including Unknown) completes to nothing.
        None => Vec::new(),
    }
}

fn scope_members(result: &AnalysisResult, scope: ScopeId, methods_only: bool) -> Vec<CompletionItem> {
    result
        .symbols
        .symbols_in(scope)
        .filter(|(_, s)| {
            !methods_only || matches!(s.kind, SymbolKind::Function | SymbolKind::BuiltinFunction)
        })
        .map(|(_, s)| CompletionItem::from_symbol(s))
        .collect()
}
