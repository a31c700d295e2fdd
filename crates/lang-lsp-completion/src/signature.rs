//! Signature help for argument positions.

use crate::context::{CompletionContext, classify_completion_context};
use lang_semantic_analyzer::AnalysisResult;
use lang_symbol_types::TypeInfo;

/// Signature-help payload for the LSP façade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHelp {
    /// Rendered signature, e.g. `add(a: int, b: int): int`
    pub label: String,
    /// One rendered entry per parameter
    pub parameters: Vec<String>,
    /// Index of the parameter under the cursor
    pub active_parameter: usize,
}

/// Signature help at `offset`: the callee's signature with the active
/// parameter index, when the cursor is in a call's argument region.
pub fn signature_help(result: &AnalysisResult, offset: usize) -> Option<SignatureHelp> {
    let CompletionContext::Argument { callee, index } =
        classify_completion_context(result, offset)
    else {
        return None;
    };
    let callee_ty = result.expr_types.get(&callee)?;
    let TypeInfo::Function(signature) = callee_ty else {
        return None;
    };

    let callee_name = result
        .node_symbol_map
        .get(&callee)
        .and_then(|&id| result.symbols.symbol(id))
        .map(|s| s.name.clone())
        .unwrap_or_default();

    let parameters: Vec<String> =
        signature.params.iter().map(|(name, ty)| format!("{name}: {ty}")).collect();
    let rendered_return = match signature.single_return() {
        Some(ty) => format!(": {ty}"),
        None => String::new(),
    };
    Some(SignatureHelp {
        label: format!("{callee_name}({}){rendered_return}", parameters.join(", ")),
        active_parameter: index.min(parameters.len().saturating_sub(1)),
        parameters,
    })
}
