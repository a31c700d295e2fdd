//! Query handlers: completion, hover, definition, references, and
//! signature help, answered from cached analysis through the position
//! services. Each query carries its request's [`CancelToken`], which the
//! workspace polls at analysis boundaries.

use crate::convert::{TextDocumentPositionParams, offset_of, range_of};
use crate::state::{HandleOutcome, parse_params};
use lang_lsp_completion::{
    CompletionContext, classify_completion_context, completion_items, hover, signature_help,
};
use lang_lsp_navigation::{find_references, goto_definition, symbol_at, symbol_identity};
use lang_lsp_protocol::{
    self as protocol, JsonRpcError, JsonRpcRequest, JsonRpcResponse, WireLocation, error_codes,
    utf16_range,
};
use lang_semantic_analyzer::{AnalysisResult, CancelToken, ModuleResolver};
use lang_workspace::Workspace;
use serde_json::{Value, json};
use std::sync::Arc;

/// Dispatch one position query. Every query resolves its document
/// through the workspace first, so it always observes the freshest
/// published analysis.
pub fn handle_query(
    workspace: &Arc<Workspace>,
    request: JsonRpcRequest,
    cancel: &CancelToken,
) -> HandleOutcome {
    let id = request.id.clone();
    let Some(params) = parse_params::<TextDocumentPositionParams>(request.params.clone()) else {
        return HandleOutcome {
            response: Some(JsonRpcResponse::error(
                id,
                JsonRpcError::new(error_codes::INVALID_PARAMS, "expected text document position"),
            )),
            ..Default::default()
        };
    };
    if !lang_uri::is_file_uri(&params.text_document.uri) {
        return HandleOutcome {
            response: Some(JsonRpcResponse::error(
                id,
                JsonRpcError::new(
                    error_codes::INVALID_PARAMS,
                    "only file:// documents are supported",
                ),
            )),
            ..Default::default()
        };
    }
    let Some(result) = workspace.analysis_with_cancel(&params.text_document.uri, cancel) else {
        // Unknown document: every query answers null rather than erroring.
        return HandleOutcome {
            response: Some(JsonRpcResponse::null(id)),
            ..Default::default()
        };
    };
    let offset = offset_of(&result, params.position);

    let value = match request.method.as_str() {
        protocol::COMPLETION => completion(workspace, &result, offset),
        protocol::HOVER => hover_value(&result, offset),
        protocol::DEFINITION => definition(workspace, &result, offset, cancel),
        protocol::REFERENCES => references(workspace, &result, offset, &request, cancel),
        protocol::SIGNATURE_HELP => signature(&result, offset),
        _ => Value::Null,
    };
    HandleOutcome {
        response: Some(JsonRpcResponse::success(id, value)),
        ..Default::default()
    }
}

fn completion(workspace: &Arc<Workspace>, result: &AnalysisResult, offset: usize) -> Value {
    let context = classify_completion_context(result, offset);
    let candidates = if context == CompletionContext::Import {
        workspace.import_candidates(&result.uri)
    } else {
        Vec::new()
    };
    let items = completion_items(result, &context, offset, &candidates);
    json!({ "isIncomplete": false, "items": items })
}

fn hover_value(result: &AnalysisResult, offset: usize) -> Value {
    match hover(result, offset) {
        Some(info) => {
            let payload = lsp_types::Hover {
                contents: lsp_types::HoverContents::Markup(lsp_types::MarkupContent {
                    kind: lsp_types::MarkupKind::Markdown,
                    value: info.contents,
                }),
                range: Some(range_of(result, info.span)),
            };
            serde_json::to_value(payload).unwrap_or(Value::Null)
        }
        None => Value::Null,
    }
}

fn definition(
    workspace: &Arc<Workspace>,
    result: &AnalysisResult,
    offset: usize,
    cancel: &CancelToken,
) -> Value {
    let Some(location) = goto_definition(result, offset) else {
        return Value::Null;
    };
    // Render the range against the defining file's own text.
    let range = if location.uri == result.uri {
        utf16_range(&result.text, &result.line_table, location.span)
    } else {
        match workspace.analysis_with_cancel(&location.uri, cancel) {
            Some(target) => utf16_range(&target.text, &target.line_table, location.span),
            None => return Value::Null,
        }
    };
    match (WireLocation { uri: location.uri, range }).to_lsp() {
        Some(location) => serde_json::to_value(location).unwrap_or(Value::Null),
        None => Value::Null,
    }
}

fn references(
    workspace: &Arc<Workspace>,
    result: &AnalysisResult,
    offset: usize,
    request: &JsonRpcRequest,
    cancel: &CancelToken,
) -> Value {
    let include_declaration = request
        .params
        .as_ref()
        .and_then(|p| p.get("context"))
        .and_then(|c| c.get("includeDeclaration"))
        .and_then(Value::as_bool)
        .unwrap_or(true);

    // Candidate files: the defining file plus everything that imports
    // it, transitively.
    let Some(target) = symbol_at(result, offset) else {
        return json!([]);
    };
    let Some((defining_uri, _)) = symbol_identity(result, target) else {
        return json!([]);
    };
    let mut uris = vec![result.uri.clone(), defining_uri.clone()];
    uris.extend(workspace.dependents_of(&defining_uri));
    uris.sort();
    uris.dedup();
    let mut candidates: Vec<Arc<AnalysisResult>> = Vec::new();
    for uri in uris {
        if let Some(analysis) = workspace.analysis_with_cancel(&uri, cancel) {
            candidates.push(analysis);
        }
    }
    let candidate_refs: Vec<&AnalysisResult> = candidates.iter().map(Arc::as_ref).collect();
    let locations = find_references(result, offset, &candidate_refs, include_declaration);

    let rendered: Vec<lsp_types::Location> = locations
        .into_iter()
        .filter_map(|location| {
            let owner = candidate_refs.iter().find(|r| r.uri == location.uri)?;
            let range = utf16_range(&owner.text, &owner.line_table, location.span);
            WireLocation { uri: location.uri, range }.to_lsp()
        })
        .collect();
    serde_json::to_value(rendered).unwrap_or_else(|_| json!([]))
}

fn signature(result: &AnalysisResult, offset: usize) -> Value {
    match signature_help(result, offset) {
        Some(help) => {
            let payload = lsp_types::SignatureHelp {
                signatures: vec![lsp_types::SignatureInformation {
                    label: help.label,
                    documentation: None,
                    parameters: Some(
                        help.parameters
                            .iter()
                            .map(|p| lsp_types::ParameterInformation {
                                label: lsp_types::ParameterLabel::Simple(p.clone()),
                                documentation: None,
                            })
                            .collect(),
                    ),
                    active_parameter: None,
                }],
                active_signature: Some(0),
                active_parameter: Some(help.active_parameter as u32),
            };
            serde_json::to_value(payload).unwrap_or(Value::Null)
        }
        None => Value::Null,
    }
}
