//! Lifecycle gating and wire behavior.

use lang_lsp::{LspServer, ServerState};
use lang_lsp_protocol::JsonRpcRequest;
use serde_json::{Value, json};

fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
    serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    }))
    .unwrap()
}

fn notification(method: &str, params: Value) -> JsonRpcRequest {
    serde_json::from_value(json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
    }))
    .unwrap()
}

#[test]
fn requests_before_initialize_get_not_initialized() {
    let mut state = ServerState::new();
    let outcome = state.handle(request(1, "textDocument/hover", json!({})));
    let error = outcome.response.unwrap().error.unwrap();
    assert_eq!(error.code, -32002);
}

#[test]
fn notifications_before_initialize_are_ignored() {
    let mut state = ServerState::new();
    let outcome = state.handle(notification("textDocument/didOpen", json!({})));
    assert!(outcome.response.is_none());
    assert!(outcome.exit_code.is_none());
}

#[test]
fn initialize_advertises_capabilities() {
    let mut state = ServerState::new();
    let outcome = state.handle(request(1, "initialize", json!({})));
    let response = outcome.response.unwrap();
    let result = response.result.unwrap();
    let caps = &result["capabilities"];
    assert_eq!(caps["textDocumentSync"], 1);
    assert_eq!(caps["hoverProvider"], true);
    assert_eq!(caps["definitionProvider"], true);
    assert_eq!(caps["completionProvider"]["triggerCharacters"], json!([".", ":"]));
}

#[test]
fn unknown_request_is_method_not_found() {
    let mut state = ServerState::new();
    state.handle(request(1, "initialize", json!({})));
    let outcome = state.handle(request(2, "textDocument/rename", json!({})));
    let error = outcome.response.unwrap().error.unwrap();
    assert_eq!(error.code, -32601);
    assert!(error.message.contains("textDocument/rename"));
}

#[test]
fn unknown_notification_is_ignored() {
    let mut state = ServerState::new();
    state.handle(request(1, "initialize", json!({})));
    let outcome = state.handle(notification("workspace/didChangeConfiguration", json!({})));
    assert!(outcome.response.is_none());
}

#[test]
fn shutdown_then_request_is_invalid() {
    let mut state = ServerState::new();
    state.handle(request(1, "initialize", json!({})));
    let shutdown = state.handle(request(2, "shutdown", json!(null)));
    assert_eq!(shutdown.response.unwrap().result, Some(Value::Null));
    let outcome = state.handle(request(3, "textDocument/hover", json!({})));
    assert_eq!(outcome.response.unwrap().error.unwrap().code, -32600);
}

#[test]
fn clean_shutdown_exits_zero() {
    let mut state = ServerState::new();
    state.handle(request(1, "initialize", json!({})));
    state.handle(request(2, "shutdown", json!(null)));
    let outcome = state.handle(notification("exit", json!(null)));
    assert_eq!(outcome.exit_code, Some(0));
}

#[test]
fn exit_without_shutdown_exits_one() {
    let mut state = ServerState::new();
    state.handle(request(1, "initialize", json!({})));
    let outcome = state.handle(notification("exit", json!(null)));
    assert_eq!(outcome.exit_code, Some(1));
}

#[test]
fn non_file_uri_query_is_rejected() {
    let mut state = ServerState::new();
    state.handle(request(1, "initialize", json!({})));
    let outcome = state.handle(request(
        2,
        "textDocument/hover",
        json!({
            "textDocument": { "uri": "untitled:Untitled-1" },
            "position": { "line": 0, "character": 0 },
        }),
    ));
    assert_eq!(outcome.response.unwrap().error.unwrap().code, -32602);
}

#[test]
fn cancelled_request_answers_request_cancelled() {
    let mut state = ServerState::new();
    state.handle(request(1, "initialize", json!({})));
    // The cancel races ahead of its request; the registry remembers it.
    state.handle(notification("$/cancelRequest", json!({ "id": 7 })));
    let outcome = state.handle(request(
        7,
        "textDocument/hover",
        json!({
            "textDocument": { "uri": "file:///mem/a.lang" },
            "position": { "line": 0, "character": 0 },
        }),
    ));
    assert_eq!(outcome.response.unwrap().error.unwrap().code, -32800);
}

#[test]
fn completed_request_ids_are_reusable() {
    let mut state = ServerState::new();
    state.handle(request(1, "initialize", json!({})));
    state.handle(notification("$/cancelRequest", json!({ "id": 9 })));
    let params = json!({
        "textDocument": { "uri": "file:///mem/missing.lang" },
        "position": { "line": 0, "character": 0 },
    });
    let cancelled = state.handle(request(9, "textDocument/hover", params.clone()));
    assert_eq!(cancelled.response.unwrap().error.unwrap().code, -32800);
    // The token was dropped with the response; a later request under
    // the same id runs normally (null: the document is unknown).
    let fresh = state.handle(request(9, "textDocument/hover", params));
    let response = fresh.response.unwrap();
    assert!(response.error.is_none());
    assert_eq!(response.result, Some(Value::Null));
}

#[test]
fn cancel_for_string_id_does_not_hit_number_id() {
    let mut state = ServerState::new();
    state.handle(request(1, "initialize", json!({})));
    state.handle(notification("$/cancelRequest", json!({ "id": "2" })));
    let outcome = state.handle(request(
        2,
        "textDocument/hover",
        json!({
            "textDocument": { "uri": "file:///mem/missing.lang" },
            "position": { "line": 0, "character": 0 },
        }),
    ));
    // The number id 2 was never cancelled; the query runs.
    assert!(outcome.response.unwrap().error.is_none());
}

#[test]
fn transport_thread_cancels_pending_requests() {
    let bodies = [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#.to_string(),
        r#"{"jsonrpc":"2.0","method":"$/cancelRequest","params":{"id":2}}"#.to_string(),
        r#"{"jsonrpc":"2.0","id":2,"method":"textDocument/hover","params":{"textDocument":{"uri":"file:///mem/a.lang"},"position":{"line":0,"character":0}}}"#
            .to_string(),
        r#"{"jsonrpc":"2.0","id":3,"method":"shutdown"}"#.to_string(),
        r#"{"jsonrpc":"2.0","method":"exit"}"#.to_string(),
    ];
    let mut input = Vec::new();
    for body in bodies {
        input.extend_from_slice(format!("Content-Length: {}\r\n\r\n{}", body.len(), body).as_bytes());
    }
    let mut reader = std::io::BufReader::new(input.as_slice());
    let mut output = Vec::new();
    let code = LspServer::new().run_with(&mut reader, &mut output).unwrap();
    assert_eq!(code, 0);
    // The cancel is intercepted on the transport thread before the
    // query is dispatched, so request 2 answers RequestCancelled.
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("-32800"), "{text}");
}

#[test]
fn stdio_loop_round_trips_a_session() {
    let mut input = Vec::new();
    for body in [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#.to_string(),
        r#"{"jsonrpc":"2.0","method":"initialized","params":{}}"#.to_string(),
        r#"{"jsonrpc":"2.0","id":2,"method":"shutdown"}"#.to_string(),
        r#"{"jsonrpc":"2.0","method":"exit"}"#.to_string(),
    ] {
        input.extend_from_slice(format!("Content-Length: {}\r\n\r\n{}", body.len(), body).as_bytes());
    }
    let mut reader = std::io::BufReader::new(input.as_slice());
    let mut output = Vec::new();
    let code = LspServer::new().run_with(&mut reader, &mut output).unwrap();
    assert_eq!(code, 0);
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("\"capabilities\""));
    assert!(text.contains("lang-lsp"));
}

#[test]
fn eof_without_exit_returns_one() {
    let mut reader = std::io::BufReader::new(&b""[..]);
    let mut output = Vec::new();
    let code = LspServer::new().run_with(&mut reader, &mut output).unwrap();
    assert_eq!(code, 1);
}
