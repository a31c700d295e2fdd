//! End-to-end editor scenarios against the dispatch layer.

use lang_lsp::ServerState;
use lang_lsp_protocol::JsonRpcRequest;
use lang_uri::path_to_uri;
use serde_json::{Value, json};
use std::path::Path;

fn request(id: i64, method: &str, params: Value) -> JsonRpcRequest {
    serde_json::from_value(json!({ "jsonrpc": "2.0", "id": id, "method": method, "params": params }))
        .unwrap()
}

fn notification(method: &str, params: Value) -> JsonRpcRequest {
    serde_json::from_value(json!({ "jsonrpc": "2.0", "method": method, "params": params })).unwrap()
}

fn initialized_state(root: Option<&Path>) -> ServerState {
    let mut state = ServerState::new();
    let params = match root {
        Some(root) => json!({ "rootUri": path_to_uri(root).unwrap() }),
        None => json!({}),
    };
    state.handle(request(1, "initialize", params));
    state
}

fn open(state: &mut ServerState, uri: &str, text: &str) -> Vec<(String, Value)> {
    let outcome = state.handle(notification(
        "textDocument/didOpen",
        json!({
            "textDocument": { "uri": uri, "languageId": "lang", "version": 1, "text": text },
        }),
    ));
    outcome.notifications
}

fn position_params(uri: &str, line: u32, character: u32) -> Value {
    json!({
        "textDocument": { "uri": uri },
        "position": { "line": line, "character": character },
    })
}

#[test]
fn hover_on_local_variable() {
    let mut state = initialized_state(None);
    let uri = "file:///mem/a.lang";
    open(&mut state, uri, "int x = 42; x;");
    // Hover over the second `x` (offset 12).
    let outcome = state.handle(request(2, "textDocument/hover", position_params(uri, 0, 12)));
    let result = outcome.response.unwrap().result.unwrap();
    let contents = result["contents"]["value"].as_str().unwrap();
    assert!(contents.contains("x : int"), "{contents}");
    assert!(contents.contains("(variable)"), "{contents}");
}

#[test]
fn definition_across_import() {
    let dir = tempfile::tempdir().unwrap();
    let util_text = "export int add(int a, int b) { return a + b; }";
    std::fs::write(dir.path().join("util.lang"), util_text).unwrap();
    let main_text = "import { add } from \"./util\"; add(1, 2);";
    let main_path = dir.path().join("main.lang");
    std::fs::write(&main_path, main_text).unwrap();

    let mut state = initialized_state(Some(dir.path()));
    let main_uri = path_to_uri(&main_path).unwrap();
    open(&mut state, &main_uri, main_text);

    // Definition on the `add` call site.
    let call_character = main_text.find("add(1").unwrap() as u32;
    let outcome = state.handle(request(
        2,
        "textDocument/definition",
        position_params(&main_uri, 0, call_character),
    ));
    let result = outcome.response.unwrap().result.unwrap();
    let target_uri = result["uri"].as_str().unwrap();
    assert!(target_uri.ends_with("util.lang"), "{target_uri}");
    // The range covers `add` in the declaration.
    let start = result["range"]["start"]["character"].as_u64().unwrap() as usize;
    let end = result["range"]["end"]["character"].as_u64().unwrap() as usize;
    assert_eq!(&util_text[start..end], "add");
}

#[test]
fn type_mismatch_publishes_error_diagnostic() {
    let mut state = initialized_state(None);
    let uri = "file:///mem/a.lang";
    let text = "int x = \"hi\";";
    let notifications = open(&mut state, uri, text);
    let (method, params) = notifications
        .iter()
        .find(|(m, _)| m == "textDocument/publishDiagnostics")
        .expect("no diagnostics published");
    assert_eq!(method, "textDocument/publishDiagnostics");
    assert_eq!(params["uri"], uri);
    assert_eq!(params["version"], 1);
    let diagnostics = params["diagnostics"].as_array().unwrap();
    let error = diagnostics
        .iter()
        .find(|d| d["severity"] == 1)
        .expect("no error diagnostic");
    assert_eq!(error["message"], "type string is not assignable to int");
    assert_eq!(error["source"], "semantic");
    // Range covers the string literal `"hi"`.
    assert_eq!(error["range"]["start"]["character"], 8);
    assert_eq!(error["range"]["end"]["character"], 12);
}

#[test]
fn completion_after_incomplete_member_access() {
    let mut state = initialized_state(None);
    let uri = "file:///mem/a.lang";
    let text = "class P { int hp; } P p = new P(); p.";
    open(&mut state, uri, text);
    let outcome = state.handle(request(
        2,
        "textDocument/completion",
        position_params(uri, 0, text.len() as u32),
    ));
    let result = outcome.response.unwrap().result.unwrap();
    let items = result["items"].as_array().unwrap();
    let hp = items.iter().find(|i| i["label"] == "hp").expect("no `hp` completion");
    // CompletionItemKind 6 = Variable (field).
    assert_eq!(hp["kind"], 6);
}

#[test]
fn circular_import_does_not_hang_and_warns() {
    let dir = tempfile::tempdir().unwrap();
    let a_text = "import { b } from \"./b\"; export int a = 1;";
    let b_text = "import { a } from \"./a\"; export int b = 2;";
    let a_path = dir.path().join("a.lang");
    std::fs::write(&a_path, a_text).unwrap();
    std::fs::write(dir.path().join("b.lang"), b_text).unwrap();

    let mut state = initialized_state(Some(dir.path()));
    let a_uri = path_to_uri(&a_path).unwrap();
    let notifications = open(&mut state, &a_uri, a_text);

    // Both files were analyzed and published.
    let published: Vec<&str> = notifications
        .iter()
        .filter(|(m, _)| m == "textDocument/publishDiagnostics")
        .filter_map(|(_, p)| p["uri"].as_str())
        .collect();
    assert!(published.iter().any(|u| u.ends_with("a.lang")), "{published:?}");
    assert!(published.iter().any(|u| u.ends_with("b.lang")), "{published:?}");

    // At least one warning mentions the circular import.
    let warned = notifications.iter().any(|(_, p)| {
        p["diagnostics"].as_array().is_some_and(|ds| {
            ds.iter().any(|d| {
                d["severity"] == 2
                    && d["message"].as_str().is_some_and(|m| m.contains("circular import"))
            })
        })
    });
    assert!(warned, "{notifications:?}");
}

#[test]
fn cache_serves_new_version_immediately_after_change() {
    let mut state = initialized_state(None);
    let uri = "file:///mem/a.lang";
    open(&mut state, uri, "int x = 1;");
    state.handle(notification(
        "textDocument/didChange",
        json!({
            "textDocument": { "uri": uri, "version": 2 },
            "contentChanges": [{ "text": "string x = \"two\"; x;" }],
        }),
    ));
    let outcome = state.handle(request(2, "textDocument/hover", position_params(uri, 0, 18)));
    let result = outcome.response.unwrap().result.unwrap();
    let contents = result["contents"]["value"].as_str().unwrap();
    assert!(contents.contains("x : string"), "{contents}");
}

#[test]
fn close_clears_diagnostics() {
    let mut state = initialized_state(None);
    let uri = "file:///mem/a.lang";
    open(&mut state, uri, "int x = \"hi\";");
    let outcome = state.handle(notification(
        "textDocument/didClose",
        json!({ "textDocument": { "uri": uri } }),
    ));
    let (_, params) = outcome
        .notifications
        .iter()
        .find(|(m, _)| m == "textDocument/publishDiagnostics")
        .expect("no clearing publish");
    assert_eq!(params["diagnostics"].as_array().unwrap().len(), 0);
}

#[test]
fn signature_help_in_argument_position() {
    let mut state = initialized_state(None);
    let uri = "file:///mem/a.lang";
    let text = "int add(int a, int b) { return a + b; }\nadd(1, ";
    open(&mut state, uri, text);
    let outcome = state.handle(request(
        2,
        "textDocument/signatureHelp",
        position_params(uri, 1, 7),
    ));
    let result = outcome.response.unwrap().result.unwrap();
    assert_eq!(result["signatures"][0]["label"], "add(a: int, b: int): int");
    assert_eq!(result["activeParameter"], 1);
}

#[test]
fn references_within_a_file() {
    let mut state = initialized_state(None);
    let uri = "file:///mem/a.lang";
    let text = "int x = 1; x; x = 2;";
    open(&mut state, uri, text);
    let outcome = state.handle(request(
        2,
        "textDocument/references",
        json!({
            "textDocument": { "uri": uri },
            "position": { "line": 0, "character": 11 },
            "context": { "includeDeclaration": true },
        }),
    ));
    let result = outcome.response.unwrap().result.unwrap();
    assert_eq!(result.as_array().unwrap().len(), 3, "{result}");
}
