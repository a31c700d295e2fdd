//! Server state and request dispatch.
//!
//! Lifecycle gating per the protocol: requests before `initialize` get
//! `-32002`, anything but `exit` after `shutdown` gets `-32600`, unknown
//! request methods get `-32601`, unknown notifications are ignored.
//! Queries register a [`CancelToken`] keyed by request id; a
//! `$/cancelRequest` that lands before or during the query turns the
//! response into `-32800`.

use crate::cancellation::CancellationRegistry;
use crate::convert::{DidChangeParams, DidCloseParams, DidOpenParams, publish_diagnostics_params};
use crate::features;
use lang_lsp_protocol::{
    self as protocol, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId, error_codes,
    server_capabilities,
};
use lang_workspace::{Workspace, WorkspaceConfig};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Uninitialized,
    Initialized,
    ShutDown,
}

/// Everything one message produced: at most one response, any number of
/// notifications, and possibly a process exit code.
#[derive(Debug, Default)]
pub struct HandleOutcome {
    pub response: Option<JsonRpcResponse>,
    pub notifications: Vec<(String, Value)>,
    pub exit_code: Option<i32>,
}

impl HandleOutcome {
    fn respond(response: JsonRpcResponse) -> Self {
        HandleOutcome { response: Some(response), ..Default::default() }
    }

    fn ignore() -> Self {
        HandleOutcome::default()
    }

    fn exit(code: i32) -> Self {
        HandleOutcome { exit_code: Some(code), ..Default::default() }
    }
}

/// The dispatcher. Owns the workspace and the cancellation registry;
/// transport loops feed it one request at a time.
pub struct ServerState {
    workspace: Arc<Workspace>,
    cancellations: Arc<CancellationRegistry>,
    phase: Phase,
}

impl ServerState {
    pub fn new() -> Self {
        ServerState {
            workspace: Arc::new(Workspace::new()),
            cancellations: Arc::new(CancellationRegistry::new()),
            phase: Phase::Uninitialized,
        }
    }

    /// The owned workspace, for tests and embedding.
    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    /// The cancellation registry; the transport thread cancels through
    /// a clone of this while a query runs on the dispatch thread.
    pub fn cancellations(&self) -> &Arc<CancellationRegistry> {
        &self.cancellations
    }

    /// Handle one message.
    pub fn handle(&mut self, request: JsonRpcRequest) -> HandleOutcome {
        match self.phase {
            Phase::Uninitialized => self.handle_uninitialized(request),
            Phase::Initialized => self.handle_initialized(request),
            Phase::ShutDown => self.handle_shut_down(request),
        }
    }

    fn handle_uninitialized(&mut self, request: JsonRpcRequest) -> HandleOutcome {
        match request.method.as_str() {
            protocol::INITIALIZE => {
                self.configure_from_initialize(request.params.as_ref());
                self.phase = Phase::Initialized;
                HandleOutcome::respond(JsonRpcResponse::success(
                    request.id,
                    json!({
                        "capabilities": server_capabilities(),
                        "serverInfo": {
                            "name": "lang-lsp",
                            "version": env!("CARGO_PKG_VERSION"),
                        },
                    }),
                ))
            }
            protocol::EXIT => HandleOutcome::exit(1),
            _ if !request.is_notification() => HandleOutcome::respond(JsonRpcResponse::error(
                request.id,
                JsonRpcError::new(error_codes::SERVER_NOT_INITIALIZED, "server not initialized"),
            )),
            _ => HandleOutcome::ignore(),
        }
    }

    fn handle_shut_down(&mut self, request: JsonRpcRequest) -> HandleOutcome {
        match request.method.as_str() {
            protocol::EXIT => HandleOutcome::exit(0),
            _ if !request.is_notification() => HandleOutcome::respond(JsonRpcResponse::error(
                request.id,
                JsonRpcError::new(error_codes::INVALID_REQUEST, "server is shutting down"),
            )),
            _ => HandleOutcome::ignore(),
        }
    }

    fn handle_initialized(&mut self, request: JsonRpcRequest) -> HandleOutcome {
        match request.method.as_str() {
            protocol::INITIALIZED => HandleOutcome::ignore(),
            protocol::CANCEL_REQUEST => {
                // Normally intercepted on the transport thread; handled
                // here too so direct dispatch behaves the same.
                self.cancellations.cancel_params(request.params.as_ref());
                HandleOutcome::ignore()
            }
            protocol::INITIALIZE => HandleOutcome::respond(JsonRpcResponse::error(
                request.id,
                JsonRpcError::new(error_codes::INVALID_REQUEST, "server is already initialized"),
            )),
            protocol::SHUTDOWN => {
                self.phase = Phase::ShutDown;
                HandleOutcome::respond(JsonRpcResponse::null(request.id))
            }
            protocol::EXIT => HandleOutcome::exit(1),
            protocol::DID_OPEN => self.did_open(request.params),
            protocol::DID_CHANGE => self.did_change(request.params),
            protocol::DID_CLOSE => self.did_close(request.params),
            protocol::COMPLETION
            | protocol::HOVER
            | protocol::DEFINITION
            | protocol::REFERENCES
            | protocol::SIGNATURE_HELP => self.dispatch_query(request),
            _ if !request.is_notification() => HandleOutcome::respond(JsonRpcResponse::error(
                request.id,
                JsonRpcError::new(
                    error_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {}", request.method),
                ),
            )),
            _ => HandleOutcome::ignore(),
        }
    }

    /// Run one position query under its cancellation token. The token is
    /// checked before and after the query so a cancel arriving at any
    /// point yields `-32800` instead of a result.
    fn dispatch_query(&mut self, request: JsonRpcRequest) -> HandleOutcome {
        let id = request.id.clone();
        let token = self.cancellations.register(id.as_ref());
        let outcome = if token.is_cancelled() {
            HandleOutcome::respond(cancelled_response(id.clone()))
        } else {
            let mut outcome = features::handle_query(&self.workspace, request, &token);
            if token.is_cancelled() {
                outcome.response = Some(cancelled_response(id.clone()));
            }
            outcome
        };
        self.cancellations.complete(id.as_ref());
        outcome
    }

    // ===== Lifecycle =====

    fn configure_from_initialize(&self, params: Option<&Value>) {
        let mut config = WorkspaceConfig::default();
        if let Some(params) = params {
            let root_uri = params.get("rootUri").and_then(Value::as_str);
            config.root_path = match root_uri {
                Some(uri) => lang_uri::uri_to_path(uri).ok(),
                None => params.get("rootPath").and_then(Value::as_str).map(PathBuf::from),
            };
            if let Some(includes) = params
                .get("initializationOptions")
                .and_then(|o| o.get("includePaths"))
                .and_then(Value::as_array)
            {
                config.include_paths =
                    includes.iter().filter_map(Value::as_str).map(PathBuf::from).collect();
            }
        }
        tracing::info!(root = ?config.root_path, includes = config.include_paths.len(), "workspace configured");
        self.workspace.configure(config);
    }

    // ===== Text synchronization =====

    fn did_open(&self, params: Option<Value>) -> HandleOutcome {
        let Some(params) = parse_params::<DidOpenParams>(params) else {
            return HandleOutcome::ignore();
        };
        if !lang_uri::is_file_uri(&params.text_document.uri) {
            tracing::warn!(uri = %params.text_document.uri, "ignoring non-file document");
            return HandleOutcome::ignore();
        }
        self.workspace.open_document(
            &params.text_document.uri,
            params.text_document.text,
            params.text_document.version,
        );
        self.publish_outcome()
    }

    fn did_change(&self, params: Option<Value>) -> HandleOutcome {
        let Some(params) = parse_params::<DidChangeParams>(params) else {
            return HandleOutcome::ignore();
        };
        // Full sync only: the last change carries the complete text.
        let Some(change) = params.content_changes.into_iter().last() else {
            return HandleOutcome::ignore();
        };
        let applied = self.workspace.change_document(
            &params.text_document.uri,
            change.text,
            params.text_document.version,
        );
        if applied.is_none() {
            // Stale version; nothing new to publish.
            return HandleOutcome::ignore();
        }
        self.publish_outcome()
    }

    fn did_close(&self, params: Option<Value>) -> HandleOutcome {
        let Some(params) = parse_params::<DidCloseParams>(params) else {
            return HandleOutcome::ignore();
        };
        self.workspace.close_document(&params.text_document.uri);
        // An empty publish clears the problems list for the closed file.
        let mut outcome = HandleOutcome::ignore();
        outcome.notifications.push((
            protocol::PUBLISH_DIAGNOSTICS.to_string(),
            json!({ "uri": params.text_document.uri, "diagnostics": [] }),
        ));
        outcome
    }

    /// Collect publishDiagnostics notifications for everything analyzed
    /// by the triggering sync message.
    fn publish_outcome(&self) -> HandleOutcome {
        let mut outcome = HandleOutcome::ignore();
        for result in self.workspace.drain_fresh_results() {
            outcome
                .notifications
                .push((protocol::PUBLISH_DIAGNOSTICS.to_string(), publish_diagnostics_params(&result)));
        }
        outcome
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}

fn cancelled_response(id: Option<RequestId>) -> JsonRpcResponse {
    JsonRpcResponse::error(
        id,
        JsonRpcError::new(error_codes::REQUEST_CANCELLED, "request cancelled"),
    )
}

pub(crate) fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Option<T> {
    let params = params?;
    match serde_json::from_value(params) {
        Ok(parsed) => Some(parsed),
        Err(error) => {
            tracing::warn!(%error, "malformed params");
            None
        }
    }
}
