//! Request cancellation registry.
//!
//! Maps in-flight request ids to the [`CancelToken`]s the analysis
//! layer polls. The transport thread cancels through this registry
//! while the worker thread is still running the query; a
//! `$/cancelRequest` that races ahead of its request pre-registers a
//! cancelled token, so the request is answered `-32800` the moment it
//! is dispatched.

use lang_lsp_protocol::RequestId;
use lang_semantic_analyzer::CancelToken;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct CancellationRegistry {
    entries: Mutex<HashMap<String, CancelToken>>,
}

impl CancellationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The token for a request being dispatched. Requests without an id
    /// (notifications) get a fresh untracked token.
    pub fn register(&self, id: Option<&RequestId>) -> CancelToken {
        match id {
            Some(id) => self.entries.lock().entry(id.key()).or_default().clone(),
            None => CancelToken::new(),
        }
    }

    /// Cancel the request with this id, pre-registering a cancelled
    /// token when the request has not been dispatched yet.
    pub fn cancel(&self, id: &RequestId) {
        self.entries.lock().entry(id.key()).or_default().cancel();
    }

    /// Cancel from `$/cancelRequest` params (`{ "id": … }`).
    pub fn cancel_params(&self, params: Option<&serde_json::Value>) {
        if let Some(id) = params.and_then(|p| p.get("id")) {
            tracing::debug!(%id, "cancel requested");
            self.cancel(&RequestId::from_value(id.clone()));
        }
    }

    /// Drop the entry once the response is on the wire.
    pub fn complete(&self, id: Option<&RequestId>) {
        if let Some(id) = id {
            self.entries.lock().remove(&id.key());
        }
    }
}
