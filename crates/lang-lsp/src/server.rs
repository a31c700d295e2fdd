//! The server run loop.
//!
//! The transport thread reads frames and the worker thread dispatches
//! them, per the transport/analysis thread split. `$/cancelRequest` is
//! intercepted on the transport thread and flips the registered token,
//! so it can reach a query the worker is still running. Responses from
//! both threads serialize through a shared writer lock.

use crate::state::ServerState;
use crate::transport::{ReadOutcome, read_message, write_message, write_notification};
use lang_lsp_protocol::{
    self as protocol, JsonRpcError, JsonRpcRequest, JsonRpcResponse, error_codes,
};
use parking_lot::Mutex;
use std::io::{self, BufRead, Write};
use std::sync::mpsc;

/// The Lang language server. Reads framed JSON-RPC from a reader,
/// dispatches through [`ServerState`], and writes framed responses.
pub struct LspServer {
    state: ServerState,
}

impl LspServer {
    pub fn new() -> Self {
        LspServer { state: ServerState::new() }
    }

    /// Run over stdio until `exit` or EOF; returns the process exit
    /// code (0 after a clean `shutdown`/`exit`, 1 otherwise).
    pub fn run(&mut self) -> io::Result<i32> {
        let stdin = io::stdin();
        let mut reader = stdin.lock();
        let mut writer = io::stdout();
        self.run_with(&mut reader, &mut writer)
    }

    /// Run over arbitrary reader/writer pairs; used by the integration
    /// tests to drive the server in memory.
    pub fn run_with<R: BufRead, W: Write + Send>(
        &mut self,
        reader: &mut R,
        writer: &mut W,
    ) -> io::Result<i32> {
        let cancellations = self.state.cancellations().clone();
        let state = &mut self.state;
        let writer = Mutex::new(writer);
        let writer = &writer;

        std::thread::scope(|scope| {
            let (tx, rx) = mpsc::channel::<JsonRpcRequest>();
            let worker = scope.spawn(move || -> io::Result<Option<i32>> {
                while let Ok(request) = rx.recv() {
                    let outcome = state.handle(request);
                    let mut guard = writer.lock();
                    if let Some(response) = outcome.response {
                        write_message(&mut **guard, &response)?;
                    }
                    for (method, params) in outcome.notifications {
                        write_notification(&mut **guard, &method, params)?;
                    }
                    if let Some(code) = outcome.exit_code {
                        return Ok(Some(code));
                    }
                }
                Ok(None)
            });

            loop {
                match read_message(reader)? {
                    ReadOutcome::Eof => {
                        tracing::info!("client closed the stream");
                        break;
                    }
                    ReadOutcome::Invalid(message) => {
                        let mut guard = writer.lock();
                        write_message(
                            &mut **guard,
                            &JsonRpcResponse::error(
                                None,
                                JsonRpcError::new(error_codes::PARSE_ERROR, message),
                            ),
                        )?;
                    }
                    ReadOutcome::Message(request) => {
                        // Cancellation short-circuits here so it can
                        // reach a query already running on the worker;
                        // everything else keeps its arrival order.
                        if request.method == protocol::CANCEL_REQUEST {
                            cancellations.cancel_params(request.params.as_ref());
                            continue;
                        }
                        let is_exit = request.method == protocol::EXIT;
                        if tx.send(request).is_err() {
                            break;
                        }
                        if is_exit {
                            break;
                        }
                    }
                }
            }
            drop(tx);
            match worker.join() {
                Ok(result) => result.map(|code| code.unwrap_or(1)),
                Err(_) => Ok(1),
            }
        })
    }
}

impl Default for LspServer {
    fn default() -> Self {
        Self::new()
    }
}
