//! The Lang LSP server runtime.
//!
//! A stateless translation layer between the JSON-RPC wire and the core
//! engine: [`transport`] frames messages, [`state`] gates the lifecycle
//! and dispatches, [`features`] answers queries through the position
//! services, [`convert`] reshapes byte spans into the 0-based UTF-16
//! positions the wire requires, and [`cancellation`] keys in-flight
//! requests so `$/cancelRequest` can reach them from the transport
//! thread.

mod cancellation;
mod convert;
mod features;
mod server;
mod state;
mod transport;

pub use cancellation::CancellationRegistry;
pub use server::LspServer;
pub use state::{HandleOutcome, ServerState};

/// Run the server over stdio; returns the process exit code.
pub fn run_stdio() -> std::io::Result<i32> {
    let mut server = LspServer::new();
    server.run()
}
