//! JSON-RPC 2.0 message types and LSP protocol constants.

mod capabilities;
mod jsonrpc;
mod methods;
mod wire;

pub use capabilities::server_capabilities;
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use methods::*;
pub use wire::{
    WireDiagnostic, WireLocation, WirePosition, WireRange, utf16_range,
};

/// Standard JSON-RPC and LSP error codes.
pub mod error_codes {
    /// Invalid JSON was received
    pub const PARSE_ERROR: i32 = -32700;
    /// The JSON is not a valid request object (also: requests after
    /// `shutdown`)
    pub const INVALID_REQUEST: i32 = -32600;
    /// Method does not exist
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid method parameters
    pub const INVALID_PARAMS: i32 = -32602;
    /// Request arrived before `initialize`
    pub const SERVER_NOT_INITIALIZED: i32 = -32002;
    /// The request was cancelled by the client
    pub const REQUEST_CANCELLED: i32 = -32800;
}
