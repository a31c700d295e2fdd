//! Content-Length framing over arbitrary reader/writer pairs.
//!
//! One message per `Content-Length: N\r\n\r\n<N bytes>` frame. Unknown
//! headers are ignored; invalid UTF-8 in the payload is replaced so a
//! parseable message still goes through.

use lang_lsp_protocol::{JsonRpcRequest, JsonRpcResponse};
use std::io::{self, BufRead, Write};

/// Result of reading one frame.
#[derive(Debug)]
pub enum ReadOutcome {
    /// Clean end of input
    Eof,
    /// A frame arrived but its payload was not valid JSON-RPC
    Invalid(String),
    /// A parsed message
    Message(JsonRpcRequest),
}

/// Read one framed message. `Err` only on I/O failure.
pub fn read_message<R: BufRead>(reader: &mut R) -> io::Result<ReadOutcome> {
    let mut content_length: Option<usize> = None;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            // Only Content-Length matters; any other header is ignored.
            if key.trim().eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse::<usize>().ok();
            }
        }
    }

    let Some(length) = content_length else {
        return Ok(ReadOutcome::Invalid("missing Content-Length header".to_string()));
    };

    let mut body = vec![0u8; length];
    if let Err(error) = reader.read_exact(&mut body) {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            return Ok(ReadOutcome::Eof);
        }
        return Err(error);
    }

    // Replace invalid UTF-8; the message is still processed if the
    // replacement result parses as JSON.
    let text = String::from_utf8_lossy(&body);
    match serde_json::from_str::<JsonRpcRequest>(&text) {
        Ok(message) => Ok(ReadOutcome::Message(message)),
        Err(error) => {
            tracing::warn!(%error, len = length, "dropping malformed frame");
            Ok(ReadOutcome::Invalid(format!("invalid JSON payload: {error}")))
        }
    }
}

/// Write one framed response.
pub fn write_message<W: Write>(writer: &mut W, response: &JsonRpcResponse) -> io::Result<()> {
    let content = serde_json::to_string(response).map_err(io::Error::other)?;
    write!(writer, "Content-Length: {}\r\n\r\n{}", content.len(), content)?;
    writer.flush()
}

/// Write one framed notification.
pub fn write_notification<W: Write>(
    writer: &mut W,
    method: &str,
    params: serde_json::Value,
) -> io::Result<()> {
    let notification = serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
    });
    let content = serde_json::to_string(&notification).map_err(io::Error::other)?;
    write!(writer, "Content-Length: {}\r\n\r\n{}", content.len(), content)?;
    writer.flush()
}
