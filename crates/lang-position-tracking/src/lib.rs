//! Byte-oriented position tracking for the Lang LSP.
//!
//! The analysis engine works in byte offsets and 1-based line/byte-column
//! positions. Conversion to the 0-based UTF-16 positions the LSP wire
//! format requires happens only at the server boundary, using the helpers
//! in [`convert`].

mod convert;
mod line_table;
mod span;

pub use convert::{offset_to_utf16_position, utf16_position_to_offset};
pub use line_table::LineTable;
pub use span::{Position, Range, Span};
