//! Line-start table for offset ↔ position conversion.

use crate::span::{Position, Range, Span};

/// Stores the byte offset of every line start for one source text.
///
/// Built in a single O(n) scan. `position_at` answers in O(log n) via
/// binary search; `offset_at` answers in O(1). Columns are byte columns;
/// UTF-16 reshaping for LSP clients happens in [`crate::convert`].
#[derive(Debug, Clone)]
pub struct LineTable {
    /// Byte offset of each line start; always begins with 0
    line_starts: Vec<usize>,
    /// Total length of the indexed text in bytes
    text_len: usize,
}

impl LineTable {
    /// Build the table by scanning `text` once.
    ///
    /// A line starts at offset 0 and after every `\n`, `\r\n`, or lone
    /// `\r` terminator.
    pub fn new(text: &str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0];
        let mut i = 0;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => line_starts.push(i + 1),
                b'\r' => {
                    if i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
                        line_starts.push(i + 2);
                        i += 1;
                    } else {
                        line_starts.push(i + 1);
                    }
                }
                _ => {}
            }
            i += 1;
        }
        LineTable { line_starts, text_len: bytes.len() }
    }

    /// Number of lines. At least 1 even for empty text.
    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }

    /// Length of the indexed text in bytes.
    pub fn text_len(&self) -> usize {
        self.text_len
    }

    /// Convert a byte offset to a 1-based position.
    ///
    /// Offsets past the end of the text are clamped to the end. The
    /// returned column is a byte column within the line.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text_len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let column = offset - self.line_starts[line] + 1;
        Position::new(line as u32 + 1, column as u32)
    }

    /// Convert a 1-based position to a byte offset.
    ///
    /// The line is clamped to the last line; the column is clamped so the
    /// result never crosses into the next line nor past the end of text.
    pub fn offset_at(&self, position: Position) -> usize {
        if position.line == 0 {
            return 0;
        }
        let line = (position.line as usize - 1).min(self.line_starts.len() - 1);
        let line_start = self.line_starts[line];
        let hard_end = self.next_line_start(line);
        let column = position.column.max(1) as usize - 1;
        (line_start + column).min(hard_end)
    }

    /// Byte offset where the 1-based `line` starts, or `None` for lines
    /// past the end of the table.
    pub fn line_start_offset(&self, line: u32) -> Option<usize> {
        if line == 0 {
            return None;
        }
        self.line_starts.get(line as usize - 1).copied()
    }

    /// Byte offset of the end of the 1-based `line`, excluding its
    /// terminator bytes (`\r` and/or `\n`).
    ///
    /// `text` must be the same text the table was built from.
    pub fn line_end_offset(&self, line: u32, text: &str) -> usize {
        if line == 0 {
            return 0;
        }
        let line = (line as usize - 1).min(self.line_starts.len() - 1);
        let mut end = self.next_line_start(line);
        let bytes = text.as_bytes();
        while end > self.line_starts[line]
            && matches!(bytes.get(end - 1), Some(b'\n') | Some(b'\r'))
        {
            end -= 1;
        }
        end
    }

    /// Convert a byte span to a positional range.
    pub fn range_of(&self, span: Span) -> Range {
        Range::new(self.position_at(span.start), self.position_at(span.end))
    }

    fn next_line_start(&self, line: usize) -> usize {
        if line + 1 < self.line_starts.len() { self.line_starts[line + 1] } else { self.text_len }
    }
}
