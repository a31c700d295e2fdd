//! Wire position shapes and their `lsp_types` conversions.
//!
//! The engine's byte spans reshape into these 0-based UTF-16 wire
//! structs at the server boundary, and from there into the
//! schema-checked `lsp_types` payloads that actually go on the wire.

use serde::{Deserialize, Serialize};

/// LSP position: 0-based line, 0-based UTF-16 character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePosition {
    pub line: u32,
    pub character: u32,
}

/// LSP range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireRange {
    pub start: WirePosition,
    pub end: WirePosition,
}

/// A wire location before its URI is validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireLocation {
    pub uri: String,
    pub range: WireRange,
}

/// A diagnostic before severity and range take their `lsp_types` shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDiagnostic {
    pub range: WireRange,
    pub severity: u8,
    pub source: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl From<WirePosition> for lsp_types::Position {
    fn from(position: WirePosition) -> Self {
        lsp_types::Position { line: position.line, character: position.character }
    }
}

impl From<lsp_types::Position> for WirePosition {
    fn from(position: lsp_types::Position) -> Self {
        WirePosition { line: position.line, character: position.character }
    }
}

impl From<WireRange> for lsp_types::Range {
    fn from(range: WireRange) -> Self {
        lsp_types::Range { start: range.start.into(), end: range.end.into() }
    }
}

impl From<lsp_types::Range> for WireRange {
    fn from(range: lsp_types::Range) -> Self {
        WireRange { start: range.start.into(), end: range.end.into() }
    }
}

impl WireLocation {
    /// Validate the URI and produce an `lsp_types::Location`; `None`
    /// when the URI does not parse.
    pub fn to_lsp(&self) -> Option<lsp_types::Location> {
        let uri: lsp_types::Uri = self.uri.parse().ok()?;
        Some(lsp_types::Location::new(uri, self.range.into()))
    }
}

impl WireDiagnostic {
    /// The published `lsp_types::Diagnostic` shape.
    pub fn to_lsp(&self) -> lsp_types::Diagnostic {
        let severity = match self.severity {
            1 => lsp_types::DiagnosticSeverity::ERROR,
            2 => lsp_types::DiagnosticSeverity::WARNING,
            3 => lsp_types::DiagnosticSeverity::INFORMATION,
            _ => lsp_types::DiagnosticSeverity::HINT,
        };
        lsp_types::Diagnostic {
            range: self.range.into(),
            severity: Some(severity),
            source: Some(self.source.clone()),
            message: self.message.clone(),
            data: self.data.clone(),
            ..Default::default()
        }
    }
}

/// Convert a byte span in `text` to a wire range.
pub fn utf16_range(
    text: &str,
    table: &lang_position_tracking::LineTable,
    span: lang_position_tracking::Span,
) -> WireRange {
    let (start_line, start_character) =
        lang_position_tracking::offset_to_utf16_position(text, table, span.start);
    let (end_line, end_character) =
        lang_position_tracking::offset_to_utf16_position(text, table, span.end);
    WireRange {
        start: WirePosition { line: start_line, character: start_character },
        end: WirePosition { line: end_line, character: end_character },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lang_position_tracking::{LineTable, Span};

    #[test]
    fn range_conversion_is_zero_based() {
        let text = "int x;\nint y;";
        let table = LineTable::new(text);
        let range = utf16_range(text, &table, Span::new(11, 12));
        assert_eq!(range.start, WirePosition { line: 1, character: 4 });
        assert_eq!(range.end, WirePosition { line: 1, character: 5 });
    }

    #[test]
    fn wire_range_round_trips_through_lsp_types() {
        let wire = WireRange {
            start: WirePosition { line: 2, character: 0 },
            end: WirePosition { line: 2, character: 7 },
        };
        let lsp: lsp_types::Range = wire.into();
        assert_eq!(lsp.start.line, 2);
        assert_eq!(WireRange::from(lsp), wire);
    }

    #[test]
    fn location_requires_a_valid_uri() {
        let range = WireRange {
            start: WirePosition { line: 0, character: 0 },
            end: WirePosition { line: 0, character: 1 },
        };
        let good = WireLocation { uri: "file:///tmp/a.lang".to_string(), range };
        assert!(good.to_lsp().is_some());
        let bad = WireLocation { uri: "not a uri".to_string(), range };
        assert!(bad.to_lsp().is_none());
    }

    #[test]
    fn diagnostic_maps_severity_codes() {
        let diagnostic = WireDiagnostic {
            range: WireRange {
                start: WirePosition { line: 0, character: 8 },
                end: WirePosition { line: 0, character: 12 },
            },
            severity: 1,
            source: "semantic".to_string(),
            message: "type string is not assignable to int".to_string(),
            data: None,
        };
        let lsp = diagnostic.to_lsp();
        assert_eq!(lsp.severity, Some(lsp_types::DiagnosticSeverity::ERROR));
        assert_eq!(lsp.source.as_deref(), Some("semantic"));
    }
}
