//! Permissive byte-wise lexer for Lang.
//!
//! The lexer never fails: unrecognized bytes become [`TokenKind::Error`]
//! tokens and a diagnostic, unterminated strings and block comments are
//! reported but still tokenized, and the output always ends in `Eof`.
//! Doc comments (`/// …`) are collected separately so the AST builder
//! can attach them to the following declaration.

use lang_diagnostics::Diagnostic;
use lang_position_tracking::Span;
use lang_token::{Token, TokenKind};

/// Everything one lex pass produces.
#[derive(Debug, Clone)]
pub struct LexOutput {
    /// Lexed tokens, `Eof`-terminated
    pub tokens: Vec<Token>,
    /// `///` doc comment runs with their spans, text stripped of markers
    pub doc_comments: Vec<DocComment>,
    /// Lexical diagnostics (unterminated strings, stray bytes, ...)
    pub diagnostics: Vec<Diagnostic>,
}

/// One contiguous run of `///` lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocComment {
    /// Span covering the whole run
    pub span: Span,
    /// Joined comment text, one line per `///` line
    pub text: String,
}

/// Lex `text` to completion.
pub fn lex(text: &str) -> LexOutput {
    Lexer::new(text).run()
}

struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
    doc_comments: Vec<DocComment>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Lexer {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
            doc_comments: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> LexOutput {
        while self.pos < self.bytes.len() {
            self.skip_trivia();
            if self.pos >= self.bytes.len() {
                break;
            }
            let start = self.pos;
            match self.bytes[self.pos] {
                b'0'..=b'9' => self.number(start),
                b'"' | b'\'' => self.string(start),
                b if b == b'_' || b.is_ascii_alphabetic() => self.word(start),
                _ => self.operator_or_error(start),
            }
        }
        self.tokens.push(Token::new(TokenKind::Eof, Span::empty(self.bytes.len()), ""));
        LexOutput { tokens: self.tokens, doc_comments: self.doc_comments, diagnostics: self.diagnostics }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.bytes.get(self.pos) {
                Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n') => self.pos += 1,
                Some(b'/') if self.peek_byte(1) == Some(b'/') => {
                    if self.peek_byte(2) == Some(b'/') {
                        self.doc_comment_run();
                    } else {
                        self.skip_to_line_end();
                    }
                }
                Some(b'/') if self.peek_byte(1) == Some(b'*') => self.block_comment(),
                _ => break,
            }
        }
    }

    fn doc_comment_run(&mut self) {
        let start = self.pos;
        let mut lines = Vec::new();
        loop {
            // Consume one `/// …` line.
            self.pos += 3;
            let line_start = self.pos;
            self.skip_to_line_end();
            lines.push(self.text[line_start..self.pos].trim().to_string());
            let run_end = self.pos;
            // A directly following `///` line (only whitespace between)
            // extends the run.
            let mut probe = self.pos;
            while matches!(self.bytes.get(probe), Some(b' ') | Some(b'\t') | Some(b'\r') | Some(b'\n')) {
                probe += 1;
            }
            if self.bytes.get(probe) == Some(&b'/')
                && self.bytes.get(probe + 1) == Some(&b'/')
                && self.bytes.get(probe + 2) == Some(&b'/')
            {
                self.pos = probe;
                continue;
            }
            self.doc_comments.push(DocComment { span: Span::new(start, run_end), text: lines.join("\n") });
            break;
        }
    }

    fn skip_to_line_end(&mut self) {
        while let Some(&b) = self.bytes.get(self.pos) {
            if b == b'\n' || b == b'\r' {
                break;
            }
            self.pos += 1;
        }
    }

    fn block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        loop {
            match self.bytes.get(self.pos) {
                None => {
                    self.diagnostics.push(Diagnostic::syntax_error(
                        Span::new(start, self.pos),
                        "unterminated block comment",
                    ));
                    break;
                }
                Some(b'*') if self.peek_byte(1) == Some(b'/') => {
                    self.pos += 2;
                    break;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn number(&mut self, start: usize) {
        while matches!(self.bytes.get(self.pos), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }
        let mut kind = TokenKind::IntLiteral;
        // A fraction only if the dot is followed by a digit, so `1..2`
        // still lexes as int, concat, int.
        if self.bytes.get(self.pos) == Some(&b'.')
            && matches!(self.peek_byte(1), Some(b) if b.is_ascii_digit())
        {
            kind = TokenKind::FloatLiteral;
            self.pos += 1;
            while matches!(self.bytes.get(self.pos), Some(b) if b.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        self.push(kind, start);
    }

    fn string(&mut self, start: usize) {
        let quote = self.bytes[self.pos];
        self.pos += 1;
        loop {
            match self.bytes.get(self.pos) {
                None | Some(b'\n') | Some(b'\r') => {
                    self.diagnostics.push(Diagnostic::syntax_error(
                        Span::new(start, self.pos),
                        "unterminated string literal",
                    ));
                    break;
                }
                Some(b'\\') => {
                    match self.peek_byte(1) {
                        Some(b'n' | b't' | b'r' | b'0' | b'\\' | b'"' | b'\'') => self.pos += 2,
                        _ => {
                            self.diagnostics.push(Diagnostic::syntax_error(
                                Span::new(self.pos, (self.pos + 2).min(self.bytes.len())),
                                "unknown escape sequence",
                            ));
                            self.pos += 1;
                        }
                    }
                }
                Some(&b) if b == quote => {
                    self.pos += 1;
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.push(TokenKind::StringLiteral, start);
    }

    fn word(&mut self, start: usize) {
        while matches!(self.bytes.get(self.pos), Some(b) if *b == b'_' || b.is_ascii_alphanumeric()) {
            self.pos += 1;
        }
        let word = &self.text[start..self.pos];
        let kind = TokenKind::keyword(word).unwrap_or(TokenKind::Ident);
        self.push(kind, start);
    }

    fn operator_or_error(&mut self, start: usize) {
        use TokenKind::*;
        let (kind, len) = match (self.bytes[self.pos], self.peek_byte(1), self.peek_byte(2)) {
            (b'.', Some(b'.'), Some(b'.')) => (Ellipsis, 3),
            (b'.', Some(b'.'), _) => (Concat, 2),
            (b'.', _, _) => (Dot, 1),
            (b'=', Some(b'='), _) => (Eq, 2),
            (b'=', _, _) => (Assign, 1),
            (b'!', Some(b'='), _) => (NotEq, 2),
            (b'!', _, _) => (Bang, 1),
            // `<<`/`>>` are not lexed as units: nested generic type
            // arguments like `map<string, list<int>>` need the single
            // `>`s, so the parser glues adjacent tokens into shifts.
            (b'<', Some(b'='), _) => (LtEq, 2),
            (b'<', _, _) => (Lt, 1),
            (b'>', Some(b'='), _) => (GtEq, 2),
            (b'>', _, _) => (Gt, 1),
            (b'&', Some(b'&'), _) => (AndAnd, 2),
            (b'&', _, _) => (Amp, 1),
            (b'|', Some(b'|'), _) => (OrOr, 2),
            (b'|', _, _) => (Pipe, 1),
            (b'+', _, _) => (Plus, 1),
            (b'-', _, _) => (Minus, 1),
            (b'*', _, _) => (Star, 1),
            (b'/', _, _) => (Slash, 1),
            (b'%', _, _) => (Percent, 1),
            (b'^', _, _) => (Caret, 1),
            (b'#', _, _) => (Hash, 1),
            (b',', _, _) => (Comma, 1),
            (b';', _, _) => (Semicolon, 1),
            (b':', _, _) => (Colon, 1),
            (b'(', _, _) => (LParen, 1),
            (b')', _, _) => (RParen, 1),
            (b'{', _, _) => (LBrace, 1),
            (b'}', _, _) => (RBrace, 1),
            (b'[', _, _) => (LBracket, 1),
            (b']', _, _) => (RBracket, 1),
            _ => {
                // Skip one whole character, not one byte, so multi-byte
                // UTF-8 stays intact in the error token text.
                let ch_len = self.text[start..].chars().next().map(char::len_utf8).unwrap_or(1);
                self.pos = start + ch_len;
                self.push(Error, start);
                self.diagnostics.push(Diagnostic::syntax_error(
                    Span::new(start, self.pos),
                    format!("unexpected character `{}`", &self.text[start..self.pos]),
                ));
                return;
            }
        };
        self.pos = start + len;
        self.push(kind, start);
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        let span = Span::new(start, self.pos);
        self.tokens.push(Token::new(kind, span, &self.text[start..self.pos]));
    }

    fn peek_byte(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kinds(text: &str) -> Vec<TokenKind> {
        lex(text).tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn declaration_tokens() {
        use TokenKind::*;
        assert_eq!(
            kinds("int x = 42;"),
            vec![KwInt, Ident, Assign, IntLiteral, Semicolon, Eof]
        );
    }

    #[test]
    fn float_vs_concat() {
        use TokenKind::*;
        assert_eq!(kinds("1.5"), vec![FloatLiteral, Eof]);
        assert_eq!(kinds("a .. b"), vec![Ident, Concat, Ident, Eof]);
        assert_eq!(kinds("1..2"), vec![IntLiteral, Concat, IntLiteral, Eof]);
    }

    #[test]
    fn two_char_operators() {
        use TokenKind::*;
        assert_eq!(kinds("== != <= >= && ||"), vec![Eq, NotEq, LtEq, GtEq, AndAnd, OrOr, Eof]);
    }

    #[test]
    fn shift_operators_lex_as_adjacent_angles() {
        use TokenKind::*;
        assert_eq!(kinds("a << b"), vec![Ident, Lt, Lt, Ident, Eof]);
        assert_eq!(kinds("map<string, list<int>> m"), vec![KwMap, Lt, KwString, Comma, KwList, Lt, KwInt, Gt, Gt, Ident, Eof]);
    }

    #[test]
    fn string_with_escapes() {
        let out = lex(r#""a\nb""#);
        assert_eq!(out.tokens[0].kind, TokenKind::StringLiteral);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn unterminated_string_reports_but_tokenizes() {
        let out = lex("\"abc");
        assert_eq!(out.tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(out.diagnostics.len(), 1);
        assert!(out.diagnostics[0].message.contains("unterminated string"));
    }

    #[test]
    fn comments_are_trivia() {
        use TokenKind::*;
        assert_eq!(kinds("a // c\nb /* x */ c"), vec![Ident, Ident, Ident, Eof]);
    }

    #[test]
    fn doc_comment_runs_collected() {
        let out = lex("/// adds things\n/// slowly\nint add;\n");
        assert_eq!(out.doc_comments.len(), 1);
        assert_eq!(out.doc_comments[0].text, "adds things\nslowly");
    }

    #[test]
    fn stray_byte_becomes_error_token() {
        let out = lex("a @ b");
        assert_eq!(out.tokens[1].kind, TokenKind::Error);
        assert_eq!(out.diagnostics.len(), 1);
    }

    #[test]
    fn incomplete_member_access_lexes() {
        use TokenKind::*;
        assert_eq!(kinds("obj."), vec![Ident, Dot, Eof]);
    }

    #[test]
    fn spans_are_byte_accurate() {
        let out = lex("ab cd");
        assert_eq!(out.tokens[0].span, Span::new(0, 2));
        assert_eq!(out.tokens[1].span, Span::new(3, 5));
    }
}
