//! Token kinds and the token stream the Lang parser consumes.

use lang_position_tracking::Span;
use serde::{Deserialize, Serialize};

/// Every token the lexer can produce.
///
/// Malformed input never stops the lexer; unrecognizable bytes come out
/// as [`TokenKind::Error`] tokens so the parser can recover around them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals
    /// Integer literal, e.g. `42`
    IntLiteral,
    /// Floating-point literal, e.g. `3.25`
    FloatLiteral,
    /// Quoted string literal, escapes already validated
    StringLiteral,

    /// Identifier
    Ident,

    // Keywords
    KwImport,
    KwFrom,
    KwAs,
    KwExport,
    KwClass,
    KwStatic,
    KwConst,
    KwGlobal,
    KwMutivar,
    KwType,
    KwIf,
    KwElse,
    KwWhile,
    KwFor,
    KwReturn,
    KwBreak,
    KwContinue,
    KwDefer,
    KwNew,
    KwThis,
    KwTrue,
    KwFalse,
    KwNull,
    KwFunction,
    KwCoroutine,
    KwInt,
    KwFloat,
    KwNumber,
    KwBool,
    KwString,
    KwVoid,
    KwAny,
    KwList,
    KwMap,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Concat,
    Hash,
    Bang,
    Assign,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Amp,
    Pipe,
    Caret,
    Dot,
    Colon,

    // Punctuation
    Comma,
    Semicolon,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Ellipsis,

    /// Bytes the lexer could not classify
    Error,
    /// End of input; always the last token of a stream
    Eof,
}

impl TokenKind {
    /// Keyword lookup for an identifier-shaped word.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        Some(match word {
            "import" => TokenKind::KwImport,
            "from" => TokenKind::KwFrom,
            "as" => TokenKind::KwAs,
            "export" => TokenKind::KwExport,
            "class" => TokenKind::KwClass,
            "static" => TokenKind::KwStatic,
            "const" => TokenKind::KwConst,
            "global" => TokenKind::KwGlobal,
            "mutivar" => TokenKind::KwMutivar,
            "type" => TokenKind::KwType,
            "if" => TokenKind::KwIf,
            "else" => TokenKind::KwElse,
            "while" => TokenKind::KwWhile,
            "for" => TokenKind::KwFor,
            "return" => TokenKind::KwReturn,
            "break" => TokenKind::KwBreak,
            "continue" => TokenKind::KwContinue,
            "defer" => TokenKind::KwDefer,
            "new" => TokenKind::KwNew,
            "this" => TokenKind::KwThis,
            "true" => TokenKind::KwTrue,
            "false" => TokenKind::KwFalse,
            "null" => TokenKind::KwNull,
            "function" => TokenKind::KwFunction,
            "coroutine" => TokenKind::KwCoroutine,
            "int" => TokenKind::KwInt,
            "float" => TokenKind::KwFloat,
            "number" => TokenKind::KwNumber,
            "bool" => TokenKind::KwBool,
            "string" => TokenKind::KwString,
            "void" => TokenKind::KwVoid,
            "any" => TokenKind::KwAny,
            "list" => TokenKind::KwList,
            "map" => TokenKind::KwMap,
            _ => return None,
        })
    }

    /// Whether this kind names a builtin type keyword usable in a type
    /// annotation.
    pub fn is_type_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::KwInt
                | TokenKind::KwFloat
                | TokenKind::KwNumber
                | TokenKind::KwBool
                | TokenKind::KwString
                | TokenKind::KwVoid
                | TokenKind::KwAny
                | TokenKind::KwNull
                | TokenKind::KwFunction
                | TokenKind::KwCoroutine
                | TokenKind::KwList
                | TokenKind::KwMap
        )
    }

    /// Whether a declaration can start with this kind. Used by the
    /// parser's recovery sets.
    pub fn starts_declaration(&self) -> bool {
        self.is_type_keyword()
            || matches!(
                self,
                TokenKind::KwImport
                    | TokenKind::KwExport
                    | TokenKind::KwClass
                    | TokenKind::KwConst
                    | TokenKind::KwGlobal
                    | TokenKind::KwMutivar
                    | TokenKind::KwType
            )
    }
}

/// One lexed token: kind, source span, and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Classification of the token
    pub kind: TokenKind,
    /// Byte span in the source text
    pub span: Span,
    /// The covered source text
    pub text: String,
}

impl Token {
    /// Create a token.
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Token { kind, span, text: text.into() }
    }
}

/// An owning token stream with cursor helpers for the parser.
///
/// The stream always ends with exactly one [`TokenKind::Eof`] token whose
/// span is the empty span at the end of input.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    cursor: usize,
}

impl TokenStream {
    /// Wrap a lexed token vector. Appends the `Eof` sentinel if the lexer
    /// did not.
    pub fn new(mut tokens: Vec<Token>, text_len: usize) -> Self {
        if !matches!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof)) {
            tokens.push(Token::new(TokenKind::Eof, Span::empty(text_len), ""));
        }
        TokenStream { tokens, cursor: 0 }
    }

    /// All tokens including the `Eof` sentinel.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// The token at the cursor.
    pub fn current(&self) -> &Token {
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    /// Look ahead `n` tokens without moving the cursor.
    pub fn peek(&self, n: usize) -> &Token {
        let idx = (self.cursor + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    /// Whether the cursor token has the given kind.
    pub fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Whether the cursor is at end of input.
    pub fn at_eof(&self) -> bool {
        self.at(TokenKind::Eof)
    }

    /// Advance and return the token that was at the cursor.
    pub fn bump(&mut self) -> Token {
        let token = self.current().clone();
        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
        }
        token
    }

    /// Advance past the cursor token if it has `kind`.
    pub fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.at(kind) { Some(self.bump()) } else { None }
    }

    /// Current cursor index, for parser progress checks.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
