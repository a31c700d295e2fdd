//! The permissive recursive-descent parser.
//!
//! Panic-mode recovery keeps the parser total: every byte of input ends
//! up under the root `Unit` node, unparseable stretches inside `Error`
//! nodes. The parser only reports diagnostics and builds CST shape; all
//! tolerant-AST decisions (error nodes, incompleteness flags) belong to
//! the builder.

use crate::cst::{CstChild, CstKind, CstNode, CstNodeId, CstTree};
use lang_diagnostics::Diagnostic;
use lang_position_tracking::Span;
use lang_token::{TokenKind, TokenStream};

pub(crate) struct Parser {
    tokens: TokenStream,
    nodes: Vec<CstNode>,
    diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub(crate) fn new(tokens: TokenStream) -> Self {
        Parser { tokens, nodes: Vec::new(), diagnostics: Vec::new() }
    }

    pub(crate) fn parse(mut self) -> (CstTree, TokenStream, Vec<Diagnostic>) {
        let root = self.parse_unit();
        let tree = CstTree::new(self.nodes, root);
        (tree, self.tokens, self.diagnostics)
    }

    // ===== Units and items =====

    fn parse_unit(&mut self) -> CstNodeId {
        let mut children = Vec::new();
        while !self.tokens.at_eof() {
            let before = self.tokens.cursor();
            let item = self.parse_item();
            children.push(CstChild::Node(item));
            if self.tokens.cursor() == before {
                // The item parser could not consume anything; skip one
                // token into an error node so the loop always advances.
                let idx = self.tokens.cursor();
                let token = self.tokens.bump();
                self.error(token.span, format!("unexpected token `{}`", token.text));
                children.push(CstChild::Node(self.alloc(CstKind::Error, vec![CstChild::Token(idx)])));
            }
        }
        self.alloc(CstKind::Unit, children)
    }

    /// One declaration or statement.
    fn parse_item(&mut self) -> CstNodeId {
        let mut modifiers: Vec<CstChild> = Vec::new();
        while matches!(
            self.tokens.current().kind,
            TokenKind::KwExport | TokenKind::KwConst | TokenKind::KwGlobal | TokenKind::KwStatic
        ) {
            modifiers.push(CstChild::Token(self.bump_idx()));
        }

        match self.tokens.current().kind {
            TokenKind::KwImport => self.parse_import(modifiers),
            TokenKind::KwClass => self.parse_class(modifiers),
            // `type Id = …;` declares an alias; a bare `type(…)` is a
            // call of the builtin and parses as an expression below.
            TokenKind::KwType if self.tokens.peek(1).kind == TokenKind::Ident => {
                self.parse_type_alias(modifiers)
            }
            TokenKind::KwMutivar => self.parse_mutivar(modifiers),
            _ if self.looks_like_decl() => self.parse_var_or_func(modifiers),
            _ if !modifiers.is_empty() => {
                let span = self.current_span();
                self.error(span, "expected declaration after modifier");
                self.alloc(CstKind::Error, modifiers)
            }
            TokenKind::LBrace => self.parse_block(),
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwWhile => self.parse_while(),
            TokenKind::KwFor => self.parse_for(),
            TokenKind::KwReturn => self.parse_return(),
            TokenKind::KwBreak => self.parse_jump(CstKind::BreakStmt),
            TokenKind::KwContinue => self.parse_jump(CstKind::ContinueStmt),
            TokenKind::KwDefer => self.parse_defer(),
            _ => self.parse_expr_stmt(),
        }
    }

    // ===== Declarations =====

    fn parse_import(&mut self, mut children: Vec<CstChild>) -> CstNodeId {
        children.push(CstChild::Token(self.bump_idx())); // import
        match self.tokens.current().kind {
            TokenKind::Star => {
                children.push(CstChild::Token(self.bump_idx()));
                self.expect(TokenKind::KwAs, "`as`", &mut children);
                self.expect(TokenKind::Ident, "module alias", &mut children);
            }
            TokenKind::LBrace => {
                children.push(CstChild::Token(self.bump_idx()));
                while !matches!(self.tokens.current().kind, TokenKind::RBrace | TokenKind::Eof) {
                    let mut item = Vec::new();
                    if self.tokens.at(TokenKind::KwType) {
                        item.push(CstChild::Token(self.bump_idx()));
                    }
                    if !self.expect(TokenKind::Ident, "imported name", &mut item) {
                        break;
                    }
                    if self.tokens.at(TokenKind::KwAs) {
                        item.push(CstChild::Token(self.bump_idx()));
                        self.expect(TokenKind::Ident, "import alias", &mut item);
                    }
                    children.push(CstChild::Node(self.alloc(CstKind::ImportItem, item)));
                    if !self.tokens.at(TokenKind::Comma) {
                        break;
                    }
                    children.push(CstChild::Token(self.bump_idx()));
                }
                self.expect(TokenKind::RBrace, "`}`", &mut children);
            }
            _ => {
                let span = self.current_span();
                self.error(span, "expected `*` or `{` after `import`");
            }
        }
        self.expect(TokenKind::KwFrom, "`from`", &mut children);
        self.expect(TokenKind::StringLiteral, "module path string", &mut children);
        self.expect(TokenKind::Semicolon, "`;`", &mut children);
        self.alloc(CstKind::ImportDecl, children)
    }

    fn parse_class(&mut self, mut children: Vec<CstChild>) -> CstNodeId {
        children.push(CstChild::Token(self.bump_idx())); // class
        self.expect(TokenKind::Ident, "class name", &mut children);
        if self.expect(TokenKind::LBrace, "`{`", &mut children) {
            while !matches!(self.tokens.current().kind, TokenKind::RBrace | TokenKind::Eof) {
                let before = self.tokens.cursor();
                let member = self.parse_item();
                children.push(CstChild::Node(member));
                if self.tokens.cursor() == before {
                    let idx = self.tokens.cursor();
                    let token = self.tokens.bump();
                    self.error(token.span, format!("unexpected token `{}` in class body", token.text));
                    children
                        .push(CstChild::Node(self.alloc(CstKind::Error, vec![CstChild::Token(idx)])));
                }
            }
            self.expect(TokenKind::RBrace, "`}`", &mut children);
        }
        self.alloc(CstKind::ClassDecl, children)
    }

    fn parse_type_alias(&mut self, mut children: Vec<CstChild>) -> CstNodeId {
        children.push(CstChild::Token(self.bump_idx())); // type
        self.expect(TokenKind::Ident, "type alias name", &mut children);
        self.expect(TokenKind::Assign, "`=`", &mut children);
        children.push(CstChild::Node(self.parse_type_ref()));
        self.expect(TokenKind::Semicolon, "`;`", &mut children);
        self.alloc(CstKind::TypeAlias, children)
    }

    fn parse_mutivar(&mut self, mut children: Vec<CstChild>) -> CstNodeId {
        children.push(CstChild::Token(self.bump_idx())); // mutivar
        self.expect(TokenKind::Ident, "variable name", &mut children);
        while self.tokens.at(TokenKind::Comma) {
            children.push(CstChild::Token(self.bump_idx()));
            self.expect(TokenKind::Ident, "variable name", &mut children);
        }
        if self.expect(TokenKind::Assign, "`=`", &mut children) {
            children.push(CstChild::Node(self.parse_expr()));
        }
        self.expect(TokenKind::Semicolon, "`;`", &mut children);
        self.alloc(CstKind::MultiVarDecl, children)
    }

    /// A variable declaration or a function declaration; both start with
    /// a type reference and a name.
    fn parse_var_or_func(&mut self, mut children: Vec<CstChild>) -> CstNodeId {
        children.push(CstChild::Node(self.parse_type_ref()));
        self.expect(TokenKind::Ident, "name", &mut children);
        if self.tokens.at(TokenKind::LParen) {
            self.parse_param_list(&mut children);
            if self.tokens.at(TokenKind::LBrace) {
                children.push(CstChild::Node(self.parse_block()));
            } else {
                let span = self.current_span();
                self.error(span, "expected function body");
            }
            return self.alloc(CstKind::FuncDecl, children);
        }
        if self.tokens.at(TokenKind::Assign) {
            children.push(CstChild::Token(self.bump_idx()));
            children.push(CstChild::Node(self.parse_expr()));
        }
        self.expect(TokenKind::Semicolon, "`;`", &mut children);
        self.alloc(CstKind::VarDecl, children)
    }

    fn parse_param_list(&mut self, children: &mut Vec<CstChild>) {
        children.push(CstChild::Token(self.bump_idx())); // (
        while !matches!(self.tokens.current().kind, TokenKind::RParen | TokenKind::Eof) {
            if self.tokens.at(TokenKind::Ellipsis) {
                children.push(CstChild::Token(self.bump_idx()));
                break;
            }
            let mut param = vec![CstChild::Node(self.parse_type_ref())];
            self.expect(TokenKind::Ident, "parameter name", &mut param);
            children.push(CstChild::Node(self.alloc(CstKind::Param, param)));
            if !self.tokens.at(TokenKind::Comma) {
                break;
            }
            children.push(CstChild::Token(self.bump_idx()));
        }
        self.expect(TokenKind::RParen, "`)`", children);
    }

    // ===== Type references =====

    fn parse_type_ref(&mut self) -> CstNodeId {
        let first = self.parse_type_atom();
        if !self.tokens.at(TokenKind::Pipe) {
            return first;
        }
        let mut children = vec![CstChild::Node(first)];
        while self.tokens.at(TokenKind::Pipe) {
            children.push(CstChild::Token(self.bump_idx()));
            children.push(CstChild::Node(self.parse_type_atom()));
        }
        self.alloc(CstKind::UnionType, children)
    }

    fn parse_type_atom(&mut self) -> CstNodeId {
        match self.tokens.current().kind {
            TokenKind::KwList => {
                let mut children = vec![CstChild::Token(self.bump_idx())];
                self.expect(TokenKind::Lt, "`<`", &mut children);
                children.push(CstChild::Node(self.parse_type_ref()));
                self.expect(TokenKind::Gt, "`>`", &mut children);
                self.alloc(CstKind::ListType, children)
            }
            TokenKind::KwMap => {
                let mut children = vec![CstChild::Token(self.bump_idx())];
                self.expect(TokenKind::Lt, "`<`", &mut children);
                children.push(CstChild::Node(self.parse_type_ref()));
                self.expect(TokenKind::Comma, "`,`", &mut children);
                children.push(CstChild::Node(self.parse_type_ref()));
                self.expect(TokenKind::Gt, "`>`", &mut children);
                self.alloc(CstKind::MapType, children)
            }
            kind if kind.is_type_keyword() || kind == TokenKind::Ident => {
                let idx = self.bump_idx();
                self.alloc(CstKind::TypeRef, vec![CstChild::Token(idx)])
            }
            _ => {
                let span = self.current_span();
                self.error(span, "expected type");
                self.alloc(CstKind::Error, Vec::new())
            }
        }
    }

    // ===== Statements =====

    fn parse_block(&mut self) -> CstNodeId {
        let mut children = vec![CstChild::Token(self.bump_idx())]; // {
        while !matches!(self.tokens.current().kind, TokenKind::RBrace | TokenKind::Eof) {
            let before = self.tokens.cursor();
            children.push(CstChild::Node(self.parse_item()));
            if self.tokens.cursor() == before {
                let idx = self.tokens.cursor();
                let token = self.tokens.bump();
                self.error(token.span, format!("unexpected token `{}`", token.text));
                children.push(CstChild::Node(self.alloc(CstKind::Error, vec![CstChild::Token(idx)])));
            }
        }
        self.expect(TokenKind::RBrace, "`}`", &mut children);
        self.alloc(CstKind::Block, children)
    }

    fn parse_if(&mut self) -> CstNodeId {
        let mut children = vec![CstChild::Token(self.bump_idx())]; // if
        self.expect(TokenKind::LParen, "`(`", &mut children);
        children.push(CstChild::Node(self.parse_expr()));
        self.expect(TokenKind::RParen, "`)`", &mut children);
        children.push(CstChild::Node(self.parse_item()));
        if self.tokens.at(TokenKind::KwElse) {
            children.push(CstChild::Token(self.bump_idx()));
            children.push(CstChild::Node(self.parse_item()));
        }
        self.alloc(CstKind::IfStmt, children)
    }

    fn parse_while(&mut self) -> CstNodeId {
        let mut children = vec![CstChild::Token(self.bump_idx())]; // while
        self.expect(TokenKind::LParen, "`(`", &mut children);
        children.push(CstChild::Node(self.parse_expr()));
        self.expect(TokenKind::RParen, "`)`", &mut children);
        children.push(CstChild::Node(self.parse_item()));
        self.alloc(CstKind::WhileStmt, children)
    }

    fn parse_for(&mut self) -> CstNodeId {
        let mut children = vec![CstChild::Token(self.bump_idx())]; // for
        self.expect(TokenKind::LParen, "`(`", &mut children);
        // Init clause: declaration (consumes its own `;`), expression
        // statement, or bare `;`.
        if self.tokens.at(TokenKind::Semicolon) {
            children.push(CstChild::Token(self.bump_idx()));
        } else if self.looks_like_decl() {
            children.push(CstChild::Node(self.parse_var_or_func(Vec::new())));
        } else {
            children.push(CstChild::Node(self.parse_expr()));
            self.expect(TokenKind::Semicolon, "`;`", &mut children);
        }
        if !self.tokens.at(TokenKind::Semicolon) {
            children.push(CstChild::Node(self.parse_expr()));
        }
        self.expect(TokenKind::Semicolon, "`;`", &mut children);
        if !self.tokens.at(TokenKind::RParen) {
            children.push(CstChild::Node(self.parse_expr()));
        }
        self.expect(TokenKind::RParen, "`)`", &mut children);
        children.push(CstChild::Node(self.parse_item()));
        self.alloc(CstKind::ForStmt, children)
    }

    fn parse_return(&mut self) -> CstNodeId {
        let mut children = vec![CstChild::Token(self.bump_idx())]; // return
        if !matches!(self.tokens.current().kind, TokenKind::Semicolon | TokenKind::Eof) {
            children.push(CstChild::Node(self.parse_expr()));
            while self.tokens.at(TokenKind::Comma) {
                children.push(CstChild::Token(self.bump_idx()));
                children.push(CstChild::Node(self.parse_expr()));
            }
        }
        self.expect(TokenKind::Semicolon, "`;`", &mut children);
        self.alloc(CstKind::ReturnStmt, children)
    }

    fn parse_jump(&mut self, kind: CstKind) -> CstNodeId {
        let mut children = vec![CstChild::Token(self.bump_idx())];
        self.expect(TokenKind::Semicolon, "`;`", &mut children);
        self.alloc(kind, children)
    }

    fn parse_defer(&mut self) -> CstNodeId {
        let mut children = vec![CstChild::Token(self.bump_idx())]; // defer
        if self.tokens.at(TokenKind::LBrace) {
            children.push(CstChild::Node(self.parse_block()));
        } else {
            let span = self.current_span();
            self.error(span, "expected block after `defer`");
        }
        self.alloc(CstKind::DeferStmt, children)
    }

    fn parse_expr_stmt(&mut self) -> CstNodeId {
        let mut children = vec![CstChild::Node(self.parse_expr())];
        self.expect(TokenKind::Semicolon, "`;`", &mut children);
        self.alloc(CstKind::ExprStmt, children)
    }

    // ===== Expressions =====

    fn parse_expr(&mut self) -> CstNodeId {
        self.parse_expr_bp(0)
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> CstNodeId {
        let mut lhs = self.parse_unary();
        loop {
            // The lexer emits single `<`/`>` so generics nest; adjacent
            // pairs glue back into shift operators here.
            let glued_shift = self.at_glued_shift();
            let Some((l_bp, r_bp)) = (if glued_shift {
                Some((17, 18))
            } else {
                binary_binding_power(self.tokens.current().kind)
            }) else {
                break;
            };
            if l_bp < min_bp {
                break;
            }
            let mut children = vec![CstChild::Node(lhs), CstChild::Token(self.bump_idx())];
            if glued_shift {
                children.push(CstChild::Token(self.bump_idx()));
            }
            children.push(CstChild::Node(self.parse_expr_bp(r_bp)));
            lhs = self.alloc(CstKind::BinaryExpr, children);
        }
        lhs
    }

    /// Whether the cursor sits on two adjacent `<`s or `>`s forming a
    /// shift operator.
    fn at_glued_shift(&self) -> bool {
        let current = self.tokens.current();
        let next = self.tokens.peek(1);
        current.kind == next.kind
            && matches!(current.kind, TokenKind::Lt | TokenKind::Gt)
            && current.span.end == next.span.start
    }

    fn parse_unary(&mut self) -> CstNodeId {
        match self.tokens.current().kind {
            TokenKind::Minus | TokenKind::Bang | TokenKind::Hash => {
                let op = self.bump_idx();
                let operand = self.parse_unary();
                self.alloc(CstKind::UnaryExpr, vec![CstChild::Token(op), CstChild::Node(operand)])
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> CstNodeId {
        let mut base = self.parse_primary();
        loop {
            match self.tokens.current().kind {
                TokenKind::LParen => {
                    let mut children = vec![CstChild::Node(base), CstChild::Token(self.bump_idx())];
                    while !matches!(self.tokens.current().kind, TokenKind::RParen | TokenKind::Eof) {
                        children.push(CstChild::Node(self.parse_expr()));
                        if !self.tokens.at(TokenKind::Comma) {
                            break;
                        }
                        children.push(CstChild::Token(self.bump_idx()));
                    }
                    self.expect(TokenKind::RParen, "`)`", &mut children);
                    base = self.alloc(CstKind::CallExpr, children);
                }
                TokenKind::Dot | TokenKind::Colon => {
                    let is_dot = self.tokens.at(TokenKind::Dot);
                    let mut children = vec![CstChild::Node(base), CstChild::Token(self.bump_idx())];
                    if self.tokens.at(TokenKind::Ident) {
                        children.push(CstChild::Token(self.bump_idx()));
                    } else {
                        // `obj.` with nothing after it: keep the node so
                        // completion can still classify the position.
                        let span = self.current_span();
                        self.error(span, if is_dot { "expected member name after `.`" } else { "expected member name after `:`" });
                    }
                    base = self
                        .alloc(if is_dot { CstKind::MemberExpr } else { CstKind::ColonExpr }, children);
                }
                TokenKind::LBracket => {
                    let mut children = vec![CstChild::Node(base), CstChild::Token(self.bump_idx())];
                    children.push(CstChild::Node(self.parse_expr()));
                    self.expect(TokenKind::RBracket, "`]`", &mut children);
                    base = self.alloc(CstKind::IndexExpr, children);
                }
                _ => break,
            }
        }
        base
    }

    fn parse_primary(&mut self) -> CstNodeId {
        match self.tokens.current().kind {
            TokenKind::IntLiteral
            | TokenKind::FloatLiteral
            | TokenKind::StringLiteral
            | TokenKind::KwTrue
            | TokenKind::KwFalse
            | TokenKind::KwNull => {
                let idx = self.bump_idx();
                self.alloc(CstKind::Literal, vec![CstChild::Token(idx)])
            }
            TokenKind::Ident => {
                let idx = self.bump_idx();
                self.alloc(CstKind::NameRef, vec![CstChild::Token(idx)])
            }
            // The builtin `type` function; the keyword only introduces a
            // declaration when a name follows it.
            TokenKind::KwType => {
                let idx = self.bump_idx();
                self.alloc(CstKind::NameRef, vec![CstChild::Token(idx)])
            }
            TokenKind::KwThis => {
                let idx = self.bump_idx();
                self.alloc(CstKind::ThisExpr, vec![CstChild::Token(idx)])
            }
            TokenKind::KwNew => {
                let mut children = vec![CstChild::Token(self.bump_idx())];
                if self.tokens.at(TokenKind::Ident) {
                    children.push(CstChild::Token(self.bump_idx()));
                    while self.tokens.at(TokenKind::Dot) && self.tokens.peek(1).kind == TokenKind::Ident
                    {
                        children.push(CstChild::Token(self.bump_idx()));
                        children.push(CstChild::Token(self.bump_idx()));
                    }
                } else {
                    let span = self.current_span();
                    self.error(span, "expected class name after `new`");
                }
                if self.tokens.at(TokenKind::LParen) {
                    children.push(CstChild::Token(self.bump_idx()));
                    while !matches!(self.tokens.current().kind, TokenKind::RParen | TokenKind::Eof) {
                        children.push(CstChild::Node(self.parse_expr()));
                        if !self.tokens.at(TokenKind::Comma) {
                            break;
                        }
                        children.push(CstChild::Token(self.bump_idx()));
                    }
                    self.expect(TokenKind::RParen, "`)`", &mut children);
                }
                self.alloc(CstKind::NewExpr, children)
            }
            TokenKind::KwFunction => {
                let mut children = vec![CstChild::Token(self.bump_idx())];
                if self.tokens.at(TokenKind::LParen) {
                    self.parse_param_list(&mut children);
                }
                if self.tokens.at(TokenKind::LBrace) {
                    children.push(CstChild::Node(self.parse_block()));
                } else {
                    let span = self.current_span();
                    self.error(span, "expected lambda body");
                }
                self.alloc(CstKind::LambdaExpr, children)
            }
            TokenKind::LParen => {
                let mut children = vec![CstChild::Token(self.bump_idx())];
                children.push(CstChild::Node(self.parse_expr()));
                self.expect(TokenKind::RParen, "`)`", &mut children);
                self.alloc(CstKind::ParenExpr, children)
            }
            _ => {
                let span = self.current_span();
                self.error(span, "expected expression");
                self.alloc(CstKind::Error, Vec::new())
            }
        }
    }

    // ===== Lookahead =====

    /// Whether the tokens at the cursor have declaration shape:
    /// a type reference followed by a name.
    fn looks_like_decl(&self) -> bool {
        let kind = self.tokens.current().kind;
        if kind.is_type_keyword() {
            return true;
        }
        if kind != TokenKind::Ident {
            return false;
        }
        match self.type_shape_end(self.tokens.cursor()) {
            Some(end) => self.kind_at(end) == TokenKind::Ident,
            None => false,
        }
    }

    /// Scan a type-reference shape starting at absolute token index `i`;
    /// returns the index one past it.
    fn type_shape_end(&self, i: usize) -> Option<usize> {
        let mut end = self.atom_shape_end(i)?;
        while self.kind_at(end) == TokenKind::Pipe {
            end = self.atom_shape_end(end + 1)?;
        }
        Some(end)
    }

    fn atom_shape_end(&self, i: usize) -> Option<usize> {
        match self.kind_at(i) {
            TokenKind::KwList => {
                if self.kind_at(i + 1) != TokenKind::Lt {
                    return Some(i + 1);
                }
                let elem = self.type_shape_end(i + 2)?;
                (self.kind_at(elem) == TokenKind::Gt).then_some(elem + 1)
            }
            TokenKind::KwMap => {
                if self.kind_at(i + 1) != TokenKind::Lt {
                    return Some(i + 1);
                }
                let key = self.type_shape_end(i + 2)?;
                if self.kind_at(key) != TokenKind::Comma {
                    return None;
                }
                let value = self.type_shape_end(key + 1)?;
                (self.kind_at(value) == TokenKind::Gt).then_some(value + 1)
            }
            TokenKind::Ident => Some(i + 1),
            kind if kind.is_type_keyword() => Some(i + 1),
            _ => None,
        }
    }

    // ===== Primitives =====

    fn kind_at(&self, i: usize) -> TokenKind {
        self.tokens.tokens().get(i).map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn bump_idx(&mut self) -> usize {
        let idx = self.tokens.cursor();
        self.tokens.bump();
        idx
    }

    fn current_span(&self) -> Span {
        self.tokens.current().span
    }

    fn expect(&mut self, kind: TokenKind, what: &str, children: &mut Vec<CstChild>) -> bool {
        if self.tokens.at(kind) {
            children.push(CstChild::Token(self.bump_idx()));
            true
        } else {
            let span = self.current_span();
            self.error(span, format!("expected {what}"));
            false
        }
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        let message = message.into();
        tracing::trace!(start = span.start, end = span.end, %message, "syntax error");
        self.diagnostics.push(Diagnostic::syntax_error(span, message));
    }

    fn alloc(&mut self, kind: CstKind, children: Vec<CstChild>) -> CstNodeId {
        let span = self.span_over(&children);
        let id = CstNodeId(self.nodes.len() as u32);
        self.nodes.push(CstNode { kind, span, children });
        id
    }

    fn span_over(&self, children: &[CstChild]) -> Span {
        let mut span: Option<Span> = None;
        for child in children {
            let child_span = match child {
                CstChild::Node(id) => self.nodes[id.index()].span,
                CstChild::Token(idx) => match self.tokens.tokens().get(*idx) {
                    Some(token) => token.span,
                    None => continue,
                },
            };
            span = Some(match span {
                Some(prev) => prev.cover(child_span),
                None => child_span,
            });
        }
        span.unwrap_or_else(|| Span::empty(self.tokens.current().span.start))
    }
}

/// Left/right binding powers; left-associative operators bind tighter on
/// the right, assignment is right-associative.
fn binary_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
    use TokenKind::*;
    Some(match kind {
        Assign => (2, 1),
        OrOr => (3, 4),
        AndAnd => (5, 6),
        Pipe => (7, 8),
        Caret => (9, 10),
        Amp => (11, 12),
        Eq | NotEq => (13, 14),
        Lt | LtEq | Gt | GtEq => (15, 16),
        Concat => (19, 20),
        Plus | Minus => (21, 22),
        Star | Slash | Percent => (23, 24),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_source;

    fn kinds_under_root(text: &str) -> Vec<CstKind> {
        let result = parse_source(text);
        result.tree.node_children(result.tree.root()).map(|id| result.tree.node(id).kind).collect()
    }

    #[test]
    fn simple_declaration() {
        assert_eq!(kinds_under_root("int x = 42;"), vec![CstKind::VarDecl]);
    }

    #[test]
    fn function_declaration() {
        assert_eq!(
            kinds_under_root("export int add(int a, int b) { return a + b; }"),
            vec![CstKind::FuncDecl]
        );
    }

    #[test]
    fn class_with_members() {
        let result = parse_source("class P { int hp; static int max() { return 9; } }");
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let class = result.tree.node_children(result.tree.root()).next().unwrap();
        assert_eq!(result.tree.node(class).kind, CstKind::ClassDecl);
        let members: Vec<_> =
            result.tree.node_children(class).map(|id| result.tree.node(id).kind).collect();
        assert_eq!(members, vec![CstKind::VarDecl, CstKind::FuncDecl]);
    }

    #[test]
    fn expression_statement_vs_declaration() {
        assert_eq!(kinds_under_root("P p = new P();"), vec![CstKind::VarDecl]);
        assert_eq!(kinds_under_root("p.hp = 3;"), vec![CstKind::ExprStmt]);
        assert_eq!(kinds_under_root("a | b;"), vec![CstKind::ExprStmt]);
        assert_eq!(kinds_under_root("A | B x;"), vec![CstKind::VarDecl]);
    }

    #[test]
    fn imports() {
        assert_eq!(
            kinds_under_root("import { add, sub as s, type T } from \"./util\";"),
            vec![CstKind::ImportDecl]
        );
        assert_eq!(kinds_under_root("import * as util from \"./util\";"), vec![CstKind::ImportDecl]);
    }

    #[test]
    fn binary_chain_is_left_associative() {
        let result = parse_source("a + b + c;");
        let stmt = result.tree.node_children(result.tree.root()).next().unwrap();
        let outer = result.tree.node_children(stmt).next().unwrap();
        assert_eq!(result.tree.node(outer).kind, CstKind::BinaryExpr);
        // Left child of the outer `+` is itself a BinaryExpr.
        let lhs = result.tree.node_children(outer).next().unwrap();
        assert_eq!(result.tree.node(lhs).kind, CstKind::BinaryExpr);
    }

    #[test]
    fn incomplete_member_access_still_parses() {
        let result = parse_source("p.");
        let stmt = result.tree.node_children(result.tree.root()).next().unwrap();
        let member = result.tree.node_children(stmt).next().unwrap();
        assert_eq!(result.tree.node(member).kind, CstKind::MemberExpr);
        assert!(!result.diagnostics.is_empty());
    }

    #[test]
    fn garbage_never_stops_the_parser() {
        let result = parse_source("@@@ int x = 1; %%%");
        assert!(!result.diagnostics.is_empty());
        let kinds: Vec<_> = result
            .tree
            .node_children(result.tree.root())
            .map(|id| result.tree.node(id).kind)
            .collect();
        assert!(kinds.contains(&CstKind::VarDecl));
    }

    #[test]
    fn mutivar_declaration() {
        assert_eq!(kinds_under_root("mutivar a, b = f();"), vec![CstKind::MultiVarDecl]);
    }

    #[test]
    fn control_flow() {
        assert_eq!(
            kinds_under_root("if (a) { b; } else { c; } while (d) e; for (int i = 0; i < 9; i = i + 1) {} defer { x; }"),
            vec![CstKind::IfStmt, CstKind::WhileStmt, CstKind::ForStmt, CstKind::DeferStmt]
        );
    }

    #[test]
    fn every_token_is_reachable_or_skipped() {
        // Progress guard: wildly malformed input terminates.
        let result = parse_source("((((( class ] ) } mutivar");
        assert!(result.tree.len() > 0);
    }

    #[test]
    fn union_and_generic_types() {
        assert_eq!(kinds_under_root("list<int> xs;"), vec![CstKind::VarDecl]);
        assert_eq!(kinds_under_root("map<string, list<int>> m;"), vec![CstKind::VarDecl]);
        assert_eq!(kinds_under_root("int|null maybe;"), vec![CstKind::VarDecl]);
    }
}
