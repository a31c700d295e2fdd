//! CST → tolerant AST lowering.
//!
//! The builder walks the CST post-order and calls the matching
//! [`AstFactory`] constructor for each production. It upholds the
//! never-null invariant: wherever the CST is missing an expected piece,
//! the `expect_*` helpers return an `Error`/`Missing` node instead of
//! propagating failure, and the affected parent is flagged `HAS_ERROR`.
//! Still-typable-in states (`obj.` with no member yet) become
//! `INCOMPLETE` nodes that keep the dot or colon range.

use lang_ast::{Ast, AstFactory, AstKind, BinaryOp, ImportItem, ImportTarget, NameId, NodeFlags, NodeId, UnaryOp};
use lang_parser::{CstKind, CstNodeId, CstTree, ParseResult};
use lang_position_tracking::Span;
use lang_token::{Token, TokenKind, TokenStream};
use rustc_hash::FxHashMap;

/// Lower a parse result into the tolerant AST.
pub fn build(result: &ParseResult) -> Ast {
    let text_len = result.tokens.tokens().last().map(|t| t.span.end).unwrap_or(0);
    let mut builder = Builder {
        tree: &result.tree,
        tokens: &result.tokens,
        factory: AstFactory::new(),
        docs: doc_attachment_map(result),
    };
    let root = builder.build_unit(result.tree.root(), text_len);
    builder.factory.finish(Some(root), text_len)
}

/// Map from "byte offset of the first token after a `///` run" to the
/// run's text; a declaration starting at that offset owns the docs.
fn doc_attachment_map(result: &ParseResult) -> FxHashMap<usize, String> {
    let mut map = FxHashMap::default();
    let tokens = result.tokens.tokens();
    for doc in &result.doc_comments {
        let next = tokens.iter().find(|t| t.span.start >= doc.span.end && t.kind != TokenKind::Eof);
        if let Some(token) = next {
            map.insert(token.span.start, doc.text.clone());
        }
    }
    map
}

struct Builder<'a> {
    tree: &'a CstTree,
    tokens: &'a TokenStream,
    factory: AstFactory,
    docs: FxHashMap<usize, String>,
}

impl<'a> Builder<'a> {
    // ===== Units and items =====

    fn build_unit(&mut self, id: CstNodeId, text_len: usize) -> NodeId {
        let items: Vec<NodeId> = self
            .tree
            .node_children(id)
            .collect::<Vec<_>>()
            .into_iter()
            .map(|child| {
                // Recovery residue in declaration position becomes an
                // error declaration; inside statements it stays a
                // statement-shaped error node.
                if self.tree.node(child).kind == CstKind::Error {
                    let span = self.tree.node(child).span;
                    self.factory.error_decl(span, "unparsed input")
                } else {
                    self.build_item(child)
                }
            })
            .collect();
        self.factory.alloc(AstKind::CompilationUnit { items }, Span::new(0, text_len))
    }

    /// Build a declaration or statement node.
    fn build_item(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        match self.tree.node(id).kind {
            CstKind::ImportDecl => self.build_import(id),
            CstKind::ClassDecl => self.build_class(id),
            CstKind::FuncDecl => self.build_func(id),
            CstKind::VarDecl => self.build_var(id),
            CstKind::MultiVarDecl => self.build_mutivar(id),
            CstKind::TypeAlias => self.build_type_alias(id),
            CstKind::Block => self.build_block(id),
            CstKind::IfStmt => self.build_if(id),
            CstKind::WhileStmt => self.build_while(id),
            CstKind::ForStmt => self.build_for(id),
            CstKind::ReturnStmt => self.build_return(id),
            CstKind::BreakStmt => self.factory.alloc(AstKind::BreakStmt, span),
            CstKind::ContinueStmt => self.factory.alloc(AstKind::ContinueStmt, span),
            CstKind::DeferStmt => self.build_defer(id),
            CstKind::ExprStmt => self.build_expr_stmt(id),
            CstKind::Error => self.factory.error_stmt(span, "unparsed input"),
            _ => {
                // An expression production directly in item position.
                let expr = self.build_expr(id);
                self.factory.alloc(AstKind::ExprStmt { expr }, span)
            }
        }
    }

    fn build_import(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let mut flags = self.modifier_flags(id);
        let tokens: Vec<(usize, Token)> = self.token_children(id);

        let path_token = tokens.iter().find(|(_, t)| t.kind == TokenKind::StringLiteral);
        let (path, path_span) = match path_token {
            Some((_, token)) => {
                let raw = unquote(&token.text);
                (self.factory.intern(&raw), token.span)
            }
            None => {
                flags.insert(NodeFlags::HAS_ERROR);
                (lang_ast::Interner::empty(), Span::empty(span.end))
            }
        };

        let target = if tokens.iter().any(|(_, t)| t.kind == TokenKind::Star) {
            // `import * as X` — alias is the identifier before `from`.
            let alias = tokens
                .iter()
                .find(|(_, t)| t.kind == TokenKind::Ident)
                .map(|(_, t)| (self.factory.intern(&t.text), t.span));
            match alias {
                Some((alias, alias_span)) => ImportTarget::Wildcard { alias, alias_span },
                None => {
                    flags.insert(NodeFlags::HAS_ERROR);
                    ImportTarget::Wildcard {
                        alias: lang_ast::Interner::empty(),
                        alias_span: Span::empty(span.end),
                    }
                }
            }
        } else {
            let mut items = Vec::new();
            for child in self.tree.node_children(id).collect::<Vec<_>>() {
                if self.tree.node(child).kind != CstKind::ImportItem {
                    continue;
                }
                let child_tokens = self.token_children(child);
                let is_type = child_tokens.iter().any(|(_, t)| t.kind == TokenKind::KwType);
                let mut idents = child_tokens.iter().filter(|(_, t)| t.kind == TokenKind::Ident);
                match idents.next() {
                    Some((_, name_token)) => {
                        let alias = idents.next().map(|(_, t)| self.factory.intern(&t.text));
                        items.push(ImportItem {
                            name: self.factory.intern(&name_token.text),
                            name_span: name_token.span,
                            alias,
                            is_type,
                        });
                    }
                    None => flags.insert(NodeFlags::HAS_ERROR),
                }
            }
            ImportTarget::Named { items }
        };

        self.factory.alloc_flagged(AstKind::ImportDecl { path, path_span, target }, span, flags)
    }

    fn build_class(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let mut flags = self.modifier_flags(id);
        let (name, name_span) = self.decl_name(id, &mut flags);
        let members: Vec<NodeId> = self
            .tree
            .node_children(id)
            .collect::<Vec<_>>()
            .into_iter()
            .map(|member| self.build_item(member))
            .collect();
        let doc = self.doc_for(span);
        self.factory.alloc_flagged(AstKind::ClassDecl { name, name_span, members, doc }, span, flags)
    }

    fn build_func(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let mut flags = self.modifier_flags(id);
        let (name, name_span) = self.decl_name(id, &mut flags);
        let is_variadic = self.token_children(id).iter().any(|(_, t)| t.kind == TokenKind::Ellipsis);

        let mut return_type = None;
        let mut params = Vec::new();
        let mut body = None;
        for child in self.tree.node_children(id).collect::<Vec<_>>() {
            match self.tree.node(child).kind {
                CstKind::Param => params.push(self.build_param(child)),
                CstKind::Block => body = Some(self.build_block(child)),
                kind if is_type_kind(kind) => return_type = Some(child),
                _ => {}
            }
        }
        let return_type = self.expect_type(return_type, span.start);
        let body = match body {
            Some(body) => body,
            None => {
                flags.insert(NodeFlags::HAS_ERROR);
                self.factory.error_stmt(Span::empty(span.end), "missing function body")
            }
        };
        let doc = self.doc_for(span);
        self.factory.alloc_flagged(
            AstKind::FuncDecl { name, name_span, params, return_type, body, is_variadic, doc },
            span,
            flags,
        )
    }

    fn build_param(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let mut flags = NodeFlags::empty();
        let (name, name_span) = self.decl_name(id, &mut flags);
        let ty = self.first_type_child(id);
        let ty = self.expect_type(ty, span.start);
        self.factory.alloc_flagged(AstKind::Param { name, name_span, ty }, span, flags)
    }

    fn build_var(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let mut flags = self.modifier_flags(id);
        let (name, name_span) = self.decl_name(id, &mut flags);
        let ty = self.first_type_child(id);
        let ty = self.expect_type(ty, span.start);
        let init = self
            .tree
            .node_children(id)
            .find(|c| !is_type_kind(self.tree.node(*c).kind))
            .map(|c| self.expect_expr(Some(c), span.end));
        let doc = self.doc_for(span);
        self.factory.alloc_flagged(AstKind::VarDecl { name, name_span, ty, init, doc }, span, flags)
    }

    fn build_mutivar(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let mut flags = NodeFlags::empty();
        let names: Vec<(NameId, Span)> = self
            .token_children(id)
            .into_iter()
            .filter(|(_, t)| t.kind == TokenKind::Ident)
            .map(|(_, t)| (self.factory.intern(&t.text), t.span))
            .collect();
        if names.is_empty() {
            flags.insert(NodeFlags::HAS_ERROR);
        }
        let init_child = self.tree.node_children(id).next();
        let init = self.expect_expr(init_child, span.end);
        self.factory.alloc_flagged(AstKind::MultiVarDecl { names, init }, span, flags)
    }

    fn build_type_alias(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let mut flags = self.modifier_flags(id);
        let (name, name_span) = self.decl_name(id, &mut flags);
        let ty = self.first_type_child(id);
        let ty = self.expect_type(ty, span.start);
        let doc = self.doc_for(span);
        self.factory.alloc_flagged(AstKind::TypeAliasDecl { name, name_span, ty, doc }, span, flags)
    }

    // ===== Statements =====

    fn build_block(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let stmts: Vec<NodeId> = self
            .tree
            .node_children(id)
            .collect::<Vec<_>>()
            .into_iter()
            .map(|stmt| self.build_item(stmt))
            .collect();
        self.factory.alloc(AstKind::Block { stmts }, span)
    }

    fn build_if(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let children: Vec<CstNodeId> = self.tree.node_children(id).collect();
        let cond = self.expect_expr(children.first().copied(), span.start);
        let then_branch = match children.get(1) {
            Some(child) => self.build_item(*child),
            None => self.factory.error_stmt(Span::empty(span.end), "missing `if` body"),
        };
        let else_branch = children.get(2).map(|child| self.build_item(*child));
        self.factory.alloc(AstKind::IfStmt { cond, then_branch, else_branch }, span)
    }

    fn build_while(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let children: Vec<CstNodeId> = self.tree.node_children(id).collect();
        let cond = self.expect_expr(children.first().copied(), span.start);
        let body = match children.get(1) {
            Some(child) => self.build_item(*child),
            None => self.factory.error_stmt(Span::empty(span.end), "missing `while` body"),
        };
        self.factory.alloc(AstKind::WhileStmt { cond, body }, span)
    }

    /// The `for` header children interleave with `;`/`)` tokens; a small
    /// state machine assigns each sub-node to its clause.
    fn build_for(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let mut init = None;
        let mut cond = None;
        let mut step = None;
        let mut body = None;
        let mut state = 0u8;
        for child in self.tree.node(id).children.clone() {
            match child {
                lang_parser::CstChild::Token(idx) => {
                    match self.token_at(idx).kind {
                        TokenKind::Semicolon if state < 2 => state += 1,
                        TokenKind::RParen => state = 3,
                        _ => {}
                    }
                }
                lang_parser::CstChild::Node(node) => match state {
                    0 => {
                        if self.tree.node(node).kind == CstKind::VarDecl {
                            init = Some(self.build_item(node));
                            state = 1;
                        } else {
                            let expr = self.build_expr(node);
                            let expr_span = self.factory.span_of(expr);
                            init = Some(self.factory.alloc(AstKind::ExprStmt { expr }, expr_span));
                        }
                    }
                    1 => cond = Some(self.build_expr(node)),
                    2 => step = Some(self.build_expr(node)),
                    _ => body = Some(self.build_item(node)),
                },
            }
        }
        let body = match body {
            Some(body) => body,
            None => self.factory.error_stmt(Span::empty(span.end), "missing `for` body"),
        };
        self.factory.alloc(AstKind::ForStmt { init, cond, step, body }, span)
    }

    fn build_return(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let values: Vec<NodeId> = self
            .tree
            .node_children(id)
            .collect::<Vec<_>>()
            .into_iter()
            .map(|value| self.expect_expr(Some(value), span.end))
            .collect();
        self.factory.alloc(AstKind::ReturnStmt { values }, span)
    }

    fn build_defer(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let body = match self.tree.node_children(id).next() {
            Some(block) => self.build_item(block),
            None => self.factory.error_stmt(Span::empty(span.end), "missing `defer` body"),
        };
        self.factory.alloc(AstKind::DeferStmt { body }, span)
    }

    fn build_expr_stmt(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let expr_child = self.tree.node_children(id).next();
        let expr = self.expect_expr(expr_child, span.start);
        self.factory.alloc(AstKind::ExprStmt { expr }, span)
    }

    // ===== Expressions =====

    fn build_expr(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        match self.tree.node(id).kind {
            CstKind::Literal => self.build_literal(id),
            CstKind::NameRef => {
                let name = match self.token_children(id).first() {
                    Some((_, token)) => self.factory.intern(&token.text),
                    None => lang_ast::Interner::empty(),
                };
                self.factory.alloc(AstKind::Identifier { name }, span)
            }
            CstKind::ThisExpr => self.factory.alloc(AstKind::ThisExpr, span),
            CstKind::UnaryExpr => {
                let op = match self.token_children(id).first().map(|(_, t)| t.kind) {
                    Some(TokenKind::Minus) => UnaryOp::Neg,
                    Some(TokenKind::Hash) => UnaryOp::Len,
                    _ => UnaryOp::Not,
                };
                let operand_child = self.tree.node_children(id).next();
                let operand = self.expect_expr(operand_child, span.end);
                self.factory.alloc(AstKind::UnaryExpr { op, operand }, span)
            }
            CstKind::BinaryExpr => self.build_binary(id),
            CstKind::CallExpr => {
                let children: Vec<CstNodeId> = self.tree.node_children(id).collect();
                let callee = self.expect_expr(children.first().copied(), span.start);
                let args: Vec<NodeId> =
                    children[1..].iter().map(|arg| self.expect_expr(Some(*arg), span.end)).collect();
                self.factory.alloc(AstKind::CallExpr { callee, args }, span)
            }
            CstKind::MemberExpr | CstKind::ColonExpr => self.build_member(id),
            CstKind::IndexExpr => {
                let children: Vec<CstNodeId> = self.tree.node_children(id).collect();
                let base = self.expect_expr(children.first().copied(), span.start);
                let index = self.expect_expr(children.get(1).copied(), span.end);
                self.factory.alloc(AstKind::IndexExpr { base, index }, span)
            }
            CstKind::NewExpr => self.build_new(id),
            CstKind::LambdaExpr => {
                let mut params = Vec::new();
                let mut body = None;
                for child in self.tree.node_children(id).collect::<Vec<_>>() {
                    match self.tree.node(child).kind {
                        CstKind::Param => params.push(self.build_param(child)),
                        CstKind::Block => body = Some(self.build_block(child)),
                        _ => {}
                    }
                }
                let mut flags = NodeFlags::empty();
                let body = match body {
                    Some(body) => body,
                    None => {
                        flags.insert(NodeFlags::HAS_ERROR);
                        self.factory.error_stmt(Span::empty(span.end), "missing lambda body")
                    }
                };
                self.factory.alloc_flagged(AstKind::LambdaExpr { params, body }, span, flags)
            }
            // Parentheses are purely concrete; lower straight through.
            CstKind::ParenExpr => {
                let inner = self.tree.node_children(id).next();
                self.expect_expr(inner, span.start)
            }
            CstKind::Error => self.factory.error_expr(span, "unparsed expression"),
            _ => self.factory.error_expr(span, "expected expression"),
        }
    }

    fn build_literal(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let Some((_, token)) = self.token_children(id).into_iter().next() else {
            return self.factory.error_expr(span, "empty literal");
        };
        match token.kind {
            TokenKind::IntLiteral => match token.text.parse::<i64>() {
                Ok(value) => self.factory.alloc(AstKind::IntLiteral { value }, span),
                Err(_) => self.factory.alloc_flagged(
                    AstKind::IntLiteral { value: 0 },
                    span,
                    NodeFlags::HAS_ERROR,
                ),
            },
            TokenKind::FloatLiteral => {
                let value = token.text.parse::<f64>().unwrap_or(0.0);
                self.factory.alloc(AstKind::FloatLiteral { value }, span)
            }
            TokenKind::StringLiteral => {
                let text = unescape(&unquote(&token.text));
                let value = self.factory.intern(&text);
                self.factory.alloc(AstKind::StringLiteral { value }, span)
            }
            TokenKind::KwTrue => self.factory.alloc(AstKind::BoolLiteral { value: true }, span),
            TokenKind::KwFalse => self.factory.alloc(AstKind::BoolLiteral { value: false }, span),
            TokenKind::KwNull => self.factory.alloc(AstKind::NullLiteral, span),
            _ => self.factory.error_expr(span, "unrecognized literal"),
        }
    }

    fn build_binary(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let children: Vec<CstNodeId> = self.tree.node_children(id).collect();
        let lhs = self.expect_expr(children.first().copied(), span.start);
        let rhs = self.expect_expr(children.get(1).copied(), span.end);
        let op_tokens = self.token_children(id);
        let op = match op_tokens.as_slice() {
            [(_, a), (_, b)] if a.kind == TokenKind::Lt && b.kind == TokenKind::Lt => BinaryOp::Shl,
            [(_, a), (_, b)] if a.kind == TokenKind::Gt && b.kind == TokenKind::Gt => BinaryOp::Shr,
            [(_, token), ..] => binary_op(token.kind),
            [] => BinaryOp::Assign,
        };
        self.factory.alloc(AstKind::BinaryExpr { op, lhs, rhs }, span)
    }

    fn build_member(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let is_dot = self.tree.node(id).kind == CstKind::MemberExpr;
        let base_child = self.tree.node_children(id).next();
        let base = self.expect_expr(base_child, span.start);
        let tokens = self.token_children(id);
        let member_token = tokens.iter().find(|(_, t)| t.kind == TokenKind::Ident);
        let (member, member_span, flags) = match member_token {
            Some((_, token)) => (self.factory.intern(&token.text), token.span, NodeFlags::empty()),
            None => {
                // Keep the `.`/`:` range so completion still finds this
                // node when the cursor sits right after the dot.
                let dot_end = tokens
                    .iter()
                    .find(|(_, t)| matches!(t.kind, TokenKind::Dot | TokenKind::Colon))
                    .map(|(_, t)| t.span.end)
                    .unwrap_or(span.end);
                (lang_ast::Interner::empty(), Span::empty(dot_end), NodeFlags::INCOMPLETE)
            }
        };
        let kind = if is_dot {
            AstKind::MemberAccessExpr { base, member, member_span }
        } else {
            AstKind::ColonLookupExpr { base, member, member_span }
        };
        self.factory.alloc_flagged(kind, span, flags)
    }

    fn build_new(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        let tokens = self.token_children(id);
        let mut path: Vec<(NameId, Span)> = tokens
            .iter()
            .filter(|(_, t)| t.kind == TokenKind::Ident)
            .map(|(_, t)| (self.factory.intern(&t.text), t.span))
            .collect();
        let mut flags = NodeFlags::empty();
        if path.is_empty() {
            // Missing qualified name: synthesize one empty segment so
            // completion still sees the `new ` prefix.
            let new_end = tokens
                .iter()
                .find(|(_, t)| t.kind == TokenKind::KwNew)
                .map(|(_, t)| t.span.end)
                .unwrap_or(span.start);
            path.push((lang_ast::Interner::empty(), Span::empty(new_end)));
            flags.insert(NodeFlags::INCOMPLETE);
        }
        let args: Vec<NodeId> = self
            .tree
            .node_children(id)
            .collect::<Vec<_>>()
            .into_iter()
            .map(|arg| self.expect_expr(Some(arg), span.end))
            .collect();
        self.factory.alloc_flagged(AstKind::NewExpr { path, args }, span, flags)
    }

    // ===== Type references =====

    fn build_type(&mut self, id: CstNodeId) -> NodeId {
        let span = self.tree.node(id).span;
        match self.tree.node(id).kind {
            CstKind::TypeRef => {
                let name = match self.token_children(id).first() {
                    Some((_, token)) => self.factory.intern(&token.text),
                    None => lang_ast::Interner::empty(),
                };
                self.factory.alloc(AstKind::TypeName { name }, span)
            }
            CstKind::ListType => {
                let elem_child = self.tree.node_children(id).next();
                let elem = self.expect_type(elem_child, span.end);
                self.factory.alloc(AstKind::ListTypeNode { elem }, span)
            }
            CstKind::MapType => {
                let children: Vec<CstNodeId> = self.tree.node_children(id).collect();
                let key = self.expect_type(children.first().copied(), span.end);
                let value = self.expect_type(children.get(1).copied(), span.end);
                self.factory.alloc(AstKind::MapTypeNode { key, value }, span)
            }
            CstKind::UnionType => {
                let members: Vec<NodeId> = self
                    .tree
                    .node_children(id)
                    .collect::<Vec<_>>()
                    .into_iter()
                    .map(|member| self.expect_type(Some(member), span.end))
                    .collect();
                self.factory.alloc(AstKind::UnionTypeNode { members }, span)
            }
            CstKind::Error => self.factory.error_type(span, "unparsed type"),
            _ => self.factory.error_type(span, "expected type"),
        }
    }

    // ===== Expect helpers =====

    /// Build an expression from `id`, or a `MissingExpr` at `at` when the
    /// child is absent.
    fn expect_expr(&mut self, id: Option<CstNodeId>, at: usize) -> NodeId {
        match id {
            Some(id) => self.build_expr(id),
            None => self.factory.missing_expr(at),
        }
    }

    /// Build a type reference from `id`, or an `ErrorType` at `at` when
    /// the child is absent.
    fn expect_type(&mut self, id: Option<CstNodeId>, at: usize) -> NodeId {
        match id {
            Some(id) => self.build_type(id),
            None => self.factory.error_type(Span::empty(at), "missing type"),
        }
    }

    // ===== Shared pieces =====

    fn token_children(&self, id: CstNodeId) -> Vec<(usize, Token)> {
        self.tree.token_children(id).map(|idx| (idx, self.token_at(idx).clone())).collect()
    }

    fn token_at(&self, idx: usize) -> &Token {
        static FALLBACK: std::sync::OnceLock<Token> = std::sync::OnceLock::new();
        self.tokens.tokens().get(idx).unwrap_or_else(|| {
            FALLBACK.get_or_init(|| Token::new(TokenKind::Eof, Span::empty(0), ""))
        })
    }

    fn modifier_flags(&self, id: CstNodeId) -> NodeFlags {
        let mut flags = NodeFlags::empty();
        for (_, token) in self.token_children(id) {
            match token.kind {
                TokenKind::KwConst => flags.insert(NodeFlags::IS_CONST),
                TokenKind::KwGlobal => flags.insert(NodeFlags::IS_GLOBAL),
                TokenKind::KwStatic => flags.insert(NodeFlags::IS_STATIC),
                TokenKind::KwExport => flags.insert(NodeFlags::IS_EXPORT),
                _ => {}
            }
        }
        flags
    }

    /// The declared name of a decl-shaped node: its first `Ident` token.
    /// Missing names flag the declaration and use the empty name.
    fn decl_name(&mut self, id: CstNodeId, flags: &mut NodeFlags) -> (NameId, Span) {
        match self.token_children(id).iter().find(|(_, t)| t.kind == TokenKind::Ident) {
            Some((_, token)) => (self.factory.intern(&token.text), token.span),
            None => {
                flags.insert(NodeFlags::HAS_ERROR);
                (lang_ast::Interner::empty(), Span::empty(self.tree.node(id).span.start))
            }
        }
    }

    fn first_type_child(&self, id: CstNodeId) -> Option<CstNodeId> {
        self.tree.node_children(id).find(|c| is_type_kind(self.tree.node(*c).kind))
    }

    fn doc_for(&mut self, span: Span) -> Option<NameId> {
        let text = self.docs.get(&span.start).cloned();
        text.map(|text| self.factory.intern(&text))
    }
}

fn is_type_kind(kind: CstKind) -> bool {
    matches!(kind, CstKind::TypeRef | CstKind::ListType | CstKind::MapType | CstKind::UnionType)
        || kind == CstKind::Error
}

fn binary_op(kind: TokenKind) -> BinaryOp {
    match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Concat => BinaryOp::Concat,
        TokenKind::Eq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::AndAnd => BinaryOp::And,
        TokenKind::OrOr => BinaryOp::Or,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Caret => BinaryOp::BitXor,
        _ => BinaryOp::Assign,
    }
}

fn unquote(text: &str) -> String {
    let trimmed = text
        .strip_prefix('"')
        .or_else(|| text.strip_prefix('\''))
        .unwrap_or(text);
    let trimmed = trimmed
        .strip_suffix('"')
        .or_else(|| trimmed.strip_suffix('\''))
        .unwrap_or(trimmed);
    trimmed.to_string()
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
