//! Node arena and the typed factory the AST builder uses.

use crate::flags::NodeFlags;
use crate::interner::{Interner, NameId};
use crate::node::{AstKind, NodeId};
use lang_position_tracking::Span;

/// One allocated AST node.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    /// Payload and children
    pub kind: AstKind,
    /// Byte span in the source file
    pub span: Span,
    /// Error/incompleteness/modifier flags
    pub flags: NodeFlags,
}

/// The finished, immutable AST of one file.
///
/// All nodes live in one `Vec` arena; [`NodeId`]s are stable for the
/// lifetime of the `Ast` and the whole allocation is dropped at once when
/// the file is closed or re-analyzed.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<AstNode>,
    interner: Interner,
    root: NodeId,
}

impl Ast {
    /// The compilation-unit root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node. Ids always originate from this arena; a stale id
    /// from another file resolves to the root rather than panicking.
    pub fn node(&self, id: NodeId) -> &AstNode {
        self.nodes.get(id.index()).unwrap_or(&self.nodes[self.root.index()])
    }

    /// Resolve interned text.
    pub fn name(&self, id: NameId) -> &str {
        self.interner.resolve(id)
    }

    /// Child ids of `id` in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.node(id).kind.child_ids()
    }

    /// Total node count.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds only the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Every node id in allocation order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Depth-first preorder walk from the root.
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            out.push(id);
            let children = self.children(id);
            for child in children.into_iter().rev() {
                stack.push(child);
            }
        }
        out
    }
}

/// Builds one file's AST. Exposes a typed constructor per kind; the
/// error and missing constructors set [`NodeFlags::HAS_ERROR`] so no
/// caller has to remember to.
#[derive(Debug, Default)]
pub struct AstFactory {
    nodes: Vec<AstNode>,
    interner: Interner,
}

impl AstFactory {
    /// Create an empty factory with a fresh interner.
    pub fn new() -> Self {
        AstFactory { nodes: Vec::new(), interner: Interner::new() }
    }

    /// Intern a string for use in node payloads.
    pub fn intern(&mut self, text: &str) -> NameId {
        self.interner.intern(text)
    }

    /// Allocate a node with explicit flags.
    pub fn alloc_flagged(&mut self, kind: AstKind, span: Span, flags: NodeFlags) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(AstNode { kind, span, flags });
        id
    }

    /// Allocate a node with empty flags.
    pub fn alloc(&mut self, kind: AstKind, span: Span) -> NodeId {
        self.alloc_flagged(kind, span, NodeFlags::empty())
    }

    /// Add flags to an already-allocated node.
    pub fn add_flags(&mut self, id: NodeId, flags: NodeFlags) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.flags.insert(flags);
        }
    }

    /// Widen a node's span to cover `span`. The builder uses this to keep
    /// parent ranges covering late-arriving children.
    pub fn cover_span(&mut self, id: NodeId, span: Span) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.span = node.span.cover(span);
        }
    }

    /// Span of an already-allocated node.
    pub fn span_of(&self, id: NodeId) -> Span {
        self.nodes.get(id.index()).map(|n| n.span).unwrap_or_default()
    }

    /// Kind of an already-allocated node.
    pub fn kind_of(&self, id: NodeId) -> &AstKind {
        &self.nodes[id.index()].kind
    }

    /// An expression error node carrying a recovery message.
    pub fn error_expr(&mut self, span: Span, message: impl Into<String>) -> NodeId {
        self.alloc_flagged(AstKind::ErrorExpr { message: message.into() }, span, NodeFlags::HAS_ERROR)
    }

    /// A statement error node.
    pub fn error_stmt(&mut self, span: Span, message: impl Into<String>) -> NodeId {
        self.alloc_flagged(AstKind::ErrorStmt { message: message.into() }, span, NodeFlags::HAS_ERROR)
    }

    /// A declaration error node.
    pub fn error_decl(&mut self, span: Span, message: impl Into<String>) -> NodeId {
        self.alloc_flagged(AstKind::ErrorDecl { message: message.into() }, span, NodeFlags::HAS_ERROR)
    }

    /// A type-reference error node.
    pub fn error_type(&mut self, span: Span, message: impl Into<String>) -> NodeId {
        self.alloc_flagged(AstKind::ErrorType { message: message.into() }, span, NodeFlags::HAS_ERROR)
    }

    /// The marker for an expression that is absent entirely.
    pub fn missing_expr(&mut self, offset: usize) -> NodeId {
        self.alloc_flagged(AstKind::MissingExpr, Span::empty(offset), NodeFlags::HAS_ERROR)
    }

    /// Finish the arena. If `root` was never allocated (total parser
    /// failure), an empty compilation unit is synthesized so the
    /// never-null invariant holds even then.
    pub fn finish(mut self, root: Option<NodeId>, text_len: usize) -> Ast {
        let root = match root {
            Some(root) if root.index() < self.nodes.len() => root,
            _ => {
                let id = NodeId(self.nodes.len() as u32);
                self.nodes.push(AstNode {
                    kind: AstKind::CompilationUnit { items: Vec::new() },
                    span: Span::new(0, text_len),
                    flags: NodeFlags::HAS_ERROR,
                });
                id
            }
        };
        Ast { nodes: self.nodes, interner: self.interner, root }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_builds_and_finishes() {
        let mut factory = AstFactory::new();
        let name = factory.intern("x");
        let ident = factory.alloc(AstKind::Identifier { name }, Span::new(0, 1));
        let stmt = factory.alloc(AstKind::ExprStmt { expr: ident }, Span::new(0, 2));
        let root = factory.alloc(AstKind::CompilationUnit { items: vec![stmt] }, Span::new(0, 2));
        let ast = factory.finish(Some(root), 2);
        assert_eq!(ast.root(), root);
        assert_eq!(ast.children(root), vec![stmt]);
        assert_eq!(ast.name(name), "x");
    }

    #[test]
    fn error_nodes_carry_has_error() {
        let mut factory = AstFactory::new();
        let err = factory.error_expr(Span::new(3, 4), "expected expression");
        let missing = factory.missing_expr(9);
        let root = factory.alloc(AstKind::CompilationUnit { items: vec![] }, Span::new(0, 9));
        let ast = factory.finish(Some(root), 9);
        assert!(ast.node(err).flags.contains(NodeFlags::HAS_ERROR));
        assert!(ast.node(missing).flags.contains(NodeFlags::HAS_ERROR));
        assert_eq!(ast.node(missing).span, Span::empty(9));
    }

    #[test]
    fn finish_without_root_synthesizes_unit() {
        let factory = AstFactory::new();
        let ast = factory.finish(None, 7);
        assert!(matches!(ast.node(ast.root()).kind, AstKind::CompilationUnit { .. }));
        assert!(ast.node(ast.root()).flags.contains(NodeFlags::HAS_ERROR));
        assert_eq!(ast.node(ast.root()).span, Span::new(0, 7));
    }

    #[test]
    fn preorder_visits_every_node_once() {
        let mut factory = AstFactory::new();
        let name = factory.intern("y");
        let a = factory.alloc(AstKind::Identifier { name }, Span::new(0, 1));
        let b = factory.alloc(AstKind::UnaryExpr { op: crate::UnaryOp::Neg, operand: a }, Span::new(0, 1));
        let stmt = factory.alloc(AstKind::ExprStmt { expr: b }, Span::new(0, 2));
        let root = factory.alloc(AstKind::CompilationUnit { items: vec![stmt] }, Span::new(0, 2));
        let ast = factory.finish(Some(root), 2);
        let order = ast.preorder();
        assert_eq!(order.len(), 4);
        assert_eq!(order[0], root);
    }
}
