//! Concrete syntax tree produced by the permissive parser.
//!
//! The CST keeps every consumed token reachable: each production node
//! lists its children as a mix of sub-nodes and token indices into the
//! owning [`lang_token::TokenStream`]. The AST builder pattern-matches on
//! [`CstKind`] and the token kinds to lower this into the tolerant AST.

use lang_position_tracking::Span;

/// Index of a node in a [`CstTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CstNodeId(pub u32);

impl CstNodeId {
    /// Arena slot index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Grammar production kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CstKind {
    /// Whole file
    Unit,

    // Declarations
    ImportDecl,
    ImportItem,
    ClassDecl,
    FuncDecl,
    Param,
    VarDecl,
    MultiVarDecl,
    TypeAlias,

    // Statements
    Block,
    IfStmt,
    WhileStmt,
    ForStmt,
    ReturnStmt,
    BreakStmt,
    ContinueStmt,
    DeferStmt,
    ExprStmt,

    // Expressions
    BinaryExpr,
    UnaryExpr,
    CallExpr,
    MemberExpr,
    ColonExpr,
    IndexExpr,
    NewExpr,
    LambdaExpr,
    ParenExpr,
    Literal,
    NameRef,
    ThisExpr,

    // Type references
    TypeRef,
    ListType,
    MapType,
    UnionType,

    /// Tokens skipped during panic-mode recovery
    Error,
}

/// A child of a CST node: either a sub-production or a raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CstChild {
    /// Sub-node id
    Node(CstNodeId),
    /// Index into the token stream
    Token(usize),
}

/// One CST production node.
#[derive(Debug, Clone)]
pub struct CstNode {
    /// Production kind
    pub kind: CstKind,
    /// Byte span covering every child
    pub span: Span,
    /// Children in source order
    pub children: Vec<CstChild>,
}

/// The CST of one file.
#[derive(Debug, Clone)]
pub struct CstTree {
    nodes: Vec<CstNode>,
    root: CstNodeId,
}

impl CstTree {
    pub(crate) fn new(nodes: Vec<CstNode>, root: CstNodeId) -> Self {
        CstTree { nodes, root }
    }

    /// An empty placeholder unit covering `[0, text_len)`; produced when
    /// the parser itself fails.
    pub fn empty_unit(text_len: usize) -> Self {
        let root = CstNode { kind: CstKind::Unit, span: Span::new(0, text_len), children: Vec::new() };
        CstTree { nodes: vec![root], root: CstNodeId(0) }
    }

    /// Root node id.
    pub fn root(&self) -> CstNodeId {
        self.root
    }

    /// Look up a node.
    pub fn node(&self, id: CstNodeId) -> &CstNode {
        &self.nodes[id.index().min(self.nodes.len() - 1)]
    }

    /// Sub-node children of `id`, skipping tokens.
    pub fn node_children(&self, id: CstNodeId) -> impl Iterator<Item = CstNodeId> + '_ {
        self.node(id).children.iter().filter_map(|child| match child {
            CstChild::Node(node) => Some(*node),
            CstChild::Token(_) => None,
        })
    }

    /// Token-index children of `id`, skipping sub-nodes.
    pub fn token_children(&self, id: CstNodeId) -> impl Iterator<Item = usize> + '_ {
        self.node(id).children.iter().filter_map(|child| match child {
            CstChild::Token(token) => Some(*token),
            CstChild::Node(_) => None,
        })
    }

    /// Total node count.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is just the placeholder root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}
