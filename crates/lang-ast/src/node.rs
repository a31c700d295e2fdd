//! AST node kinds and operators.

use crate::interner::NameId;
use lang_position_tracking::Span;
use serde::{Deserialize, Serialize};

/// Index of a node in one file's [`crate::Ast`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Arena slot index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `#x` — length of a list, map, string, or tuple
    Len,
}

/// Binary operators, including assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// `..` string concatenation
    Concat,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// `&&`, short-circuit
    And,
    /// `||`, short-circuit
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    /// `=`
    Assign,
}

impl BinaryOp {
    /// Operator text as written in source, for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Concat => "..",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Assign => "=",
        }
    }
}

/// One name in a named import list: `a`, `b as c`, or `type T`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportItem {
    /// Name as exported by the target module
    pub name: NameId,
    /// Span of `name` in this file
    pub name_span: Span,
    /// Local alias (`b as c`), if any
    pub alias: Option<NameId>,
    /// `type T` import
    pub is_type: bool,
}

/// What an import statement binds.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportTarget {
    /// `import * as X from "path"`
    Wildcard {
        /// The module alias `X`
        alias: NameId,
        /// Span of the alias token
        alias_span: Span,
    },
    /// `import { a, b as c, type T } from "path"`
    Named {
        /// The listed names
        items: Vec<ImportItem>,
    },
}

/// The payload of every AST node.
///
/// Kinds group into the compilation unit, declarations, statements,
/// expressions, and type references. Error and missing variants keep the
/// tree total on any input.
#[derive(Debug, Clone, PartialEq)]
pub enum AstKind {
    // ===== Unit =====
    /// Root of a file. Treated as containing every in-bounds offset even
    /// when its own range is damaged by a top-level parse error.
    CompilationUnit {
        /// Top-level declarations and statements
        items: Vec<NodeId>,
    },

    // ===== Declarations =====
    /// `import … from "path";`
    ImportDecl {
        /// The raw path string (without quotes)
        path: NameId,
        /// Span of the path literal, for import diagnostics
        path_span: Span,
        /// Wildcard or named binding list
        target: ImportTarget,
    },
    /// A variable or field declaration. Flags carry `const`, `global`,
    /// `static`, and `export`.
    VarDecl {
        name: NameId,
        name_span: Span,
        /// Declared type annotation
        ty: NodeId,
        /// Initializer, if written
        init: Option<NodeId>,
        /// Preceding `///` doc text
        doc: Option<NameId>,
    },
    /// `mutivar a, b = f();` — declares every name from one multi-return
    /// initializer.
    MultiVarDecl {
        names: Vec<(NameId, Span)>,
        init: NodeId,
    },
    /// A function or method declaration. Methods carry `IS_STATIC` when
    /// declared `static`.
    FuncDecl {
        name: NameId,
        name_span: Span,
        params: Vec<NodeId>,
        return_type: NodeId,
        body: NodeId,
        /// `(…, ...)` variadic marker
        is_variadic: bool,
        doc: Option<NameId>,
    },
    /// One parameter of a function, method, or lambda.
    Param {
        name: NameId,
        name_span: Span,
        ty: NodeId,
    },
    /// `class Name { … }`
    ClassDecl {
        name: NameId,
        name_span: Span,
        members: Vec<NodeId>,
        doc: Option<NameId>,
    },
    /// `type Name = T;`
    TypeAliasDecl {
        name: NameId,
        name_span: Span,
        ty: NodeId,
        doc: Option<NameId>,
    },
    /// A declaration the parser could not form.
    ErrorDecl {
        message: String,
    },

    // ===== Statements =====
    /// `{ … }`
    Block {
        stmts: Vec<NodeId>,
    },
    IfStmt {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    WhileStmt {
        cond: NodeId,
        body: NodeId,
    },
    ForStmt {
        init: Option<NodeId>,
        cond: Option<NodeId>,
        step: Option<NodeId>,
        body: NodeId,
    },
    /// `return a, b;` — zero or more values
    ReturnStmt {
        values: Vec<NodeId>,
    },
    BreakStmt,
    ContinueStmt,
    /// `defer { … }` — body runs at function exit, analyzed in the
    /// enclosing function scope
    DeferStmt {
        body: NodeId,
    },
    ExprStmt {
        expr: NodeId,
    },
    /// A statement the parser could not form.
    ErrorStmt {
        message: String,
    },

    // ===== Expressions =====
    IntLiteral {
        value: i64,
    },
    FloatLiteral {
        value: f64,
    },
    StringLiteral {
        value: NameId,
    },
    BoolLiteral {
        value: bool,
    },
    NullLiteral,
    Identifier {
        name: NameId,
    },
    ThisExpr,
    UnaryExpr {
        op: UnaryOp,
        operand: NodeId,
    },
    BinaryExpr {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    CallExpr {
        callee: NodeId,
        args: Vec<NodeId>,
    },
    /// `base.member`. An `INCOMPLETE` node has the empty member name and
    /// keeps the dot in its span so completion can still locate it.
    MemberAccessExpr {
        base: NodeId,
        member: NameId,
        member_span: Span,
    },
    /// `base:member` — method lookup form.
    ColonLookupExpr {
        base: NodeId,
        member: NameId,
        member_span: Span,
    },
    IndexExpr {
        base: NodeId,
        index: NodeId,
    },
    /// `new A.B.C(args)`. A missing qualified name synthesizes a single
    /// empty segment so completion still sees the prefix.
    NewExpr {
        path: Vec<(NameId, Span)>,
        args: Vec<NodeId>,
    },
    /// `function (params) { … }`
    LambdaExpr {
        params: Vec<NodeId>,
        body: NodeId,
    },
    /// An expression the parser could not form.
    ErrorExpr {
        message: String,
    },
    /// An expected expression that is absent entirely.
    MissingExpr,

    // ===== Type references =====
    /// A named type: builtin keyword or class/alias name.
    TypeName {
        name: NameId,
    },
    /// `list<T>`
    ListTypeNode {
        elem: NodeId,
    },
    /// `map<K, V>`
    MapTypeNode {
        key: NodeId,
        value: NodeId,
    },
    /// `A | B | …` in annotation position
    UnionTypeNode {
        members: Vec<NodeId>,
    },
    /// A type reference the parser could not form.
    ErrorType {
        message: String,
    },
}

impl AstKind {
    /// Child nodes in source order. Drives every traversal, including the
    /// deepest-containing-node search.
    pub fn child_ids(&self) -> Vec<NodeId> {
        use AstKind::*;
        match self {
            CompilationUnit { items } => items.clone(),
            ImportDecl { .. } => Vec::new(),
            VarDecl { ty, init, .. } => {
                let mut out = vec![*ty];
                out.extend(init);
                out
            }
            MultiVarDecl { init, .. } => vec![*init],
            FuncDecl { params, return_type, body, .. } => {
                let mut out = params.clone();
                out.push(*return_type);
                out.push(*body);
                out
            }
            Param { ty, .. } => vec![*ty],
            ClassDecl { members, .. } => members.clone(),
            TypeAliasDecl { ty, .. } => vec![*ty],
            ErrorDecl { .. } => Vec::new(),
            Block { stmts } => stmts.clone(),
            IfStmt { cond, then_branch, else_branch } => {
                let mut out = vec![*cond, *then_branch];
                out.extend(else_branch);
                out
            }
            WhileStmt { cond, body } => vec![*cond, *body],
            ForStmt { init, cond, step, body } => {
                let mut out = Vec::new();
                out.extend(init);
                out.extend(cond);
                out.extend(step);
                out.push(*body);
                out
            }
            ReturnStmt { values } => values.clone(),
            BreakStmt | ContinueStmt => Vec::new(),
            DeferStmt { body } => vec![*body],
            ExprStmt { expr } => vec![*expr],
            ErrorStmt { .. } => Vec::new(),
            IntLiteral { .. } | FloatLiteral { .. } | StringLiteral { .. } | BoolLiteral { .. }
            | NullLiteral | Identifier { .. } | ThisExpr => Vec::new(),
            UnaryExpr { operand, .. } => vec![*operand],
            BinaryExpr { lhs, rhs, .. } => vec![*lhs, *rhs],
            CallExpr { callee, args } => {
                let mut out = vec![*callee];
                out.extend(args.iter().copied());
                out
            }
            MemberAccessExpr { base, .. } | ColonLookupExpr { base, .. } => vec![*base],
            IndexExpr { base, index } => vec![*base, *index],
            NewExpr { args, .. } => args.clone(),
            LambdaExpr { params, body } => {
                let mut out = params.clone();
                out.push(*body);
                out
            }
            ErrorExpr { .. } | MissingExpr => Vec::new(),
            TypeName { .. } => Vec::new(),
            ListTypeNode { elem } => vec![*elem],
            MapTypeNode { key, value } => vec![*key, *value],
            UnionTypeNode { members } => members.clone(),
            ErrorType { .. } => Vec::new(),
        }
    }

    /// Whether this kind is an expression.
    pub fn is_expr(&self) -> bool {
        use AstKind::*;
        matches!(
            self,
            IntLiteral { .. }
                | FloatLiteral { .. }
                | StringLiteral { .. }
                | BoolLiteral { .. }
                | NullLiteral
                | Identifier { .. }
                | ThisExpr
                | UnaryExpr { .. }
                | BinaryExpr { .. }
                | CallExpr { .. }
                | MemberAccessExpr { .. }
                | ColonLookupExpr { .. }
                | IndexExpr { .. }
                | NewExpr { .. }
                | LambdaExpr { .. }
                | ErrorExpr { .. }
                | MissingExpr
        )
    }

    /// Whether this kind is a type reference.
    pub fn is_type(&self) -> bool {
        use AstKind::*;
        matches!(
            self,
            TypeName { .. } | ListTypeNode { .. } | MapTypeNode { .. } | UnionTypeNode { .. } | ErrorType { .. }
        )
    }

    /// Whether this kind is one of the error/missing recovery variants.
    pub fn is_error(&self) -> bool {
        use AstKind::*;
        matches!(
            self,
            ErrorDecl { .. } | ErrorStmt { .. } | ErrorExpr { .. } | MissingExpr | ErrorType { .. }
        )
    }
}
