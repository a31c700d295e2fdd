//! Tolerant AST for Lang.
//!
//! The single strongest invariant of the whole engine lives here: every
//! AST field that can refer to a child refers to a real node. Parse
//! failures materialize as `ErrorExpr`, `ErrorStmt`, `ErrorDecl`,
//! `ErrorType`, or `MissingExpr` nodes; consumers match on kind and never
//! check for absence.
//!
//! Nodes live in a per-file arena ([`Ast`]) addressed by [`NodeId`] and
//! are dropped wholesale when the file is closed or re-analyzed.
//! Identifier and literal text is interned per file and addressed by
//! [`NameId`].

mod arena;
mod flags;
mod interner;
mod node;

pub use arena::{Ast, AstFactory, AstNode};
pub use flags::NodeFlags;
pub use interner::{Interner, NameId};
pub use node::{AstKind, BinaryOp, ImportItem, ImportTarget, NodeId, UnaryOp};
