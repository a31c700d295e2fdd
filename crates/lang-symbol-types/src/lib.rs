//! Symbol taxonomy and the Lang type system.
//!
//! [`TypeInfo`] is the sum type every inferred or declared type lives in.
//! Unions are canonical (deduplicated, sorted), tuples are
//! arity-validated, equality is structural everywhere except classes,
//! which compare nominally by name. [`is_assignable`] implements the
//! ordered assignability rules; its verdict tells callers whether to
//! attach a warning diagnostic.

mod assignability;
mod type_info;

pub use assignability::{Assignability, is_assignable};
pub use type_info::{ClassRef, FunctionSignature, ModuleRef, ReturnType, TypeError, TypeInfo};

use serde::{Deserialize, Serialize};

/// Index of a scope in a symbol table's scope arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u32);

impl ScopeId {
    /// Arena slot index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a symbol in a symbol table's symbol arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// Arena slot index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Classification of symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
    Class,
    Module,
    TypeAlias,
    BuiltinFunction,
    BuiltinType,
}

impl SymbolKind {
    /// Human-readable label, shown in hover output.
    pub fn label(&self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::Module => "module",
            SymbolKind::TypeAlias => "type alias",
            SymbolKind::BuiltinFunction => "builtin function",
            SymbolKind::BuiltinType => "builtin type",
        }
    }

    /// The LSP `CompletionItemKind` code for this symbol kind.
    pub fn completion_item_kind(&self) -> u8 {
        match self {
            SymbolKind::Variable => 6,
            SymbolKind::Parameter => 6,
            SymbolKind::Function => 3,
            SymbolKind::Class => 7,
            SymbolKind::Module => 9,
            SymbolKind::TypeAlias => 8,
            SymbolKind::BuiltinFunction => 3,
            SymbolKind::BuiltinType => 14,
        }
    }
}

/// Kinds of scopes in the scope tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScopeKind {
    Global,
    Module,
    Function,
    Class,
    Block,
}
