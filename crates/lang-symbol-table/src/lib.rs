//! Scope tree and symbol records.
//!
//! Scopes and symbols live together in one owning [`SymbolTable`] and
//! refer to each other by [`ScopeId`]/[`SymbolId`] indices, so class
//! types, class scopes, and member symbols can reference each other
//! freely without reference cycles. The global scope is preseeded with
//! the builtin functions once at construction and never mutated after.

mod builtins;

pub use builtins::builtin_symbols;
pub use lang_symbol_types::{ScopeId, ScopeKind, SymbolId, SymbolKind};

use lang_ast::NodeId;
use lang_position_tracking::Span;
use lang_symbol_types::TypeInfo;
use rustc_hash::FxHashMap;

/// A lexical scope: one region of source in which a set of names is
/// resolvable.
#[derive(Debug, Clone)]
pub struct Scope {
    /// This scope's own id
    pub id: ScopeId,
    /// Classification
    pub kind: ScopeKind,
    /// Parent scope; `None` only for the global scope
    pub parent: Option<ScopeId>,
    /// Nested scopes in creation order
    pub children: Vec<ScopeId>,
    /// Symbols defined directly in this scope, by name
    pub symbols: FxHashMap<String, SymbolId>,
    /// Source range the scope covers
    pub range: Span,
    /// The AST node that owns the scope, when one exists
    pub owner: Option<NodeId>,
}

/// A named, typed definition belonging to one scope.
#[derive(Debug, Clone)]
pub struct Symbol {
    /// Symbol name
    pub name: String,
    /// Classification
    pub kind: SymbolKind,
    /// Declared or inferred type
    pub ty: TypeInfo,
    /// Range of the defining name
    pub defining_span: Span,
    /// Defining AST node in the owning file
    pub defining_node: Option<NodeId>,
    /// The scope the symbol is defined in
    pub scope: ScopeId,
    /// URI of the defining file when the symbol was bound through an
    /// import; `None` for locally defined symbols
    pub origin_uri: Option<String>,
    pub is_const: bool,
    pub is_static: bool,
    pub is_global: bool,
    pub is_exported: bool,
    /// Opaque documentation string, if any
    pub documentation: Option<String>,
}

impl Symbol {
    /// A plain local symbol with everything optional defaulted.
    pub fn new(name: impl Into<String>, kind: SymbolKind, ty: TypeInfo, defining_span: Span) -> Self {
        Symbol {
            name: name.into(),
            kind,
            ty,
            defining_span,
            defining_node: None,
            scope: ScopeId(0),
            origin_uri: None,
            is_const: false,
            is_static: false,
            is_global: false,
            is_exported: false,
            documentation: None,
        }
    }
}

/// Outcome of [`SymbolTable::define`]: duplicates are rejected and the
/// prior definition handed back so the caller can point its diagnostic
/// at both sites.
pub type DefineResult = Result<SymbolId, SymbolId>;

/// Owns every scope and symbol of one analyzed file.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Create a table whose global scope is seeded with the builtins.
    pub fn new() -> Self {
        let global = Scope {
            id: ScopeId(0),
            kind: ScopeKind::Global,
            parent: None,
            children: Vec::new(),
            symbols: FxHashMap::default(),
            range: Span::new(0, usize::MAX),
            owner: None,
        };
        let mut table = SymbolTable { scopes: vec![global], symbols: Vec::new() };
        for (name, ty, doc) in builtins::builtin_symbols() {
            let kind = match ty {
                TypeInfo::Function(_) => SymbolKind::BuiltinFunction,
                _ => SymbolKind::BuiltinType,
            };
            let mut symbol = Symbol::new(name.clone(), kind, ty.clone(), Span::empty(0));
            symbol.documentation = Some(doc.clone());
            // Builtins are installed once; the global scope has no
            // duplicates by construction.
            let _ = table.define(ScopeId(0), symbol);
        }
        table
    }

    /// The global scope id.
    pub fn global_scope(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Create a child scope of `parent`.
    pub fn push_scope(
        &mut self,
        kind: ScopeKind,
        parent: ScopeId,
        range: Span,
        owner: Option<NodeId>,
    ) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            id,
            kind,
            parent: Some(parent),
            children: Vec::new(),
            symbols: FxHashMap::default(),
            range,
            owner,
        });
        if let Some(parent) = self.scopes.get_mut(parent.index()) {
            parent.children.push(id);
        }
        id
    }

    /// Define `symbol` in `scope`. Rejects duplicates, returning the
    /// existing symbol id as the error.
    pub fn define(&mut self, scope: ScopeId, mut symbol: Symbol) -> DefineResult {
        if let Some(&existing) = self.scopes[scope.index()].symbols.get(&symbol.name) {
            return Err(existing);
        }
        symbol.scope = scope;
        let id = SymbolId(self.symbols.len() as u32);
        let name = symbol.name.clone();
        self.symbols.push(symbol);
        self.scopes[scope.index()].symbols.insert(name, id);
        Ok(id)
    }

    /// Resolve `name` from `scope`, walking parent scopes.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(scope_id) = current {
            let scope = self.scope(scope_id)?;
            if let Some(&id) = scope.symbols.get(name) {
                return Some(id);
            }
            current = scope.parent;
        }
        None
    }

    /// Resolve `name` in `scope` only, without walking parents.
    pub fn resolve_locally(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.scope(scope)?.symbols.get(name).copied()
    }

    /// Look up a scope.
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    /// Look up a symbol.
    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// Mutable symbol access, used for two-phase declaration where the
    /// stub's type is patched after the body is analyzed.
    pub fn symbol_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        self.symbols.get_mut(id.index())
    }

    /// All scopes in creation order.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// All symbols in definition order.
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols.iter().enumerate().map(|(i, s)| (SymbolId(i as u32), s))
    }

    /// Symbols defined directly in `scope`.
    pub fn symbols_in(&self, scope: ScopeId) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.scope(scope)
            .into_iter()
            .flat_map(|s| s.symbols.values())
            .filter_map(|&id| self.symbol(id).map(|s| (id, s)))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_scope_has_builtins() {
        let table = SymbolTable::new();
        for name in ["print", "type", "tostring", "tonumber", "ipairs", "pairs", "error", "assert"] {
            let id = table.resolve(table.global_scope(), name);
            assert!(id.is_some(), "missing builtin {name}");
            let symbol = table.symbol(id.unwrap()).unwrap();
            assert_eq!(symbol.kind, SymbolKind::BuiltinFunction);
            assert!(symbol.documentation.is_some());
        }
    }

    #[test]
    fn define_rejects_duplicates() {
        let mut table = SymbolTable::new();
        let scope = table.push_scope(ScopeKind::Module, table.global_scope(), Span::new(0, 10), None);
        let first = table
            .define(scope, Symbol::new("x", SymbolKind::Variable, TypeInfo::Int, Span::new(0, 1)))
            .unwrap();
        let second =
            table.define(scope, Symbol::new("x", SymbolKind::Variable, TypeInfo::Bool, Span::new(5, 6)));
        assert_eq!(second, Err(first));
    }

    #[test]
    fn resolve_walks_parents_but_locally_does_not() {
        let mut table = SymbolTable::new();
        let module = table.push_scope(ScopeKind::Module, table.global_scope(), Span::new(0, 100), None);
        let block = table.push_scope(ScopeKind::Block, module, Span::new(10, 40), None);
        table
            .define(module, Symbol::new("outer", SymbolKind::Variable, TypeInfo::Int, Span::new(0, 5)))
            .unwrap();
        assert!(table.resolve(block, "outer").is_some());
        assert!(table.resolve_locally(block, "outer").is_none());
        assert!(table.resolve(block, "print").is_some());
    }

    #[test]
    fn shadowing_resolves_innermost() {
        let mut table = SymbolTable::new();
        let module = table.push_scope(ScopeKind::Module, table.global_scope(), Span::new(0, 100), None);
        let inner = table.push_scope(ScopeKind::Block, module, Span::new(10, 40), None);
        let outer_sym = table
            .define(module, Symbol::new("x", SymbolKind::Variable, TypeInfo::Int, Span::new(0, 1)))
            .unwrap();
        let inner_sym = table
            .define(inner, Symbol::new("x", SymbolKind::Variable, TypeInfo::String, Span::new(12, 13)))
            .unwrap();
        assert_eq!(table.resolve(inner, "x"), Some(inner_sym));
        assert_eq!(table.resolve(module, "x"), Some(outer_sym));
    }
}
