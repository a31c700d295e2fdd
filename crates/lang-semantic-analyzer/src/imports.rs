//! Import binding.
//!
//! Imports copy the target module's exported symbols into the importing
//! file's own symbol table (scopes and all, re-mapped through a memo so
//! class graphs stay acyclic and terminate). Copies carry `origin_uri`
//! and the original defining range, which is what makes cross-file
//! go-to-definition land in the right file.

use crate::analyzer::Analyzer;
use crate::resolver::ImportOutcome;
use crate::result::AnalysisResult;
use lang_ast::{AstKind, ImportTarget, NodeId};
use lang_diagnostics::Diagnostic;
use lang_position_tracking::Span;
use lang_symbol_table::{Symbol, SymbolTable};
use lang_symbol_types::{
    ClassRef, FunctionSignature, ModuleRef, ReturnType, ScopeId, ScopeKind, SymbolKind, TypeInfo,
};
use rustc_hash::FxHashMap;

impl Analyzer<'_> {
    pub(crate) fn bind_import(&mut self, id: NodeId) {
        let AstKind::ImportDecl { path, path_span, target } = self.ast.node(id).kind.clone() else {
            return;
        };
        let path_text = self.name_of(path);
        if path_text.is_empty() {
            // The parser already reported the malformed import.
            return;
        }
        let target_uri = match self.resolver.resolve_path(self.uri, &path_text) {
            Ok(uri) => uri,
            Err(searched) => {
                self.diagnostics.push(
                    Diagnostic::semantic_error(
                        path_span,
                        format!("cannot resolve import \"{path_text}\""),
                    )
                    .with_data(serde_json::json!({
                        "path": path_text,
                        "searched": searched,
                    })),
                );
                return;
            }
        };
        self.imports.push(target_uri.clone());

        match self.resolver.request_analysis(&target_uri, self.visited, self.cancel) {
            ImportOutcome::Resolved(result) => {
                self.bind_target(id, &target, &result, &target_uri);
            }
            ImportOutcome::Circular(partial) => {
                self.diagnostics.push(Diagnostic::semantic_warning(
                    path_span,
                    format!("circular import of \"{path_text}\""),
                ));
                if let Some(result) = partial {
                    self.bind_target(id, &target, &result, &target_uri);
                }
            }
            ImportOutcome::Unavailable => {
                self.diagnostics.push(Diagnostic::semantic_error(
                    path_span,
                    format!("imported module \"{path_text}\" could not be analyzed"),
                ));
            }
        }
    }

    fn bind_target(
        &mut self,
        id: NodeId,
        target: &ImportTarget,
        result: &AnalysisResult,
        target_uri: &str,
    ) {
        let mut memo = FxHashMap::default();
        match target {
            ImportTarget::Wildcard { alias, alias_span } => {
                let alias_name = self.name_of(*alias);
                if alias_name.is_empty() {
                    return;
                }
                let module_scope = self.table.push_scope(
                    ScopeKind::Module,
                    self.table.global_scope(),
                    Span::empty(0),
                    None,
                );
                let exported: Vec<Symbol> = result
                    .symbols
                    .symbols_in(result.module_scope)
                    .filter(|(_, s)| s.is_exported)
                    .map(|(_, s)| s.clone())
                    .collect();
                for symbol in exported {
                    let copy = self.import_symbol(&symbol, &result.symbols, target_uri, &mut memo);
                    let _ = self.table.define(module_scope, copy);
                }
                let module_symbol = Symbol {
                    kind: SymbolKind::Module,
                    ty: TypeInfo::Module(ModuleRef { name: alias_name.clone(), scope: module_scope }),
                    origin_uri: Some(target_uri.to_string()),
                    ..Symbol::new(alias_name, SymbolKind::Module, TypeInfo::Unknown, *alias_span)
                };
                self.define_or_report(self.scope, module_symbol, *alias_span).inspect(|&sym| {
                    self.node_symbol_map.insert(id, sym);
                });
            }
            ImportTarget::Named { items } => {
                for item in items {
                    let name = self.name_of(item.name);
                    if name.is_empty() {
                        continue;
                    }
                    let found = result
                        .symbols
                        .resolve_locally(result.module_scope, &name)
                        .and_then(|sym| result.symbols.symbol(sym))
                        .filter(|sym| sym.is_exported)
                        .cloned();
                    let Some(symbol) = found else {
                        self.diagnostics.push(Diagnostic::semantic_error(
                            item.name_span,
                            format!("module does not export `{name}`"),
                        ));
                        continue;
                    };
                    if item.is_type
                        && !matches!(symbol.kind, SymbolKind::Class | SymbolKind::TypeAlias)
                    {
                        self.diagnostics.push(Diagnostic::semantic_warning(
                            item.name_span,
                            format!("`{name}` is imported as a type but is a {}", symbol.kind.label()),
                        ));
                    }
                    let mut copy = self.import_symbol(&symbol, &result.symbols, target_uri, &mut memo);
                    if let Some(alias) = item.alias {
                        copy.name = self.name_of(alias);
                    }
                    self.define_or_report(self.scope, copy, item.name_span);
                }
            }
        }
    }

    /// Copy a symbol from another file's table, re-mapping every scope id
    /// embedded in its type into this table.
    fn import_symbol(
        &mut self,
        symbol: &Symbol,
        source: &SymbolTable,
        target_uri: &str,
        memo: &mut FxHashMap<String, ScopeId>,
    ) -> Symbol {
        let ty = self.import_type(&symbol.ty, source, target_uri, memo);
        Symbol {
            name: symbol.name.clone(),
            kind: symbol.kind,
            ty,
            defining_span: symbol.defining_span,
            defining_node: None,
            scope: self.table.global_scope(),
            origin_uri: Some(symbol.origin_uri.clone().unwrap_or_else(|| target_uri.to_string())),
            is_const: symbol.is_const,
            is_static: symbol.is_static,
            is_global: symbol.is_global,
            is_exported: false,
            documentation: symbol.documentation.clone(),
        }
    }

    /// Re-map a type from another table. Class and module scopes are
    /// copied member-by-member; the memo both deduplicates and breaks
    /// cycles (a class referring to itself maps to the scope created
    /// before its members are copied).
    fn import_type(
        &mut self,
        ty: &TypeInfo,
        source: &SymbolTable,
        target_uri: &str,
        memo: &mut FxHashMap<String, ScopeId>,
    ) -> TypeInfo {
        match ty {
            TypeInfo::Class(class) => {
                let scope = self.import_scope(
                    &format!("class:{}", class.name),
                    class.scope,
                    source,
                    target_uri,
                    memo,
                );
                TypeInfo::Class(ClassRef { name: class.name.clone(), scope })
            }
            TypeInfo::Module(module) => {
                let scope = self.import_scope(
                    &format!("module:{}", module.name),
                    module.scope,
                    source,
                    target_uri,
                    memo,
                );
                TypeInfo::Module(ModuleRef { name: module.name.clone(), scope })
            }
            TypeInfo::List(elem) => TypeInfo::list(self.import_type(elem, source, target_uri, memo)),
            TypeInfo::Map(key, value) => {
                let key = self.import_type(key, source, target_uri, memo);
                let value = self.import_type(value, source, target_uri, memo);
                TypeInfo::Map(Box::new(key), Box::new(value))
            }
            TypeInfo::Tuple(elements) => TypeInfo::Tuple(
                elements.iter().map(|e| self.import_type(e, source, target_uri, memo)).collect(),
            ),
            TypeInfo::Union(members) => TypeInfo::Union(
                members.iter().map(|m| self.import_type(m, source, target_uri, memo)).collect(),
            ),
            TypeInfo::Function(signature) => {
                let params = signature
                    .params
                    .iter()
                    .map(|(name, ty)| (name.clone(), self.import_type(ty, source, target_uri, memo)))
                    .collect();
                let return_type = match &signature.return_type {
                    ReturnType::Single(ty) => ReturnType::Single(Box::new(
                        self.import_type(ty, source, target_uri, memo),
                    )),
                    ReturnType::Multi(types) => ReturnType::Multi(
                        types.iter().map(|t| self.import_type(t, source, target_uri, memo)).collect(),
                    ),
                };
                TypeInfo::Function(Box::new(FunctionSignature {
                    params,
                    return_type,
                    is_variadic: signature.is_variadic,
                }))
            }
            other => other.clone(),
        }
    }

    fn import_scope(
        &mut self,
        memo_key: &str,
        scope: ScopeId,
        source: &SymbolTable,
        target_uri: &str,
        memo: &mut FxHashMap<String, ScopeId>,
    ) -> ScopeId {
        if let Some(&mapped) = memo.get(memo_key) {
            return mapped;
        }
        let kind = source.scope(scope).map(|s| s.kind).unwrap_or(ScopeKind::Class);
        let new_scope =
            self.table.push_scope(kind, self.table.global_scope(), Span::empty(0), None);
        memo.insert(memo_key.to_string(), new_scope);
        let members: Vec<Symbol> =
            source.symbols_in(scope).map(|(_, s)| s.clone()).collect();
        for member in members {
            let copy = self.import_symbol(&member, source, target_uri, memo);
            let _ = self.table.define(new_scope, copy);
        }
        new_scope
    }
}
