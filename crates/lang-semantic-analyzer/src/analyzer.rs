//! The analysis pass: scopes, declarations, and statement checks.
//!
//! Expression inference lives in [`crate::infer`]; import binding in
//! [`crate::imports`]. Traversal context (current scope, current class,
//! return expectation, loop depth) is explicit state on the analyzer,
//! saved and restored around nested constructs.

use crate::resolver::{CancelToken, ModuleResolver};
use crate::result::AnalysisResult;
use lang_ast::{Ast, AstKind, NameId, NodeFlags, NodeId};
use lang_diagnostics::Diagnostic;
use lang_parser::ParseResult;
use lang_position_tracking::Span;
use lang_symbol_table::{Symbol, SymbolTable};
use lang_symbol_types::{
    Assignability, ClassRef, FunctionSignature, ReturnType, ScopeId, ScopeKind, SymbolId,
    SymbolKind, TypeInfo, is_assignable,
};
use rustc_hash::{FxHashMap, FxHashSet};

pub(crate) struct Analyzer<'a> {
    pub(crate) uri: &'a str,
    pub(crate) ast: &'a Ast,
    pub(crate) resolver: &'a dyn ModuleResolver,
    pub(crate) visited: &'a mut FxHashSet<String>,
    pub(crate) cancel: &'a CancelToken,

    pub(crate) table: SymbolTable,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) node_symbol_map: FxHashMap<NodeId, SymbolId>,
    pub(crate) expr_types: FxHashMap<NodeId, TypeInfo>,
    pub(crate) scope_range_map: Vec<(Span, ScopeId)>,
    pub(crate) imports: Vec<String>,
    pub(crate) bound_imports: FxHashSet<NodeId>,
    /// Memoized annotation resolutions; two-phase declaration visits the
    /// same type nodes twice and must not duplicate their diagnostics.
    pub(crate) resolved_types: FxHashMap<NodeId, TypeInfo>,
    pub(crate) module_scope: ScopeId,

    // Explicit traversal context
    pub(crate) scope: ScopeId,
    pub(crate) current_class: Option<ClassRef>,
    pub(crate) in_static_method: bool,
    /// `None` outside functions; `Some(Some(t))` inside a function with a
    /// declared return type; `Some(None)` inside a lambda whose return is
    /// being inferred.
    pub(crate) return_decl: Option<Option<TypeInfo>>,
    pub(crate) inferred_return: Option<TypeInfo>,
    /// Arities/types of multi-value returns seen in the current function
    pub(crate) multi_return: Option<Vec<TypeInfo>>,
    pub(crate) loop_depth: u32,
}

impl<'a> Analyzer<'a> {
    pub(crate) fn run(
        uri: &str,
        version: i64,
        text: std::sync::Arc<String>,
        parse: ParseResult,
        ast: Ast,
        resolver: &dyn ModuleResolver,
        visited: &mut FxHashSet<String>,
        cancel: &CancelToken,
    ) -> AnalysisResult {
        let mut table = SymbolTable::new();
        let root = ast.root();
        let root_span = ast.node(root).span;
        let module_scope =
            table.push_scope(ScopeKind::Module, table.global_scope(), root_span, Some(root));

        let mut analyzer = Analyzer {
            uri,
            ast: &ast,
            resolver,
            visited,
            cancel,
            table,
            diagnostics: Vec::new(),
            node_symbol_map: FxHashMap::default(),
            expr_types: FxHashMap::default(),
            scope_range_map: vec![(root_span, module_scope)],
            imports: Vec::new(),
            bound_imports: FxHashSet::default(),
            resolved_types: FxHashMap::default(),
            module_scope,
            scope: module_scope,
            current_class: None,
            in_static_method: false,
            return_decl: None,
            inferred_return: None,
            multi_return: None,
            loop_depth: 0,
        };

        let done = analyzer.analyze_unit(root);
        let Analyzer {
            table, diagnostics, node_symbol_map, expr_types, scope_range_map, imports, ..
        } = analyzer;

        AnalysisResult {
            uri: uri.to_string(),
            version,
            line_table: lang_position_tracking::LineTable::new(&text),
            text,
            parse,
            symbols: table,
            module_scope,
            diagnostics,
            node_symbol_map,
            expr_types,
            scope_range_map,
            imports,
            done,
            ast,
        }
    }

    /// Returns false when abandoned by cancellation.
    fn analyze_unit(&mut self, root: NodeId) -> bool {
        let items = self.ast.children(root);

        // Imports bind first: nothing local depends on order here, and
        // everything after may reference imported names.
        for &item in &items {
            if matches!(self.ast.node(item).kind, AstKind::ImportDecl { .. }) {
                self.bound_imports.insert(item);
                self.bind_import(item);
            }
        }
        // Class stubs, so signatures and fields can reference any class.
        for &item in &items {
            if matches!(self.ast.node(item).kind, AstKind::ClassDecl { .. }) {
                self.declare_class_stub(item, self.module_scope);
            }
        }
        // Type aliases next; they may name classes and imports.
        for &item in &items {
            if matches!(self.ast.node(item).kind, AstKind::TypeAliasDecl { .. }) {
                self.declare_type_alias(item, self.module_scope);
            }
        }
        // Member and function stubs; types fully resolvable now.
        for &item in &items {
            match self.ast.node(item).kind {
                AstKind::ClassDecl { .. } => self.declare_class_members(item),
                AstKind::FuncDecl { .. } => {
                    self.declare_func_stub(item, self.module_scope);
                }
                _ => {}
            }
        }
        // Main pass in document order.
        for &item in &items {
            if self.cancel.is_cancelled() {
                tracing::debug!(uri = self.uri, "analysis cancelled between items");
                return false;
            }
            let recovered = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                self.analyze_item(item);
            }));
            if recovered.is_err() {
                let span = self.ast.node(item).span;
                self.diagnostics.push(Diagnostic::internal_error(span, "analysis pass failed for this item"));
            }
        }
        true
    }

    fn analyze_item(&mut self, id: NodeId) {
        match self.ast.node(id).kind.clone() {
            AstKind::ImportDecl { .. } => {
                // Top-level imports were bound in the import phase.
                if self.bound_imports.insert(id) {
                    self.bind_import(id);
                }
            }
            AstKind::TypeAliasDecl { .. } => {
                if !self.node_symbol_map.contains_key(&id) {
                    self.declare_type_alias(id, self.scope);
                }
            }
            AstKind::ClassDecl { .. } => self.analyze_class_bodies(id),
            AstKind::FuncDecl { .. } => {
                // Top-level functions have stubs; nested ones do not yet.
                if !self.node_symbol_map.contains_key(&id) {
                    self.declare_func_stub(id, self.scope);
                }
                self.analyze_func_body(id);
            }
            _ => self.analyze_stmt(id),
        }
    }

    // ===== Declaration helpers =====

    pub(crate) fn declare_class_stub(&mut self, id: NodeId, scope: ScopeId) -> Option<SymbolId> {
        let AstKind::ClassDecl { name, name_span, doc, .. } = self.ast.node(id).kind.clone() else {
            return None;
        };
        let node = self.ast.node(id);
        let span = node.span;
        let flags = node.flags;
        let class_name = self.name_of(name);
        let class_scope = self.table.push_scope(ScopeKind::Class, scope, span, Some(id));
        self.scope_range_map.push((span, class_scope));
        let mut symbol = Symbol::new(
            class_name.clone(),
            SymbolKind::Class,
            TypeInfo::Class(ClassRef { name: class_name.clone(), scope: class_scope }),
            name_span,
        );
        symbol.defining_node = Some(id);
        symbol.is_exported = flags.contains(NodeFlags::IS_EXPORT);
        symbol.documentation = doc.map(|d| self.name_of(d));
        self.define_or_report(scope, symbol, name_span).inspect(|&sym| {
            self.node_symbol_map.insert(id, sym);
        })
    }

    pub(crate) fn declare_type_alias(&mut self, id: NodeId, scope: ScopeId) -> Option<SymbolId> {
        let AstKind::TypeAliasDecl { name, name_span, ty, doc } = self.ast.node(id).kind.clone()
        else {
            return None;
        };
        let flags = self.ast.node(id).flags;
        let aliased = self.resolve_type(ty);
        let mut symbol = Symbol::new(self.name_of(name), SymbolKind::TypeAlias, aliased, name_span);
        symbol.defining_node = Some(id);
        symbol.is_exported = flags.contains(NodeFlags::IS_EXPORT);
        symbol.documentation = doc.map(|d| self.name_of(d));
        self.define_or_report(scope, symbol, name_span).inspect(|&sym| {
            self.node_symbol_map.insert(id, sym);
        })
    }

    /// Declare fields and method stubs into an already-stubbed class.
    pub(crate) fn declare_class_members(&mut self, id: NodeId) {
        let Some(class_scope) = self.class_scope_of(id) else { return };
        let AstKind::ClassDecl { members, .. } = self.ast.node(id).kind.clone() else { return };
        for member in members {
            match self.ast.node(member).kind.clone() {
                AstKind::VarDecl { name, name_span, ty, doc, .. } => {
                    let flags = self.ast.node(member).flags;
                    let field_ty = self.resolve_type(ty);
                    let mut symbol =
                        Symbol::new(self.name_of(name), SymbolKind::Variable, field_ty, name_span);
                    symbol.defining_node = Some(member);
                    symbol.is_static = flags.contains(NodeFlags::IS_STATIC);
                    symbol.is_const = flags.contains(NodeFlags::IS_CONST);
                    symbol.documentation = doc.map(|d| self.name_of(d));
                    self.define_or_report(class_scope, symbol, name_span).inspect(|&sym| {
                        self.node_symbol_map.insert(member, sym);
                    });
                }
                AstKind::FuncDecl { .. } => {
                    self.declare_func_stub(member, class_scope);
                }
                _ => {}
            }
        }
    }

    pub(crate) fn declare_func_stub(&mut self, id: NodeId, scope: ScopeId) -> Option<SymbolId> {
        let AstKind::FuncDecl { name, name_span, params, return_type, is_variadic, doc, .. } =
            self.ast.node(id).kind.clone()
        else {
            return None;
        };
        let flags = self.ast.node(id).flags;
        let mut signature_params = Vec::new();
        for param in params {
            if let AstKind::Param { name, ty, .. } = self.ast.node(param).kind.clone() {
                let param_ty = self.resolve_type(ty);
                signature_params.push((self.name_of(name), param_ty));
            }
        }
        let declared_return = self.resolve_type(return_type);
        let mut signature = FunctionSignature::new(signature_params, declared_return);
        signature.is_variadic = is_variadic;

        let mut symbol = Symbol::new(
            self.name_of(name),
            SymbolKind::Function,
            TypeInfo::function(signature),
            name_span,
        );
        symbol.defining_node = Some(id);
        symbol.is_exported = flags.contains(NodeFlags::IS_EXPORT);
        symbol.is_static = flags.contains(NodeFlags::IS_STATIC);
        symbol.documentation = doc.map(|d| self.name_of(d));
        self.define_or_report(scope, symbol, name_span).inspect(|&sym| {
            self.node_symbol_map.insert(id, sym);
        })
    }

    fn class_scope_of(&self, id: NodeId) -> Option<ScopeId> {
        let symbol = self.node_symbol_map.get(&id)?;
        match &self.table.symbol(*symbol)?.ty {
            TypeInfo::Class(class) => Some(class.scope),
            _ => None,
        }
    }

    /// Define into `scope`; on duplicate, report a diagnostic carrying
    /// both the new and the prior definition ranges.
    pub(crate) fn define_or_report(
        &mut self,
        scope: ScopeId,
        symbol: Symbol,
        span: Span,
    ) -> Option<SymbolId> {
        let name = symbol.name.clone();
        match self.table.define(scope, symbol) {
            Ok(id) => Some(id),
            Err(existing) => {
                let prior = self.table.symbol(existing).map(|s| s.defining_span).unwrap_or_default();
                self.diagnostics.push(
                    Diagnostic::semantic_error(
                        span,
                        format!("duplicate definition of `{name}`"),
                    )
                    .with_data(serde_json::json!({
                        "firstDefinition": { "start": prior.start, "end": prior.end },
                    })),
                );
                None
            }
        }
    }

    // ===== Class and function bodies =====

    fn analyze_class_bodies(&mut self, id: NodeId) {
        let Some(class_scope) = self.class_scope_of(id) else { return };
        let AstKind::ClassDecl { name, members, .. } = self.ast.node(id).kind.clone() else {
            return;
        };
        let class_ref = ClassRef { name: self.name_of(name), scope: class_scope };

        let saved_scope = self.scope;
        let saved_class = self.current_class.take();
        self.scope = class_scope;
        self.current_class = Some(class_ref);

        for member in members {
            match self.ast.node(member).kind.clone() {
                AstKind::VarDecl { ty, init, .. } => {
                    if let Some(init) = init {
                        let declared = self.resolve_type(ty);
                        let init_ty = self.infer_expr(init);
                        self.check_assignment(&init_ty, &declared, self.ast.node(init).span);
                    }
                }
                AstKind::FuncDecl { .. } => {
                    let is_static = self.ast.node(member).flags.contains(NodeFlags::IS_STATIC);
                    let saved_static = self.in_static_method;
                    self.in_static_method = is_static;
                    self.analyze_func_body(member);
                    self.in_static_method = saved_static;
                }
                _ => self.analyze_stmt(member),
            }
        }

        self.scope = saved_scope;
        self.current_class = saved_class;
    }

    fn analyze_func_body(&mut self, id: NodeId) {
        let AstKind::FuncDecl { params, return_type, body, .. } = self.ast.node(id).kind.clone()
        else {
            return;
        };
        let span = self.ast.node(id).span;
        let declared_return = self.resolve_type(return_type);

        let function_scope = self.table.push_scope(ScopeKind::Function, self.scope, span, Some(id));
        self.scope_range_map.push((span, function_scope));

        let saved_scope = self.scope;
        let saved_return = self.return_decl.take();
        let saved_multi = self.multi_return.take();
        let saved_loop = self.loop_depth;
        self.scope = function_scope;
        self.return_decl = Some(Some(declared_return));
        self.loop_depth = 0;

        self.declare_params(&params, function_scope);
        self.analyze_stmts_of(body);

        // A body that returned multiple values makes the function
        // multi-return at call sites from here on.
        if let Some(types) = self.multi_return.take() {
            if let Some(&symbol) = self.node_symbol_map.get(&id) {
                if let Some(symbol) = self.table.symbol_mut(symbol) {
                    if let TypeInfo::Function(signature) = &mut symbol.ty {
                        signature.return_type = ReturnType::Multi(types);
                    }
                }
            }
        }

        self.scope = saved_scope;
        self.return_decl = saved_return;
        self.multi_return = saved_multi;
        self.loop_depth = saved_loop;
    }

    pub(crate) fn declare_params(&mut self, params: &[NodeId], scope: ScopeId) {
        for &param in params {
            if let AstKind::Param { name, name_span, ty } = self.ast.node(param).kind.clone() {
                let param_ty = self.resolve_type(ty);
                let mut symbol =
                    Symbol::new(self.name_of(name), SymbolKind::Parameter, param_ty, name_span);
                symbol.defining_node = Some(param);
                self.define_or_report(scope, symbol, name_span).inspect(|&sym| {
                    self.node_symbol_map.insert(param, sym);
                });
            }
        }
    }

    /// Analyze the statements of a block node directly in the current
    /// scope (used for function bodies and `defer`, which do not open a
    /// block scope of their own).
    fn analyze_stmts_of(&mut self, body: NodeId) {
        match self.ast.node(body).kind.clone() {
            AstKind::Block { stmts } => {
                for stmt in stmts {
                    self.analyze_item(stmt);
                }
            }
            _ => self.analyze_item(body),
        }
    }

    // ===== Statements =====

    pub(crate) fn analyze_stmt(&mut self, id: NodeId) {
        match self.ast.node(id).kind.clone() {
            AstKind::VarDecl { name, name_span, ty, init, doc } => {
                let flags = self.ast.node(id).flags;
                let declared = self.resolve_type(ty);
                if let Some(init) = init {
                    let init_ty = self.infer_expr(init);
                    self.check_assignment(&init_ty, &declared, self.ast.node(init).span);
                }
                let target_scope =
                    if flags.contains(NodeFlags::IS_GLOBAL) { self.module_scope } else { self.scope };
                let mut symbol =
                    Symbol::new(self.name_of(name), SymbolKind::Variable, declared, name_span);
                symbol.defining_node = Some(id);
                symbol.is_const = flags.contains(NodeFlags::IS_CONST);
                symbol.is_global = flags.contains(NodeFlags::IS_GLOBAL);
                symbol.is_static = flags.contains(NodeFlags::IS_STATIC);
                symbol.is_exported = flags.contains(NodeFlags::IS_EXPORT);
                symbol.documentation = doc.map(|d| self.name_of(d));
                self.define_or_report(target_scope, symbol, name_span).inspect(|&sym| {
                    self.node_symbol_map.insert(id, sym);
                });
            }
            AstKind::MultiVarDecl { names, init } => self.analyze_mutivar(id, &names, init),
            AstKind::Block { stmts } => {
                let span = self.ast.node(id).span;
                let block_scope = self.table.push_scope(ScopeKind::Block, self.scope, span, Some(id));
                self.scope_range_map.push((span, block_scope));
                let saved = self.scope;
                self.scope = block_scope;
                for stmt in stmts {
                    self.analyze_item(stmt);
                }
                self.scope = saved;
            }
            AstKind::IfStmt { cond, then_branch, else_branch } => {
                self.check_condition(cond);
                self.analyze_item(then_branch);
                if let Some(else_branch) = else_branch {
                    self.analyze_item(else_branch);
                }
            }
            AstKind::WhileStmt { cond, body } => {
                self.check_condition(cond);
                self.loop_depth += 1;
                self.analyze_item(body);
                self.loop_depth -= 1;
            }
            AstKind::ForStmt { init, cond, step, body } => {
                // The whole `for` gets a scope so the init declaration is
                // visible in the header and body but nowhere else.
                let span = self.ast.node(id).span;
                let for_scope = self.table.push_scope(ScopeKind::Block, self.scope, span, Some(id));
                self.scope_range_map.push((span, for_scope));
                let saved = self.scope;
                self.scope = for_scope;
                if let Some(init) = init {
                    self.analyze_item(init);
                }
                if let Some(cond) = cond {
                    self.check_condition(cond);
                }
                if let Some(step) = step {
                    self.infer_expr(step);
                }
                self.loop_depth += 1;
                self.analyze_item(body);
                self.loop_depth -= 1;
                self.scope = saved;
            }
            AstKind::ReturnStmt { values } => self.analyze_return(id, &values),
            AstKind::BreakStmt => {
                if self.loop_depth == 0 {
                    let span = self.ast.node(id).span;
                    self.diagnostics
                        .push(Diagnostic::semantic_error(span, "`break` outside of a loop"));
                }
            }
            AstKind::ContinueStmt => {
                if self.loop_depth == 0 {
                    let span = self.ast.node(id).span;
                    self.diagnostics
                        .push(Diagnostic::semantic_error(span, "`continue` outside of a loop"));
                }
            }
            AstKind::DeferStmt { body } => {
                // Defer bodies run at function exit and are analyzed in
                // the enclosing function scope, not a nested block scope.
                self.analyze_stmts_of(body);
            }
            AstKind::ExprStmt { expr } => {
                self.infer_expr(expr);
            }
            AstKind::FuncDecl { .. } => {
                if !self.node_symbol_map.contains_key(&id) {
                    self.declare_func_stub(id, self.scope);
                }
                self.analyze_func_body(id);
            }
            AstKind::ClassDecl { .. } => {
                if !self.node_symbol_map.contains_key(&id) {
                    self.declare_class_stub(id, self.scope);
                    self.declare_class_members(id);
                }
                self.analyze_class_bodies(id);
            }
            AstKind::TypeAliasDecl { .. } => {
                if !self.node_symbol_map.contains_key(&id) {
                    self.declare_type_alias(id, self.scope);
                }
            }
            AstKind::ImportDecl { .. } => {
                // Imports below the top level bind where they stand.
                if self.bound_imports.insert(id) {
                    self.bind_import(id);
                }
            }
            AstKind::ErrorDecl { .. } | AstKind::ErrorStmt { .. } => {}
            _ => {
                // An expression node in statement position.
                self.infer_expr(id);
            }
        }
    }

    fn analyze_mutivar(&mut self, id: NodeId, names: &[(NameId, Span)], init: NodeId) {
        let init_ty = self.infer_expr(init);
        let init_span = self.ast.node(init).span;
        if names.is_empty() {
            return;
        }
        let elem_types: Vec<TypeInfo> = match &init_ty {
            TypeInfo::Tuple(elements) => {
                if elements.len() != names.len() {
                    self.diagnostics.push(Diagnostic::semantic_error(
                        init_span,
                        format!(
                            "multi-return arity mismatch: {} values for {} names",
                            elements.len(),
                            names.len()
                        ),
                    ));
                }
                names
                    .iter()
                    .enumerate()
                    .map(|(i, _)| elements.get(i).cloned().unwrap_or(TypeInfo::Unknown))
                    .collect()
            }
            TypeInfo::Unknown => vec![TypeInfo::Unknown; names.len()],
            single => {
                if names.len() > 1 {
                    self.diagnostics.push(Diagnostic::semantic_warning(
                        init_span,
                        "initializer yields a single value; remaining names get type unknown",
                    ));
                }
                let mut types = vec![TypeInfo::Unknown; names.len()];
                types[0] = single.clone();
                types
            }
        };
        for ((name, name_span), ty) in names.iter().zip(elem_types) {
            let mut symbol = Symbol::new(self.name_of(*name), SymbolKind::Variable, ty, *name_span);
            symbol.defining_node = Some(id);
            self.define_or_report(self.scope, symbol, *name_span);
        }
        // The declaration node maps to its first name's symbol.
        if let Some((name, _)) = names.first() {
            let first = self.name_of(*name);
            if let Some(sym) = self.table.resolve_locally(self.scope, &first) {
                self.node_symbol_map.insert(id, sym);
            }
        }
    }

    fn analyze_return(&mut self, id: NodeId, values: &[NodeId]) {
        let span = self.ast.node(id).span;
        let value_types: Vec<TypeInfo> = values.iter().map(|&v| self.infer_expr(v)).collect();
        match self.return_decl.clone() {
            None => {
                self.diagnostics
                    .push(Diagnostic::semantic_error(span, "`return` outside of a function"));
            }
            Some(Some(declared)) => match value_types.len() {
                0 => {
                    if declared != TypeInfo::Void && declared != TypeInfo::Unknown {
                        self.diagnostics.push(Diagnostic::semantic_error(
                            span,
                            format!("missing return value for type {declared}"),
                        ));
                    }
                }
                1 => {
                    self.check_assignment(&value_types[0], &declared, self.ast.node(values[0]).span);
                }
                _ => {
                    // Multi-value return: the first value honors the
                    // annotation; the full shape is recorded so call
                    // sites see a tuple.
                    self.check_assignment(&value_types[0], &declared, self.ast.node(values[0]).span);
                    if self.multi_return.is_none() {
                        self.multi_return = Some(value_types.clone());
                    }
                }
            },
            Some(None) => {
                if self.inferred_return.is_none() {
                    self.inferred_return = match value_types.len() {
                        0 => Some(TypeInfo::Void),
                        _ => Some(value_types[0].clone()),
                    };
                }
            }
        }
    }

    fn check_condition(&mut self, cond: NodeId) {
        let ty = self.infer_expr(cond);
        if !matches!(ty, TypeInfo::Bool | TypeInfo::Any | TypeInfo::Unknown) {
            let span = self.ast.node(cond).span;
            self.diagnostics.push(Diagnostic::semantic_error(
                span,
                format!("condition must be bool, got {ty}"),
            ));
        }
    }

    // ===== Shared checks =====

    /// Check `source → target`, attaching diagnostics at `span`. Returns
    /// the effective source type after multi-return adjustment.
    pub(crate) fn check_assignment(
        &mut self,
        source: &TypeInfo,
        target: &TypeInfo,
        span: Span,
    ) -> TypeInfo {
        // Unknown on either side never cascades further errors.
        if *source == TypeInfo::Unknown || *target == TypeInfo::Unknown {
            return source.clone();
        }
        // A tuple (always a multi-return result; Lang has no tuple
        // literals) consumed by a single-value slot uses its first value.
        let mut effective = source.clone();
        if let TypeInfo::Tuple(elements) = source {
            let direct = is_assignable(source, target);
            if !direct.is_ok() {
                if let Some(first) = elements.first() {
                    self.diagnostics.push(Diagnostic::semantic_warning(
                        span,
                        "using only the first value of a multi-return result",
                    ));
                    effective = first.clone();
                }
            }
        }
        match is_assignable(&effective, target) {
            Assignability::Ok => {}
            Assignability::OkWithWarning(message) => {
                self.diagnostics.push(Diagnostic::semantic_warning(span, message));
            }
            Assignability::No => {
                self.diagnostics.push(Diagnostic::semantic_error(
                    span,
                    format!("type {effective} is not assignable to {target}"),
                ));
            }
        }
        effective
    }

    // ===== Type resolution =====

    /// Resolve a type-reference node into a `TypeInfo`.
    pub(crate) fn resolve_type(&mut self, id: NodeId) -> TypeInfo {
        if let Some(cached) = self.resolved_types.get(&id) {
            return cached.clone();
        }
        let resolved = self.resolve_type_uncached(id);
        self.resolved_types.insert(id, resolved.clone());
        resolved
    }

    fn resolve_type_uncached(&mut self, id: NodeId) -> TypeInfo {
        let span = self.ast.node(id).span;
        match self.ast.node(id).kind.clone() {
            AstKind::TypeName { name } => {
                let text = self.name_of(name);
                match text.as_str() {
                    "int" => TypeInfo::Int,
                    "float" => TypeInfo::Float,
                    "number" => TypeInfo::Number,
                    "bool" => TypeInfo::Bool,
                    "string" => TypeInfo::String,
                    "void" => TypeInfo::Void,
                    "any" => TypeInfo::Any,
                    "null" => TypeInfo::Null,
                    "function" => TypeInfo::FunctionKeyword,
                    "coroutine" => TypeInfo::CoroutineKeyword,
                    "" => TypeInfo::Unknown,
                    _ => match self.table.resolve(self.scope, &text) {
                        Some(symbol_id) => {
                            let symbol = self.table.symbol(symbol_id);
                            match symbol.map(|s| (s.kind, s.ty.clone())) {
                                Some((SymbolKind::Class, ty)) => {
                                    self.node_symbol_map.insert(id, symbol_id);
                                    ty
                                }
                                Some((SymbolKind::TypeAlias, ty)) => {
                                    self.node_symbol_map.insert(id, symbol_id);
                                    ty
                                }
                                _ => {
                                    self.diagnostics.push(Diagnostic::semantic_error(
                                        span,
                                        format!("`{text}` is not a type"),
                                    ));
                                    TypeInfo::Unknown
                                }
                            }
                        }
                        None => {
                            self.diagnostics.push(Diagnostic::semantic_error(
                                span,
                                format!("unknown type `{text}`"),
                            ));
                            TypeInfo::Unknown
                        }
                    },
                }
            }
            AstKind::ListTypeNode { elem } => TypeInfo::list(self.resolve_type(elem)),
            AstKind::MapTypeNode { key, value } => {
                let key_ty = self.resolve_type(key);
                let value_ty = self.resolve_type(value);
                match TypeInfo::map(key_ty, value_ty) {
                    Ok(ty) => ty,
                    Err(error) => {
                        self.diagnostics.push(Diagnostic::semantic_error(span, error.to_string()));
                        TypeInfo::Unknown
                    }
                }
            }
            AstKind::UnionTypeNode { members } => {
                let member_types: Vec<TypeInfo> =
                    members.iter().map(|&m| self.resolve_type(m)).collect();
                match TypeInfo::union(member_types) {
                    Ok(ty) => ty,
                    Err(error) => {
                        self.diagnostics.push(Diagnostic::semantic_error(span, error.to_string()));
                        TypeInfo::Unknown
                    }
                }
            }
            AstKind::ErrorType { .. } => TypeInfo::Unknown,
            _ => TypeInfo::Unknown,
        }
    }

    // ===== Small helpers =====

    pub(crate) fn name_of(&self, id: NameId) -> String {
        self.ast.name(id).to_string()
    }

    pub(crate) fn span_of(&self, id: NodeId) -> Span {
        self.ast.node(id).span
    }
}
