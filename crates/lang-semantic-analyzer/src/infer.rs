//! Bottom-up expression type inference and name resolution.

use crate::analyzer::Analyzer;
use lang_ast::{AstKind, BinaryOp, NodeFlags, NodeId, UnaryOp};
use lang_diagnostics::Diagnostic;
use lang_symbol_table::Symbol;
use lang_symbol_types::{
    Assignability, FunctionSignature, ReturnType, SymbolKind, TypeInfo, is_assignable,
};

impl Analyzer<'_> {
    /// Infer the type of an expression node, resolving names and
    /// recording both into the result maps. Never fails; anything
    /// unresolvable is `Unknown` plus (at most) one diagnostic at the
    /// offending node.
    pub(crate) fn infer_expr(&mut self, id: NodeId) -> TypeInfo {
        let ty = self.infer_expr_inner(id);
        self.expr_types.insert(id, ty.clone());
        ty
    }

    fn infer_expr_inner(&mut self, id: NodeId) -> TypeInfo {
        let span = self.span_of(id);
        match self.ast.node(id).kind.clone() {
            AstKind::IntLiteral { .. } => TypeInfo::Int,
            AstKind::FloatLiteral { .. } => TypeInfo::Float,
            AstKind::StringLiteral { .. } => TypeInfo::String,
            AstKind::BoolLiteral { .. } => TypeInfo::Bool,
            AstKind::NullLiteral => TypeInfo::Null,
            AstKind::Identifier { name } => {
                let text = self.name_of(name);
                match self.table.resolve(self.scope, &text) {
                    Some(symbol_id) => {
                        self.node_symbol_map.insert(id, symbol_id);
                        self.check_static_access(symbol_id, span);
                        self.table.symbol(symbol_id).map(|s| s.ty.clone()).unwrap_or(TypeInfo::Unknown)
                    }
                    None => {
                        self.diagnostics.push(Diagnostic::semantic_error(
                            span,
                            format!("unresolved name `{text}`"),
                        ));
                        TypeInfo::Unknown
                    }
                }
            }
            AstKind::ThisExpr => match self.current_class.clone() {
                Some(class) => {
                    if self.in_static_method {
                        self.diagnostics.push(Diagnostic::semantic_error(
                            span,
                            "`this` is not available in a static method",
                        ));
                        TypeInfo::Unknown
                    } else {
                        TypeInfo::Class(class)
                    }
                }
                None => {
                    self.diagnostics.push(Diagnostic::semantic_error(
                        span,
                        "`this` is only available inside a class",
                    ));
                    TypeInfo::Unknown
                }
            },
            AstKind::UnaryExpr { op, operand } => {
                let operand_ty = self.infer_expr(operand);
                self.infer_unary(op, operand_ty, span)
            }
            AstKind::BinaryExpr { op, lhs, rhs } => self.infer_binary(op, lhs, rhs, id),
            AstKind::CallExpr { callee, args } => self.infer_call(callee, &args, id),
            AstKind::MemberAccessExpr { base, member, member_span } => {
                let incomplete = self.ast.node(id).flags.contains(NodeFlags::INCOMPLETE);
                self.infer_member(id, base, member, member_span, incomplete)
            }
            AstKind::ColonLookupExpr { base, member, member_span } => {
                let incomplete = self.ast.node(id).flags.contains(NodeFlags::INCOMPLETE);
                self.infer_member(id, base, member, member_span, incomplete)
            }
            AstKind::IndexExpr { base, index } => {
                let base_ty = self.infer_expr(base);
                let index_ty = self.infer_expr(index);
                self.infer_index(base_ty, index_ty, span)
            }
            AstKind::NewExpr { path, args } => self.infer_new(id, &path, &args),
            AstKind::LambdaExpr { params, body } => self.infer_lambda(id, &params, body),
            AstKind::ErrorExpr { .. } | AstKind::MissingExpr => TypeInfo::Unknown,
            _ => TypeInfo::Unknown,
        }
    }

    fn infer_unary(&mut self, op: UnaryOp, operand: TypeInfo, span: lang_position_tracking::Span) -> TypeInfo {
        match op {
            UnaryOp::Neg => match operand {
                TypeInfo::Int | TypeInfo::Float | TypeInfo::Number => operand,
                TypeInfo::Any | TypeInfo::Unknown => TypeInfo::Unknown,
                other => {
                    self.diagnostics.push(Diagnostic::semantic_error(
                        span,
                        format!("cannot negate {other}"),
                    ));
                    TypeInfo::Unknown
                }
            },
            UnaryOp::Not => TypeInfo::Bool,
            UnaryOp::Len => match operand {
                TypeInfo::List(_) | TypeInfo::Map(_, _) | TypeInfo::String | TypeInfo::Tuple(_) => {
                    TypeInfo::Int
                }
                TypeInfo::Any | TypeInfo::Unknown => TypeInfo::Int,
                other => {
                    self.diagnostics.push(Diagnostic::semantic_error(
                        span,
                        format!("`#` requires a list, map, string, or tuple, got {other}"),
                    ));
                    TypeInfo::Unknown
                }
            },
        }
    }

    fn infer_binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId, id: NodeId) -> TypeInfo {
        let span = self.span_of(id);
        let lhs_ty = self.infer_expr(lhs);
        let rhs_ty = self.infer_expr(rhs);

        use BinaryOp::*;
        match op {
            Assign => {
                self.check_place(lhs);
                self.check_assignment(&rhs_ty, &lhs_ty, self.span_of(rhs));
                lhs_ty
            }
            Add | Sub | Mul | Div | Mod => self.numeric_result(op, &lhs_ty, &rhs_ty, span),
            Concat => {
                for (side, ty) in [(lhs, &lhs_ty), (rhs, &rhs_ty)] {
                    if !string_coercible(ty) {
                        let side_span = self.span_of(side);
                        self.diagnostics.push(Diagnostic::semantic_error(
                            side_span,
                            format!("`..` requires string-coercible operands, got {ty}"),
                        ));
                    }
                }
                TypeInfo::String
            }
            Eq | NotEq | Lt | LtEq | Gt | GtEq => TypeInfo::Bool,
            And | Or => {
                // Short-circuit result: the wider of the two operands.
                if lhs_ty == rhs_ty {
                    lhs_ty
                } else if is_assignable(&lhs_ty, &rhs_ty) == Assignability::Ok {
                    rhs_ty
                } else if is_assignable(&rhs_ty, &lhs_ty) == Assignability::Ok {
                    lhs_ty
                } else {
                    TypeInfo::union(vec![lhs_ty, rhs_ty]).unwrap_or(TypeInfo::Unknown)
                }
            }
            BitAnd | BitOr | BitXor | Shl | Shr => {
                for (side, ty) in [(lhs, &lhs_ty), (rhs, &rhs_ty)] {
                    if !matches!(ty, TypeInfo::Int | TypeInfo::Any | TypeInfo::Unknown) {
                        let side_span = self.span_of(side);
                        self.diagnostics.push(Diagnostic::semantic_error(
                            side_span,
                            format!("bitwise `{}` requires int operands, got {ty}", op.as_str()),
                        ));
                    }
                }
                TypeInfo::Int
            }
        }
    }

    /// Arithmetic promotion. `/` on two ints is integer division and
    /// stays int.
    fn numeric_result(
        &mut self,
        op: BinaryOp,
        lhs: &TypeInfo,
        rhs: &TypeInfo,
        span: lang_position_tracking::Span,
    ) -> TypeInfo {
        use TypeInfo::*;
        match (lhs, rhs) {
            (Unknown | Any, _) | (_, Unknown | Any) => Unknown,
            (Int, Int) => Int,
            (Int | Float, Int | Float) => Float,
            (Int | Float | Number, Int | Float | Number) => Number,
            _ => {
                self.diagnostics.push(Diagnostic::semantic_error(
                    span,
                    format!("operator `{}` requires numeric operands, got {lhs} and {rhs}", op.as_str()),
                ));
                Unknown
            }
        }
    }

    /// Assignment targets must be names, members, or index slots, and
    /// not constants.
    fn check_place(&mut self, lhs: NodeId) {
        let span = self.span_of(lhs);
        match self.ast.node(lhs).kind.clone() {
            AstKind::Identifier { .. } | AstKind::MemberAccessExpr { .. } | AstKind::IndexExpr { .. } => {
                if let Some(&symbol_id) = self.node_symbol_map.get(&lhs) {
                    if let Some(symbol) = self.table.symbol(symbol_id) {
                        if symbol.is_const {
                            let name = symbol.name.clone();
                            self.diagnostics.push(Diagnostic::semantic_error(
                                span,
                                format!("cannot assign to constant `{name}`"),
                            ));
                        }
                    }
                }
            }
            _ => {
                self.diagnostics
                    .push(Diagnostic::semantic_error(span, "invalid assignment target"));
            }
        }
    }

    fn infer_call(&mut self, callee: NodeId, args: &[NodeId], id: NodeId) -> TypeInfo {
        let callee_ty = self.infer_expr(callee);
        let arg_types: Vec<TypeInfo> = args.iter().map(|&a| self.infer_expr(a)).collect();
        let span = self.span_of(id);

        match callee_ty {
            TypeInfo::Function(signature) => {
                self.check_call_args(&signature, args, &arg_types, span);
                match &signature.return_type {
                    ReturnType::Single(ty) => (**ty).clone(),
                    ReturnType::Multi(types) => {
                        // Multi-return materializes as a tuple; consumers
                        // with non-matching arity fall back to the first
                        // value with a warning in check_assignment.
                        TypeInfo::tuple(types.clone())
                            .unwrap_or_else(|_| types.first().cloned().unwrap_or(TypeInfo::Unknown))
                    }
                }
            }
            TypeInfo::FunctionKeyword | TypeInfo::Any | TypeInfo::Unknown => TypeInfo::Unknown,
            other => {
                self.diagnostics.push(Diagnostic::semantic_error(
                    span,
                    format!("cannot call a value of type {other}"),
                ));
                TypeInfo::Unknown
            }
        }
    }

    fn check_call_args(
        &mut self,
        signature: &FunctionSignature,
        args: &[NodeId],
        arg_types: &[TypeInfo],
        call_span: lang_position_tracking::Span,
    ) {
        let declared = signature.params.len();
        if !signature.is_variadic && args.len() > declared {
            if let Some(&first_extra) = args.get(declared) {
                let span = self.span_of(first_extra);
                self.diagnostics.push(Diagnostic::semantic_error(
                    span,
                    format!("expected {declared} arguments, got {}", args.len()),
                ));
            }
        }
        if args.len() < declared {
            self.diagnostics.push(Diagnostic::semantic_error(
                call_span,
                format!("expected {declared} arguments, got {}", args.len()),
            ));
        }
        for ((arg, arg_ty), (_, param_ty)) in args.iter().zip(arg_types).zip(&signature.params) {
            let span = self.span_of(*arg);
            self.check_assignment(arg_ty, param_ty, span);
        }
    }

    fn infer_member(
        &mut self,
        id: NodeId,
        base: NodeId,
        member: lang_ast::NameId,
        member_span: lang_position_tracking::Span,
        incomplete: bool,
    ) -> TypeInfo {
        let base_ty = self.infer_expr(base);
        if incomplete {
            // `obj.` mid-typing: completion owns this state, analysis
            // stays quiet.
            return TypeInfo::Unknown;
        }
        let member_name = self.name_of(member);
        match &base_ty {
            TypeInfo::Class(class) => {
                match self.table.resolve_locally(class.scope, &member_name) {
                    Some(symbol_id) => {
                        self.node_symbol_map.insert(id, symbol_id);
                        self.table.symbol(symbol_id).map(|s| s.ty.clone()).unwrap_or(TypeInfo::Unknown)
                    }
                    None => {
                        let class_name = class.name.clone();
                        self.diagnostics.push(Diagnostic::semantic_error(
                            member_span,
                            format!("class {class_name} has no member `{member_name}`"),
                        ));
                        TypeInfo::Unknown
                    }
                }
            }
            TypeInfo::Module(module) => {
                match self.table.resolve_locally(module.scope, &member_name) {
                    Some(symbol_id) => {
                        self.node_symbol_map.insert(id, symbol_id);
                        self.table.symbol(symbol_id).map(|s| s.ty.clone()).unwrap_or(TypeInfo::Unknown)
                    }
                    None => {
                        let module_name = module.name.clone();
                        self.diagnostics.push(Diagnostic::semantic_error(
                            member_span,
                            format!("module {module_name} has no exported member `{member_name}`"),
                        ));
                        TypeInfo::Unknown
                    }
                }
            }
            TypeInfo::Map(_, value) => (**value).clone(),
            TypeInfo::Any | TypeInfo::Unknown => TypeInfo::Unknown,
            other => {
                self.diagnostics.push(Diagnostic::semantic_error(
                    member_span,
                    format!("type {other} has no members"),
                ));
                TypeInfo::Unknown
            }
        }
    }

    fn infer_index(
        &mut self,
        base: TypeInfo,
        index: TypeInfo,
        span: lang_position_tracking::Span,
    ) -> TypeInfo {
        match base {
            TypeInfo::List(elem) => {
                if !matches!(index, TypeInfo::Int | TypeInfo::Any | TypeInfo::Unknown) {
                    self.diagnostics.push(Diagnostic::semantic_error(
                        span,
                        format!("list index must be int, got {index}"),
                    ));
                }
                *elem
            }
            TypeInfo::Map(key, value) => {
                if index != TypeInfo::Unknown && !is_assignable(&index, &key).is_ok() {
                    self.diagnostics.push(Diagnostic::semantic_error(
                        span,
                        format!("map key must be {key}, got {index}"),
                    ));
                }
                *value
            }
            TypeInfo::String => TypeInfo::String,
            TypeInfo::Tuple(_) | TypeInfo::Any | TypeInfo::Unknown => TypeInfo::Unknown,
            other => {
                self.diagnostics.push(Diagnostic::semantic_error(
                    span,
                    format!("type {other} cannot be indexed"),
                ));
                TypeInfo::Unknown
            }
        }
    }

    fn infer_new(&mut self, id: NodeId, path: &[(lang_ast::NameId, lang_position_tracking::Span)], args: &[NodeId]) -> TypeInfo {
        for &arg in args {
            self.infer_expr(arg);
        }
        let incomplete = self.ast.node(id).flags.contains(NodeFlags::INCOMPLETE);
        if incomplete {
            return TypeInfo::Unknown;
        }
        let Some(&(first, first_span)) = path.first() else {
            return TypeInfo::Unknown;
        };
        let first_name = self.name_of(first);
        let mut current = match self.table.resolve(self.scope, &first_name) {
            Some(symbol_id) => symbol_id,
            None => {
                self.diagnostics.push(Diagnostic::semantic_error(
                    first_span,
                    format!("unresolved name `{first_name}`"),
                ));
                return TypeInfo::Unknown;
            }
        };
        // Walk `A.B.C` through module scopes.
        for &(segment, segment_span) in &path[1..] {
            let segment_name = self.name_of(segment);
            let scope = match self.table.symbol(current).map(|s| s.ty.clone()) {
                Some(TypeInfo::Module(module)) => module.scope,
                _ => {
                    self.diagnostics.push(Diagnostic::semantic_error(
                        segment_span,
                        format!("`{segment_name}` is not reachable through a module path"),
                    ));
                    return TypeInfo::Unknown;
                }
            };
            current = match self.table.resolve_locally(scope, &segment_name) {
                Some(symbol_id) => symbol_id,
                None => {
                    self.diagnostics.push(Diagnostic::semantic_error(
                        segment_span,
                        format!("no exported member `{segment_name}`"),
                    ));
                    return TypeInfo::Unknown;
                }
            };
        }
        let symbol: Option<&Symbol> = self.table.symbol(current);
        match symbol.map(|s| (s.kind, s.ty.clone(), s.name.clone())) {
            Some((SymbolKind::Class, ty, _)) => {
                self.node_symbol_map.insert(id, current);
                ty
            }
            Some((_, _, name)) => {
                let span = self.span_of(id);
                self.diagnostics.push(Diagnostic::semantic_error(
                    span,
                    format!("`{name}` is not a class"),
                ));
                TypeInfo::Unknown
            }
            None => TypeInfo::Unknown,
        }
    }

    fn infer_lambda(&mut self, id: NodeId, params: &[NodeId], body: NodeId) -> TypeInfo {
        let span = self.span_of(id);
        let lambda_scope =
            self.table.push_scope(lang_symbol_types::ScopeKind::Function, self.scope, span, Some(id));
        self.scope_range_map.push((span, lambda_scope));

        let saved_scope = self.scope;
        let saved_return = self.return_decl.take();
        let saved_inferred = self.inferred_return.take();
        let saved_loop = self.loop_depth;
        self.scope = lambda_scope;
        self.return_decl = Some(None);
        self.loop_depth = 0;

        self.declare_params(params, lambda_scope);
        self.analyze_stmt(body);

        let return_ty = self.inferred_return.take().unwrap_or(TypeInfo::Void);
        self.scope = saved_scope;
        self.return_decl = saved_return;
        self.inferred_return = saved_inferred;
        self.loop_depth = saved_loop;

        let mut signature_params = Vec::new();
        for &param in params {
            if let AstKind::Param { name, ty, .. } = self.ast.node(param).kind.clone() {
                let param_ty = self.resolve_type(ty);
                signature_params.push((self.name_of(name), param_ty));
            }
        }
        TypeInfo::function(FunctionSignature::new(signature_params, return_ty))
    }

    /// Instance members may not be referenced bare from static methods.
    fn check_static_access(&mut self, symbol_id: lang_symbol_types::SymbolId, span: lang_position_tracking::Span) {
        if !self.in_static_method {
            return;
        }
        let Some(class) = self.current_class.clone() else { return };
        if let Some(symbol) = self.table.symbol(symbol_id) {
            if symbol.scope == class.scope && !symbol.is_static && symbol.kind == SymbolKind::Variable
            {
                let name = symbol.name.clone();
                self.diagnostics.push(Diagnostic::semantic_error(
                    span,
                    format!("instance member `{name}` is not available in a static method"),
                ));
            }
        }
    }
}

fn string_coercible(ty: &TypeInfo) -> bool {
    matches!(
        ty,
        TypeInfo::String
            | TypeInfo::Int
            | TypeInfo::Float
            | TypeInfo::Number
            | TypeInfo::Bool
            | TypeInfo::Any
            | TypeInfo::Unknown
    )
}
