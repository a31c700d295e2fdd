//! End-to-end analyzer behavior on single files.

use lang_ast::AstKind;
use lang_diagnostics::Severity;
use lang_semantic_analyzer::{AnalysisResult, analyze_standalone};
use lang_symbol_types::{SymbolKind, TypeInfo};

fn analyze(text: &str) -> AnalysisResult {
    analyze_standalone("file:///test.lang", 1, text)
}

fn semantic_errors(result: &AnalysisResult) -> Vec<String> {
    result
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .map(|d| d.message.clone())
        .collect()
}

/// Find the node id of the identifier expression with the given name.
fn ident_node(result: &AnalysisResult, name: &str) -> lang_ast::NodeId {
    result
        .ast
        .preorder()
        .into_iter()
        .find(|&id| match &result.ast.node(id).kind {
            AstKind::Identifier { name: n } => result.ast.name(*n) == name,
            _ => false,
        })
        .unwrap_or_else(|| panic!("no identifier `{name}`"))
}

#[test]
fn local_variable_resolves_with_type() {
    let result = analyze("int x = 42; x;");
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
    let use_site = ident_node(&result, "x");
    let symbol_id = result.node_symbol_map[&use_site];
    let symbol = result.symbols.symbol(symbol_id).unwrap();
    assert_eq!(symbol.name, "x");
    assert_eq!(symbol.kind, SymbolKind::Variable);
    assert_eq!(symbol.ty, TypeInfo::Int);
    assert_eq!(result.expr_types[&use_site], TypeInfo::Int);
}

#[test]
fn type_mismatch_diagnostic_covers_initializer() {
    let text = "int x = \"hi\";";
    let result = analyze(text);
    let errors = semantic_errors(&result);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert_eq!(errors[0], "type string is not assignable to int");
    let diag = &result.diagnostics[0];
    assert_eq!(&text[diag.span.start..diag.span.end], "\"hi\"");
}

#[test]
fn unresolved_name_types_unknown_without_cascade() {
    let result = analyze("int x = nope + 1;");
    let errors = semantic_errors(&result);
    // One unresolved-name error; the addition and the initializer do not
    // pile on more.
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("unresolved name `nope`"));
}

#[test]
fn duplicate_definition_reports_both_sites() {
    let result = analyze("int x = 1; string x = \"a\";");
    let errors = semantic_errors(&result);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("duplicate definition of `x`"));
    assert!(result.diagnostics.iter().any(|d| d.data.is_some()));
}

#[test]
fn integer_division_stays_int() {
    let result = analyze("int z = 6 / 4;");
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn mixed_arithmetic_promotes_to_float() {
    let result = analyze("float f = 1 + 2.5; int bad = 1 + 2.5;");
    let errors = semantic_errors(&result);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains("not assignable to int"));
}

#[test]
fn concat_requires_string_coercible() {
    let result = analyze("class P {} P p = new P(); string s = \"a\" .. p;");
    let errors = semantic_errors(&result);
    assert_eq!(errors.len(), 1, "{errors:?}");
    assert!(errors[0].contains(".."));
}

#[test]
fn break_outside_loop_is_an_error() {
    let result = analyze("break;");
    assert!(semantic_errors(&result).iter().any(|m| m.contains("`break` outside of a loop")));
}

#[test]
fn break_inside_loop_is_fine() {
    let result = analyze("while (true) { break; continue; }");
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn class_members_and_this() {
    let text = "class Counter {\n  int value;\n  void bump() { this.value = this.value + 1; }\n}";
    let result = analyze(text);
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn implicit_member_reference_inside_method() {
    let text = "class Counter {\n  int value;\n  int get() { return value; }\n}";
    let result = analyze(text);
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn static_method_rejects_instance_state() {
    let text = "class C {\n  int n;\n  static int bad() { return n; }\n  static int worse() { return this.n; }\n}";
    let result = analyze(text);
    let errors = semantic_errors(&result);
    assert!(errors.iter().any(|m| m.contains("instance member `n`")), "{errors:?}");
    assert!(errors.iter().any(|m| m.contains("`this` is not available")), "{errors:?}");
}

#[test]
fn static_members_resolve_without_this() {
    let text = "class C {\n  static int limit = 9;\n  static int get() { return limit; }\n}";
    let result = analyze(text);
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn member_access_types_flow() {
    let result = analyze("class P { int hp; } P p = new P(); int h = p.hp;");
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn unknown_member_is_reported() {
    let result = analyze("class P { int hp; } P p = new P(); p.mana;");
    let errors = semantic_errors(&result);
    assert!(errors.iter().any(|m| m.contains("no member `mana`")), "{errors:?}");
}

#[test]
fn incomplete_member_access_stays_quiet_semantically() {
    let result = analyze("class P { int hp; } P p = new P(); p.");
    // The parser reports the missing member name; the analyzer adds no
    // member-lookup error for the incomplete node.
    assert!(
        !semantic_errors(&result).iter().any(|m| m.contains("no member")),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn return_type_checked() {
    let result = analyze("int f() { return \"nope\"; }");
    let errors = semantic_errors(&result);
    assert!(errors.iter().any(|m| m.contains("not assignable to int")), "{errors:?}");
}

#[test]
fn missing_return_value_reported() {
    let result = analyze("int f() { return; }");
    let errors = semantic_errors(&result);
    assert!(errors.iter().any(|m| m.contains("missing return value")), "{errors:?}");
}

#[test]
fn return_at_top_level_is_an_error() {
    let result = analyze("return 1;");
    assert!(semantic_errors(&result).iter().any(|m| m.contains("outside of a function")));
}

#[test]
fn functions_resolve_before_their_bodies() {
    // Self-recursion works because stubs are declared first.
    let result = analyze("int fact(int n) { if (n < 2) { return 1; } return n * fact(n - 1); }");
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn mutivar_consumes_multi_return() {
    let text = "int pair() { return 1, 2; }\nmutivar a, b = pair();\nint c = a + b;";
    let result = analyze(text);
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn mutivar_single_value_warns() {
    let result = analyze("int one() { return 1; }\nmutivar a, b = one();");
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning && d.message.contains("single value")),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn any_narrowing_warns() {
    let result = analyze("any a = 1; int x = a;");
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Warning
                && d.message.contains("implicit narrowing from any")),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn const_assignment_rejected() {
    let result = analyze("const int x = 1; x = 2;");
    assert!(
        semantic_errors(&result).iter().any(|m| m.contains("cannot assign to constant `x`"))
    );
}

#[test]
fn defer_shares_function_scope() {
    let text = "void f() { int n = 1; defer { n = 2; } }";
    let result = analyze(text);
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn shadowing_is_allowed_across_scopes() {
    let text = "int x = 1; void f() { string x = \"s\"; x = \"t\"; }";
    let result = analyze(text);
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn scope_ranges_nest() {
    let text = "void f() { if (true) { int y = 1; } }";
    let result = analyze(text);
    // Every non-module scope range nests strictly inside its parent's.
    for (span, scope_id) in &result.scope_range_map {
        let scope = result.symbols.scope(*scope_id).unwrap();
        if let Some(parent) = scope.parent {
            if let Some(parent_scope) = result.symbols.scope(parent) {
                if parent_scope.kind != lang_symbol_types::ScopeKind::Global {
                    assert!(
                        parent_scope.range.start <= span.start && span.end <= parent_scope.range.end,
                        "scope {span:?} escapes parent {:?}",
                        parent_scope.range
                    );
                }
            }
        }
    }
}

#[test]
fn builtins_are_callable() {
    let result = analyze("print(1, \"two\", 3.0); string t = type(42);");
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn wrong_argument_type_reported() {
    let result = analyze("int add(int a, int b) { return a + b; } add(1, \"two\");");
    let errors = semantic_errors(&result);
    assert!(errors.iter().any(|m| m.contains("not assignable to int")), "{errors:?}");
}

#[test]
fn wrong_argument_count_reported() {
    let result = analyze("int add(int a, int b) { return a + b; } add(1);");
    let errors = semantic_errors(&result);
    assert!(errors.iter().any(|m| m.contains("expected 2 arguments")), "{errors:?}");
}

#[test]
fn lambda_infers_return_type() {
    let result = analyze("function g = function (int n) { return n + 1; };");
    assert!(semantic_errors(&result).is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn analysis_survives_garbage() {
    let result = analyze("class ] { int = ; } @@ while ((( {{{");
    assert!(result.done);
    // Syntax diagnostics exist; analysis still produced a result bundle.
    assert!(!result.parse.diagnostics.is_empty());
}

#[test]
fn type_alias_participates_in_annotations() {
    let result = analyze("type Id = int; Id x = 7; string s = x;");
    let errors = semantic_errors(&result);
    assert!(errors.iter().any(|m| m.contains("not assignable to string")), "{errors:?}");
}

#[test]
fn unresolved_import_is_a_semantic_error_with_data() {
    let result = analyze("import { helper } from \"./missing\";");
    let diag = result
        .diagnostics
        .iter()
        .find(|d| d.message.contains("cannot resolve import"))
        .expect("missing import diagnostic");
    assert_eq!(diag.severity, Severity::Error);
    assert!(diag.data.is_some());
}
