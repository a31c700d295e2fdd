//! Visible-symbols walker.

use lang_semantic_analyzer::AnalysisResult;
use lang_symbol_table::Symbol;
use lang_symbol_types::SymbolId;
use rustc_hash::FxHashSet;

/// Every symbol visible at `offset`, walking the scope chain from the
/// innermost scope outward. Inner definitions shadow outer ones by
/// name, so each name appears exactly once.
pub fn find_visible_symbols(result: &AnalysisResult, offset: usize) -> Vec<(SymbolId, &Symbol)> {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut visible = Vec::new();
    let mut current = Some(result.scope_at(offset));
    while let Some(scope_id) = current {
        let Some(scope) = result.symbols.scope(scope_id) else { break };
        let mut here: Vec<(SymbolId, &Symbol)> = result.symbols.symbols_in(scope_id).collect();
        // Stable order within one scope: by definition site.
        here.sort_by_key(|(_, s)| (s.defining_span.start, s.name.clone()));
        for (id, symbol) in here {
            if seen.insert(symbol.name.as_str()) {
                visible.push((id, symbol));
            }
        }
        current = scope.parent;
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use lang_semantic_analyzer::analyze_standalone;

    #[test]
    fn shadowing_yields_exactly_one_entry_per_name() {
        let text = "int x = 1; void f() { string x = \"s\"; x; }";
        let result = analyze_standalone("file:///t.lang", 1, text);
        let offset = text.find("x; }").unwrap();
        let visible = find_visible_symbols(&result, offset);
        let xs: Vec<_> = visible.iter().filter(|(_, s)| s.name == "x").collect();
        assert_eq!(xs.len(), 1);
        assert_eq!(xs[0].1.ty, lang_symbol_types::TypeInfo::String);
    }

    #[test]
    fn builtins_are_always_visible() {
        let result = analyze_standalone("file:///t.lang", 1, "int x = 1;");
        let visible = find_visible_symbols(&result, 0);
        assert!(visible.iter().any(|(_, s)| s.name == "print"));
        assert!(visible.iter().any(|(_, s)| s.name == "x"));
    }

    #[test]
    fn function_scope_sees_parameters() {
        let text = "int add(int a, int b) { return a; }";
        let result = analyze_standalone("file:///t.lang", 1, text);
        let offset = text.find("return").unwrap();
        let visible = find_visible_symbols(&result, offset);
        assert!(visible.iter().any(|(_, s)| s.name == "a"));
        assert!(visible.iter().any(|(_, s)| s.name == "b"));
        assert!(visible.iter().any(|(_, s)| s.name == "add"));
    }
}
