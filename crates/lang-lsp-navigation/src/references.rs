//! References lookup.
//!
//! Symbols are matched across files by identity `(defining uri,
//! defining span)`: an imported copy and its original agree on both, so
//! a reference scan does not depend on table-local symbol ids.

use crate::{Location, symbol_at};
use lang_ast::AstKind;
use lang_semantic_analyzer::AnalysisResult;
use lang_position_tracking::Span;
use lang_symbol_types::SymbolId;

/// The cross-file identity of a symbol: its defining file and range.
pub fn symbol_identity(result: &AnalysisResult, id: SymbolId) -> Option<(String, Span)> {
    let symbol = result.symbols.symbol(id)?;
    Some((
        symbol.origin_uri.clone().unwrap_or_else(|| result.uri.clone()),
        symbol.defining_span,
    ))
}

/// All references to the symbol under `offset` in `origin`, scanning
/// `candidates` (the origin file plus every file known to import the
/// defining file, transitively; the caller assembles that set from the
/// workspace's import edges).
pub fn find_references(
    origin: &AnalysisResult,
    offset: usize,
    candidates: &[&AnalysisResult],
    include_declaration: bool,
) -> Vec<Location> {
    let Some(target_id) = symbol_at(origin, offset) else {
        return Vec::new();
    };
    let Some(target) = symbol_identity(origin, target_id) else {
        return Vec::new();
    };

    let mut locations = Vec::new();
    if include_declaration {
        locations.push(Location { uri: target.0.clone(), span: target.1 });
    }

    for result in candidates {
        for (&node, &symbol_id) in &result.node_symbol_map {
            if symbol_identity(result, symbol_id).as_ref() != Some(&target) {
                continue;
            }
            // Identifier uses and member accesses are reference sites;
            // declaration nodes are covered by include_declaration.
            let node_data = result.ast.node(node);
            let span = match &node_data.kind {
                AstKind::Identifier { .. } => node_data.span,
                AstKind::MemberAccessExpr { member_span, .. }
                | AstKind::ColonLookupExpr { member_span, .. } => *member_span,
                _ => continue,
            };
            let location = Location { uri: result.uri.clone(), span };
            if !locations.contains(&location) {
                locations.push(location);
            }
        }
    }
    locations.sort_by(|a, b| (&a.uri, a.span.start).cmp(&(&b.uri, b.span.start)));
    locations
}

#[cfg(test)]
mod tests {
    use super::*;
    use lang_semantic_analyzer::analyze_standalone;

    #[test]
    fn references_in_single_file() {
        let text = "int x = 1; x; x = 2;";
        let result = analyze_standalone("file:///t.lang", 1, text);
        let first_use = text.find("x;").unwrap();
        let refs = find_references(&result, first_use, &[&result], true);
        // Declaration plus two uses.
        assert_eq!(refs.len(), 3, "{refs:?}");
        assert!(refs.iter().all(|r| r.uri == "file:///t.lang"));
    }

    #[test]
    fn member_references_use_member_span() {
        let text = "class P { int hp; } P p = new P(); p.hp;";
        let result = analyze_standalone("file:///t.lang", 1, text);
        let member_use = text.rfind("hp").unwrap();
        let refs = find_references(&result, member_use, &[&result], false);
        assert_eq!(refs.len(), 1, "{refs:?}");
        assert_eq!(&text[refs[0].span.start..refs[0].span.end], "hp");
    }

    #[test]
    fn no_symbol_under_cursor_means_no_references() {
        let text = "1 + 2;";
        let result = analyze_standalone("file:///t.lang", 1, text);
        let refs = find_references(&result, 0, &[&result], true);
        assert!(refs.is_empty());
    }
}
