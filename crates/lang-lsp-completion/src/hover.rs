//! Hover rendering.

use lang_ast::AstKind;
use lang_lsp_navigation::{find_node_at, symbol_at};
use lang_position_tracking::Span;
use lang_semantic_analyzer::AnalysisResult;

/// Hover payload: rendered text plus the range it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
    /// Markdown-ish hover text
    pub contents: String,
    /// The hovered range
    pub span: Span,
}

/// Hover at `offset`: `name : type` with the symbol-kind label and any
/// documentation for resolved symbols; the inferred type for literals.
/// `None` when there is nothing useful under the cursor.
pub fn hover(result: &AnalysisResult, offset: usize) -> Option<HoverInfo> {
    let found = find_node_at(&result.ast, offset);
    let node = result.ast.node(found.node);

    // A literal under the cursor renders its inferred type; the
    // ancestor walk below would otherwise land on the enclosing
    // declaration's symbol.
    if matches!(
        node.kind,
        AstKind::IntLiteral { .. }
            | AstKind::FloatLiteral { .. }
            | AstKind::StringLiteral { .. }
            | AstKind::BoolLiteral { .. }
            | AstKind::NullLiteral
    ) {
        let ty = result.expr_types.get(&found.node)?;
        return Some(HoverInfo { contents: ty.to_string(), span: node.span });
    }

    let symbol_id = symbol_at(result, offset)?;
    let symbol = result.symbols.symbol(symbol_id)?;
    let mut contents = format!("{} : {}", symbol.name, symbol.ty);
    contents.push_str(&format!("\n({})", symbol.kind.label()));
    if let Some(doc) = &symbol.documentation {
        contents.push_str("\n\n");
        contents.push_str(doc);
    }
    Some(HoverInfo { contents, span: node.span })
}

#[cfg(test)]
mod tests {
    use super::*;

    use lang_semantic_analyzer::analyze_standalone;

    #[test]
    fn hover_on_variable_use() {
        let text = "int x = 42; x;";
        let result = analyze_standalone("file:///t.lang", 1, text);
        let info = hover(&result, text.find("x;").unwrap()).expect("no hover");
        assert!(info.contents.starts_with("x : int"));
        assert!(info.contents.contains("(variable)"));
    }

    #[test]
    fn hover_on_literal_shows_type() {
        let text = "print(3.25);";
        let result = analyze_standalone("file:///t.lang", 1, text);
        let info = hover(&result, text.find("3.25").unwrap() + 1).expect("no hover");
        assert_eq!(info.contents, "float");
    }

    #[test]
    fn hover_on_builtin_includes_documentation() {
        let text = "print(1);";
        let result = analyze_standalone("file:///t.lang", 1, text);
        let info = hover(&result, 1).expect("no hover");
        assert!(info.contents.contains("print : function"));
        assert!(info.contents.contains("standard output"));
    }

    #[test]
    fn hover_on_documented_function() {
        let text = "/// Adds two ints.\nint add(int a, int b) { return a + b; }\nadd(1, 2);";
        let result = analyze_standalone("file:///t.lang", 1, text);
        let offset = text.rfind("add").unwrap();
        let info = hover(&result, offset).expect("no hover");
        assert!(info.contents.contains("Adds two ints."));
    }

    #[test]
    fn hover_nowhere_is_none() {
        let text = "   ";
        let result = analyze_standalone("file:///t.lang", 1, text);
        assert!(hover(&result, 1).is_none());
    }
}
