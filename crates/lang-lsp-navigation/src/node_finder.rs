//! Deepest containing-node search.

use lang_ast::{Ast, AstKind, NodeId};

/// The innermost node containing an offset, plus the root-to-parent
/// ancestor chain. "Find ancestor of kind X" queries walk `ancestors`
/// from the back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeLocation {
    /// Innermost node whose range contains the offset
    pub node: NodeId,
    /// Chain from the compilation unit down to the node's parent
    pub ancestors: Vec<NodeId>,
}

impl NodeLocation {
    /// The nearest enclosing node (self included) matching `pred`.
    pub fn find_enclosing(&self, ast: &Ast, pred: impl Fn(&AstKind) -> bool) -> Option<NodeId> {
        std::iter::once(self.node)
            .chain(self.ancestors.iter().rev().copied())
            .find(|&id| pred(&ast.node(id).kind))
    }
}

/// Walk from the compilation unit, recursing into the first child whose
/// range contains `offset` (`begin <= offset < end`; empty ranges match
/// their own offset). The compilation unit is treated as containing
/// every in-bounds offset even when its own range is damaged by a
/// top-level parse error.
pub fn find_node_at(ast: &Ast, offset: usize) -> NodeLocation {
    let mut ancestors = Vec::new();
    let mut current = ast.root();
    loop {
        let next = ast
            .children(current)
            .into_iter()
            .find(|&child| ast.node(child).span.contains(offset));
        match next {
            Some(child) => {
                ancestors.push(current);
                current = child;
            }
            None => return NodeLocation { node: current, ancestors },
        }
    }
}

/// Node search tuned for completion: when the exact offset lands between
/// nodes (the common case right after a trigger character like `.`),
/// retry one byte to the left so the incomplete node is found.
pub fn find_node_for_completion(ast: &Ast, offset: usize) -> NodeLocation {
    let found = find_node_at(ast, offset);
    let uninteresting = matches!(
        ast.node(found.node).kind,
        AstKind::CompilationUnit { .. } | AstKind::Block { .. }
    );
    if uninteresting && offset > 0 {
        return find_node_at(ast, offset - 1);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use lang_ast_builder::build;
    use lang_parser::parse_source;

    fn ast_of(text: &str) -> Ast {
        build(&parse_source(text))
    }

    #[test]
    fn finds_deepest_node() {
        let ast = ast_of("int x = 1 + 2;");
        // Offset of `2`.
        let found = find_node_at(&ast, 12);
        assert!(matches!(ast.node(found.node).kind, AstKind::IntLiteral { value: 2 }));
        // Ancestors lead from the root through the binary expression.
        assert!(matches!(ast.node(found.ancestors[0]).kind, AstKind::CompilationUnit { .. }));
        assert!(
            found
                .ancestors
                .iter()
                .any(|&id| matches!(ast.node(id).kind, AstKind::BinaryExpr { .. }))
        );
    }

    #[test]
    fn out_of_node_offset_returns_unit() {
        let ast = ast_of("int x = 1;   ");
        let found = find_node_at(&ast, 12);
        assert!(matches!(ast.node(found.node).kind, AstKind::CompilationUnit { .. }));
        assert!(found.ancestors.is_empty());
    }

    #[test]
    fn completion_search_steps_back_to_incomplete_member() {
        let ast = ast_of("p.");
        let found = find_node_for_completion(&ast, 2);
        assert!(
            matches!(ast.node(found.node).kind, AstKind::MemberAccessExpr { .. }),
            "got {:?}",
            ast.node(found.node).kind
        );
    }

    #[test]
    fn enclosing_lookup_walks_outward() {
        let ast = ast_of("void f() { while (true) { break; } }");
        let offset = "void f() { while (true) { b".len() - 1;
        let found = find_node_at(&ast, offset);
        let enclosing_while =
            found.find_enclosing(&ast, |kind| matches!(kind, AstKind::WhileStmt { .. }));
        assert!(enclosing_while.is_some());
    }
}
