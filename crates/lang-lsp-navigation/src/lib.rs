//! Position-driven navigation queries over a published
//! [`AnalysisResult`]: deepest-node search, scope and symbol visibility,
//! go-to-definition, and references.

mod node_finder;
mod references;
mod visible;

pub use node_finder::{NodeLocation, find_node_at, find_node_for_completion};
pub use references::{find_references, symbol_identity};
pub use visible::find_visible_symbols;

use lang_position_tracking::Span;
use lang_semantic_analyzer::AnalysisResult;
use lang_symbol_types::SymbolId;

/// A resolved source location in some file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Canonical URI of the file
    pub uri: String,
    /// Byte span within that file
    pub span: Span,
}

/// The symbol recorded for the node at `offset`, walking ancestors from
/// the innermost node outward.
pub fn symbol_at(result: &AnalysisResult, offset: usize) -> Option<SymbolId> {
    let found = find_node_at(&result.ast, offset);
    std::iter::once(found.node)
        .chain(found.ancestors.iter().rev().copied())
        .find_map(|id| result.node_symbol_map.get(&id).copied())
}

/// Go-to-definition: the defining range of the symbol under the cursor.
/// Imported symbols point at their original defining file. Returns
/// `None` (never an error) when nothing resolvable is under the cursor.
pub fn goto_definition(result: &AnalysisResult, offset: usize) -> Option<Location> {
    let symbol_id = symbol_at(result, offset)?;
    let symbol = result.symbols.symbol(symbol_id)?;
    if symbol.defining_span == Span::empty(0) && symbol.origin_uri.is_none() {
        // Builtins have no source location to jump to.
        return None;
    }
    Some(Location {
        uri: symbol.origin_uri.clone().unwrap_or_else(|| result.uri.clone()),
        span: symbol.defining_span,
    })
}
