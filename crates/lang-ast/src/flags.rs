//! Per-node flag bitset.

use serde::{Deserialize, Serialize};

/// Compact flag set carried by every AST node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct NodeFlags(u8);

impl NodeFlags {
    /// Construction expected a child it could not obtain, or the node is
    /// itself an error node.
    pub const HAS_ERROR: NodeFlags = NodeFlags(1 << 0);
    /// The node represents a still-typable-in state, e.g. `obj.` with no
    /// member yet.
    pub const INCOMPLETE: NodeFlags = NodeFlags(1 << 1);
    /// Declared with `global`.
    pub const IS_GLOBAL: NodeFlags = NodeFlags(1 << 2);
    /// Declared with `const`.
    pub const IS_CONST: NodeFlags = NodeFlags(1 << 3);
    /// Declared with `static` (class members).
    pub const IS_STATIC: NodeFlags = NodeFlags(1 << 4);
    /// Declared with `export`.
    pub const IS_EXPORT: NodeFlags = NodeFlags(1 << 5);

    /// The empty flag set.
    pub fn empty() -> NodeFlags {
        NodeFlags(0)
    }

    /// Whether every bit of `other` is set in `self`.
    pub fn contains(&self, other: NodeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Set the bits of `other`.
    pub fn insert(&mut self, other: NodeFlags) {
        self.0 |= other.0;
    }

    /// Union of two flag sets.
    pub fn union(self, other: NodeFlags) -> NodeFlags {
        NodeFlags(self.0 | other.0)
    }
}

impl std::ops::BitOr for NodeFlags {
    type Output = NodeFlags;
    fn bitor(self, rhs: NodeFlags) -> NodeFlags {
        self.union(rhs)
    }
}
