//! Per-file string interner.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Index of an interned string in one file's [`Interner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NameId(pub u32);

/// Interns identifier and literal text so AST nodes store 4-byte indices
/// instead of owned strings. One interner per file; it dies with the
/// file's arena.
#[derive(Debug, Default, Clone)]
pub struct Interner {
    names: Vec<String>,
    lookup: FxHashMap<String, NameId>,
}

impl Interner {
    /// Create an interner with the empty string preinterned as id 0.
    pub fn new() -> Self {
        let mut interner = Interner { names: Vec::new(), lookup: FxHashMap::default() };
        interner.intern("");
        interner
    }

    /// The id of the empty string.
    pub fn empty() -> NameId {
        NameId(0)
    }

    /// Intern `text`, returning the existing id if already present.
    pub fn intern(&mut self, text: &str) -> NameId {
        if let Some(&id) = self.lookup.get(text) {
            return id;
        }
        let id = NameId(self.names.len() as u32);
        self.names.push(text.to_string());
        self.lookup.insert(text.to_string(), id);
        id
    }

    /// Resolve an id back to its text.
    ///
    /// Ids always come from this interner, so out-of-range lookups mean a
    /// cross-file id mixup; they resolve to the empty string rather than
    /// panicking.
    pub fn resolve(&self, id: NameId) -> &str {
        self.names.get(id.0 as usize).map(String::as_str).unwrap_or("")
    }

    /// Number of distinct interned strings.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether only the preinterned empty string is present.
    pub fn is_empty(&self) -> bool {
        self.names.len() <= 1
    }
}
