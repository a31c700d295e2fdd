//! The analyzer's view of the workspace, plus cancellation.

use crate::result::AnalysisResult;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation token. Cloned freely; all clones observe the
/// same flag. The analyzer checks it at coarse boundaries (between files
/// in a transitive import walk, between top-level items).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Outcome of asking the workspace to analyze an import target.
#[derive(Debug, Clone)]
pub enum ImportOutcome {
    /// A finished analysis of the target
    Resolved(Arc<AnalysisResult>),
    /// The target is already being analyzed further up the stack; the
    /// carried result, if any, is partial (declarations completed so
    /// far). The importer should bind what it can and warn.
    Circular(Option<Arc<AnalysisResult>>),
    /// The path resolved but the file could not be read or analyzed
    Unavailable,
}

/// Services the analyzer needs from the file graph owner. Implemented by
/// the workspace; a null implementation keeps single-file analysis
/// independent of any workspace.
pub trait ModuleResolver {
    /// Resolve an import path string against the importing file's URI.
    /// Returns the canonical target URI, or the list of locations
    /// searched when nothing exists.
    fn resolve_path(&self, from_uri: &str, path: &str) -> Result<String, Vec<String>>;

    /// Request an analysis of `uri`, recursing if necessary. `visited`
    /// carries the URIs currently being analyzed on this stack so cycles
    /// terminate.
    fn request_analysis(
        &self,
        uri: &str,
        visited: &mut FxHashSet<String>,
        cancel: &CancelToken,
    ) -> ImportOutcome;

    /// Candidate module path strings for import completion, relative to
    /// the importing file.
    fn import_candidates(&self, _from_uri: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Resolver with no workspace behind it: every import fails to resolve.
pub struct NullResolver;

impl ModuleResolver for NullResolver {
    fn resolve_path(&self, _from_uri: &str, _path: &str) -> Result<String, Vec<String>> {
        Err(Vec::new())
    }

    fn request_analysis(
        &self,
        _uri: &str,
        _visited: &mut FxHashSet<String>,
        _cancel: &CancelToken,
    ) -> ImportOutcome {
        ImportOutcome::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_is_shared_across_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
