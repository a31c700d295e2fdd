//! Multi-file workspace: file registry, analysis cache, import
//! resolution, and cycle handling.
//!
//! The workspace owns every open or imported file and the per-URI
//! published [`AnalysisResult`]. Results are immutable `Arc`s replaced
//! wholesale on re-analysis, so readers never observe a half-built
//! bundle. Import requests recurse through [`ModuleResolver`] with a
//! `visited` set; a URI already on the stack answers `Circular` and the
//! importer binds the partial result and warns.

mod resolve;

use lang_semantic_analyzer::{
    AnalysisResult, CancelToken, ImportOutcome, ModuleResolver, analyze,
};
use lang_uri::{uri_key, uri_to_path};
use parking_lot::{Mutex, RwLock};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Workspace-level configuration, seeded from `initialize`.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceConfig {
    /// Workspace root directory
    pub root_path: Option<PathBuf>,
    /// Additional include paths searched by import resolution
    pub include_paths: Vec<PathBuf>,
    /// When true, dependents of a changed file are re-analyzed eagerly
    /// instead of on next query
    pub eager_reanalyze: bool,
}

#[derive(Debug, Clone)]
struct FileEntry {
    text: Arc<String>,
    version: i64,
    /// Opened by the editor (didOpen) as opposed to pulled in by an
    /// import
    open_in_editor: bool,
    path: Option<PathBuf>,
}

#[derive(Default)]
struct State {
    files: FxHashMap<String, FileEntry>,
    by_path: FxHashMap<PathBuf, String>,
    results: FxHashMap<String, Arc<AnalysisResult>>,
    /// Results published since the last drain, for diagnostics
    /// publication
    fresh: Vec<Arc<AnalysisResult>>,
}

/// The workspace. Shared state sits behind locks so a transport thread
/// and an analysis thread can both hold a reference; analysis itself
/// runs without the lock held.
pub struct Workspace {
    config: RwLock<WorkspaceConfig>,
    state: Mutex<State>,
}

impl Workspace {
    /// An empty workspace with default configuration.
    pub fn new() -> Self {
        Workspace { config: RwLock::new(WorkspaceConfig::default()), state: Mutex::new(State::default()) }
    }

    /// Replace the configuration (from `initialize`).
    pub fn configure(&self, config: WorkspaceConfig) {
        *self.config.write() = config;
    }

    /// Current configuration snapshot.
    pub fn config(&self) -> WorkspaceConfig {
        self.config.read().clone()
    }

    // ===== Text synchronization =====

    /// `didOpen`: register the file and analyze it.
    pub fn open_document(&self, uri: &str, text: String, version: i64) -> Arc<AnalysisResult> {
        let key = uri_key(uri);
        let path = uri_to_path(&key).ok().map(|p| lang_uri::normalize_path(&p));
        {
            let mut state = self.state.lock();
            if let Some(path) = &path {
                state.by_path.insert(path.clone(), key.clone());
            }
            state.files.insert(
                key.clone(),
                FileEntry { text: Arc::new(text), version, open_in_editor: true, path },
            );
            state.results.remove(&key);
        }
        self.analyze_uri(&key, &CancelToken::new())
    }

    /// `didChange` with full text. Stale versions (≤ the registered one)
    /// are dropped so out-of-order notifications cannot roll a document
    /// back.
    pub fn change_document(
        &self,
        uri: &str,
        text: String,
        version: i64,
    ) -> Option<Arc<AnalysisResult>> {
        let key = uri_key(uri);
        {
            let mut state = self.state.lock();
            match state.files.get_mut(&key) {
                Some(entry) => {
                    if version <= entry.version {
                        tracing::debug!(uri = %key, version, current = entry.version, "dropping stale didChange");
                        return None;
                    }
                    entry.text = Arc::new(text);
                    entry.version = version;
                    entry.open_in_editor = true;
                }
                None => {
                    let path = uri_to_path(&key).ok().map(|p| lang_uri::normalize_path(&p));
                    if let Some(path) = &path {
                        state.by_path.insert(path.clone(), key.clone());
                    }
                    state.files.insert(
                        key.clone(),
                        FileEntry { text: Arc::new(text), version, open_in_editor: true, path },
                    );
                }
            }
            state.results.remove(&key);
        }
        let result = self.analyze_uri(&key, &CancelToken::new());
        if self.config.read().eager_reanalyze {
            self.reanalyze_dependents(&key);
        }
        Some(result)
    }

    /// `didClose`: drop the registry entry and cached analysis; the
    /// file's arena and interner die with them. Files that other open
    /// files import get re-opened from disk on demand.
    pub fn close_document(&self, uri: &str) {
        let key = uri_key(uri);
        let mut state = self.state.lock();
        if let Some(entry) = state.files.remove(&key) {
            if let Some(path) = entry.path {
                state.by_path.remove(&path);
            }
        }
        state.results.remove(&key);
    }

    /// URIs of files opened by the editor.
    pub fn open_uris(&self) -> Vec<String> {
        let state = self.state.lock();
        state.files.iter().filter(|(_, e)| e.open_in_editor).map(|(uri, _)| uri.clone()).collect()
    }

    // ===== Queries =====

    /// The up-to-date analysis for `uri`, re-analyzing if the cache is
    /// missing or stale. This is the entry point every position query
    /// goes through, so queries always observe the freshest version.
    pub fn analysis(&self, uri: &str) -> Option<Arc<AnalysisResult>> {
        self.analysis_with_cancel(uri, &CancelToken::new())
    }

    /// Like [`Workspace::analysis`], with the caller's request token
    /// checked at analysis boundaries. A cancelled pass returns its
    /// partial result without publishing it; the previously published
    /// result stays intact for later queries.
    pub fn analysis_with_cancel(
        &self,
        uri: &str,
        cancel: &CancelToken,
    ) -> Option<Arc<AnalysisResult>> {
        let key = uri_key(uri);
        {
            let state = self.state.lock();
            if let (Some(entry), Some(result)) = (state.files.get(&key), state.results.get(&key)) {
                if result.version == entry.version {
                    return Some(result.clone());
                }
            }
        }
        self.ensure_file(&key)?;
        Some(self.analyze_uri(&key, cancel))
    }

    /// Cached analysis only; never triggers analysis. Used for partial
    /// binding of circular imports.
    pub fn cached_analysis(&self, uri: &str) -> Option<Arc<AnalysisResult>> {
        self.state.lock().results.get(&uri_key(uri)).cloned()
    }

    /// Results published since the last call; the façade publishes one
    /// diagnostics notification per entry.
    pub fn drain_fresh_results(&self) -> Vec<Arc<AnalysisResult>> {
        std::mem::take(&mut self.state.lock().fresh)
    }

    /// URIs of all open files that transitively import `uri`.
    pub fn dependents_of(&self, uri: &str) -> Vec<String> {
        let target = uri_key(uri);
        let state = self.state.lock();
        let mut dependents = Vec::new();
        let mut queue: Vec<String> = vec![target.clone()];
        let mut seen: FxHashSet<String> = FxHashSet::default();
        seen.insert(target);
        while let Some(current) = queue.pop() {
            for (uri, result) in state.results.iter() {
                if result.imports.iter().any(|i| *i == current) && seen.insert(uri.clone()) {
                    dependents.push(uri.clone());
                    queue.push(uri.clone());
                }
            }
        }
        dependents
    }

    // ===== Internals =====

    fn reanalyze_dependents(&self, uri: &str) {
        for dependent in self.dependents_of(uri) {
            {
                let mut state = self.state.lock();
                state.results.remove(&dependent);
            }
            if self.ensure_file(&dependent).is_some() {
                self.analyze_uri(&dependent, &CancelToken::new());
            }
        }
    }

    /// Make sure `uri` has a registered text, loading from disk if
    /// needed. Returns the text and version.
    fn ensure_file(&self, key: &str) -> Option<(Arc<String>, i64)> {
        {
            let state = self.state.lock();
            if let Some(entry) = state.files.get(key) {
                return Some((entry.text.clone(), entry.version));
            }
        }
        let path = uri_to_path(key).ok().map(|p| lang_uri::normalize_path(&p))?;
        let text = std::fs::read_to_string(&path).ok()?;
        let mut state = self.state.lock();
        let entry = FileEntry {
            text: Arc::new(text),
            version: 0,
            open_in_editor: false,
            path: Some(path.clone()),
        };
        state.by_path.insert(path, key.to_string());
        let inserted = state.files.entry(key.to_string()).or_insert(entry);
        Some((inserted.text.clone(), inserted.version))
    }

    /// Run the parse → build → analyze pipeline for `uri` and publish
    /// atomically. Callers must have registered the file text.
    fn analyze_uri(&self, key: &str, cancel: &CancelToken) -> Arc<AnalysisResult> {
        let mut visited = FxHashSet::default();
        self.analyze_with_visited(key, &mut visited, cancel)
    }

    fn analyze_with_visited(
        &self,
        key: &str,
        visited: &mut FxHashSet<String>,
        cancel: &CancelToken,
    ) -> Arc<AnalysisResult> {
        let (text, version) = match self.ensure_file(key) {
            Some(found) => found,
            None => (Arc::new(String::new()), 0),
        };

        tracing::debug!(uri = %key, version, "analyzing");
        visited.insert(key.to_string());
        let parse = lang_parser::parse_source(&text);
        let ast = lang_ast_builder::build(&parse);
        let result = Arc::new(analyze(key, version, text, parse, ast, self, visited, cancel));
        visited.remove(key);

        let mut state = self.state.lock();
        let current_version = state.files.get(key).map(|e| e.version).unwrap_or(version);
        // Publish unless cancelled mid-pass or the document moved on
        // while we were analyzing; the previously published result stays
        // intact in those cases.
        if (result.done || !state.results.contains_key(key)) && current_version == version {
            state.results.insert(key.to_string(), result.clone());
            state.fresh.push(result.clone());
        }
        result
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleResolver for Workspace {
    fn resolve_path(&self, from_uri: &str, path: &str) -> Result<String, Vec<String>> {
        resolve::resolve_import_path(self, from_uri, path)
    }

    fn request_analysis(
        &self,
        uri: &str,
        visited: &mut FxHashSet<String>,
        cancel: &CancelToken,
    ) -> ImportOutcome {
        let key = uri_key(uri);
        if visited.contains(&key) {
            return ImportOutcome::Circular(self.cached_analysis(&key));
        }
        {
            let state = self.state.lock();
            if let (Some(entry), Some(result)) = (state.files.get(&key), state.results.get(&key)) {
                if result.version == entry.version {
                    return ImportOutcome::Resolved(result.clone());
                }
            }
        }
        if self.ensure_file(&key).is_none() {
            return ImportOutcome::Unavailable;
        }
        ImportOutcome::Resolved(self.analyze_with_visited(&key, visited, cancel))
    }

    fn import_candidates(&self, from_uri: &str) -> Vec<String> {
        resolve::module_candidates(self, from_uri)
    }
}

impl Workspace {
    pub(crate) fn is_known_path(&self, path: &std::path::Path) -> bool {
        self.state.lock().by_path.contains_key(path)
    }
}

#[cfg(test)]
mod tests;
