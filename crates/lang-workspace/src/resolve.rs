//! Import path resolution.
//!
//! Resolution order for an import string `S` from URI `U`:
//! 1. `./` or `../` prefixes resolve relative to `U`'s directory.
//! 2. Otherwise the workspace root.
//! 3. Otherwise each configured include path, in order.
//!
//! A `.lang` suffix is appended when missing. The first candidate that
//! exists (on disk or as an open document) wins; none found is an error
//! carrying the searched locations.

use crate::Workspace;
use lang_uri::{normalize_path, path_to_uri, uri_key, uri_to_path};
use std::path::{Path, PathBuf};

pub(crate) fn resolve_import_path(
    workspace: &Workspace,
    from_uri: &str,
    spec: &str,
) -> Result<String, Vec<String>> {
    let with_ext =
        if spec.ends_with(".lang") { spec.to_string() } else { format!("{spec}.lang") };

    let mut candidates: Vec<PathBuf> = Vec::new();
    if spec.starts_with("./") || spec.starts_with("../") {
        if let Ok(from_path) = uri_to_path(from_uri) {
            if let Some(dir) = from_path.parent() {
                candidates.push(dir.join(&with_ext));
            }
        }
    } else {
        let config = workspace.config();
        if let Some(root) = &config.root_path {
            candidates.push(root.join(&with_ext));
        }
        for include in &config.include_paths {
            candidates.push(include.join(&with_ext));
        }
    }

    let mut searched = Vec::new();
    for candidate in candidates {
        let normalized = normalize_path(&candidate);
        if workspace.is_known_path(&normalized) || normalized.is_file() {
            if let Ok(uri) = path_to_uri(&normalized) {
                return Ok(uri_key(&uri));
            }
        }
        searched.push(normalized.display().to_string());
    }
    Err(searched)
}

/// Candidate module path strings for import completion: every `.lang`
/// file under the workspace root, as a root-relative specifier.
pub(crate) fn module_candidates(workspace: &Workspace, _from_uri: &str) -> Vec<String> {
    let config = workspace.config();
    let Some(root) = config.root_path else { return Vec::new() };
    let mut out = Vec::new();
    collect_lang_files(&root, &root, &mut out, 0);
    out.sort();
    out
}

fn collect_lang_files(root: &Path, dir: &Path, out: &mut Vec<String>, depth: usize) {
    // Bounded traversal keeps completion responsive on big trees.
    if depth > 6 {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_lang_files(root, &path, out, depth + 1);
        } else if path.extension().map(|e| e == "lang").unwrap_or(false) {
            if let Ok(relative) = path.strip_prefix(root) {
                let spec = relative.with_extension("");
                out.push(spec.to_string_lossy().replace('\\', "/"));
            }
        }
    }
}
