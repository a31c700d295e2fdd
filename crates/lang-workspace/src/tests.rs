//! Workspace behavior: caching, invalidation, imports, cycles.

use crate::{Workspace, WorkspaceConfig};
use lang_diagnostics::Severity;
use lang_uri::path_to_uri;
use std::path::Path;

fn write_file(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, text).unwrap();
    path_to_uri(&path).unwrap()
}

fn workspace_rooted(dir: &Path) -> Workspace {
    let workspace = Workspace::new();
    workspace.configure(WorkspaceConfig {
        root_path: Some(dir.to_path_buf()),
        include_paths: Vec::new(),
        eager_reanalyze: false,
    });
    workspace
}

#[test]
fn open_analyzes_and_caches() {
    let workspace = Workspace::new();
    let result = workspace.open_document("file:///mem/a.lang", "int x = 1;".to_string(), 1);
    assert_eq!(result.version, 1);
    assert!(result.done);
    let again = workspace.analysis("file:///mem/a.lang").unwrap();
    assert!(std::sync::Arc::ptr_eq(&result, &again));
}

#[test]
fn change_invalidates_and_republishes() {
    let workspace = Workspace::new();
    workspace.open_document("file:///mem/a.lang", "int x = 1;".to_string(), 1);
    let updated = workspace
        .change_document("file:///mem/a.lang", "int x = \"oops\";".to_string(), 2)
        .unwrap();
    assert_eq!(updated.version, 2);
    assert!(!updated.diagnostics.is_empty());
    // Cache freshness: a query immediately after didChange sees v2.
    let query = workspace.analysis("file:///mem/a.lang").unwrap();
    assert_eq!(query.version, 2);
}

#[test]
fn stale_versions_are_dropped() {
    let workspace = Workspace::new();
    workspace.open_document("file:///mem/a.lang", "int x = 1;".to_string(), 5);
    assert!(workspace.change_document("file:///mem/a.lang", "bogus".to_string(), 4).is_none());
    let current = workspace.analysis("file:///mem/a.lang").unwrap();
    assert_eq!(current.version, 5);
    assert!(current.parse.diagnostics.is_empty());
}

#[test]
fn close_drops_cache_entry() {
    let workspace = Workspace::new();
    workspace.open_document("file:///mem/a.lang", "int x = 1;".to_string(), 1);
    workspace.close_document("file:///mem/a.lang");
    assert!(workspace.cached_analysis("file:///mem/a.lang").is_none());
    // Not on disk, so a fresh query cannot reload it.
    assert!(workspace.analysis("file:///mem/a.lang").is_none());
}

#[test]
fn import_resolves_relative_and_binds_exports() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "util.lang", "export int add(int a, int b) { return a + b; }");
    let main_uri = write_file(dir.path(), "main.lang", "import { add } from \"./util\"; add(1, 2);");
    let workspace = workspace_rooted(dir.path());

    let result = workspace.analysis(&main_uri).unwrap();
    let errors: Vec<_> =
        result.diagnostics.iter().filter(|d| d.severity == Severity::Error).collect();
    assert!(errors.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.imports.len(), 1);
    assert!(result.imports[0].ends_with("util.lang"));
}

#[test]
fn imported_symbol_keeps_origin() {
    let dir = tempfile::tempdir().unwrap();
    let util_uri =
        write_file(dir.path(), "util.lang", "export int add(int a, int b) { return a + b; }");
    let main_uri = write_file(dir.path(), "main.lang", "import { add } from \"./util\"; add(1, 2);");
    let workspace = workspace_rooted(dir.path());

    let result = workspace.analysis(&main_uri).unwrap();
    let (_, add) = result
        .symbols
        .symbols()
        .find(|(_, s)| s.name == "add")
        .expect("imported `add` not bound");
    assert_eq!(add.origin_uri.as_deref(), Some(util_uri.as_str()));
    // The defining span points at `add` in util.lang.
    let util_text = "export int add(int a, int b) { return a + b; }";
    assert_eq!(&util_text[add.defining_span.start..add.defining_span.end], "add");
}

#[test]
fn non_exported_symbols_are_invisible() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "util.lang", "int hidden() { return 1; }");
    let main_uri =
        write_file(dir.path(), "main.lang", "import { hidden } from \"./util\"; hidden();");
    let workspace = workspace_rooted(dir.path());

    let result = workspace.analysis(&main_uri).unwrap();
    assert!(
        result.diagnostics.iter().any(|d| d.message.contains("does not export `hidden`")),
        "{:?}",
        result.diagnostics
    );
}

#[test]
fn wildcard_import_binds_module_symbol() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "util.lang", "export int add(int a, int b) { return a + b; }");
    let main_uri = write_file(
        dir.path(),
        "main.lang",
        "import * as util from \"./util\"; int r = util.add(1, 2);",
    );
    let workspace = workspace_rooted(dir.path());

    let result = workspace.analysis(&main_uri).unwrap();
    let errors: Vec<_> =
        result.diagnostics.iter().filter(|d| d.severity == Severity::Error).collect();
    assert!(errors.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn unresolved_import_lists_searched_paths() {
    let dir = tempfile::tempdir().unwrap();
    let main_uri = write_file(dir.path(), "main.lang", "import { x } from \"nowhere/missing\";");
    let workspace = workspace_rooted(dir.path());

    let result = workspace.analysis(&main_uri).unwrap();
    let diag = result
        .diagnostics
        .iter()
        .find(|d| d.message.contains("cannot resolve import"))
        .expect("missing resolution diagnostic");
    let data = diag.data.as_ref().unwrap();
    assert!(data["searched"].as_array().is_some_and(|s| !s.is_empty()));
}

#[test]
fn circular_imports_terminate_with_warning() {
    let dir = tempfile::tempdir().unwrap();
    let a_uri = write_file(dir.path(), "a.lang", "import { b } from \"./b\"; export int a = 1;");
    let b_uri = write_file(dir.path(), "b.lang", "import { a } from \"./a\"; export int b = 2;");
    let workspace = workspace_rooted(dir.path());

    // Bounded time is implied by the test finishing at all.
    let a_result = workspace.analysis(&a_uri).unwrap();
    let b_result = workspace.analysis(&b_uri).unwrap();
    assert!(a_result.done);
    assert!(b_result.done);

    let warned = a_result
        .diagnostics
        .iter()
        .chain(b_result.diagnostics.iter())
        .any(|d| d.severity == Severity::Warning && d.message.contains("circular import"));
    assert!(warned, "a: {:?}\nb: {:?}", a_result.diagnostics, b_result.diagnostics);
}

#[test]
fn import_from_include_path() {
    let dir = tempfile::tempdir().unwrap();
    let libs = dir.path().join("libs");
    std::fs::create_dir_all(&libs).unwrap();
    write_file(&libs, "shared.lang", "export int seven() { return 7; }");
    let main_uri = write_file(dir.path(), "main.lang", "import { seven } from \"shared\"; seven();");

    let workspace = Workspace::new();
    workspace.configure(WorkspaceConfig {
        root_path: Some(dir.path().join("src")),
        include_paths: vec![libs],
        eager_reanalyze: false,
    });

    let result = workspace.analysis(&main_uri).unwrap();
    let errors: Vec<_> =
        result.diagnostics.iter().filter(|d| d.severity == Severity::Error).collect();
    assert!(errors.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn dependents_are_tracked() {
    let dir = tempfile::tempdir().unwrap();
    let util_uri =
        write_file(dir.path(), "util.lang", "export int add(int a, int b) { return a + b; }");
    let main_uri = write_file(dir.path(), "main.lang", "import { add } from \"./util\"; add(1, 2);");
    let workspace = workspace_rooted(dir.path());

    workspace.analysis(&main_uri).unwrap();
    let dependents = workspace.dependents_of(&util_uri);
    assert_eq!(dependents, vec![lang_uri::uri_key(&main_uri)]);
}

#[test]
fn fresh_results_drain_for_publication() {
    let workspace = Workspace::new();
    workspace.open_document("file:///mem/a.lang", "int x = 1;".to_string(), 1);
    let fresh = workspace.drain_fresh_results();
    assert_eq!(fresh.len(), 1);
    assert!(workspace.drain_fresh_results().is_empty());
}
