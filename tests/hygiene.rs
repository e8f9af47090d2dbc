//! Source hygiene checks for the certcanvas crate.
//!
//! Scans `src/` (test modules excluded) for constructs that crash the WASM
//! module or silently drop errors. Budgets only ever go down.
#![allow(clippy::absurd_extreme_comparisons)]

use std::fs;
use std::path::{Path, PathBuf};

// Anything that aborts the module in the browser.
const MAX_UNWRAP: usize = 0;
const MAX_EXPECT: usize = 0;
const MAX_PANIC: usize = 0;
const MAX_UNREACHABLE: usize = 0;
const MAX_TODO: usize = 0;
const MAX_UNIMPLEMENTED: usize = 0;

// Errors discarded without being logged or returned.
const MAX_SILENT_DISCARD: usize = 0;
const MAX_DOT_OK: usize = 0;

const MAX_ALLOW_DEAD_CODE: usize = 0;

struct SourceFile {
    path: PathBuf,
    content: String,
}

impl SourceFile {
    fn is_test(&self) -> bool {
        self.path.to_string_lossy().ends_with("_test.rs")
    }
}

fn all_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    walk(Path::new("src"), &mut files);
    files
}

/// Production sources only.
fn source_files() -> Vec<SourceFile> {
    all_files().into_iter().filter(|f| !f.is_test()).collect()
}

fn walk(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs")
            && let Ok(content) = fs::read_to_string(&path)
        {
            out.push(SourceFile { path, content });
        }
    }
}

/// Per-file line counts for `pattern`, skipping files with no hits.
fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .map(|f| (f.path.display().to_string(), f.content.lines().filter(|l| l.contains(pattern)).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

fn assert_budget(pattern: &str, max: usize) {
    let found = hits(&source_files(), pattern);
    let count: usize = found.iter().map(|(_, n)| n).sum();
    let listing = found.iter().map(|(path, n)| format!("  {path}: {n}")).collect::<Vec<_>>().join("\n");
    assert!(count <= max, "`{pattern}` budget exceeded: found {count}, max {max}.\n{listing}");
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("engine.rs")), "src/ not scanned; run from the crate root");
}

#[test]
fn unwrap_budget() {
    assert_budget(".unwrap()", MAX_UNWRAP);
}

#[test]
fn expect_budget() {
    assert_budget(".expect(", MAX_EXPECT);
}

#[test]
fn panic_budget() {
    assert_budget("panic!(", MAX_PANIC);
}

#[test]
fn unreachable_budget() {
    assert_budget("unreachable!(", MAX_UNREACHABLE);
}

#[test]
fn todo_budget() {
    assert_budget("todo!(", MAX_TODO);
}

#[test]
fn unimplemented_budget() {
    assert_budget("unimplemented!(", MAX_UNIMPLEMENTED);
}

#[test]
fn silent_discard_budget() {
    assert_budget("let _ =", MAX_SILENT_DISCARD);
}

#[test]
fn dot_ok_budget() {
    assert_budget(".ok()", MAX_DOT_OK);
}

#[test]
fn allow_dead_code_budget() {
    assert_budget("#[allow(dead_code)]", MAX_ALLOW_DEAD_CODE);
}

/// Every `foo_test.rs` must be mounted by `foo.rs`, or its tests never run.
#[test]
fn test_modules_are_wired() {
    let files = all_files();
    let mut orphans = Vec::new();
    for test in files.iter().filter(|f| f.is_test()) {
        let Some(name) = test.path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let owner = test.path.with_file_name(name.replace("_test.rs", ".rs"));
        let attr = format!("#[path = \"{name}\"]");
        let wired = files.iter().any(|f| f.path == owner && f.content.contains(&attr));
        if !wired {
            orphans.push(name);
        }
    }
    assert!(orphans.is_empty(), "unwired test modules: {orphans:?}");
}
