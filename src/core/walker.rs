//! Tree traversal driving the transformer and the manifest patcher.
//!
//! The walker owns file selection: which names are source files, which
//! are build manifests, which directories are skipped outright, and
//! whether a path counts as engine code. Every file's outcome is
//! independent; one unreadable or write-protected file never blocks
//! the rest of the tree.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::manifest::ManifestPatcher;
use crate::rewrite::LineChange;
use crate::rules::RuleSet;
use crate::transform;

/// Directories excluded from the walk at any depth.
const SKIP_DIRS: &[&str] = &["thirdparty", "intermediate"];

/// Extensions handled by the line rewrite engine. The stem must be a
/// plain identifier; `Foo.Bar.cpp` style names are not source files.
const SOURCE_EXTENSIONS: &[&str] = &["inl", "cpp", "h", "ini"];

/// Suffix marking a build manifest.
const MANIFEST_SUFFIX: &str = ".build.cs";

/// Path segment marking engine code, which is exempt from idiom rules.
const ENGINE_SEGMENT: &str = "engine";

/// Explicit run configuration; passed down, never ambient.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Root of the project tree.
    pub root: PathBuf,
    /// Subdirectories to restrict the walk to; empty walks the whole root.
    pub subdirs: Vec<String>,
    /// Rewrite files in place (with backups) instead of previewing.
    pub apply: bool,
}

/// Outcome for one file that produced changes or a diagnostic.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    /// Path relative to the configured root.
    pub path: String,
    pub changes: Vec<LineChange>,
    /// Whether the changes were written to disk.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counts for the whole run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationSummary {
    pub files_scanned: usize,
    pub files_changed: usize,
    pub total_changes: usize,
    pub errors: usize,
}

/// The full result of a migration run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub applied: bool,
    pub files: Vec<FileReport>,
    pub summary: MigrationSummary,
}

/// Walk the configured tree and rewrite (or preview) every eligible file.
pub fn run(rules: &RuleSet, config: &MigrationConfig) -> Result<MigrationReport> {
    if !config.root.is_dir() {
        return Err(Error::validation_invalid_argument(
            "root",
            format!("Not a directory: {}", config.root.display()),
        ));
    }

    let mut scopes = Vec::new();
    if config.subdirs.is_empty() {
        scopes.push(config.root.clone());
    } else {
        for sub in &config.subdirs {
            let scope = config.root.join(sub);
            if !scope.is_dir() {
                return Err(Error::validation_invalid_argument(
                    "dirs",
                    format!("Not a directory under the root: {}", sub),
                ));
            }
            scopes.push(scope);
        }
    }

    let patcher = ManifestPatcher::new();
    let mut files = Vec::new();
    let mut summary = MigrationSummary::default();

    for scope in &scopes {
        log_status!("walk", "Scanning {}", scope.display());
        walk(scope, rules, &patcher, config, &mut files, &mut summary);
    }

    summary.files_changed = files.iter().filter(|f| !f.changes.is_empty()).count();
    summary.total_changes = files.iter().map(|f| f.changes.len()).sum();
    summary.errors = files.iter().filter(|f| f.error.is_some()).count();

    log_status!(
        "walk",
        "Complete: {} files scanned, {} changed, {} change(s), {} error(s)",
        summary.files_scanned,
        summary.files_changed,
        summary.total_changes,
        summary.errors
    );

    Ok(MigrationReport {
        applied: config.apply,
        files,
        summary,
    })
}

fn walk(
    dir: &Path,
    rules: &RuleSet,
    patcher: &ManifestPatcher,
    config: &MigrationConfig,
    files: &mut Vec<FileReport>,
    summary: &mut MigrationSummary,
) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    // Sorted for deterministic reports across platforms.
    let mut entries: Vec<_> = entries.flatten().collect();
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            let name = entry.file_name().to_string_lossy().to_lowercase();
            if SKIP_DIRS.contains(&name.as_str()) {
                continue;
            }
            walk(&path, rules, patcher, config, files, summary);
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_lowercase();
        if is_source_file(&name) {
            summary.files_scanned += 1;
            process_source(&path, rules, config, files);
        } else if name.ends_with(MANIFEST_SUFFIX) {
            summary.files_scanned += 1;
            process_manifest(&path, patcher, config, files);
        }
    }
}

fn process_source(
    path: &Path,
    rules: &RuleSet,
    config: &MigrationConfig,
    files: &mut Vec<FileReport>,
) {
    let engine = is_engine_code(path);
    let (changes, error) = if config.apply {
        transform::apply_file(rules, path, engine)
    } else {
        (transform::scan_file(rules, path, engine), None)
    };

    if changes.is_empty() && error.is_none() {
        return;
    }
    let applied = config.apply && error.is_none() && !changes.is_empty();
    files.push(FileReport {
        path: relative(path, &config.root),
        changes,
        applied,
        error: error.map(|e| e.to_string()),
    });
}

fn process_manifest(
    path: &Path,
    patcher: &ManifestPatcher,
    config: &MigrationConfig,
    files: &mut Vec<FileReport>,
) {
    // Engine manifests already declare their own dependencies.
    if is_engine_code(path) {
        return;
    }

    let (change, error) = if config.apply {
        patcher.apply(path)
    } else {
        (patcher.scan(path), None)
    };

    if change.is_none() && error.is_none() {
        return;
    }
    let applied = config.apply && error.is_none() && change.is_some();
    let changes = change
        .into_iter()
        .map(|c| LineChange {
            line_number: c.line_number,
            original: c.original,
            rewritten: c.rewritten,
        })
        .collect();
    files.push(FileReport {
        path: relative(path, &config.root),
        changes,
        applied,
        error: error.map(|e| e.to_string()),
    });
}

/// A file name shaped like `<identifier>.<source extension>`.
fn is_source_file(lower_name: &str) -> bool {
    let Some((stem, ext)) = lower_name.rsplit_once('.') else {
        return false;
    };
    if !SOURCE_EXTENSIONS.contains(&ext) {
        return false;
    }
    !stem.is_empty() && stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// True when any directory component of the path is `Engine`.
fn is_engine_code(path: &Path) -> bool {
    let Some(parent) = path.parent() else {
        return false;
    };
    parent
        .components()
        .any(|c| c.as_os_str().to_string_lossy().eq_ignore_ascii_case(ENGINE_SEGMENT))
}

fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .to_string()
}

// ============================================================================
// Tests
// ============================================================================
