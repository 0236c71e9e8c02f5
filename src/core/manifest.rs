//! Build manifest patching.
//!
//! `*.Build.cs` dependency lists gain a `"NavigationSystem"` entry next
//! to the first `"AIModule"` declaration. A manifest that already
//! declares the new module is never touched, even when the legacy module
//! is also present, which keeps the patch idempotent. At most one change
//! is made per manifest.

use std::path::Path;

use regex::Regex;
use serde::Serialize;

use crate::error::Error;
use crate::rewrite::chomp;
use crate::transform::replace_with_backup;

/// Token whose presence means the manifest is already migrated.
pub const NEW_MODULE_TOKEN: &str = "\"NavigationSystem\"";
/// Token marking the dependency the new module is inserted next to.
pub const LEGACY_MODULE_TOKEN: &str = "\"AIModule\"";

/// The single dependency-list insertion for one manifest.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestChange {
    /// Line number of the legacy declaration, starting at 1.
    pub line_number: usize,
    pub original: String,
    /// Two-line replacement: the new declaration above the untouched
    /// legacy line, with an embedded newline between them.
    pub rewritten: String,
}

/// Specialized single-purpose rewriter for build manifests.
#[derive(Debug)]
pub struct ManifestPatcher {
    legacy_decl: Regex,
}

impl ManifestPatcher {
    pub fn new() -> Self {
        ManifestPatcher {
            // Leading whitespace and the trailing comma are captured so
            // the insertion can mirror the declaration's style.
            legacy_decl: Regex::new(r#"(\s*)"AIModule"\s*(,?)"#).unwrap(),
        }
    }

    /// Locate the insertion in raw manifest text, if one is needed.
    pub fn find_change(&self, content: &str) -> Option<ManifestChange> {
        if content.contains(NEW_MODULE_TOKEN) || !content.contains(LEGACY_MODULE_TOKEN) {
            return None;
        }

        for (index, raw) in content.split_inclusive('\n').enumerate() {
            let line = chomp(raw);
            if let Some(caps) = self.legacy_decl.captures(line) {
                let prefix = &line[..caps.get(0).unwrap().start()];
                let indent = &caps[1];
                let rewritten = format!("{}{}\"NavigationSystem\",\n{}", prefix, indent, line);
                return Some(ManifestChange {
                    line_number: index + 1,
                    original: line.to_string(),
                    rewritten,
                });
            }
        }

        None
    }

    /// Preview the patch for one manifest file. Unreadable or non-UTF-8
    /// manifests scan as unchanged.
    pub fn scan(&self, path: &Path) -> Option<ManifestChange> {
        let content = std::fs::read_to_string(path).ok()?;
        self.find_change(&content)
    }

    /// Apply the patch to one manifest file.
    ///
    /// Failures are returned as recovered errors next to the attempted
    /// change so the walk can report them and continue.
    pub fn apply(&self, path: &Path) -> (Option<ManifestChange>, Option<Error>) {
        let Some(change) = self.scan(path) else {
            return (None, None);
        };
        let error = self.apply_scanned(path, &change).err();
        (Some(change), error)
    }

    /// Validate a previously scanned change against the file's current
    /// content, then write the patch behind a backup.
    ///
    /// The target line is re-validated immediately before being
    /// overwritten; a mismatch means something else modified the
    /// manifest in the meantime, and the file is left untouched.
    pub fn apply_scanned(&self, path: &Path, change: &ManifestChange) -> crate::Result<()> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::file_write(path.display().to_string(), &e))?;

        let found = content
            .split_inclusive('\n')
            .nth(change.line_number - 1)
            .map(chomp)
            .unwrap_or_default();
        if found != change.original {
            return Err(Error::manifest_consistency(
                path.display().to_string(),
                change.line_number,
                change.original.clone(),
                found.to_string(),
            ));
        }

        let rewritten = splice(&content, change);
        replace_with_backup(path, &rewritten)
    }
}

impl Default for ManifestPatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace the changed line, keeping its original terminator.
fn splice(content: &str, change: &ManifestChange) -> String {
    let mut out = String::with_capacity(content.len() + change.rewritten.len());
    for (index, raw) in content.split_inclusive('\n').enumerate() {
        if index + 1 == change.line_number {
            let body = chomp(raw);
            out.push_str(&change.rewritten);
            out.push_str(&raw[body.len()..]);
        } else {
            out.push_str(raw);
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
