//! Text rendering of a migration report.
//!
//! One banner per file, then one line per change. Recovered per-file
//! diagnostics print after the change list so a failed apply still shows
//! what it would have rewritten.

use std::fmt::Write;

use crate::walker::{FileReport, MigrationReport};

const FILE_RULE: &str =
    "===================================================================================";
const CHANGE_RULE: &str =
    "-----------------------------------------------------------------------------------";

/// Render the whole report; empty string when nothing changed.
pub fn render_report(report: &MigrationReport) -> String {
    let mut out = String::new();
    for file in &report.files {
        render_file(&mut out, file);
    }
    out
}

fn render_file(out: &mut String, file: &FileReport) {
    let _ = writeln!(out, "{}", FILE_RULE);
    let _ = writeln!(out, "{}", file.path);
    let _ = writeln!(out, "{}", CHANGE_RULE);
    for change in &file.changes {
        let _ = writeln!(
            out,
            "{}: {} -> {}",
            change.line_number, change.original, change.rewritten
        );
    }
    if let Some(error) = &file.error {
        let _ = writeln!(out, "{}", error);
    }
}

// ============================================================================
// Tests
// ============================================================================
