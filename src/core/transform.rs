//! Per-file scan and apply.
//!
//! `scan_file` derives the change list without touching the tree;
//! `apply_file` re-derives it and rewrites the file in place behind a
//! `.bak` backup. A file that produces no changes is never opened for
//! writing, and a file that cannot be decoded as UTF-8 is treated as
//! having no lines at all rather than failing the walk.

use std::path::Path;

use crate::error::Error;
use crate::rewrite::{check_line, chomp, LineChange};
use crate::rules::RuleSet;
use crate::utils::io;

/// Suffix appended to the pre-rewrite backup copy.
pub const BACKUP_SUFFIX: &str = ".bak";

/// Derive the change list for one file without modifying it.
pub fn scan_file(rules: &RuleSet, path: &Path, engine_code: bool) -> Vec<LineChange> {
    let Ok(content) = std::fs::read_to_string(path) else {
        // Unreadable or non-UTF-8 input: zero lines, empty change list.
        return Vec::new();
    };
    scan_content(rules, &content, engine_code)
}

/// Rewrite one file in place, backing the original up first.
///
/// Changes are re-derived on read; an empty list means the filesystem is
/// not touched at all. A failure while backing up or replacing the file
/// abandons that file and is returned as a recovered error so the walk
/// can report it and continue.
pub fn apply_file(
    rules: &RuleSet,
    path: &Path,
    engine_code: bool,
) -> (Vec<LineChange>, Option<Error>) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return (Vec::new(), None);
    };
    let changes = scan_content(rules, &content, engine_code);
    if changes.is_empty() {
        return (Vec::new(), None);
    }

    let rewritten = rewrite_content(&content, &changes);
    let error = replace_with_backup(path, &rewritten).err();
    (changes, error)
}

fn scan_content(rules: &RuleSet, content: &str, engine_code: bool) -> Vec<LineChange> {
    content
        .split_inclusive('\n')
        .enumerate()
        .filter_map(|(index, raw)| {
            check_line(rules, raw, engine_code).map(|(original, rewritten)| LineChange {
                line_number: index + 1,
                original,
                rewritten,
            })
        })
        .collect()
}

/// Splice the rewritten lines back into the file content. Unchanged
/// lines pass through byte-identical; changed lines keep their original
/// terminator.
fn rewrite_content(content: &str, changes: &[LineChange]) -> String {
    let mut out = String::with_capacity(content.len());
    let mut pending = changes.iter().peekable();

    for (index, raw) in content.split_inclusive('\n').enumerate() {
        match pending.peek() {
            Some(change) if change.line_number == index + 1 => {
                let body = chomp(raw);
                out.push_str(&change.rewritten);
                out.push_str(&raw[body.len()..]);
                pending.next();
            }
            _ => out.push_str(raw),
        }
    }

    out
}

/// Back the original up, then atomically replace the file. The original
/// is left intact whenever the backup or the replacement fails.
pub(crate) fn replace_with_backup(path: &Path, rewritten: &str) -> crate::Result<()> {
    io::backup_file(path, BACKUP_SUFFIX)
        .map_err(|e| Error::file_write(path.display().to_string(), &e))?;
    io::write_replace(path, rewritten)
        .map_err(|e| Error::file_write(path.display().to_string(), &e))?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;
    use std::fs;

    fn rules() -> RuleSet {
        RuleSet::builtin().unwrap()
    }

    #[test]
    fn scan_numbers_lines_from_one() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bot.cpp");
        fs::write(
            &path,
            "#include \"Bot.h\"\n#include \"NavArea.h\"\nvoid F();\n",
        )
        .unwrap();

        let changes = scan_file(&rules(), &path, false);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].line_number, 2);
        assert_eq!(changes[0].original, "#include \"NavArea.h\"");
        assert_eq!(changes[0].rewritten, "#include \"NavAreas/NavArea.h\"");
    }

    #[test]
    fn scan_does_not_modify_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bot.cpp");
        fs::write(&path, "#include \"NavArea.h\"\n").unwrap();

        scan_file(&rules(), &path, false);
        assert_eq!(fs::read_to_string(&path).unwrap(), "#include \"NavArea.h\"\n");
        assert!(!dir.path().join("Bot.cpp.bak").exists());
    }

    #[test]
    fn non_utf8_file_scans_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Binary.h");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x41]).unwrap();

        assert!(scan_file(&rules(), &path, false).is_empty());
        let (changes, error) = apply_file(&rules(), &path, false);
        assert!(changes.is_empty());
        assert!(error.is_none());
    }

    #[test]
    fn apply_rewrites_in_place_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bot.cpp");
        let original = "#include \"NavArea.h\"\nvoid F();\n";
        fs::write(&path, original).unwrap();

        let (changes, error) = apply_file(&rules(), &path, false);
        assert!(error.is_none());
        assert_eq!(changes.len(), 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "#include \"NavAreas/NavArea.h\"\nvoid F();\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("Bot.cpp.bak")).unwrap(),
            original
        );
    }

    #[test]
    fn clean_file_is_never_opened_for_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Clean.cpp");
        fs::write(&path, "void F();\n").unwrap();

        let (changes, error) = apply_file(&rules(), &path, false);
        assert!(changes.is_empty());
        assert!(error.is_none());
        assert!(!dir.path().join("Clean.cpp.bak").exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), "void F();\n");
    }

    #[test]
    fn second_apply_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bot.cpp");
        fs::write(&path, "#include \"NavArea.h\"\n/Script/Engine.NavigationSystem\n").unwrap();

        let (first, _) = apply_file(&rules(), &path, false);
        assert_eq!(first.len(), 2);
        let migrated = fs::read_to_string(&path).unwrap();

        fs::remove_file(dir.path().join("Bot.cpp.bak")).unwrap();
        let (second, error) = apply_file(&rules(), &path, false);
        assert!(second.is_empty());
        assert!(error.is_none());
        assert!(!dir.path().join("Bot.cpp.bak").exists());
        assert_eq!(fs::read_to_string(&path).unwrap(), migrated);
    }

    #[test]
    fn crlf_terminators_survive_the_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bot.cpp");
        fs::write(&path, "#include \"NavArea.h\"\r\nvoid F();\r\n").unwrap();

        let (changes, error) = apply_file(&rules(), &path, false);
        assert!(error.is_none());
        assert_eq!(changes.len(), 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "#include \"NavAreas/NavArea.h\"\r\nvoid F();\r\n"
        );
    }

    #[test]
    fn file_without_trailing_newline_keeps_its_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bot.cpp");
        fs::write(&path, "#include \"NavArea.h\"").unwrap();

        let (changes, _) = apply_file(&rules(), &path, false);
        assert_eq!(changes.len(), 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "#include \"NavAreas/NavArea.h\""
        );
    }

    #[cfg(unix)]
    #[test]
    fn write_failure_is_recovered_not_raised() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Bot.cpp");
        fs::write(&path, "#include \"NavArea.h\"\n").unwrap();

        // Read-only directory: the backup copy cannot be created.
        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o555)).unwrap();
        if fs::write(dir.path().join("probe"), "x").is_ok() {
            // Permission bits don't bind this user (root); nothing to test.
            return;
        }

        let (changes, error) = apply_file(&rules(), &path, false);
        assert_eq!(changes.len(), 1);
        let error = error.expect("expected a recovered write error");
        assert_eq!(error.code.as_str(), "file.write_failed");

        fs::set_permissions(dir.path(), fs::Permissions::from_mode(0o755)).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "#include \"NavArea.h\"\n"
        );
    }
}
