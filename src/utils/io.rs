//! In-place file replacement primitives.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Copy the current content of `path` to a sibling `<name><suffix>`
/// file and return the backup path.
pub fn backup_file(path: &Path, suffix: &str) -> io::Result<PathBuf> {
    let mut name = path
        .file_name()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid path: {}", path.display()),
            )
        })?
        .to_os_string();
    name.push(suffix);
    let backup = path.with_file_name(name);
    fs::copy(path, &backup)?;
    Ok(backup)
}

/// Write `content` to `path` atomically (write to .tmp, then rename).
///
/// The rename is atomic on POSIX filesystems, so readers always see
/// either the old content or the new content — never a partial write.
pub fn write_replace(path: &Path, content: &str) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid path: {}", path.display()),
        )
    })?;
    let filename = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Invalid path: {}", path.display()),
        )
    })?;

    let tmp_path = parent.join(format!("{}.tmp", filename.to_string_lossy()));

    if let Err(e) = fs::write(&tmp_path, content) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }

    fs::rename(&tmp_path, path)
}
