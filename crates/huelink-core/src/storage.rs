// Whole-file replacement for the credential and snapshot files.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::CoreError;

/// Write `contents` to `path` via a sibling temp file and a rename, so a
/// crash never leaves a half-written file behind. The temp file is created
/// with owner-only permissions on Unix and keeps them after the rename.
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), CoreError> {
    let storage_err = |source| CoreError::Storage {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(storage_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(storage_err)?;
    tmp.write_all(contents).map_err(storage_err)?;
    tmp.as_file().sync_all().map_err(storage_err)?;
    tmp.persist(path).map_err(|e| storage_err(e.error))?;
    Ok(())
}
