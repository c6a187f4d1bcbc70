//! Blank tabular template for operators to fill in.

use std::path::Path;

use tracing::info;

use qamerge_shared::{QaMergeError, Result, TABULAR_COLUMNS};

/// Write a header-only CSV to `path`.
///
/// Refuses to replace an existing file unless `force` is set, so a filled-in
/// sheet is never wiped by accident.
pub fn write_template(path: &Path, delimiter: u8, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(QaMergeError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| QaMergeError::io(parent, e))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| QaMergeError::write(path, std::io::Error::other(e)))?;
    writer
        .write_record(TABULAR_COLUMNS)
        .map_err(|e| QaMergeError::write(path, std::io::Error::other(e)))?;
    writer.flush().map_err(|e| QaMergeError::write(path, e))?;

    info!(path = %path.display(), "wrote tabular template");
    Ok(())
}
