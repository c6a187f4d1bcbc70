//! Loading and persisting Q&A collections.
//!
//! A collection is a pretty-printed JSON array of [`QaRecord`]s. Rendering is
//! canonical: parsing a written file and rendering it again yields the same
//! bytes.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use qamerge_shared::{QaMergeError, QaRecord, Result};

/// Load the collection at `path`.
///
/// Returns `Ok(None)` only when the file does not exist; the merge then
/// starts from an empty base. Any other read failure is a load error.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_collection(path: &Path) -> Result<Option<Vec<QaRecord>>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("existing collection not found, starting from an empty base");
            return Ok(None);
        }
        Err(e) => return Err(QaMergeError::load(path, format!("cannot read file: {e}"))),
    };

    let records = parse_collection(path, &content)?;

    info!(records = records.len(), "loaded existing collection");
    Ok(Some(records))
}

/// Parse collection JSON text. `origin` is only used in error messages.
///
/// Every record must have a non-blank question and answer.
pub fn parse_collection(origin: &Path, content: &str) -> Result<Vec<QaRecord>> {
    let records: Vec<QaRecord> = serde_json::from_str(content)
        .map_err(|e| QaMergeError::load(origin, format!("invalid collection JSON: {e}")))?;

    for (index, record) in records.iter().enumerate() {
        if record.question.trim().is_empty() {
            return Err(QaMergeError::load(
                origin,
                format!("record {index} has an empty question"),
            ));
        }
        if record.answer.trim().is_empty() {
            return Err(QaMergeError::load(
                origin,
                format!("record {index} has an empty answer"),
            ));
        }
    }

    Ok(records)
}

/// Render records in the canonical on-disk form.
pub fn render_collection(records: &[QaRecord]) -> Result<String> {
    let mut json = serde_json::to_string_pretty(records)
        .map_err(|e| QaMergeError::Serialize(e.to_string()))?;
    json.push('\n');
    Ok(json)
}

/// Write `records` to `path` atomically (temp file, then rename).
///
/// Returns the SHA-256 hex digest of the bytes written. On failure the
/// target is left untouched and the temp file is removed.
#[instrument(skip_all, fields(path = %path.display(), records = records.len()))]
pub fn write_collection(path: &Path, records: &[QaRecord]) -> Result<String> {
    let content = render_collection(records)?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if !parent.is_dir() {
        return Err(QaMergeError::write(
            path,
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("directory {} does not exist", parent.display()),
            ),
        ));
    }

    let temp = temp_path_for(path);

    if let Err(e) = std::fs::write(&temp, &content) {
        let _ = std::fs::remove_file(&temp);
        return Err(QaMergeError::write(path, e));
    }

    if let Err(e) = std::fs::rename(&temp, path) {
        let _ = std::fs::remove_file(&temp);
        return Err(QaMergeError::write(path, e));
    }

    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let hash = format!("{:x}", hasher.finalize());

    debug!(size = content.len(), sha256 = %hash, "wrote collection");
    Ok(hash)
}

/// Hidden sibling temp file used for the atomic write.
fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "collection.json".to_string());
    path.with_file_name(format!(".{name}.tmp"))
}
