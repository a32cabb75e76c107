use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::OUTPUT_INDENT;
use crate::error::{PipelineError, Result};
use crate::types::BikeRecord;

/// Reads a JSON array of record objects from `path`
pub fn read_records(path: &Path) -> Result<Vec<BikeRecord>> {
    let content = fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PipelineError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => PipelineError::Io(e),
    })?;

    // from_slice validates UTF-8 itself, so bad encoding is a parse failure
    let records: Vec<BikeRecord> =
        serde_json::from_slice(&content).map_err(|source| PipelineError::MalformedInput {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(path = %path.display(), records = records.len(), "Read input");
    Ok(records)
}

/// Serializes `value` with 4-space indentation
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(OUTPUT_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Writes `value` to `path` as pretty JSON.
///
/// The document is fully serialized before anything touches disk and lands
/// through a rename, so a failed run never leaves a partial file behind.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = to_pretty_json(value)?;
    let write_err = |source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(write_err)?;
    }

    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, &bytes).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }

    debug!(path = %path.display(), bytes = bytes.len(), "Wrote output");
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
