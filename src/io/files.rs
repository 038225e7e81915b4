//! Raw file access for interchange files
//!
//! Return files are read whole: the trailer count has to be checked before
//! any event is released, so there is nothing to gain from streaming.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::types::BoletoError;

/// Map an open/read failure, keeping "not found" distinct from other I/O errors
pub(crate) fn not_found_or_io(path: &Path, error: std::io::Error) -> BoletoError {
    if error.kind() == ErrorKind::NotFound {
        BoletoError::FileNotFound {
            path: path.display().to_string(),
        }
    } else {
        BoletoError::from(error)
    }
}

/// Read a return file from disk
pub fn read_return_file(path: &Path) -> Result<Vec<u8>, BoletoError> {
    let bytes = fs::read(path).map_err(|e| not_found_or_io(path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Return file read");
    Ok(bytes)
}

/// Read a return file on the tokio runtime
pub async fn read_return_file_async(path: &Path) -> Result<Vec<u8>, BoletoError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| not_found_or_io(path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "Return file read");
    Ok(bytes)
}

/// Write a remittance batch into `dir` under its generated file name
///
/// The directory is created when missing. Returns the full path written.
pub fn write_batch_file(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, BoletoError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, bytes)?;
    Ok(path)
}
