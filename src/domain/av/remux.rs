use crate::error::MediaError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix appended to the staged file name for the remuxed copy.
pub const PROCESSING_SUFFIX: &str = ".processing";

/// Sibling path the remuxer writes to: `<input>.processing`.
pub fn processing_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(PROCESSING_SUFFIX);
    PathBuf::from(name)
}

/// A remux is only usable if it produced a non-empty file.
///
/// Returns the output size in bytes.
pub async fn verify_output(output: &Path) -> Result<u64, MediaError> {
    let metadata = tokio::fs::metadata(output)
        .await
        .map_err(|e| MediaError::Remux(format!("could not stat remuxed file: {e}")))?;

    if metadata.len() == 0 {
        return Err(MediaError::EmptyOutput);
    }
    Ok(metadata.len())
}
