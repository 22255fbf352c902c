use std::fs;
use std::path::Path;
use tracing::{debug, error};

use crate::error::{PipelineError, PipelineResult};

/// Create a directory and its parents. Succeeds if it already exists.
pub fn ensure_dir(dir: &Path) -> PipelineResult<()> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::io(dir, e))
}

/// Copy a file, replacing the destination if it exists.
///
/// # Returns
/// * `Ok(bytes)` number of bytes copied
/// * `Err(PipelineError::CopyFailed)` if the copy failed
pub fn copy_file(src: &Path, dest: &Path) -> PipelineResult<u64> {
    fs::copy(src, dest).map_err(|source| {
        error!("Failed to copy file from {:?} to {:?}: {}", src, dest, source);
        PipelineError::CopyFailed {
            src: src.to_path_buf(),
            dest: dest.to_path_buf(),
            source,
        }
    })
}

/// Copy `src` to `dest` only when `src` exists.
///
/// # Returns
/// * `Ok(true)` if the file was copied
/// * `Ok(false)` if there was nothing to copy
pub fn copy_if_exists(src: &Path, dest: &Path) -> PipelineResult<bool> {
    if !src.is_file() {
        debug!("No file at {:?}, skipping", src);
        return Ok(false);
    }
    copy_file(src, dest)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_copy_file_overwrites() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dest = dir.path().join("dest.txt");
        fs::write(&src, "new").unwrap();
        fs::write(&dest, "old contents").unwrap();

        assert_eq!(copy_file(&src, &dest).unwrap(), 3);
        assert_eq!(fs::read_to_string(&dest).unwrap(), "new");
        assert_eq!(fs::read_to_string(&src).unwrap(), "new");
    }

    #[test]
    fn test_copy_file_missing_source() {
        let dir = tempdir().unwrap();
        let err = copy_file(&dir.path().join("nope"), &dir.path().join("dest")).unwrap_err();
        assert!(matches!(err, PipelineError::CopyFailed { .. }));
    }

    #[test]
    fn test_copy_if_exists() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("label.txt");
        let dest = dir.path().join("copy.txt");

        assert!(!copy_if_exists(&src, &dest).unwrap());
        assert!(!dest.exists());

        fs::write(&src, "0 0.5 0.5 0.1 0.1").unwrap();
        assert!(copy_if_exists(&src, &dest).unwrap());
        assert!(dest.exists());
    }

    #[test]
    fn test_ensure_dir_is_idempotent() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_dir(&nested).unwrap();
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
