use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};

/// The unsplit source dataset: `images/` plus optional per-image labels.
#[derive(Debug, Clone)]
pub struct RawDataset {
    images_dir: PathBuf,
    labels_dir: PathBuf,
    image_files: Vec<OsString>,
}

impl RawDataset {
    /// Enumerate the images in `images_dir` with the given extension.
    ///
    /// File names are sorted so the listing is independent of directory order.
    /// A missing `images_dir` is an error; an empty one only warns.
    pub fn open(images_dir: &Path, labels_dir: &Path, extension: &str) -> PipelineResult<Self> {
        if !images_dir.is_dir() {
            return Err(PipelineError::DatasetMissing(images_dir.to_path_buf()));
        }

        let entries = fs::read_dir(images_dir).map_err(|e| PipelineError::io(images_dir, e))?;

        let mut image_files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| PipelineError::io(images_dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            // Extension must match exactly: `.PNG` is not a `.png` image
            if path.extension() == Some(OsStr::new(extension)) {
                image_files.push(entry.file_name());
            }
        }
        image_files.sort();

        if image_files.is_empty() {
            warn!("Folder {:?} has no .{} files", images_dir, extension);
        } else {
            info!("Found {} images in {:?}", image_files.len(), images_dir);
        }

        Ok(Self {
            images_dir: images_dir.to_path_buf(),
            labels_dir: labels_dir.to_path_buf(),
            image_files,
        })
    }

    pub fn image_files(&self) -> &[OsString] {
        &self.image_files
    }

    pub fn image_path(&self, file_name: &OsString) -> PathBuf {
        self.images_dir.join(file_name)
    }

    /// Label file matching an image by stem. It may not exist.
    pub fn label_path(&self, file_name: &OsString) -> PathBuf {
        self.labels_dir.join(label_file_name(file_name))
    }
}

/// `board_01.png` -> `board_01.txt`
pub fn label_file_name(image_file: &OsString) -> OsString {
    let stem = Path::new(image_file)
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| image_file.clone());
    let mut name = stem;
    name.push(".txt");
    name
}
