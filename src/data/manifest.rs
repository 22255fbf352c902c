use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::data::dataset::DatasetSplit;
use crate::error::{PipelineError, PipelineResult};

/// Dataset description handed to the detection framework (`data.yaml`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetManifest {
    /// Working directory root
    pub path: PathBuf,
    /// Train images, relative to `path`
    pub train: String,
    /// Validation images, relative to `path`
    pub val: String,
    pub names: BTreeMap<u32, String>,
}

impl DatasetManifest {
    pub fn new(work_root: &Path, class_names: &BTreeMap<u32, String>) -> Self {
        Self {
            path: work_root.to_path_buf(),
            train: DatasetSplit::Train.images_subdir(),
            val: DatasetSplit::Val.images_subdir(),
            names: class_names.clone(),
        }
    }

    /// Serialize to `manifest_path`, replacing any previous manifest.
    pub fn write(&self, manifest_path: &Path) -> PipelineResult<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(manifest_path, yaml).map_err(|e| PipelineError::io(manifest_path, e))?;
        info!("Manifest written to: {:?}", manifest_path);
        Ok(())
    }

    pub fn load(manifest_path: &Path) -> PipelineResult<Self> {
        let contents =
            fs::read_to_string(manifest_path).map_err(|e| PipelineError::io(manifest_path, e))?;
        Ok(serde_yaml::from_str(&contents)?)
    }
}
