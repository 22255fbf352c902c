use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{PipelineError, PipelineResult};

/// Name of the optional overrides file looked up in the base directory.
pub const CONFIG_FILE_NAME: &str = "knot_trainer.json";

/// Environment variable that points the pipeline at a base directory.
pub const BASE_DIR_ENV: &str = "KNOT_TRAINER_BASE_DIR";

/// Pipeline configuration.
///
/// Every field has a default, so a config file only needs to name the values
/// it overrides. The defaults reproduce the fixed knot detector run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw dataset folder under the base directory (holds `images/` and `labels/`)
    pub raw_dataset_dir: String,
    /// Working folder the split is materialized into
    pub work_dir: String,
    /// Manifest file written into the base directory
    pub manifest_file: String,
    /// Extension of the raw images, without the dot
    pub image_extension: String,
    /// Fraction of samples assigned to the validation split
    pub val_ratio: f64,
    /// Seed for the split shuffle
    pub seed: u64,
    /// Class id to class name table
    pub class_names: BTreeMap<u32, String>,
    /// Pretrained checkpoint handed to the detection framework
    pub checkpoint: String,
    pub epochs: u32,
    pub image_size: u32,
    /// Training output folder under the base directory
    pub project_dir: String,
    pub run_name: String,
    pub export_format: String,
    pub opset: u32,
    /// Detection framework command-line program
    pub trainer_program: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dataset_dir: "WoodDataset".to_string(),
            work_dir: "yolo_data".to_string(),
            manifest_file: "data.yaml".to_string(),
            image_extension: "png".to_string(),
            val_ratio: 0.2,
            seed: 29,
            class_names: BTreeMap::from([(0, "knot".to_string())]),
            checkpoint: "yolov8n.pt".to_string(),
            epochs: 20,
            image_size: 640,
            project_dir: "runs".to_string(),
            run_name: "knot_detector".to_string(),
            export_format: "onnx".to_string(),
            opset: 12,
            trainer_program: "yolo".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn raw_images_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.raw_dataset_dir).join("images")
    }

    pub fn raw_labels_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.raw_dataset_dir).join("labels")
    }

    pub fn work_root(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.work_dir)
    }

    pub fn manifest_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.manifest_file)
    }

    pub fn project_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.project_dir)
    }

    /// Candidate config files, in lookup order.
    pub fn config_paths(base_dir: &Path) -> Vec<PathBuf> {
        let mut paths = vec![base_dir.join(CONFIG_FILE_NAME)];
        if let Some(dirs) = ProjectDirs::from("", "", "knot-trainer") {
            paths.push(dirs.config_dir().join(CONFIG_FILE_NAME));
        }
        paths
    }

    /// Read a config file. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> PipelineResult<Option<Self>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(PipelineError::io(path, e)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|source| PipelineError::Config {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Load the first config file found for `base_dir`, or defaults.
    ///
    /// A broken config file is reported and skipped rather than aborting the run.
    pub fn load(base_dir: &Path) -> Self {
        Self::load_first(&Self::config_paths(base_dir))
    }

    /// Load the first readable config among `paths`, or defaults.
    pub fn load_first(paths: &[PathBuf]) -> Self {
        for path in paths {
            match Self::load_from(path) {
                Ok(Some(config)) => {
                    info!("Loaded config from: {:?}", path);
                    return config;
                }
                Ok(None) => {}
                Err(e) => warn!("{}. Ignoring it.", e),
            }
        }

        info!("No config file found. Using defaults.");
        Self::default()
    }
}

/// Base directory for the run: `KNOT_TRAINER_BASE_DIR` if set, else the
/// current directory. Relative values are resolved against the current directory.
pub fn resolve_base_dir() -> PipelineResult<PathBuf> {
    let cwd = std::env::current_dir().map_err(|e| PipelineError::io(".", e))?;
    Ok(match std::env::var_os(BASE_DIR_ENV) {
        Some(dir) if !dir.is_empty() => cwd.join(dir),
        _ => cwd,
    })
}
