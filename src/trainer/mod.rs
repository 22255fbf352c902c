//! Seam to the external detection framework.
//!
//! Training and export are done entirely by the framework; this crate only
//! loads a checkpoint, hands it the manifest and hyperparameters, and asks for
//! an export.

mod ultralytics;

use std::path::PathBuf;

use crate::config::PipelineConfig;
use crate::error::PipelineResult;

pub use ultralytics::UltralyticsCli;

#[derive(Debug, Clone, PartialEq)]
pub struct TrainRequest {
    /// Manifest describing the dataset
    pub data: PathBuf,
    pub epochs: u32,
    pub image_size: u32,
    /// Folder the framework writes its runs into
    pub project: PathBuf,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub format: String,
    pub opset: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportOutcome {
    pub success: bool,
    /// Exported file, when the framework left one where expected
    pub artifact: Option<PathBuf>,
}

impl TrainRequest {
    pub fn from_config(config: &PipelineConfig, base_dir: &std::path::Path) -> Self {
        Self {
            data: config.manifest_path(base_dir),
            epochs: config.epochs,
            image_size: config.image_size,
            project: config.project_path(base_dir),
            name: config.run_name.clone(),
        }
    }
}

impl ExportRequest {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            format: config.export_format.clone(),
            opset: config.opset,
        }
    }
}

/// Loads model handles from checkpoints.
pub trait DetectionFramework {
    type Model: DetectionModel;

    fn load(&self, checkpoint: &str) -> PipelineResult<Self::Model>;
}

/// A model handle owned by the framework.
pub trait DetectionModel {
    /// Train in place. Afterwards the handle refers to the trained weights.
    fn train(&mut self, request: &TrainRequest) -> PipelineResult<()>;

    fn export(&self, request: &ExportRequest) -> PipelineResult<ExportOutcome>;
}
