//! The linear run: prepare -> train -> export -> done.

use std::path::{Path, PathBuf};
use tracing::{error, info, info_span, warn};

use crate::config::PipelineConfig;
use crate::data::{materialize, split_samples, DatasetManifest, RawDataset, SplitStats};
use crate::error::{PipelineError, PipelineResult};
use crate::trainer::{
    DetectionFramework, DetectionModel, ExportOutcome, ExportRequest, TrainRequest,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Prepare,
    Train,
    Export,
    Done,
}

impl Stage {
    pub fn as_str(&self) -> &str {
        match self {
            Stage::Prepare => "prepare",
            Stage::Train => "train",
            Stage::Export => "export",
            Stage::Done => "done",
        }
    }
}

/// Result of the data preparation stage.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub manifest_path: PathBuf,
    pub manifest: DatasetManifest,
    pub splits: Vec<SplitStats>,
}

#[derive(Debug)]
pub enum PipelineOutcome {
    /// The raw images folder was absent; nothing was written.
    DatasetMissing(PathBuf),
    Completed {
        splits: Vec<SplitStats>,
        export: ExportOutcome,
    },
}

impl PipelineOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PipelineOutcome::Completed { .. })
    }
}

/// Split the raw dataset into the working directory and write the manifest.
pub fn prepare_data(config: &PipelineConfig, base_dir: &Path) -> PipelineResult<PreparedDataset> {
    let raw = RawDataset::open(
        &config.raw_images_dir(base_dir),
        &config.raw_labels_dir(base_dir),
        &config.image_extension,
    )?;

    let assignment = split_samples(raw.image_files().to_vec(), config.val_ratio, config.seed);
    info!(
        "Assigned {} of {} images to train and {} to val",
        assignment.train.len(),
        assignment.len(),
        assignment.val.len()
    );

    let work_root = config.work_root(base_dir);
    let splits = materialize(&raw, &assignment, &work_root)?;

    let manifest = DatasetManifest::new(&work_root, &config.class_names);
    let manifest_path = config.manifest_path(base_dir);
    manifest.write(&manifest_path)?;

    Ok(PreparedDataset {
        manifest_path,
        manifest,
        splits,
    })
}

/// Load the checkpoint, train it on the manifest and export the result.
pub fn train_and_export<F: DetectionFramework>(
    framework: &F,
    config: &PipelineConfig,
    base_dir: &Path,
) -> PipelineResult<ExportOutcome> {
    let model = {
        let _span = info_span!("train").entered();
        let mut model = framework.load(&config.checkpoint)?;
        let request = TrainRequest::from_config(config, base_dir);
        let manifest = DatasetManifest::load(&request.data)?;
        info!(
            "Dataset {:?}: train {}, val {}",
            manifest.path, manifest.train, manifest.val
        );
        info!(
            "Training for {} epochs at {}px, run {:?}",
            request.epochs, request.image_size, request.name
        );
        model.train(&request)?;
        model
    };

    info!("Stage: {}", Stage::Export.as_str());
    let _span = info_span!("export").entered();
    let request = ExportRequest::from_config(config);
    let outcome = model.export(&request)?;
    if outcome.success {
        match &outcome.artifact {
            Some(path) => info!("Success, {} file is created: {:?}", request.format, path),
            None => info!("Success, {} export finished", request.format),
        }
    } else {
        warn!("Export to {} failed", request.format);
    }

    Ok(outcome)
}

/// Run every stage in order.
///
/// A missing raw dataset stops the run before anything is written and is
/// reported as `PipelineOutcome::DatasetMissing`; every other failure is
/// returned as an error.
pub fn run<F: DetectionFramework>(
    framework: &F,
    config: &PipelineConfig,
    base_dir: &Path,
) -> PipelineResult<PipelineOutcome> {
    let _span = info_span!("pipeline").entered();

    info!("Stage: {}", Stage::Prepare.as_str());
    let prepared = {
        let _span = info_span!("prepare").entered();
        match prepare_data(config, base_dir) {
            Ok(prepared) => prepared,
            Err(PipelineError::DatasetMissing(path)) => {
                error!("Folder {:?} doesn't exist", path);
                return Ok(PipelineOutcome::DatasetMissing(path));
            }
            Err(e) => return Err(e),
        }
    };
    info!(
        "Dataset ready, manifest at {:?} with {} classes",
        prepared.manifest_path,
        prepared.manifest.names.len()
    );

    info!("Stage: {}", Stage::Train.as_str());
    let export = train_and_export(framework, config, base_dir)?;

    info!("Stage: {}", Stage::Done.as_str());
    Ok(PipelineOutcome::Completed {
        splits: prepared.splits,
        export,
    })
}
