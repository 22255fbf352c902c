use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{info, warn};

use super::{DetectionFramework, DetectionModel, ExportOutcome, ExportRequest, TrainRequest};
use crate::error::{PipelineError, PipelineResult};

/// Drives the Ultralytics `yolo` command-line program.
#[derive(Debug, Clone)]
pub struct UltralyticsCli {
    program: String,
}

impl UltralyticsCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl DetectionFramework for UltralyticsCli {
    type Model = UltralyticsModel;

    fn load(&self, checkpoint: &str) -> PipelineResult<UltralyticsModel> {
        info!("Using checkpoint {}", checkpoint);
        Ok(UltralyticsModel {
            program: self.program.clone(),
            weights: PathBuf::from(checkpoint),
        })
    }
}

#[derive(Debug, Clone)]
pub struct UltralyticsModel {
    program: String,
    weights: PathBuf,
}

impl UltralyticsModel {
    pub fn weights(&self) -> &Path {
        &self.weights
    }

    fn run(&self, args: &[OsString]) -> PipelineResult<ExitStatus> {
        info!(
            "Running {} {}",
            self.program,
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        // stdio is inherited so the framework's own progress output reaches the terminal
        Command::new(&self.program)
            .args(args)
            .status()
            .map_err(|source| PipelineError::Spawn {
                program: self.program.clone(),
                source,
            })
    }
}

fn key_value(key: &str, value: impl AsRef<std::ffi::OsStr>) -> OsString {
    let mut arg = OsString::from(key);
    arg.push("=");
    arg.push(value);
    arg
}

/// `yolo detect train ...` arguments. `exist_ok` keeps the run folder stable
/// across re-runs instead of numbering a new one.
pub fn train_args(weights: &Path, request: &TrainRequest) -> Vec<OsString> {
    vec![
        OsString::from("detect"),
        OsString::from("train"),
        key_value("model", weights),
        key_value("data", &request.data),
        key_value("epochs", request.epochs.to_string()),
        key_value("imgsz", request.image_size.to_string()),
        key_value("project", &request.project),
        key_value("name", &request.name),
        key_value("exist_ok", "True"),
    ]
}

pub fn export_args(weights: &Path, request: &ExportRequest) -> Vec<OsString> {
    vec![
        OsString::from("export"),
        key_value("model", weights),
        key_value("format", &request.format),
        key_value("opset", request.opset.to_string()),
    ]
}

/// Where the framework leaves the best checkpoint of a run.
pub fn best_weights(request: &TrainRequest) -> PathBuf {
    request
        .project
        .join(&request.name)
        .join("weights")
        .join("best.pt")
}

impl DetectionModel for UltralyticsModel {
    fn train(&mut self, request: &TrainRequest) -> PipelineResult<()> {
        let status = self.run(&train_args(&self.weights, request))?;
        if !status.success() {
            return Err(PipelineError::TrainingFailed { status });
        }

        self.weights = best_weights(request);
        info!("Training finished, weights at {:?}", self.weights());
        Ok(())
    }

    fn export(&self, request: &ExportRequest) -> PipelineResult<ExportOutcome> {
        let status = self.run(&export_args(&self.weights, request))?;
        if !status.success() {
            warn!("Export exited with {}", status);
            return Ok(ExportOutcome {
                success: false,
                artifact: None,
            });
        }

        let expected = self.weights.with_extension(&request.format);
        let artifact = expected.exists().then_some(expected);
        Ok(ExportOutcome {
            success: true,
            artifact,
        })
    }
}
