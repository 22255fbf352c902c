use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Everything that can stop the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("raw images folder {0:?} doesn't exist")]
    DatasetMissing(PathBuf),

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to copy {src:?} to {dest:?}: {source}")]
    CopyFailed {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize manifest: {0}")]
    Manifest(#[from] serde_yaml::Error),

    #[error("invalid config file {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("training failed ({status})")]
    TrainingFailed { status: ExitStatus },

    #[error("failed to set up logging: {0}")]
    Logging(String),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}
