use std::process::ExitCode;
use tracing::{error, info};

mod config;
use config::{resolve_base_dir, PipelineConfig};

mod data;
mod error;
mod logging;

mod pipeline;
use pipeline::PipelineOutcome;

mod trainer;
use trainer::UltralyticsCli;

fn main() -> ExitCode {
    let base_dir = match resolve_base_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::setup_logging(&base_dir) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting knot detector training in {:?}", base_dir);
    let config = PipelineConfig::load(&base_dir);
    let framework = UltralyticsCli::new(config.trainer_program.clone());

    match pipeline::run(&framework, &config, &base_dir) {
        Ok(outcome) if outcome.is_success() => {
            if let PipelineOutcome::Completed { splits, export } = &outcome {
                let images: usize = splits.iter().map(|s| s.images).sum();
                info!(
                    "Pipeline finished: {} images prepared, export {}",
                    images,
                    if export.success { "succeeded" } else { "failed" }
                );
            }
            ExitCode::SUCCESS
        }
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            error!("Pipeline failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
