mod pipeline_config;

pub use pipeline_config::{resolve_base_dir, PipelineConfig};
