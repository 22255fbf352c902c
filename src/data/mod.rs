pub mod dataset;
pub mod manifest;
pub mod operations;

pub use dataset::*;
pub use manifest::DatasetManifest;
pub use operations::*;
