mod label;
mod raw;
mod split;
mod stats;

pub use label::parse_label_file;
pub use raw::{label_file_name, RawDataset};
pub use split::{split_samples, DatasetSplit, SplitAssignment};
pub use stats::SplitStats;
