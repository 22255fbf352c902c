mod file_ops;
mod materialize;

pub use materialize::materialize;
