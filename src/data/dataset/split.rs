use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::ffi::OsString;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetSplit {
    Train,
    Val,
}

impl DatasetSplit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetSplit::Train => "train",
            DatasetSplit::Val => "val",
        }
    }

    pub fn all() -> [DatasetSplit; 2] {
        [DatasetSplit::Train, DatasetSplit::Val]
    }

    /// Image folder relative to the working root, e.g. `images/train`
    pub fn images_subdir(&self) -> String {
        format!("images/{}", self.as_str())
    }

    /// Label folder relative to the working root, e.g. `labels/train`
    pub fn labels_subdir(&self) -> String {
        format!("labels/{}", self.as_str())
    }
}

/// Disjoint train/val partition of image file names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitAssignment {
    pub train: Vec<OsString>,
    pub val: Vec<OsString>,
}

impl SplitAssignment {
    pub fn get(&self, split: DatasetSplit) -> &[OsString] {
        match split {
            DatasetSplit::Train => &self.train,
            DatasetSplit::Val => &self.val,
        }
    }

    pub fn len(&self) -> usize {
        self.train.len() + self.val.len()
    }
}

/// Number of samples that go to validation: `ceil(ratio * total)`.
///
/// Keeps at least one sample in train when there is any input.
pub fn val_count(total: usize, val_ratio: f64) -> usize {
    let ratio = val_ratio.clamp(0.0, 1.0);
    let count = ((ratio * total as f64).ceil() as usize).min(total);
    if total > 0 && count == total {
        total - 1
    } else {
        count
    }
}

/// Shuffle `files` with a seeded RNG and cut off the validation share.
///
/// The same input list and seed always produce the same assignment.
pub fn split_samples(mut files: Vec<OsString>, val_ratio: f64, seed: u64) -> SplitAssignment {
    let n_val = val_count(files.len(), val_ratio);

    // ChaCha8 output is fixed by its algorithm, unlike StdRng
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    files.shuffle(&mut rng);

    let train = files.split_off(n_val);
    let val = files;

    debug!(
        "Split {} samples into {} train / {} val (seed {})",
        train.len() + val.len(),
        train.len(),
        val.len(),
        seed
    );

    SplitAssignment { train, val }
}
