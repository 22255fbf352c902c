use std::collections::BTreeMap;

use super::label::LabelInfo;
use super::split::DatasetSplit;

/// What ended up in one materialized split.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitStats {
    pub split: DatasetSplit,
    pub images: usize,
    /// Images whose label file was copied
    pub labels: usize,
    /// Images without a label file or with an empty one
    pub background: usize,
    pub objects: usize,
    pub objects_per_class: BTreeMap<u32, usize>,
    /// Boxes reaching outside the image
    pub out_of_bounds: usize,
    pub malformed_lines: usize,
}

impl SplitStats {
    pub fn new(split: DatasetSplit) -> Self {
        Self {
            split,
            images: 0,
            labels: 0,
            background: 0,
            objects: 0,
            objects_per_class: BTreeMap::new(),
            out_of_bounds: 0,
            malformed_lines: 0,
        }
    }

    /// Account for a copied image that had no label file.
    pub fn record_unlabeled(&mut self) {
        self.images += 1;
        self.background += 1;
    }

    /// Account for a copied image and its copied label.
    ///
    /// `None` means the label was copied but could not be read as text; it
    /// still counts as a label and as one malformed line.
    pub fn record_copied_label(&mut self, label: Option<&LabelInfo>) {
        self.images += 1;
        self.labels += 1;

        let Some(label) = label else {
            self.malformed_lines += 1;
            self.background += 1;
            return;
        };

        self.malformed_lines += label.malformed_lines;
        if label.is_background() {
            self.background += 1;
        }
        for detection in &label.detections {
            self.objects += 1;
            *self.objects_per_class.entry(detection.class_id).or_insert(0) += 1;
            if !detection.is_normalized() {
                self.out_of_bounds += 1;
            }
        }
    }

    /// Percentage of images that carry at least one object.
    pub fn annotated_percentage(&self) -> f32 {
        if self.images == 0 {
            0.0
        } else {
            (self.images - self.background) as f32 / self.images as f32 * 100.0
        }
    }
}
