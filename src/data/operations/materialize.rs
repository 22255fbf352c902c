//! Copies a split assignment into the working directory layout:
//! `<work>/images/<split>/` and `<work>/labels/<split>/`.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::data::dataset::{
    label_file_name, parse_label_file, DatasetSplit, RawDataset, SplitAssignment, SplitStats,
};
use crate::error::PipelineResult;

use super::file_ops::{copy_file, copy_if_exists, ensure_dir};

/// Create the image and label folders of every split.
pub fn prepare_split_dirs(work_root: &Path) -> PipelineResult<()> {
    for split in DatasetSplit::all() {
        ensure_dir(&work_root.join(split.images_subdir()))?;
        ensure_dir(&work_root.join(split.labels_subdir()))?;
    }
    Ok(())
}

/// Copy the images of one split, plus each image's label when it has one.
pub fn materialize_split(
    raw: &RawDataset,
    split: DatasetSplit,
    files: &[std::ffi::OsString],
    work_root: &Path,
) -> PipelineResult<SplitStats> {
    let dest_images = work_root.join(split.images_subdir());
    let dest_labels = work_root.join(split.labels_subdir());
    let mut stats = SplitStats::new(split);

    for file_name in files {
        copy_file(&raw.image_path(file_name), &dest_images.join(file_name))?;

        let src_label = raw.label_path(file_name);
        let dest_label = dest_labels.join(label_file_name(file_name));
        if copy_if_exists(&src_label, &dest_label)? {
            stats.record_copied_label(parse_label_file(&dest_label).as_ref());
        } else {
            debug!("No label for {:?}", file_name);
            stats.record_unlabeled();
        }
    }

    info!(
        "{}: {} images, {} labels, {} background, {} objects {:?}, {:.1}% annotated",
        stats.split.as_str(),
        stats.images,
        stats.labels,
        stats.background,
        stats.objects,
        stats.objects_per_class,
        stats.annotated_percentage()
    );
    if stats.malformed_lines > 0 || stats.out_of_bounds > 0 {
        warn!(
            "{}: {} malformed label lines, {} boxes outside the image",
            stats.split.as_str(),
            stats.malformed_lines,
            stats.out_of_bounds
        );
    }

    Ok(stats)
}

/// Create the split folders and copy both splits.
pub fn materialize(
    raw: &RawDataset,
    assignment: &SplitAssignment,
    work_root: &Path,
) -> PipelineResult<Vec<SplitStats>> {
    prepare_split_dirs(work_root)?;

    DatasetSplit::all()
        .into_iter()
        .map(|split| materialize_split(raw, split, assignment.get(split), work_root))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::split_samples;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    /// Six images, labels for the even ones only.
    fn raw_fixture(root: &Path) -> RawDataset {
        let images = root.join("WoodDataset").join("images");
        let labels = root.join("WoodDataset").join("labels");
        fs::create_dir_all(&images).unwrap();
        fs::create_dir_all(&labels).unwrap();
        for i in 0..6 {
            fs::write(images.join(format!("board_{}.png", i)), format!("png{}", i)).unwrap();
            if i % 2 == 0 {
                let label = labels.join(format!("board_{}.txt", i));
                fs::write(label, "0 0.5 0.5 0.1 0.1\n").unwrap();
            }
        }
        RawDataset::open(&images, &labels, "png").unwrap()
    }

    fn listing(dir: &Path) -> HashSet<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_materialize_copies_images_and_existing_labels() {
        let dir = tempdir().unwrap();
        let raw = raw_fixture(dir.path());
        let work = dir.path().join("yolo_data");
        let assignment = split_samples(raw.image_files().to_vec(), 0.2, 29);

        let stats = materialize(&raw, &assignment, &work).unwrap();
        assert_eq!(stats.len(), 2);

        for split in DatasetSplit::all() {
            let images = listing(&work.join(split.images_subdir()));
            let labels = listing(&work.join(split.labels_subdir()));
            let expected: HashSet<String> = assignment
                .get(split)
                .iter()
                .map(|n| n.to_string_lossy().to_string())
                .collect();
            assert_eq!(images, expected);

            for image in &images {
                let stem = image.trim_end_matches(".png");
                let index: usize = stem.trim_start_matches("board_").parse().unwrap();
                let has_label = labels.contains(&format!("{}.txt", stem));
                assert_eq!(has_label, index % 2 == 0, "label mismatch for {}", image);
            }
        }

        let total_images: usize = stats.iter().map(|s| s.images).sum();
        let total_labels: usize = stats.iter().map(|s| s.labels).sum();
        assert_eq!(total_images, 6);
        assert_eq!(total_labels, 3);
        assert_eq!(stats.iter().map(|s| s.objects).sum::<usize>(), 3);
    }

    #[test]
    fn test_materialize_counts_non_utf8_label() {
        let dir = tempdir().unwrap();
        let images = dir.path().join("WoodDataset").join("images");
        let labels = dir.path().join("WoodDataset").join("labels");
        fs::create_dir_all(&images).unwrap();
        fs::create_dir_all(&labels).unwrap();
        fs::write(images.join("board_0.png"), b"png").unwrap();
        fs::write(labels.join("board_0.txt"), b"\xff\xfe\n").unwrap();

        let raw = RawDataset::open(&images, &labels, "png").unwrap();
        let work = dir.path().join("yolo_data");
        prepare_split_dirs(&work).unwrap();
        let stats =
            materialize_split(&raw, DatasetSplit::Train, raw.image_files(), &work).unwrap();

        let copied = work.join(DatasetSplit::Train.labels_subdir()).join("board_0.txt");
        assert!(copied.is_file());
        assert_eq!(stats.images, 1);
        assert_eq!(stats.labels, 1);
        assert_eq!(stats.malformed_lines, 1);
    }

    #[test]
    fn test_materialize_rerun_overwrites() {
        let dir = tempdir().unwrap();
        let raw = raw_fixture(dir.path());
        let work = dir.path().join("yolo_data");
        let assignment = split_samples(raw.image_files().to_vec(), 0.2, 29);

        materialize(&raw, &assignment, &work).unwrap();
        fs::write(raw.image_path(&assignment.train[0]), "updated").unwrap();
        materialize(&raw, &assignment, &work).unwrap();

        let copied = work.join(DatasetSplit::Train.images_subdir()).join(&assignment.train[0]);
        assert_eq!(fs::read_to_string(copied).unwrap(), "updated");
    }

    #[test]
    fn test_materialize_leaves_sources_untouched() {
        let dir = tempdir().unwrap();
        let raw = raw_fixture(dir.path());
        let work = dir.path().join("yolo_data");
        let assignment = split_samples(raw.image_files().to_vec(), 0.2, 29);

        materialize(&raw, &assignment, &work).unwrap();

        let source_images = listing(&dir.path().join("WoodDataset").join("images"));
        assert_eq!(source_images.len(), 6);
        assert_eq!(
            fs::read_to_string(raw.image_path(&raw.image_files()[0])).unwrap(),
            "png0"
        );
    }
}
