//! Writing a split plan to disk.

use std::fs;
use std::path::Path;

use crate::error::ImgsplitError;
use crate::layout::{check_disjoint, ensure_layout, LayoutAction};
use crate::split::{FileFailure, PlannedFile, SplitPlan, SplitReport};
use crate::square::{square_file, SquareMode};

/// Execution options.
#[derive(Clone, Debug, Default)]
pub struct ExecuteOptions {
    /// Square images (pad, or crop for `--Crop` classes) instead of copying bytes.
    pub square: bool,
    /// Seed recorded in the report.
    pub seed: Option<u64>,
}

/// Write every planned file below `output_root`.
///
/// Partition roots that overlap a source dataset are refused before anything
/// is touched. All partition roots are prepared before the first file is
/// written, and a layout failure aborts the run. Failures on single files are
/// logged, recorded in the report and skipped.
pub fn execute_plan(
    plan: &SplitPlan,
    output_root: &Path,
    opts: &ExecuteOptions,
) -> Result<SplitReport, ImgsplitError> {
    for &partition in plan.mode.partitions() {
        let root = output_root.join(partition.dir_name());
        for input in &plan.source_roots {
            check_disjoint(input, &root)?;
        }
    }

    let labels = plan.merged_labels();
    for &partition in plan.mode.partitions() {
        let root = output_root.join(partition.dir_name());
        let action = ensure_layout(&root, &labels)?;
        if action == LayoutAction::Reset {
            tracing::warn!(root = %root.display(), "previous output was deleted");
        }
    }

    let mut report = SplitReport::from_plan(plan, opts.seed);

    for file in &plan.files {
        let destination = file.destination(output_root);
        match write_file(file, &destination, opts) {
            Ok(()) => report.record_written(file.partition),
            Err(err) => {
                tracing::warn!(
                    source = %file.source.path.display(),
                    error = %err,
                    "skipping file"
                );
                report.add_failure(FileFailure {
                    source: file.source.path.clone(),
                    destination,
                    message: err.to_string(),
                });
            }
        }
    }

    tracing::info!(
        written = report.written_count(),
        failed = report.failure_count(),
        "finished"
    );
    Ok(report)
}

fn write_file(
    file: &PlannedFile,
    destination: &Path,
    opts: &ExecuteOptions,
) -> Result<(), ImgsplitError> {
    let source = &file.source.path;

    if opts.square {
        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            crop = file.crop,
            "squaring file"
        );
        square_file(source, destination, SquareMode::from_crop_flag(file.crop))
    } else {
        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            "copying file"
        );
        fs::copy(source, destination)
            .map(|_| ())
            .map_err(|err| ImgsplitError::Copy {
                from: source.clone(),
                to: destination.to_path_buf(),
                source: err,
            })
    }
}

/// Build a dry-run report without touching the filesystem.
pub fn dry_run_report(plan: &SplitPlan, seed: Option<u64>) -> SplitReport {
    let mut report = SplitReport::from_plan(plan, seed);
    report.dry_run = true;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ClassSpec, ImageRecord, SourceClass};
    use crate::split::{plan_split, Partition, SplitMode, SplitOptions};

    fn write_sources(dir: &Path, n: usize) -> Vec<ImageRecord> {
        fs::create_dir_all(dir).expect("create class dir");
        (0..n)
            .map(|i| {
                let path = dir.join(format!("img_{i}.png"));
                image::RgbImage::from_pixel(4, 2, image::Rgb([i as u8, 0, 0]))
                    .save(&path)
                    .expect("save source");
                ImageRecord::from_path(path)
            })
            .collect()
    }

    #[test]
    fn writes_every_partition_and_counts() {
        let temp = tempfile::tempdir().expect("tempdir");
        let images = write_sources(&temp.path().join("in/cat"), 10);
        let class = SourceClass::new(ClassSpec::parse("cat"), temp.path().join("in/cat"), images);
        let opts = SplitOptions {
            mode: SplitMode::TestAndValidation,
            test_fraction: 0.2,
            validation_fraction: 0.3,
            rename: true,
            seed: Some(5),
        };
        let plan = plan_split(&[class], &opts).expect("plan");
        let out = temp.path().join("out");

        let report = execute_plan(&plan, &out, &ExecuteOptions::default()).expect("execute");
        assert!(report.is_clean());
        assert_eq!(report.written_count(), 10);

        let count = |p: &str| fs::read_dir(out.join(p).join("cat")).expect("read").count();
        assert_eq!(count("test_set"), 2);
        assert_eq!(count("validation_set"), 3);
        assert_eq!(count("training_set"), 5);
        assert_eq!(plan.files_in(Partition::Validation).count(), 3);
    }

    #[test]
    fn broken_file_is_skipped_and_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        let class_dir = temp.path().join("in/cat");
        let mut images = write_sources(&class_dir, 3);
        let broken = class_dir.join("broken.png");
        fs::write(&broken, b"garbage").expect("write broken");
        images.push(ImageRecord::from_path(&broken));

        let class = SourceClass::new(ClassSpec::parse("cat"), &class_dir, images);
        let opts = SplitOptions {
            test_fraction: 0.0,
            rename: true,
            seed: Some(1),
            ..Default::default()
        };
        let plan = plan_split(&[class], &opts).expect("plan");
        let exec = ExecuteOptions {
            square: true,
            seed: Some(1),
        };

        let report = execute_plan(&plan, &temp.path().join("out"), &exec).expect("execute");
        assert_eq!(report.written_count(), 3);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.failures[0].source, broken);
    }

    fn plan_for(input: &Path) -> SplitPlan {
        let classes = crate::dataset::discover_source_classes(input).expect("discover");
        let opts = SplitOptions {
            test_fraction: 0.5,
            rename: true,
            seed: Some(3),
            ..Default::default()
        };
        plan_split(&classes, &opts).expect("plan")
    }

    #[test]
    fn input_named_like_a_partition_root_is_left_alone() {
        let temp = tempfile::tempdir().expect("tempdir");
        let input = temp.path().join("training_set");
        write_sources(&input.join("cat"), 4);

        let err = execute_plan(&plan_for(&input), temp.path(), &ExecuteOptions::default())
            .expect_err("overlap");
        assert!(matches!(err, ImgsplitError::OutputOverlapsInput { .. }));
        assert_eq!(fs::read_dir(input.join("cat")).expect("read").count(), 4);
        assert!(!temp.path().join("test_set").exists());
    }

    #[test]
    fn output_inside_the_input_is_refused() {
        let temp = tempfile::tempdir().expect("tempdir");
        write_sources(&temp.path().join("cat"), 2);
        let old = temp.path().join("test_set/cat");
        write_sources(&old, 1);

        let err = execute_plan(&plan_for(temp.path()), temp.path(), &ExecuteOptions::default())
            .expect_err("overlap");
        assert!(matches!(err, ImgsplitError::OutputOverlapsInput { .. }));
        assert_eq!(fs::read_dir(&old).expect("read").count(), 1);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let class = SourceClass::new(
            ClassSpec::parse("cat"),
            "/does/not/exist",
            vec![ImageRecord::from_path("/does/not/exist/a.png")],
        );
        let plan = plan_split(&[class], &SplitOptions::default()).expect("plan");
        let report = dry_run_report(&plan, None);
        assert!(report.dry_run);
        assert_eq!(report.written_count(), 0);
        assert_eq!(report.partitions.len(), 2);
    }
}
