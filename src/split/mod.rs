//! Stratified, merge-aware split planning.
//!
//! Every source class is shuffled and cut into test, validation and training
//! ranges on its own, using its own file count. Output identity is per merged
//! class: all source classes sharing a merged label write into one folder per
//! partition and draw file numbers from one shared counter per partition.

mod report;

pub use report::{ClassSummary, FileFailure, PartitionTotals, SplitReport};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;

use crate::dataset::{ImageRecord, SourceClass};
use crate::error::ImgsplitError;

/// Slack allowed when checking that the fractions sum to at most one.
const FRACTION_SUM_EPSILON: f64 = 1e-9;

/// One of the output subsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    Test,
    Validation,
    Training,
}

impl Partition {
    pub const ALL: [Partition; 3] = [Partition::Test, Partition::Validation, Partition::Training];

    pub fn as_str(self) -> &'static str {
        match self {
            Partition::Test => "test",
            Partition::Validation => "validation",
            Partition::Training => "training",
        }
    }

    /// Name of the destination root for this partition.
    pub fn dir_name(self) -> &'static str {
        match self {
            Partition::Test => "test_set",
            Partition::Validation => "validation_set",
            Partition::Training => "training_set",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which partitions a run produces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Test and training.
    #[default]
    TestOnly,
    /// Test, validation and training.
    TestAndValidation,
}

impl SplitMode {
    /// Partitions written in this mode, training first.
    pub fn partitions(self) -> &'static [Partition] {
        match self {
            SplitMode::TestOnly => &[Partition::Training, Partition::Test],
            SplitMode::TestAndValidation => {
                &[Partition::Training, Partition::Test, Partition::Validation]
            }
        }
    }
}

/// Split options.
#[derive(Clone, Debug, Default)]
pub struct SplitOptions {
    pub mode: SplitMode,
    /// Share of each class sent to the test set, in `[0, 1]`.
    pub test_fraction: f64,
    /// Share of each class sent to the validation set, in `[0, 1]`.
    /// Ignored in [`SplitMode::TestOnly`].
    pub validation_fraction: f64,
    /// Rename outputs to `{merged_label}.{index}.{extension}`.
    pub rename: bool,
    /// Seed for reproducible shuffles; `None` draws fresh entropy.
    pub seed: Option<u64>,
}

impl SplitOptions {
    fn effective_validation_fraction(&self) -> f64 {
        match self.mode {
            SplitMode::TestOnly => 0.0,
            SplitMode::TestAndValidation => self.validation_fraction,
        }
    }
}

/// Validate split options before touching any file.
pub fn validate_split_options(opts: &SplitOptions) -> Result<(), ImgsplitError> {
    check_fraction("--test", opts.test_fraction)?;

    if opts.mode == SplitMode::TestAndValidation {
        check_fraction("--validation", opts.validation_fraction)?;

        if opts.test_fraction + opts.validation_fraction > 1.0 + FRACTION_SUM_EPSILON {
            return Err(ImgsplitError::InvalidSplitParams {
                message: "--test and --validation must sum to at most 1.0".to_string(),
            });
        }
    }

    Ok(())
}

fn check_fraction(flag: &str, value: f64) -> Result<(), ImgsplitError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ImgsplitError::InvalidSplitParams {
            message: format!("{flag} must be in the interval [0.0, 1.0], got {value}"),
        });
    }
    Ok(())
}

/// Number of files each partition receives from one class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PartitionCounts {
    pub test: usize,
    pub validation: usize,
    pub training: usize,
}

impl PartitionCounts {
    pub fn total(&self) -> usize {
        self.test + self.validation + self.training
    }

    pub fn get(&self, partition: Partition) -> usize {
        match partition {
            Partition::Test => self.test,
            Partition::Validation => self.validation,
            Partition::Training => self.training,
        }
    }

    /// Partition for the file at `index` of a shuffled class.
    ///
    /// `[0, test)` is test, `[test, test + validation)` is validation and
    /// everything after is training.
    pub fn partition_for(&self, index: usize) -> Partition {
        if index < self.test {
            Partition::Test
        } else if index < self.test + self.validation {
            Partition::Validation
        } else {
            Partition::Training
        }
    }
}

/// Compute per-partition counts for a class of `n` files.
///
/// Test and validation counts are rounded half away from zero. Validation is
/// clamped to what test leaves over and training is always the remainder, so
/// the three counts sum to `n`.
pub fn partition_counts(n: usize, opts: &SplitOptions) -> PartitionCounts {
    let test = round_share(n, opts.test_fraction).min(n);
    let validation = round_share(n, opts.effective_validation_fraction()).min(n - test);
    PartitionCounts {
        test,
        validation,
        training: n - test - validation,
    }
}

fn round_share(n: usize, fraction: f64) -> usize {
    (n as f64 * fraction).round() as usize
}

/// Shuffle one class's images.
///
/// With a seed, the generator is seeded with `seed ^ crc32c(source_label)`
/// so every class gets an independent, reproducible order.
pub fn shuffle_images(
    images: &[ImageRecord],
    source_label: &str,
    seed: Option<u64>,
) -> Vec<ImageRecord> {
    let mut shuffled = images.to_vec();

    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(class_seed(seed, source_label));
        shuffled.shuffle(&mut rng);
    } else {
        let mut rng = rand::rng();
        shuffled.shuffle(&mut rng);
    }

    shuffled
}

/// Per-class seed derived from the run seed.
pub fn class_seed(seed: u64, source_label: &str) -> u64 {
    seed ^ u64::from(crc32c::crc32c(source_label.as_bytes()))
}

/// Running file numbers per `(merged_label, partition)`.
///
/// Every pair starts at 1 and is shared by all source classes that merge
/// into the same label.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputCounters {
    next: BTreeMap<(String, Partition), usize>,
}

impl OutputCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the next index for the pair and advance it.
    pub fn next_index(&mut self, merged_label: &str, partition: Partition) -> usize {
        let slot = self
            .next
            .entry((merged_label.to_string(), partition))
            .or_insert(1);
        let index = *slot;
        *slot += 1;
        index
    }

    /// Number of indices handed out for the pair so far.
    pub fn issued(&self, merged_label: &str, partition: Partition) -> usize {
        self.next
            .get(&(merged_label.to_string(), partition))
            .map_or(0, |next| next - 1)
    }
}

/// One file scheduled for a destination.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlannedFile {
    pub source: ImageRecord,
    pub source_label: String,
    pub merged_label: String,
    pub partition: Partition,
    /// Output file name inside `{partition root}/{merged_label}`.
    pub file_name: String,
    /// False when the source file name is kept.
    pub renamed: bool,
    /// Crop instead of pad when squaring.
    pub crop: bool,
}

impl PlannedFile {
    /// Destination path below `output_root`.
    ///
    /// Kept source names are joined as they are on disk, so names that are
    /// not valid UTF-8 survive unchanged.
    pub fn destination(&self, output_root: &Path) -> PathBuf {
        let dir = output_root
            .join(self.partition.dir_name())
            .join(&self.merged_label);
        match self.source.path.file_name() {
            Some(name) if !self.renamed => dir.join(name),
            _ => dir.join(&self.file_name),
        }
    }
}

/// How one source class was split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassSplit {
    pub source_label: String,
    pub merged_label: String,
    pub crop: bool,
    pub counts: PartitionCounts,
}

/// The full assignment of source files to destinations.
#[derive(Clone, Debug, Default)]
pub struct SplitPlan {
    pub mode: SplitMode,
    pub classes: Vec<ClassSplit>,
    pub files: Vec<PlannedFile>,
    pub counters: OutputCounters,
    /// Dataset directories the classes were read from.
    pub source_roots: BTreeSet<PathBuf>,
}

impl SplitPlan {
    /// Distinct merged labels in the plan.
    pub fn merged_labels(&self) -> BTreeSet<String> {
        self.classes
            .iter()
            .map(|class| class.merged_label.clone())
            .collect()
    }

    pub fn files_in(&self, partition: Partition) -> impl Iterator<Item = &PlannedFile> {
        self.files
            .iter()
            .filter(move |file| file.partition == partition)
    }
}

/// Plan a split for the given classes.
///
/// Classes are processed in the order given. Options are validated first.
pub fn plan_split(classes: &[SourceClass], opts: &SplitOptions) -> Result<SplitPlan, ImgsplitError> {
    validate_split_options(opts)?;

    let mut counters = OutputCounters::new();
    let mut class_splits = Vec::with_capacity(classes.len());
    let mut files = Vec::new();
    let mut source_roots = BTreeSet::new();

    for class in classes {
        let spec = &class.spec;
        source_roots.insert(dataset_root(&class.dir));
        let shuffled = shuffle_images(&class.images, &spec.source_label, opts.seed);
        let counts = partition_counts(shuffled.len(), opts);

        tracing::info!(
            class = %spec.source_label,
            total = shuffled.len(),
            test = counts.test,
            validation = counts.validation,
            training = counts.training,
            "planned class split"
        );
        if spec.is_merged() {
            tracing::info!(
                class = %spec.source_label,
                merged = %spec.merged_label,
                "merging class"
            );
        }

        for (index, record) in shuffled.into_iter().enumerate() {
            let partition = counts.partition_for(index);
            let file_name = if opts.rename {
                let n = counters.next_index(&spec.merged_label, partition);
                format!("{}.{}.{}", spec.merged_label, n, record.extension)
            } else {
                record.file_name()
            };

            files.push(PlannedFile {
                source: record,
                source_label: spec.source_label.clone(),
                merged_label: spec.merged_label.clone(),
                partition,
                file_name,
                renamed: opts.rename,
                crop: spec.crop_instead_of_square,
            });
        }

        class_splits.push(ClassSplit {
            source_label: spec.source_label.clone(),
            merged_label: spec.merged_label.clone(),
            crop: spec.crop_instead_of_square,
            counts,
        });
    }

    Ok(SplitPlan {
        mode: opts.mode,
        classes: class_splits,
        files,
        counters,
        source_roots,
    })
}

fn dataset_root(class_dir: &Path) -> PathBuf {
    match class_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
