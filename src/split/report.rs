//! Split report types.
//!
//! A [`SplitReport`] is built from a plan and then updated while files are
//! written, so a dry run and a real run print the same summary.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::{Partition, PartitionCounts, SplitMode, SplitPlan};

/// Summary of a split run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SplitReport {
    pub mode: SplitMode,
    /// Seed the shuffles were derived from, if one was given.
    pub seed: Option<u64>,
    pub dry_run: bool,
    pub classes: Vec<ClassSummary>,
    pub partitions: Vec<PartitionTotals>,
    pub failures: Vec<FileFailure>,
}

impl SplitReport {
    /// Create a report for a plan before anything is written.
    pub fn from_plan(plan: &SplitPlan, seed: Option<u64>) -> Self {
        let classes = plan
            .classes
            .iter()
            .map(|class| ClassSummary {
                source_label: class.source_label.clone(),
                merged_label: class.merged_label.clone(),
                crop: class.crop,
                images: class.counts.total(),
                counts: class.counts,
            })
            .collect();

        let partitions = plan
            .mode
            .partitions()
            .iter()
            .map(|&partition| PartitionTotals {
                partition,
                planned: plan.files_in(partition).count(),
                written: 0,
            })
            .collect();

        Self {
            mode: plan.mode,
            seed,
            dry_run: false,
            classes,
            partitions,
            failures: Vec::new(),
        }
    }

    /// Count one written file.
    pub fn record_written(&mut self, partition: Partition) {
        if let Some(totals) = self
            .partitions
            .iter_mut()
            .find(|totals| totals.partition == partition)
        {
            totals.written += 1;
        }
    }

    /// Record a file that could not be written.
    pub fn add_failure(&mut self, failure: FileFailure) {
        self.failures.push(failure);
    }

    pub fn total_images(&self) -> usize {
        self.classes.iter().map(|class| class.images).sum()
    }

    pub fn written_count(&self) -> usize {
        self.partitions.iter().map(|totals| totals.written).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for SplitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Split {} image(s) from {} class(es):",
            self.total_images(),
            self.classes.len()
        )?;

        for class in &self.classes {
            write!(
                f,
                "  [{}] {} test, {} validation, {} training out of {}",
                class.source_label,
                class.counts.test,
                class.counts.validation,
                class.counts.training,
                class.images
            )?;
            if class.source_label != class.merged_label {
                write!(f, " (merged into {})", class.merged_label)?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        for totals in &self.partitions {
            if self.dry_run {
                writeln!(
                    f,
                    "  {}: {} planned",
                    totals.partition.dir_name(),
                    totals.planned
                )?;
            } else {
                writeln!(
                    f,
                    "  {}: {} of {} written",
                    totals.partition.dir_name(),
                    totals.written,
                    totals.planned
                )?;
            }
        }

        if let Some(seed) = self.seed {
            writeln!(f, "  seed: {}", seed)?;
        }

        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failures ({}):", self.failures.len())?;
            for failure in &self.failures {
                writeln!(f, "  - {}", failure)?;
            }
        }

        Ok(())
    }
}

/// Per-source-class line of the report.
#[derive(Clone, Debug, Serialize)]
pub struct ClassSummary {
    pub source_label: String,
    pub merged_label: String,
    pub crop: bool,
    pub images: usize,
    pub counts: PartitionCounts,
}

/// Planned and written file totals for one partition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartitionTotals {
    pub partition: Partition,
    pub planned: usize,
    pub written: usize,
}

/// A file skipped because it could not be read, transformed or written.
#[derive(Clone, Debug, Serialize)]
pub struct FileFailure {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub message: String,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}: {}",
            self.source.display(),
            self.destination.display(),
            self.message
        )
    }
}
