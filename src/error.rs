use std::path::PathBuf;
use thiserror::Error;

/// The main error type for imgsplit operations.
#[derive(Debug, Error)]
pub enum ImgsplitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input directory not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("No class directories found under {path}")]
    NoSourceClasses { path: PathBuf },

    #[error("Source label '{label}' is produced by both '{first}' and '{second}'")]
    DuplicateSourceLabel {
        label: String,
        first: String,
        second: String,
    },

    #[error("Class directory '{dir}' gives the unusable output label '{label}'")]
    InvalidMergedLabel { label: String, dir: String },

    #[error("Output directory {output} overlaps input directory {input}")]
    OutputOverlapsInput { input: PathBuf, output: PathBuf },

    #[error("Invalid split parameters: {message}")]
    InvalidSplitParams { message: String },

    #[error("Failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to save image {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to prepare output directory {path}: {source}")]
    Layout {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write JSON report: {source}")]
    ReportWrite {
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported report format: {0}")]
    UnsupportedReportFormat(String),

    #[error("{failed} file(s) could not be written")]
    FilesFailed { failed: usize },
}
