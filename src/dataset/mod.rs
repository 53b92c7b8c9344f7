//! Source dataset discovery.
//!
//! A source dataset is a directory whose immediate subdirectories are
//! classes. Each class directory holds its images directly.

pub mod class_spec;
mod report;

pub use class_spec::ClassSpec;
pub use report::{InventoryClass, InventoryReport};

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::ImgsplitError;

/// Extensions picked up from class directories (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// One image file inside a source class directory.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ImageRecord {
    /// Path of the source file.
    pub path: PathBuf,
    /// Text after the last `.` of the file name, verbatim.
    pub extension: String,
}

impl ImageRecord {
    /// Build a record from a file path, taking the extension verbatim.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let extension = file_name_of(&path)
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_string())
            .unwrap_or_default();
        Self { path, extension }
    }

    /// File name of the source, lossily converted to UTF-8.
    pub fn file_name(&self) -> String {
        file_name_of(&self.path)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A source class and the images found in it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceClass {
    pub spec: ClassSpec,
    /// Directory the class was read from.
    pub dir: PathBuf,
    /// Images sorted by file name.
    pub images: Vec<ImageRecord>,
}

impl SourceClass {
    pub fn new(spec: ClassSpec, dir: impl Into<PathBuf>, images: Vec<ImageRecord>) -> Self {
        Self {
            spec,
            dir: dir.into(),
            images,
        }
    }
}

/// Discover all source classes under `root`, sorted by directory name.
///
/// Fails when `root` is missing or has no class directories. A directory
/// whose output label is empty, `.` or `..` is rejected, and so are two
/// directories that parse to the same source label.
pub fn discover_source_classes(root: &Path) -> Result<Vec<SourceClass>, ImgsplitError> {
    if !root.is_dir() {
        return Err(ImgsplitError::InputNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut classes = Vec::new();
    let mut seen: HashMap<String, String> = HashMap::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ImgsplitError::Io(source.into()))?;
        if !entry.file_type().is_dir() {
            continue;
        }

        let dir_name = entry.file_name().to_string_lossy().into_owned();
        let spec = ClassSpec::parse(&dir_name);

        if matches!(spec.merged_label.as_str(), "" | "." | "..") {
            return Err(ImgsplitError::InvalidMergedLabel {
                label: spec.merged_label,
                dir: dir_name,
            });
        }

        if let Some(first) = seen.insert(spec.source_label.clone(), dir_name.clone()) {
            return Err(ImgsplitError::DuplicateSourceLabel {
                label: spec.source_label,
                first,
                second: dir_name,
            });
        }

        let images = collect_images(entry.path())?;
        tracing::debug!(
            class = %spec.source_label,
            merged = %spec.merged_label,
            images = images.len(),
            "discovered class"
        );
        classes.push(SourceClass::new(spec, entry.path(), images));
    }

    if classes.is_empty() {
        return Err(ImgsplitError::NoSourceClasses {
            path: root.to_path_buf(),
        });
    }

    Ok(classes)
}

/// Collect image files directly inside `dir`, sorted by file name.
pub fn collect_images(dir: &Path) -> Result<Vec<ImageRecord>, ImgsplitError> {
    let mut images = Vec::new();

    for entry in WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ImgsplitError::Io(source.into()))?;
        if entry.file_type().is_file() && has_image_extension(entry.path()) {
            images.push(ImageRecord::from_path(entry.path()));
        }
    }

    Ok(images)
}

fn has_image_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    IMAGE_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}
