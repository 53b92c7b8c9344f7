//! Destination directory layout.
//!
//! Each partition root holds one subdirectory per merged label. A root left
//! over from an earlier run that still contains files is wiped and rebuilt,
//! so outputs never mix with stale data. Because of that wipe, a partition
//! root may never share a directory tree with the input dataset.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use crate::error::ImgsplitError;

/// What [`ensure_layout`] had to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutAction {
    /// The root did not exist and was created.
    Created,
    /// The root held files and was deleted and recreated.
    Reset,
    /// The root was empty of files; missing label folders were added.
    Reused,
}

/// Make sure `root` exists with one empty-of-files folder per label.
///
/// Only files inside the label-level subdirectories count as leftovers.
/// Any filesystem failure is returned as [`ImgsplitError::Layout`].
pub fn ensure_layout(root: &Path, labels: &BTreeSet<String>) -> Result<LayoutAction, ImgsplitError> {
    let layout_err = |source| ImgsplitError::Layout {
        path: root.to_path_buf(),
        source,
    };

    if !root.exists() {
        fs::create_dir_all(root).map_err(layout_err)?;
        create_label_dirs(root, labels)?;
        tracing::info!(root = %root.display(), "created output directory");
        return Ok(LayoutAction::Created);
    }

    if contains_files(root)? {
        tracing::info!(
            root = %root.display(),
            "found files from a previous run, deleting"
        );
        fs::remove_dir_all(root).map_err(layout_err)?;
        fs::create_dir_all(root).map_err(layout_err)?;
        create_label_dirs(root, labels)?;
        return Ok(LayoutAction::Reset);
    }

    create_label_dirs(root, labels)?;
    Ok(LayoutAction::Reused)
}

/// Fail when `root` and `input` are the same directory or one holds the other.
///
/// Both paths are resolved through symlinks. Missing trailing components are
/// kept as written, so a root that does not exist yet can still be checked.
pub fn check_disjoint(input: &Path, root: &Path) -> Result<(), ImgsplitError> {
    let input_resolved = resolve(input).map_err(|source| ImgsplitError::Layout {
        path: input.to_path_buf(),
        source,
    })?;
    let root_resolved = resolve(root).map_err(|source| ImgsplitError::Layout {
        path: root.to_path_buf(),
        source,
    })?;

    if root_resolved.starts_with(&input_resolved) || input_resolved.starts_with(&root_resolved) {
        return Err(ImgsplitError::OutputOverlapsInput {
            input: input.to_path_buf(),
            output: root.to_path_buf(),
        });
    }
    Ok(())
}

/// Canonicalize the longest existing prefix of `path` and append the rest.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let mut existing = absolute.as_path();
    let mut missing = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(mut resolved) => {
                resolved.extend(missing.iter().rev());
                return Ok(resolved);
            }
            Err(err) => match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name.to_os_string());
                    existing = parent;
                }
                _ => return Err(err),
            },
        }
    }
}

fn create_label_dirs(root: &Path, labels: &BTreeSet<String>) -> Result<(), ImgsplitError> {
    for label in labels {
        let dir = root.join(label);
        fs::create_dir_all(&dir).map_err(|source| ImgsplitError::Layout { path: dir, source })?;
    }
    Ok(())
}

/// True if any immediate subdirectory of `root` holds a file.
fn contains_files(root: &Path) -> Result<bool, ImgsplitError> {
    for entry in WalkDir::new(root).min_depth(2).max_depth(2) {
        let entry = entry.map_err(|source| ImgsplitError::Layout {
            path: root.to_path_buf(),
            source: source.into(),
        })?;
        if !entry.file_type().is_dir() {
            return Ok(true);
        }
    }
    Ok(false)
}
