//! Class directory naming convention.
//!
//! A source class directory is named `SourceLabel[__MergedLabel][--Crop]`:
//!
//! - `__MergedLabel` writes the class into the output folder `MergedLabel`,
//!   so several source classes can be merged into one output class.
//! - `--Crop` asks for center cropping instead of black padding when images
//!   are squared.
//!
//! `--Crop` is detected as a plain substring, so a label that contains the
//! literal text `--Crop` anywhere is treated as a crop class.

use serde::Serialize;

const MERGE_SEPARATOR: &str = "__";
const FLAG_SEPARATOR: &str = "--";
const CROP_FLAG: &str = "--Crop";

/// A source class parsed from its directory name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ClassSpec {
    /// Label of the source directory, unique across a run.
    pub source_label: String,
    /// Output label; several source classes may share it.
    pub merged_label: String,
    /// Crop to square instead of padding.
    pub crop_instead_of_square: bool,
}

impl ClassSpec {
    /// Parse a class directory name.
    ///
    /// Names that match none of the patterns map to themselves.
    pub fn parse(name: &str) -> Self {
        let has_merge = name.contains(MERGE_SEPARATOR);
        let has_crop = name.contains(CROP_FLAG);

        match (has_merge, has_crop) {
            (true, false) => {
                let mut parts = name.split(MERGE_SEPARATOR);
                let source = parts.next().unwrap_or_default();
                let merged = parts.next().unwrap_or_default();
                Self::new(source, merged, false)
            }
            (true, true) => {
                let mut parts = name.split(MERGE_SEPARATOR);
                let source = parts.next().unwrap_or_default();
                let merged = parts
                    .next()
                    .and_then(|rest| rest.split(FLAG_SEPARATOR).next())
                    .unwrap_or_default();
                Self::new(source, merged, true)
            }
            (false, true) => {
                let label = name.split(FLAG_SEPARATOR).next().unwrap_or_default();
                Self::new(label, label, true)
            }
            (false, false) => Self::new(name, name, false),
        }
    }

    fn new(source: &str, merged: &str, crop: bool) -> Self {
        Self {
            source_label: source.to_string(),
            merged_label: merged.to_string(),
            crop_instead_of_square: crop,
        }
    }

    /// True when this class is written under a different label.
    pub fn is_merged(&self) -> bool {
        self.source_label != self.merged_label
    }
}

/// Fuzzing entry point for the directory name parser.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_class_name(name: &str) -> ClassSpec {
    ClassSpec::parse(name)
}
