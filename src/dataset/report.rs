//! Inventory of a source dataset, printed by `imgsplit inspect`.

use std::fmt;

use serde::Serialize;

use super::SourceClass;

/// Discovered classes and their image counts.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InventoryReport {
    pub classes: Vec<InventoryClass>,
}

/// One discovered source class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InventoryClass {
    pub source_label: String,
    pub merged_label: String,
    pub crop: bool,
    pub images: usize,
}

impl InventoryReport {
    pub fn from_classes(classes: &[SourceClass]) -> Self {
        Self {
            classes: classes
                .iter()
                .map(|class| InventoryClass {
                    source_label: class.spec.source_label.clone(),
                    merged_label: class.spec.merged_label.clone(),
                    crop: class.spec.crop_instead_of_square,
                    images: class.images.len(),
                })
                .collect(),
        }
    }

    pub fn total_images(&self) -> usize {
        self.classes.iter().map(|class| class.images).sum()
    }

    /// Number of distinct output labels.
    pub fn merged_label_count(&self) -> usize {
        let mut labels: Vec<&str> = self
            .classes
            .iter()
            .map(|class| class.merged_label.as_str())
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels.len()
    }
}

impl fmt::Display for InventoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Found {} class(es) ({} output label(s)):",
            self.classes.len(),
            self.merged_label_count()
        )?;

        for class in &self.classes {
            write!(f, "  {} ({} images)", class.source_label, class.images)?;
            if class.source_label != class.merged_label {
                write!(f, " -> {}", class.merged_label)?;
            }
            if class.crop {
                write!(f, " [crop]")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "  {} images in total", self.total_images())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ClassSpec, ImageRecord};

    #[test]
    fn inventory_lists_merges_and_totals() {
        let classes = vec![
            SourceClass::new(
                ClassSpec::parse("knife__weapon--Crop"),
                "/in/knife__weapon--Crop",
                vec![ImageRecord::from_path("/in/k/1.png")],
            ),
            SourceClass::new(
                ClassSpec::parse("gun__weapon"),
                "/in/gun__weapon",
                vec![
                    ImageRecord::from_path("/in/g/1.png"),
                    ImageRecord::from_path("/in/g/2.png"),
                ],
            ),
        ];

        let report = InventoryReport::from_classes(&classes);
        assert_eq!(report.total_images(), 3);
        assert_eq!(report.merged_label_count(), 1);

        let text = report.to_string();
        assert!(text.contains("Found 2 class(es) (1 output label(s)):"));
        assert!(text.contains("knife (1 images) -> weapon [crop]"));
        assert!(text.contains("3 images in total"));
    }
}
