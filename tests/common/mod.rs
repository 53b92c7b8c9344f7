#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

/// Small RGB image whose pixels encode their position and a tag.
pub fn tagged_image(width: u32, height: u32, tag: u8) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, tag])
    })
}

/// Write an image; the format follows the extension of `path`.
pub fn write_image(path: &Path, width: u32, height: u32, tag: u8) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    tagged_image(width, height, tag)
        .save(path)
        .expect("write image file");
}

/// Create `root/<class_dir>/img_XX.<ext>` for `n` images.
pub fn write_class(root: &Path, class_dir: &str, n: usize, ext: &str) -> Vec<PathBuf> {
    (0..n)
        .map(|i| {
            let path = root.join(class_dir).join(format!("img_{i:02}.{ext}"));
            write_image(&path, 8, 4, i as u8);
            path
        })
        .collect()
}

/// Sorted file names inside `dir`.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| {
            entry
                .expect("dir entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// Sorted names `{label}.1.{ext}` .. `{label}.{n}.{ext}`.
pub fn numbered_names(label: &str, n: usize, ext: &str) -> Vec<String> {
    let mut names: Vec<String> = (1..=n).map(|i| format!("{label}.{i}.{ext}")).collect();
    names.sort();
    names
}
