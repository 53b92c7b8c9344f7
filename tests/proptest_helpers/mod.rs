#![allow(dead_code)]

use imgsplit::dataset::{ClassSpec, ImageRecord, SourceClass};
use imgsplit::split::{SplitMode, SplitOptions};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A source class with `n` synthetic records; nothing is written to disk.
pub fn synthetic_class(dir_name: &str, n: usize) -> SourceClass {
    let images = (0..n)
        .map(|i| ImageRecord::from_path(format!("/src/{dir_name}/file_{i:04}.jpg")))
        .collect();
    SourceClass::new(
        ClassSpec::parse(dir_name),
        format!("/src/{dir_name}"),
        images,
    )
}

/// Valid `(test, validation)` fraction pairs with `test + validation <= 1`.
pub fn arb_fractions() -> impl Strategy<Value = (f64, f64)> {
    (0.0f64..=1.0).prop_flat_map(|test| (Just(test), 0.0f64..=(1.0 - test)))
}

/// Split options in either mode, always renaming and seeded.
pub fn arb_options() -> impl Strategy<Value = SplitOptions> {
    (arb_fractions(), any::<bool>(), any::<u64>()).prop_map(|((test, validation), three, seed)| {
        SplitOptions {
            mode: if three {
                SplitMode::TestAndValidation
            } else {
                SplitMode::TestOnly
            },
            test_fraction: test,
            validation_fraction: validation,
            rename: true,
            seed: Some(seed),
        }
    })
}
