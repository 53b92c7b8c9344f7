use std::collections::{BTreeMap, BTreeSet};

use imgsplit::split::{partition_counts, plan_split, Partition};
use proptest::prelude::*;

mod proptest_helpers;
use proptest_helpers::{arb_options, synthetic_class};

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn partition_counts_always_sum_to_n(n in 0usize..500, opts in arb_options()) {
        let counts = partition_counts(n, &opts);
        prop_assert_eq!(counts.test + counts.validation + counts.training, n);
    }

    #[test]
    fn partitions_are_disjoint_and_cover_the_class(n in 0usize..120, opts in arb_options()) {
        let class = synthetic_class("cat", n);
        let plan = plan_split(std::slice::from_ref(&class), &opts).expect("plan");

        let expected: BTreeSet<_> = class.images.iter().map(|i| i.path.clone()).collect();
        let planned: Vec<_> = plan.files.iter().map(|f| f.source.path.clone()).collect();
        let planned_set: BTreeSet<_> = planned.iter().cloned().collect();

        prop_assert_eq!(planned.len(), n);
        prop_assert_eq!(planned_set, expected);

        let counts = plan.classes[0].counts;
        for partition in Partition::ALL {
            prop_assert_eq!(plan.files_in(partition).count(), counts.get(partition));
        }
    }

    #[test]
    fn merged_classes_number_contiguously(
        n_a in 0usize..40,
        n_b in 0usize..40,
        b_first in any::<bool>(),
        opts in arb_options(),
    ) {
        let a = synthetic_class("a__x", n_a);
        let b = synthetic_class("b__x", n_b);
        let classes = if b_first { vec![b, a] } else { vec![a, b] };

        let plan = plan_split(&classes, &opts).expect("plan");

        let mut by_partition: BTreeMap<Partition, Vec<usize>> = BTreeMap::new();
        for file in &plan.files {
            prop_assert_eq!(&file.merged_label, "x");
            let index: usize = file
                .file_name
                .strip_prefix("x.")
                .and_then(|rest| rest.strip_suffix(".jpg"))
                .and_then(|n| n.parse().ok())
                .expect("renamed file");
            by_partition.entry(file.partition).or_default().push(index);
        }

        for partition in Partition::ALL {
            let mut indices = by_partition.remove(&partition).unwrap_or_default();
            indices.sort_unstable();
            let expected: Vec<usize> = (1..=indices.len()).collect();
            prop_assert_eq!(&indices, &expected);

            let per_class: usize = plan.classes.iter().map(|c| c.counts.get(partition)).sum();
            prop_assert_eq!(indices.len(), per_class);
            prop_assert_eq!(plan.counters.issued("x", partition), per_class);
        }
    }

    #[test]
    fn seeded_plans_are_reproducible(n in 1usize..60, opts in arb_options()) {
        let classes = vec![synthetic_class("cat", n), synthetic_class("dog__cat", n)];
        let first = plan_split(&classes, &opts).expect("plan");
        let second = plan_split(&classes, &opts).expect("plan");
        prop_assert_eq!(first.files, second.files);
    }
}
