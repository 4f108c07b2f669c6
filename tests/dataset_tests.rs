use std::collections::HashSet;

use grt_core::GrtError;
use grt_core::approx::{Closeness, within};
use grt_core::data::{ClassificationData, RegressionData};
use grt_core::random::Random;
use grt_core::serialize::Dump;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `n` samples alternating between labels 1 and 2, feature 0 holding the sample id.
fn two_class_data(n: usize) -> ClassificationData {
    let mut rng = StdRng::seed_from_u64(n as u64);
    let mut data = ClassificationData::with_name(3, "two_class", "generated").unwrap();
    for i in 0..n {
        let label = 1 + (i % 2) as u32;
        let features = [i as f64, rng.random_range(-1.0..1.0), rng.random_range(0.0..10.0)];
        data.add_sample(label, &features).unwrap();
    }
    data
}

fn ids(data: &ClassificationData) -> Vec<usize> {
    data.samples().iter().map(|s| s.features()[0] as usize).collect()
}

#[test]
fn test_stratified_k_fold_covers_every_sample_once() {
    let mut data = two_class_data(100);
    let mut rng = Random::new(5);
    data.setup_k_folds(5, true, &mut rng).unwrap();

    let mut seen = HashSet::new();
    for k in 0..5 {
        let test = data.test_fold(k).unwrap();
        let train = data.training_fold(k).unwrap();
        assert_eq!(test.num_samples() + train.num_samples(), 100);
        assert_eq!(test.num_classes(), 2);
        assert!(test.trackers().iter().all(|t| t.counter > 0));

        let test_ids: HashSet<usize> = ids(&test).into_iter().collect();
        let train_ids: HashSet<usize> = ids(&train).into_iter().collect();
        assert!(test_ids.is_disjoint(&train_ids));
        for id in test_ids {
            assert!(seen.insert(id), "sample {id} appeared in two test folds");
        }
    }
    assert_eq!(seen.len(), 100);
}

#[test]
fn test_folds_need_setup_and_are_invalidated() {
    let mut data = two_class_data(20);
    assert!(matches!(data.test_fold(0), Err(GrtError::NotReady(_))));

    let mut rng = Random::new(8);
    data.setup_k_folds(4, false, &mut rng).unwrap();
    assert!(data.fold_state().is_ready());
    assert!(matches!(data.test_fold(4), Err(GrtError::Validation(_))));

    data.add_sample(1, &[99.0, 0.0, 0.0]).unwrap();
    assert!(!data.fold_state().is_ready());
    assert!(matches!(data.training_fold(0), Err(GrtError::NotReady(_))));
}

#[test]
fn test_every_mutation_resets_fold_state() {
    type Mutation = fn(&mut ClassificationData);
    let mutations: [(&str, Mutation); 9] = [
        ("remove_sample", |d| d.remove_sample(0).unwrap()),
        ("remove_last_sample", |d| d.remove_last_sample().unwrap()),
        ("relabel", |d| d.relabel(2, 7).unwrap()),
        ("merge", |d| {
            let mut other = ClassificationData::new(3);
            other.add_sample(4, &[1.0, 2.0, 3.0]).unwrap();
            d.merge(&other).unwrap();
        }),
        ("add_class", |d| d.add_class(5, "spare").unwrap()),
        ("remove_class", |d| {
            d.remove_class(1);
        }),
        ("scale", |d| d.scale(-1.0, 1.0).unwrap()),
        ("split", |d| {
            d.split(50, true, &mut Random::new(2)).unwrap();
        }),
        ("clear", |d| d.clear()),
    ];

    for (name, mutate) in mutations {
        let mut data = two_class_data(20);
        data.setup_k_folds(4, true, &mut Random::new(8)).unwrap();
        assert!(data.fold_state().is_ready());
        mutate(&mut data);
        assert!(!data.fold_state().is_ready(), "{name} kept the folds");
        assert!(
            matches!(data.test_fold(0), Err(GrtError::NotReady(_))),
            "{name} left test_fold usable"
        );
    }
}

#[test]
fn test_stratified_k_fold_rejects_an_empty_class() {
    let mut data = two_class_data(10);
    data.add_class(3, "empty").unwrap();
    let mut rng = Random::new(3);
    assert!(matches!(
        data.setup_k_folds(3, true, &mut rng),
        Err(GrtError::Validation(_))
    ));
    assert!(!data.fold_state().is_ready());
    data.setup_k_folds(3, false, &mut rng).unwrap();
}

#[test]
fn test_stratified_k_larger_than_a_class_is_rejected() {
    let mut data = ClassificationData::new(1);
    for i in 0..10 {
        data.add_sample(1, &[i as f64]).unwrap();
    }
    data.add_sample(2, &[0.0]).unwrap();
    data.add_sample(2, &[1.0]).unwrap();
    let mut rng = Random::new(3);
    assert!(data.setup_k_folds(3, true, &mut rng).is_err());
    assert!(!data.fold_state().is_ready());
    data.setup_k_folds(3, false, &mut rng).unwrap();
}

#[test]
fn test_split_is_reproducible_and_keeps_proportions() {
    let source = two_class_data(60);

    let mut a = source.clone();
    let test_a = a.split(80, true, &mut Random::new(17)).unwrap();
    let mut b = source.clone();
    let test_b = b.split(80, true, &mut Random::new(17)).unwrap();
    assert_eq!(a, b);
    assert_eq!(test_a, test_b);

    assert_eq!(a.num_samples(), 48);
    assert_eq!(test_a.num_samples(), 12);
    for t in a.trackers() {
        assert_eq!(t.counter, 24);
    }
    assert_eq!(a.name(), "two_class");
    assert_eq!(test_a.info(), "generated");

    let mut all: Vec<usize> = ids(&a).into_iter().chain(ids(&test_a)).collect();
    all.sort_unstable();
    assert_eq!(all, (0..60).collect::<Vec<_>>());
}

#[test]
fn test_bootstrap_sizes() {
    let data = two_class_data(30);
    let mut rng = Random::new(21);

    let same = data.bootstrap(0, false, &mut rng).unwrap();
    assert_eq!(same.num_samples(), 30);
    assert_eq!(same.num_classes(), 2);

    let more = data.bootstrap(75, false, &mut rng).unwrap();
    assert_eq!(more.num_samples(), 75);
    let counted: usize = more.trackers().iter().map(|t| t.counter).sum();
    assert_eq!(counted, 75);

    let empty = ClassificationData::new(3);
    assert!(empty.bootstrap(10, false, &mut rng).is_err());
}

#[test]
fn test_balanced_bootstrap_evens_out_classes() {
    let mut data = ClassificationData::new(1);
    for i in 0..90 {
        data.add_sample(1, &[i as f64]).unwrap();
    }
    for i in 0..10 {
        data.add_sample(2, &[i as f64]).unwrap();
    }
    let boot = data.bootstrap(100, true, &mut Random::new(6)).unwrap();
    assert_eq!(boot.num_samples(), 100);
    for t in boot.trackers() {
        assert_eq!(t.counter, 50);
    }
}

#[test]
fn test_relabel_and_class_data() {
    let mut data = two_class_data(10);
    data.relabel(2, 1).unwrap();
    assert_eq!(data.num_classes(), 1);
    assert_eq!(data.trackers()[0].counter, 10);

    let mut data = two_class_data(10);
    let only_two = data.class_data(2).unwrap();
    assert_eq!(only_two.num_samples(), 5);
    assert!(only_two.samples().iter().all(|s| s.label() == 2));
    assert!(data.class_data(9).is_err());

    assert_eq!(data.remove_class(1), 5);
    assert_eq!(data.class_labels(), vec![2]);
}

#[test]
fn test_merge_combines_trackers() {
    let mut a = two_class_data(10);
    let mut b = ClassificationData::new(3);
    b.add_sample(3, &[0.0, 0.0, 0.0]).unwrap();
    b.add_sample(1, &[1.0, 1.0, 1.0]).unwrap();
    a.merge(&b).unwrap();
    assert_eq!(a.num_samples(), 12);
    assert_eq!(a.class_labels(), vec![1, 2, 3]);
    assert_eq!(a.trackers()[0].counter, 6);

    let wrong = ClassificationData::new(2);
    assert!(a.merge(&wrong).is_err());
}

#[test]
fn test_scaling_maps_features_into_target() {
    let mut data = two_class_data(40);
    data.scale(0.0, 1.0).unwrap();
    for range in data.ranges() {
        assert!(within(&range.min, &0.0, Closeness::Partial));
        assert!(within(&range.max, &1.0, Closeness::Partial));
    }
}

#[test]
fn test_classification_dump_restore() {
    let mut data = two_class_data(25);
    data.set_class_name(2, "circle").unwrap();
    let bytes = data.dump();
    let back = ClassificationData::restore(&bytes).unwrap();
    assert_eq!(back.name(), data.name());
    assert_eq!(back.samples(), data.samples());
    assert_eq!(back.trackers(), data.trackers());
    assert!(ClassificationData::restore(&bytes[..bytes.len() - 1]).is_err());
}

#[test]
fn test_regression_partitioning() {
    let mut data = RegressionData::new(2, 1);
    for i in 0..50 {
        let x = i as f64;
        data.add_sample(&[x, x * 0.5], &[2.0 * x + 1.0]).unwrap();
    }
    let mut rng = Random::new(12);
    data.setup_k_folds(5, &mut rng).unwrap();
    for k in 0..5 {
        assert_eq!(data.test_fold(k).unwrap().num_samples(), 10);
        assert_eq!(data.training_fold(k).unwrap().num_samples(), 40);
    }

    let test = data.split(70, &mut rng).unwrap();
    assert_eq!(data.num_samples(), 35);
    assert_eq!(test.num_samples(), 15);

    let boot = data.bootstrap(0, &mut rng).unwrap();
    assert_eq!(boot.num_samples(), 35);

    let back = RegressionData::restore(&data.dump()).unwrap();
    assert_eq!(back.samples(), data.samples());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_unstratified_folds_partition(n in 2usize..120, k_seed in any::<u64>()) {
        let mut data = two_class_data(n);
        let k = 2 + (k_seed as usize % (n - 1));
        let mut rng = Random::new(k_seed | 1);
        data.setup_k_folds(k, false, &mut rng).unwrap();
        let mut total = 0;
        for fold in 0..k {
            let test = data.test_fold(fold).unwrap();
            let train = data.training_fold(fold).unwrap();
            prop_assert_eq!(test.num_samples() + train.num_samples(), n);
            total += test.num_samples();
        }
        prop_assert_eq!(total, n);
    }

    #[test]
    fn prop_split_sizes(n in 1usize..200, percent in 0u32..=100) {
        let mut data = two_class_data(n);
        let test = data.split(percent, false, &mut Random::new(1)).unwrap();
        prop_assert_eq!(data.num_samples(), n * percent as usize / 100);
        prop_assert_eq!(data.num_samples() + test.num_samples(), n);
    }
}
