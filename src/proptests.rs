use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;

const COUNT: u64 = 64;

fn value() -> impl Strategy<Value = i64> {
    // Zero shows up often so sparse elision paths are exercised.
    prop_oneof![
        1 => Just(0i64),
        3 => -9i64..=9,
    ]
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    #[proptest(weight = 6)]
    Set {
        #[proptest(strategy = "0..COUNT")]
        index: u64,
        #[proptest(strategy = "value()")]
        value: i64,
    },
    #[proptest(weight = 2)]
    Put {
        #[proptest(strategy = "0..COUNT")]
        index: u64,
        #[proptest(strategy = "value()")]
        value: i64,
    },
    #[proptest(weight = 3)]
    Add {
        #[proptest(strategy = "0..COUNT")]
        index: u64,
        #[proptest(strategy = "value()")]
        value: i64,
    },
    #[proptest(weight = 2)]
    Remove {
        #[proptest(strategy = "0..COUNT")]
        index: u64,
    },
    #[proptest(weight = 2)]
    Fill {
        #[proptest(strategy = "0..=COUNT")]
        first: u64,
        #[proptest(strategy = "0..=COUNT")]
        limit: u64,
        #[proptest(strategy = "1u64..12")]
        step: u64,
        #[proptest(strategy = "value()")]
        value: i64,
    },
    #[proptest(weight = 1)]
    Modify {
        #[proptest(strategy = "0..=COUNT")]
        first: u64,
        #[proptest(strategy = "0..=COUNT")]
        limit: u64,
        #[proptest(strategy = "1u64..12")]
        step: u64,
        #[proptest(strategy = "-2i64..=2")]
        factor: i64,
    },
    #[proptest(weight = 1)]
    Exchange {
        #[proptest(strategy = "0..COUNT")]
        a: u64,
        #[proptest(strategy = "0..COUNT")]
        b: u64,
        #[proptest(strategy = "1u64..5")]
        step: u64,
        #[proptest(strategy = "0u64..5")]
        count: u64,
    },
}

/// Largest pair count that keeps both exchange runs in bounds.
fn exchange_count(a: u64, b: u64, step: u64, count: u64) -> u64 {
    let room = |start: u64| (COUNT - 1 - start) / step + 1;
    count.min(room(a)).min(room(b))
}

fn apply<S: Storage<i64>>(storage: &mut S, op: &Op) {
    match *op {
        Op::Set { index, value } | Op::Put { index, value } => storage.set(index, value),
        Op::Add { index, value } => storage.add(index, value),
        Op::Remove { index } => storage.set(index, 0),
        Op::Fill {
            first,
            limit,
            step,
            value,
        } => storage.fill_range(first, limit, step, value),
        Op::Modify {
            first,
            limit,
            step,
            factor,
        } => storage
            .modify_range(first, limit, step, &|x| x * factor)
            .unwrap(),
        Op::Exchange { a, b, step, count } => {
            storage.exchange(a, b, step, exchange_count(a, b, step, count))
        }
    }
}

fn apply_model(model: &mut [i64], op: &Op) {
    match *op {
        Op::Set { index, value } | Op::Put { index, value } => model[index as usize] = value,
        Op::Add { index, value } => model[index as usize] += value,
        Op::Remove { index } => model[index as usize] = 0,
        Op::Fill {
            first,
            limit,
            step,
            value,
        } => {
            for i in (first..limit.max(first)).step_by(step as usize) {
                model[i as usize] = value;
            }
        }
        Op::Modify {
            first,
            limit,
            step,
            factor,
        } => {
            for i in (first..limit.max(first)).step_by(step as usize) {
                model[i as usize] *= factor;
            }
        }
        Op::Exchange { a, b, step, count } => {
            for k in 0..exchange_count(a, b, step, count) {
                model.swap((a + k * step) as usize, (b + k * step) as usize);
            }
        }
    }
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=300)
}

fn check_against_model<S: Storage<i64>>(storage: &S, model: &[i64]) -> Result<(), TestCaseError> {
    prop_assert_eq!(storage.count(), model.len() as u64);
    for (i, &expected) in model.iter().enumerate() {
        prop_assert_eq!(storage.get(i as u64), expected, "index {}", i);
    }
    let expected_sum: i64 = model.iter().sum();
    prop_assert_eq!(storage.sum(), expected_sum as f64);
    Ok(())
}

fn model_largest(model: &[i64], first: u64, limit: u64, step: u64) -> u64 {
    let mut largest = first;
    let mut largest_norm = -1;
    for i in (first..limit.max(first)).step_by(step as usize) {
        let norm = model[i as usize].abs();
        if norm > largest_norm {
            largest = i;
            largest_norm = norm;
        }
    }
    largest
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_sparse_equivalence(ops in ops()) {
        let mut sparse = SparseArray::<i64>::with_strategy(COUNT, GrowthStrategy::new(1, 4, 16));
        let mut model = vec![0i64; COUNT as usize];

        for op in &ops {
            match *op {
                Op::Put { index, value } => sparse.put(index, value),
                Op::Remove { index } => {
                    let removed = sparse.remove(index);
                    let expected = model[index as usize];
                    if expected != 0 {
                        prop_assert_eq!(removed, Some(expected));
                    }
                }
                _ => apply(&mut sparse, op),
            }
            apply_model(&mut model, op);

            prop_assert!(sparse.indices().windows(2).all(|w| w[0] < w[1]));
            prop_assert!(sparse.actual_length() <= sparse.capacity());
        }

        check_against_model(&sparse, &model)?;
        for (index, value) in sparse.nonzeros() {
            prop_assert_eq!(model[index as usize], value);
        }
        let stored_nonzero = sparse.nonzeros().filter(|&(_, v)| v != 0).count();
        prop_assert_eq!(stored_nonzero, model.iter().filter(|&&v| v != 0).count());
    }

    #[test]
    fn prop_sparse_largest_and_visit(
        ops in ops(),
        first in 0..=COUNT,
        limit in 0..=COUNT,
        step in 1u64..12,
    ) {
        let mut sparse = SparseArray::<i64>::new(COUNT);
        let mut model = vec![0i64; COUNT as usize];
        for op in &ops {
            apply(&mut sparse, op);
            apply_model(&mut model, op);
        }

        prop_assert_eq!(
            sparse.index_of_largest(first, limit, step),
            model_largest(&model, first, limit, step)
        );

        let mut total = 0i64;
        let mut zeros = 0;
        sparse.visit_range(first, limit, step, &mut |v| {
            total += v;
            zeros += usize::from(v == 0);
        });
        let positions: Vec<u64> = (first..limit.max(first)).step_by(step as usize).collect();
        let expected: i64 = positions.iter().map(|&i| model[i as usize]).sum();
        prop_assert_eq!(total, expected);
        if positions.iter().any(|&i| model[i as usize] == 0) {
            prop_assert!(zeros >= 1);
        }
    }

    #[test]
    fn prop_segmented_dense_equivalence(ops in ops(), index_bits in 1u32..5) {
        let mut segmented = SegmentedArray::<i64>::partitioned(COUNT, index_bits, SegmentKind::Dense).unwrap();
        let mut dense = DenseArray::<i64>::new(COUNT).unwrap();
        for op in &ops {
            apply(&mut segmented, op);
            apply(&mut dense, op);
        }
        check_against_model(&segmented, dense.as_slice())?;
        for step in [1u64, 3, 17] {
            prop_assert_eq!(
                segmented.index_of_largest(5, COUNT, step),
                dense.index_of_largest(5, COUNT, step)
            );
        }
    }

    #[test]
    fn prop_segmented_sparse_equivalence(ops in ops(), index_bits in 2u32..6) {
        let kind = SegmentKind::Sparse(GrowthStrategy::new(1, 2, 4));
        let mut segmented = SegmentedArray::<i64>::partitioned(COUNT, index_bits, kind).unwrap();
        let mut model = vec![0i64; COUNT as usize];
        for op in &ops {
            apply(&mut segmented, op);
            apply_model(&mut model, op);
        }
        check_against_model(&segmented, &model)?;
        let stored: Vec<(u64, i64)> = segmented.nonzeros().filter(|&(_, v)| v != 0).collect();
        let expected: Vec<(u64, i64)> = model
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v != 0)
            .map(|(i, &v)| (i as u64, v))
            .collect();
        prop_assert_eq!(stored, expected);
    }

    #[test]
    fn prop_growth_monotonic(
        initial in 0u64..2000,
        chunk in 1u64..5000,
        segment in 1u64..100_000,
        current in 0u64..1_000_000,
    ) {
        let strategy = GrowthStrategy::new(initial, chunk, segment);
        prop_assert!(strategy.chunk().is_power_of_two());
        prop_assert!(strategy.segment().is_power_of_two());
        prop_assert!(strategy.segment() >= strategy.chunk());

        let next = strategy.grow(current);
        prop_assert!(next > current);
        prop_assert!(next >= strategy.initial());
        if current + 1 >= strategy.chunk() {
            prop_assert_eq!(next % strategy.chunk(), 0);
        }
        prop_assert!(strategy.grow(next) > next);
    }

    #[test]
    fn prop_sort_matches_vec(values in prop::collection::vec(value(), 0..200)) {
        let mut sparse: BasicArray<i64> = SparseArray::new(values.len() as u64).into();
        for (i, &v) in values.iter().enumerate() {
            sparse.set(i as u64, v);
        }
        sparse.sort_ascending();

        let mut expected = values;
        expected.sort();
        prop_assert_eq!(sparse.to_vec().unwrap(), expected);
    }
}

#[test]
fn set_then_remove_restores_length() {
    let mut sparse = SparseArray::<f64>::new(1 << 30);
    for i in [5u64, 900, 1 << 29] {
        sparse.set(i, 1.0);
    }
    let before = sparse.actual_length();
    for probe in [0u64, 6, 1000, (1 << 30) - 1] {
        sparse.set(probe, 2.5);
        assert_eq!(sparse.remove(probe), Some(2.5));
        assert_eq!(sparse.get(probe), 0.0);
        assert_eq!(sparse.actual_length(), before);
    }
}

#[test]
fn thresholds_scenario() {
    let strategy = GrowthStrategy::new(16, 512, 32768);
    assert!(strategy.is_chunked(600));
    assert!(!strategy.is_segmented(600));
    assert!(strategy.is_segmented(40000));
}
