#![cfg(test)]

// Property tests for CuckooMap kept inside the crate because they drive
// internal entry points: bounded placement without the resize controller
// (`try_insert`) and direct rehash/grow/shrink (`try_resize`).

use proptest::prelude::*;
use rand_core::{RngCore, SeedableRng};
use rand_pcg::Lcg128Xsl64 as Pcg;
use std::collections::{HashMap, HashSet};

use crate::cuckoo_map::{Attempt, CuckooMap};

fn distinct_keys(seed: u64, n: usize) -> Vec<u32> {
    let mut rng = Pcg::seed_from_u64(seed);
    let mut seen = HashSet::with_capacity(n);
    let mut keys = Vec::with_capacity(n);
    while keys.len() < n {
        let k = rng.next_u32();
        if k != 0 && seen.insert(k) {
            keys.push(k);
        }
    }
    keys
}

// Statistical dense-fill property: under fixed capacity (no resizing), the
// table accepts at least 95% of capacity in randomly drawn distinct keys
// before the first placement attempt fails. Checked across seeds since a
// single unlucky seed tuple is allowed to do worse.
#[test]
fn dense_fill_reaches_095_before_first_failure() {
    const LOG_SIZE: u32 = 10;

    for seed in [1u64, 2, 3] {
        let mut m: CuckooMap<u64> = CuckooMap::with_seed(LOG_SIZE, seed);
        let capacity = m.capacity();

        let mut filled = 0usize;
        for key in distinct_keys(seed ^ 0xA5A5, capacity) {
            if matches!(m.try_insert(key, 1), Attempt::Exhausted) {
                break;
            }
            filled += 1;
        }

        let ratio = filled as f64 / capacity as f64;
        assert!(ratio >= 0.95, "seed {seed}: filled only {ratio:.3} of capacity");
    }
}

// Growing must never lose an entry: everything present before the resize is
// present afterwards with the same value.
#[test]
fn forced_grows_preserve_the_live_set() {
    let mut m: CuckooMap<u64> = CuckooMap::with_seed(8, 11);
    let keys = distinct_keys(12, 500);
    for (i, &key) in keys.iter().enumerate() {
        m.insert(key, i as u64);
    }
    m.insert(0, u64::MAX);

    for _ in 0..2 {
        assert!(m.try_resize(1));
        assert_eq!(m.len(), keys.len() + 1);
        for (i, &key) in keys.iter().enumerate() {
            assert_eq!(m.get(key), Some(i as u64));
        }
        assert_eq!(m.get(0), Some(u64::MAX));
    }
    assert_eq!(m.stats().grows, 2);
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u32, u64),
    Remove(u32),
    Get(u32),
    Rehash,
    Grow,
    Shrink,
}

prop_compose! {
    // Small pool plus arbitrary keys: collisions and the zero key on
    // purpose, with the occasional far-flung key mixed in.
    fn arb_key()(k in prop_oneof![3 => 0u32..8, 1 => any::<u32>()]) -> u32 { k }
}

prop_compose! {
    fn arb_ops()(ops in proptest::collection::vec(
        prop_oneof![
            4 => (arb_key(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
            2 => arb_key().prop_map(Op::Remove),
            2 => arb_key().prop_map(Op::Get),
            1 => Just(Op::Rehash),
            1 => Just(Op::Grow),
            1 => Just(Op::Shrink),
        ], 1..100)) -> Vec<Op> { ops }
}

// State machine against a std HashMap model, with rehash/grow/shrink
// injected at arbitrary points. Exercises count accuracy, round-trip,
// delete observation, zero-key equivalence and the load-factor bound.
proptest! {
    #[test]
    fn prop_state_machine_with_forced_resizes(seed in any::<u64>(), ops in arb_ops()) {
        let mut sut: CuckooMap<u64> = CuckooMap::with_seed(4, seed);
        let mut model: HashMap<u32, u64> = HashMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    prop_assert_eq!(sut.insert(k, v), model.insert(k, v));
                }
                Op::Remove(k) => {
                    prop_assert_eq!(sut.remove(k), model.remove(&k));
                }
                Op::Get(k) => {
                    prop_assert_eq!(sut.get(k), model.get(&k).copied());
                }
                // Forced resizes may legitimately refuse (shrink floor, or
                // an unlucky seed tuple); the live set must be intact
                // either way.
                Op::Rehash => { let _ = sut.try_resize(0); }
                Op::Grow => { let _ = sut.try_resize(1); }
                Op::Shrink => { let _ = sut.try_resize(-1); }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.load_factor() <= 1.0);
        }

        for (&k, &v) in &model {
            prop_assert_eq!(sut.get(k), Some(v));
        }
    }
}
