#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can inspect the
// slot array and tombstone count directly.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use proptest::prelude::*;

use crate::error::TableError;
use crate::hash_table::HashTable;

// Pool-indexed operations so shrinking moves towards earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, usize),
    Assign(usize, usize),
    Erase(usize),
    Find(usize),
    Reserve(usize),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    // Short keys over a two-letter alphabet collide often, including the
    // "Aa"/"BB" family with identical full hashes.
    proptest::collection::vec("[ABab]{0,4}", 1..=40).prop_flat_map(|pool| {
        let len = pool.len();
        let op = prop_oneof![
            4 => (0..len, 0..VALUES).prop_map(|(k, v)| Op::Insert(k, v)),
            1 => (0..len, 0..VALUES).prop_map(|(k, v)| Op::Assign(k, v)),
            2 => (0..len).prop_map(Op::Erase),
            2 => (0..len).prop_map(Op::Find),
            1 => (0usize..400).prop_map(Op::Reserve),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

const VALUES: usize = 8;

fn value_pool() -> Vec<Vec<u8>> {
    (0..VALUES).map(|i| alloc::vec![i as u8; i + 1]).collect()
}

// Property: state-machine equivalence against BTreeMap.
// - insert rejects empty keys and duplicates, otherwise adds the entry;
// - assign/erase/find agree with the model for present and absent keys,
//   including keys displaced by collisions and keys behind tombstones;
// - reserve never shrinks and keeps every entry reachable;
// - len matches the model and live entries plus tombstones fit the array.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let values = value_pool();
        let mut sut = HashTable::new();
        let mut model: BTreeMap<&str, &[u8]> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    let key = pool[k].as_str();
                    let result = sut.insert(key, &values[v]);
                    if key.is_empty() {
                        prop_assert_eq!(result, Err(TableError::EmptyKey));
                    } else if model.contains_key(key) {
                        prop_assert_eq!(result, Err(TableError::DuplicateKey));
                    } else {
                        prop_assert_eq!(result, Ok(()));
                        model.insert(key, &values[v][..]);
                    }
                }
                Op::Assign(k, v) => {
                    let key = pool[k].as_str();
                    let result = sut.assign(key, &values[v]);
                    if key.is_empty() {
                        prop_assert_eq!(result, Err(TableError::EmptyKey));
                    } else if let Some(current) = model.get_mut(key) {
                        prop_assert_eq!(result, Ok(*current));
                        *current = &values[v][..];
                    } else {
                        prop_assert_eq!(result, Err(TableError::KeyNotFound));
                    }
                }
                Op::Erase(k) => {
                    let key = pool[k].as_str();
                    let result = sut.erase(key);
                    if key.is_empty() {
                        prop_assert_eq!(result, Err(TableError::EmptyKey));
                    } else {
                        prop_assert_eq!(result.ok(), model.remove(key));
                    }
                }
                Op::Find(k) => {
                    let key = pool[k].as_str();
                    prop_assert_eq!(sut.get(key), model.get(key).copied());
                    if !key.is_empty() {
                        prop_assert_eq!(sut.contains(key), Ok(model.contains_key(key)));
                    }
                }
                Op::Reserve(capacity) => {
                    let before = sut.capacity();
                    prop_assert_eq!(sut.reserve(capacity), Ok(()));
                    prop_assert!(sut.capacity() >= before);
                    prop_assert!(sut.capacity() >= capacity);
                }
            }

            prop_assert_eq!(sut.len(), model.len());
            prop_assert!(sut.broken_chains().is_empty());
            let stats = sut.debug_stats();
            prop_assert!(stats.populated + stats.tombstones <= stats.capacity);
            prop_assert!(crate::PRIMES.contains(&stats.capacity));
        }

        for (key, value) in &model {
            prop_assert_eq!(sut.find(*key), Ok(*value));
        }
    }
}

// Property: after any insert/erase history, no entry has an empty slot between
// its home and its position, and every surviving key is still found.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_probe_chains_unbroken(
        keys in proptest::collection::vec(any::<u16>(), 1..120),
        erase_mask in proptest::collection::vec(any::<bool>(), 120),
    ) {
        let values = value_pool();
        let mut sut = HashTable::new();
        for &k in &keys {
            let _ = sut.insert(k, &values[0]);
        }
        for (&k, &erase) in keys.iter().zip(&erase_mask) {
            if erase {
                let _ = sut.erase(k);
            }
        }

        let live: Vec<u16> = keys
            .iter()
            .zip(erase_mask.iter())
            .filter(|&(_, &erase)| !erase)
            .map(|(&k, _)| k)
            .collect();
        for k in live {
            // A key may appear twice in `keys`; any erase of it wins.
            let erased = keys
                .iter()
                .zip(&erase_mask)
                .any(|(&other, &erase)| other == k && erase);
            prop_assert_eq!(sut.contains(k), Ok(!erased));
        }

        prop_assert_eq!(sut.broken_chains(), Vec::<usize>::new());

        let hist = sut.probe_histogram();
        prop_assert_eq!(hist.iter().sum::<usize>(), sut.len());
    }
}
