// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use hllset::hllset::HllSet;
use proptest::collection::vec;
use proptest::prelude::*;

const PRECISION: u8 = 6;

fn sketch_of(items: &[u64]) -> HllSet {
    let mut sketch = HllSet::new(PRECISION).unwrap();
    sketch.extend(items);
    sketch
}

fn arb_items() -> impl Strategy<Value = Vec<u64>> {
    vec(any::<u64>(), 0..200)
}

proptest! {
    #[test]
    fn union_is_commutative_and_associative(a in arb_items(), b in arb_items(), c in arb_items()) {
        let (a, b, c) = (sketch_of(&a), sketch_of(&b), sketch_of(&c));
        prop_assert_eq!(a.union(&b).unwrap(), b.union(&a).unwrap());
        prop_assert_eq!(
            a.union(&b).unwrap().union(&c).unwrap(),
            a.union(&b.union(&c).unwrap()).unwrap()
        );
    }

    #[test]
    fn intersection_is_commutative_and_associative(
        a in arb_items(),
        b in arb_items(),
        c in arb_items(),
    ) {
        let (a, b, c) = (sketch_of(&a), sketch_of(&b), sketch_of(&c));
        prop_assert_eq!(a.intersection(&b).unwrap(), b.intersection(&a).unwrap());
        prop_assert_eq!(
            a.intersection(&b).unwrap().intersection(&c).unwrap(),
            a.intersection(&b.intersection(&c).unwrap()).unwrap()
        );
    }

    #[test]
    fn intersection_distributes_over_union(a in arb_items(), b in arb_items(), c in arb_items()) {
        let (a, b, c) = (sketch_of(&a), sketch_of(&b), sketch_of(&c));
        prop_assert_eq!(
            a.intersection(&b.union(&c).unwrap()).unwrap(),
            a.intersection(&b).unwrap().union(&a.intersection(&c).unwrap()).unwrap()
        );
    }

    #[test]
    fn identities(a in arb_items(), b in arb_items()) {
        let (a, b) = (sketch_of(&a), sketch_of(&b));
        let empty = HllSet::new(PRECISION).unwrap();
        prop_assert_eq!(a.union(&empty).unwrap(), a.clone());
        prop_assert!(a.xor(&a).unwrap().is_empty());
        prop_assert!(a.complement(&a).unwrap().is_empty());
        prop_assert_eq!(
            a.complement(&b).unwrap().union(&a.intersection(&b).unwrap()).unwrap(),
            a.clone()
        );
        prop_assert_eq!(
            a.xor(&b).unwrap(),
            a.union(&b).unwrap().complement(&a.intersection(&b).unwrap()).unwrap()
        );
    }

    #[test]
    fn union_is_sketch_of_concatenation(a in arb_items(), b in arb_items()) {
        let mut both = a.clone();
        both.extend_from_slice(&b);
        prop_assert_eq!(sketch_of(&a).union(&sketch_of(&b)).unwrap(), sketch_of(&both));
    }

    #[test]
    fn insertion_order_does_not_matter(items in arb_items()) {
        let mut reversed = items.clone();
        reversed.reverse();
        prop_assert_eq!(sketch_of(&items), sketch_of(&reversed));
    }

    #[test]
    fn add_is_idempotent(items in arb_items()) {
        let once = sketch_of(&items);
        let mut twice = once.clone();
        twice.extend(&items);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn scores_stay_in_unit_interval(a in arb_items(), b in arb_items()) {
        let (a, b) = (sketch_of(&a), sketch_of(&b));
        let jaccard = a.jaccard(&b).unwrap();
        prop_assert!((0.0..=1.0).contains(&jaccard));
        if let Ok(p) = a.conditional_probability(&b) {
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }

    #[test]
    fn serialization_round_trips(items in arb_items()) {
        let sketch = sketch_of(&items);
        prop_assert_eq!(HllSet::deserialize(&sketch.serialize()).unwrap(), sketch);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn count_never_decreases(
        precision in 4u8..=8,
        seed in any::<u32>(),
        offset in any::<u64>(),
    ) {
        let mut sketch = HllSet::with_seed(precision, seed).unwrap();
        let mut previous = 0.0;
        for i in 0..4u64 << precision {
            sketch.add(offset.wrapping_add(i));
            let count = sketch.count();
            prop_assert!(count >= previous, "item {}: {} -> {}", i, previous, count);
            previous = count;
        }
    }
}
