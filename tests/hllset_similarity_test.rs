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

use googletest::assert_that;
use googletest::prelude::ge;
use googletest::prelude::le;
use googletest::prelude::near;
use hllset::error::ErrorKind;
use hllset::hllset::HllSet;
use hllset::hllset::Overlap;

fn tokens(range: std::ops::Range<u32>) -> impl Iterator<Item = String> {
    range.map(|i| format!("token-{i}"))
}

#[test]
fn test_small_overlap_scenario() {
    // 32 buckets, |A| = 10, |B| = 15, |A ∩ B| = 5
    let mut a = HllSet::new(5).unwrap();
    let mut b = HllSet::new(5).unwrap();
    a.extend(tokens(0..10));
    b.extend(tokens(5..20));

    assert_that!(a.count(), near(10.0, 4.0));
    assert_that!(b.count(), near(15.0, 5.5));

    let intersection = a.intersection(&b).unwrap();
    assert_that!(intersection.count(), ge(3.0));
    assert_that!(intersection.count(), le(9.0));
    assert_that!(a.union(&b).unwrap().count(), near(20.0, 9.5));

    let jaccard = a.jaccard(&b).unwrap();
    assert_that!(jaccard, ge(0.1));
    assert_that!(jaccard, le(0.45));

    let overlap = Overlap::new(&a, &b).unwrap();
    assert_eq!(overlap.jaccard(), jaccard);
    assert_eq!(overlap.intersection(), &intersection);
}

#[test]
fn test_identical_and_disjoint() {
    let mut a = HllSet::new(14).unwrap();
    let mut b = HllSet::new(14).unwrap();
    a.extend(0..1_000u64);
    b.extend(1_000..2_000u64);

    assert_eq!(a.jaccard(&a).unwrap(), 1.0);
    assert_that!(a.jaccard(&b).unwrap(), le(0.03));
    assert_that!(a.conditional_probability(&b).unwrap(), le(0.05));
}

#[test]
fn test_scores_stay_in_unit_interval() {
    for (a_range, b_range) in [(0..10u64, 5..15u64), (0..1_000, 10..20), (0..1, 0..5_000)] {
        let mut a = HllSet::new(8).unwrap();
        let mut b = HllSet::new(8).unwrap();
        a.extend(a_range);
        b.extend(b_range);

        let overlap = a.overlap(&b).unwrap();
        for score in [
            overlap.jaccard(),
            overlap.left_given_right().unwrap(),
            overlap.right_given_left().unwrap(),
        ] {
            assert_that!(score, ge(0.0));
            assert_that!(score, le(1.0));
        }
    }
}

#[test]
fn test_conditional_probability() {
    let mut whole = HllSet::new(12).unwrap();
    let mut part = HllSet::new(12).unwrap();
    whole.extend(0..2_000u64);
    part.extend(0..500u64);

    // every bit of `part` is also in `whole`
    assert_eq!(whole.conditional_probability(&part).unwrap(), 1.0);
    assert_that!(part.conditional_probability(&whole).unwrap(), near(0.25, 0.05));
}

#[test]
fn test_empty_operands() {
    let empty = HllSet::new(12).unwrap();
    let mut other = HllSet::new(12).unwrap();
    other.add("x");

    assert_eq!(empty.jaccard(&empty).unwrap(), 0.0);
    assert_eq!(empty.jaccard(&other).unwrap(), 0.0);

    let err = other.conditional_probability(&empty).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DivisionUndefined);
    let err = Overlap::new(&empty, &empty)
        .unwrap()
        .left_given_right()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DivisionUndefined);
}

#[test]
fn test_comparisons_do_not_mutate() {
    let mut a = HllSet::new(10).unwrap();
    let mut b = HllSet::new(10).unwrap();
    a.extend(0..100u64);
    b.extend(50..150u64);
    let (a0, b0) = (a.clone(), b.clone());

    a.jaccard(&b).unwrap();
    a.conditional_probability(&b).unwrap();
    a.overlap(&b).unwrap();
    assert_eq!(a, a0);
    assert_eq!(b, b0);
}
