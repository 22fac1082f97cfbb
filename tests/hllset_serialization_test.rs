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
use googletest::prelude::contains_substring;
use hllset::error::ErrorKind;
use hllset::hllset::BitmapWidth;
use hllset::hllset::HllSet;
use insta::assert_snapshot;

fn populated(precision: u8, width: BitmapWidth, seed: u32, n: u64) -> HllSet {
    let mut sketch = HllSet::builder()
        .precision(precision)
        .bitmap_width(width)
        .seed(seed)
        .build()
        .unwrap();
    sketch.extend(0..n);
    sketch
}

#[test]
fn test_round_trip() {
    for precision in [4, 5, 12, 18] {
        for width in [BitmapWidth::W32, BitmapWidth::W64] {
            for n in [0, 1, 1_000] {
                let sketch = populated(precision, width, 9001, n);
                let bytes = sketch.serialize();
                let restored = HllSet::deserialize(&bytes).unwrap();
                assert_eq!(restored, sketch, "p={precision} w={width:?} n={n}");
                assert_eq!(restored.count(), sketch.count());
                assert_eq!(restored.serialize(), bytes);
            }
        }
    }
}

#[test]
fn test_restored_sketch_is_compatible() {
    let sketch = populated(10, BitmapWidth::W64, 77, 500);
    let restored = HllSet::deserialize(&sketch.serialize()).unwrap();
    assert_eq!(restored.seed(), 77);
    assert!(restored.is_compatible(&sketch));
    assert_eq!(restored.union(&sketch).unwrap(), sketch);
}

#[test]
fn test_empty_header() {
    let bytes = HllSet::new(12).unwrap().serialize();
    assert_snapshot!(
        format!("{bytes:?}"),
        @"[2, 1, 30, 12, 64, 4, 84, 17, 41, 35, 0, 0, 0, 0, 0, 0]"
    );
}

#[test]
fn test_truncated_input() {
    let bytes = populated(6, BitmapWidth::W64, 9001, 100).serialize();
    for len in [0, 1, 7, 15, 16, bytes.len() - 1] {
        let err = HllSet::deserialize(&bytes[..len]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData, "len={len}");
        assert_that!(err.message(), contains_substring("insufficient data"));
    }
    let err = HllSet::deserialize(&bytes[..20]).unwrap_err();
    assert_eq!(err.context("field"), Some("buckets"));
}

#[test]
fn test_corrupted_header() {
    let bytes = populated(6, BitmapWidth::W64, 9001, 100).serialize();
    let corrupt = |offset: usize, value: u8| {
        let mut bytes = bytes.clone();
        bytes[offset] = value;
        HllSet::deserialize(&bytes).unwrap_err()
    };

    let err = corrupt(0, 3);
    assert_that!(err.message(), contains_substring("invalid preamble longs"));
    let err = corrupt(1, 9);
    assert_that!(err.message(), contains_substring("unsupported serial version"));
    let err = corrupt(2, 7);
    assert_that!(err.message(), contains_substring("invalid family"));
    let err = corrupt(3, 3);
    assert_that!(err.message(), contains_substring("precision must be in [4; 18]"));
    assert_eq!(err.kind(), ErrorKind::InvalidData);
    let err = corrupt(4, 16);
    assert_that!(err.message(), contains_substring("unsupported bitmap width"));
    let err = corrupt(6, bytes[6] ^ 0xff);
    assert_that!(err.message(), contains_substring("seed hash mismatch"));
    let err = corrupt(8, bytes[8] ^ 0x01);
    assert_that!(err.message(), contains_substring("seed hash mismatch"));
}

#[test]
fn test_inconsistent_empty_flag() {
    let mut bytes = HllSet::new(6).unwrap().serialize();
    bytes[12] = 1;
    let err = HllSet::deserialize(&bytes).unwrap_err();
    assert_that!(err.message(), contains_substring("empty sketch claims 1"));

    let mut bytes = populated(6, BitmapWidth::W64, 9001, 100).serialize();
    bytes[5] = 0;
    bytes[16..].fill(0);
    bytes[12..16].copy_from_slice(&0u32.to_le_bytes());
    let err = HllSet::deserialize(&bytes).unwrap_err();
    assert_that!(
        err.message(),
        contains_substring("non-zero bucket count mismatch")
    );
}

#[test]
fn test_precision_must_match_payload() {
    let mut bytes = populated(5, BitmapWidth::W64, 9001, 50).serialize();
    bytes[3] = 6;
    let err = HllSet::deserialize(&bytes).unwrap_err();
    assert_eq!(err.context("field"), Some("buckets"));
}
