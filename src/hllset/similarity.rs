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

//! Similarity scores derived from the estimated cardinalities of set-algebra results.

use super::HllSet;
use super::algebra::BucketOp;
use crate::error::Error;

/// Union and intersection of two sketches, computed once together with their counts.
///
/// Use this when several scores are needed for the same pair, or when the union and
/// intersection sketches are needed downstream as well.
///
/// # Examples
///
/// ```
/// # use hllset::hllset::{HllSet, Overlap};
/// let mut a = HllSet::new(10).unwrap();
/// let mut b = HllSet::new(10).unwrap();
/// a.extend(0..100u32);
/// b.extend(50..150u32);
///
/// let overlap = Overlap::new(&a, &b).unwrap();
/// assert!((overlap.jaccard() - 1.0 / 3.0).abs() < 0.1);
/// assert!((overlap.left_given_right().unwrap() - 0.5).abs() < 0.1);
/// ```
#[derive(Debug, Clone)]
pub struct Overlap {
    union: HllSet,
    intersection: HllSet,
    union_count: f64,
    intersection_count: f64,
    left_count: f64,
    right_count: f64,
}

impl Overlap {
    /// Computes the overlap of `left` and `right`.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleSketch`](crate::error::ErrorKind::IncompatibleSketch) if the
    /// sketches cannot be combined.
    pub fn new(left: &HllSet, right: &HllSet) -> Result<Self, Error> {
        left.check_compatible(right, "overlap")?;
        let union = left.combined(right, BucketOp::Union);
        let intersection = left.combined(right, BucketOp::Intersection);
        Ok(Self {
            union_count: union.count(),
            intersection_count: intersection.count(),
            left_count: left.count(),
            right_count: right.count(),
            union,
            intersection,
        })
    }

    /// The union sketch.
    pub fn union(&self) -> &HllSet {
        &self.union
    }

    /// The intersection sketch.
    pub fn intersection(&self) -> &HllSet {
        &self.intersection
    }

    /// Estimated size of the union.
    pub fn union_count(&self) -> f64 {
        self.union_count
    }

    /// Estimated size of the intersection.
    pub fn intersection_count(&self) -> f64 {
        self.intersection_count
    }

    /// Estimated size of the left operand.
    pub fn left_count(&self) -> f64 {
        self.left_count
    }

    /// Estimated size of the right operand.
    pub fn right_count(&self) -> f64 {
        self.right_count
    }

    /// Jaccard similarity `|A ∩ B| / |A ∪ B|`, in `[0, 1]`.
    ///
    /// Two empty sketches have similarity `0.0`.
    pub fn jaccard(&self) -> f64 {
        if self.union_count == 0.0 {
            return 0.0;
        }
        clamp_unit(self.intersection_count / self.union_count)
    }

    /// Conditional probability `P(left | right) = |A ∩ B| / |B|`.
    ///
    /// # Errors
    ///
    /// Returns [`DivisionUndefined`](crate::error::ErrorKind::DivisionUndefined) if the right
    /// sketch counts zero.
    pub fn left_given_right(&self) -> Result<f64, Error> {
        ratio(self.intersection_count, self.right_count)
    }

    /// Conditional probability `P(right | left) = |A ∩ B| / |A|`.
    ///
    /// # Errors
    ///
    /// Returns [`DivisionUndefined`](crate::error::ErrorKind::DivisionUndefined) if the left
    /// sketch counts zero.
    pub fn right_given_left(&self) -> Result<f64, Error> {
        ratio(self.intersection_count, self.left_count)
    }

    /// Consumes the overlap, returning the union and intersection sketches.
    pub fn into_parts(self) -> (HllSet, HllSet) {
        (self.union, self.intersection)
    }
}

fn ratio(intersection_count: f64, given_count: f64) -> Result<f64, Error> {
    if given_count == 0.0 {
        return Err(Error::division_undefined(
            "conditional probability given an empty sketch is undefined",
        ));
    }
    Ok(clamp_unit(intersection_count / given_count))
}

// Independent estimates of the intersection and of its superset can cross by a little.
fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

impl HllSet {
    /// Estimated Jaccard similarity of two sketches, in `[0, 1]`.
    ///
    /// Returns `0.0` when both sketches are empty.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleSketch`](crate::error::ErrorKind::IncompatibleSketch) if the
    /// sketches cannot be combined.
    pub fn jaccard(&self, other: &HllSet) -> Result<f64, Error> {
        self.check_compatible(other, "jaccard similarity")?;
        let union_count = self.combined(other, BucketOp::Union).count();
        if union_count == 0.0 {
            return Ok(0.0);
        }
        let intersection_count = self.combined(other, BucketOp::Intersection).count();
        Ok(clamp_unit(intersection_count / union_count))
    }

    /// Estimated probability that an item of `given` is also in `self`, `|A ∩ B| / |B|`.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleSketch`](crate::error::ErrorKind::IncompatibleSketch) if the
    /// sketches cannot be combined, and
    /// [`DivisionUndefined`](crate::error::ErrorKind::DivisionUndefined) if `given` counts zero.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hllset::hllset::HllSet;
    /// # use hllset::error::ErrorKind;
    /// let mut words = HllSet::new(8).unwrap();
    /// words.extend(["a", "b", "c", "d"]);
    /// let mut query = HllSet::new(8).unwrap();
    /// query.extend(["a", "b"]);
    ///
    /// assert!(words.conditional_probability(&query).unwrap() > 0.9);
    ///
    /// let empty = HllSet::new(8).unwrap();
    /// let err = words.conditional_probability(&empty).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::DivisionUndefined);
    /// ```
    pub fn conditional_probability(&self, given: &HllSet) -> Result<f64, Error> {
        self.check_compatible(given, "conditional probability")?;
        let intersection_count = self.combined(given, BucketOp::Intersection).count();
        ratio(intersection_count, given.count())
    }

    /// Computes the [`Overlap`] of this sketch with `other`.
    pub fn overlap(&self, other: &HllSet) -> Result<Overlap, Error> {
        Overlap::new(self, other)
    }
}
