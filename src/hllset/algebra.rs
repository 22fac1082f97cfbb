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

//! Bucket-wise set algebra.
//!
//! Every operation is a bitwise kernel applied to each bucket pair independently. Large sketches
//! fan the kernel out over the rayon pool; since buckets never interact, the parallel result is
//! just the per-range results concatenated in bucket order.

use rayon::iter::IndexedParallelIterator;
use rayon::iter::IntoParallelRefIterator;
use rayon::iter::IntoParallelRefMutIterator;
use rayon::iter::ParallelIterator;

use super::HllSet;
use crate::error::Error;

/// Sketches with at least this many buckets are combined on the rayon pool.
const PARALLEL_MIN_BUCKETS: usize = 1 << 12;

/// Smallest bucket range handed to one rayon task.
const BUCKETS_PER_TASK: usize = 1 << 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BucketOp {
    Union,
    Intersection,
    Complement,
    SymmetricDifference,
}

impl BucketOp {
    #[inline]
    fn apply(self, lhs: u64, rhs: u64) -> u64 {
        match self {
            BucketOp::Union => lhs | rhs,
            BucketOp::Intersection => lhs & rhs,
            BucketOp::Complement => lhs & !rhs,
            BucketOp::SymmetricDifference => lhs ^ rhs,
        }
    }

    fn name(self) -> &'static str {
        match self {
            BucketOp::Union => "union",
            BucketOp::Intersection => "intersection",
            BucketOp::Complement => "complement",
            BucketOp::SymmetricDifference => "symmetric difference",
        }
    }
}

fn combine(op: BucketOp, lhs: &[u64], rhs: &[u64]) -> Box<[u64]> {
    debug_assert_eq!(lhs.len(), rhs.len());
    if lhs.len() >= PARALLEL_MIN_BUCKETS {
        combine_parallel(op, lhs, rhs)
    } else {
        combine_serial(op, lhs, rhs)
    }
}

fn combine_serial(op: BucketOp, lhs: &[u64], rhs: &[u64]) -> Box<[u64]> {
    lhs.iter()
        .zip(rhs)
        .map(|(&l, &r)| op.apply(l, r))
        .collect()
}

fn combine_parallel(op: BucketOp, lhs: &[u64], rhs: &[u64]) -> Box<[u64]> {
    log::trace!("computing {} of {} buckets on rayon pool", op.name(), lhs.len());
    lhs.par_iter()
        .zip(rhs.par_iter())
        .with_min_len(BUCKETS_PER_TASK)
        .map(|(&l, &r)| op.apply(l, r))
        .collect::<Vec<_>>()
        .into_boxed_slice()
}

fn combine_into(op: BucketOp, lhs: &mut [u64], rhs: &[u64]) {
    debug_assert_eq!(lhs.len(), rhs.len());
    if lhs.len() >= PARALLEL_MIN_BUCKETS {
        log::trace!("accumulating {} of {} buckets on rayon pool", op.name(), lhs.len());
        lhs.par_iter_mut()
            .zip(rhs.par_iter())
            .with_min_len(BUCKETS_PER_TASK)
            .for_each(|(l, &r)| *l = op.apply(*l, r));
    } else {
        for (l, &r) in lhs.iter_mut().zip(rhs) {
            *l = op.apply(*l, r);
        }
    }
}

impl HllSet {
    /// Returns the union of two sketches (bucket-wise OR).
    ///
    /// Commutative and associative; the union with an empty sketch is a copy of the other
    /// operand.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleSketch`](crate::error::ErrorKind::IncompatibleSketch) if the
    /// sketches differ in precision, bitmap width or seed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hllset::hllset::HllSet;
    /// let mut a = HllSet::new(10).unwrap();
    /// let mut b = HllSet::new(10).unwrap();
    /// a.add("apple");
    /// b.add("banana");
    ///
    /// let union = a.union(&b).unwrap();
    /// assert!((union.count() - 2.0).abs() < 0.1);
    /// assert!(a.union(&HllSet::new(11).unwrap()).is_err());
    /// ```
    pub fn union(&self, other: &HllSet) -> Result<HllSet, Error> {
        self.apply(other, BucketOp::Union)
    }

    /// Returns the intersection of two sketches (bucket-wise AND).
    ///
    /// Buckets whose AND is zero are absent from the result. Commutative and associative.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleSketch`](crate::error::ErrorKind::IncompatibleSketch) if the
    /// sketches differ in precision, bitmap width or seed.
    pub fn intersection(&self, other: &HllSet) -> Result<HllSet, Error> {
        self.apply(other, BucketOp::Intersection)
    }

    /// Returns the bits of `self` not present in `other` (bucket-wise AND-NOT).
    ///
    /// Not commutative. Buckets empty in `self` stay empty whatever `other` holds.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleSketch`](crate::error::ErrorKind::IncompatibleSketch) if the
    /// sketches differ in precision, bitmap width or seed.
    pub fn complement(&self, other: &HllSet) -> Result<HllSet, Error> {
        self.apply(other, BucketOp::Complement)
    }

    /// Alias of [`complement`](Self::complement): the sketch of `self \ other`.
    pub fn difference(&self, other: &HllSet) -> Result<HllSet, Error> {
        self.complement(other)
    }

    /// Returns the symmetric difference of two sketches (bucket-wise XOR).
    ///
    /// Commutative, associative and self-inverse: `a.symmetric_difference(&a)` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleSketch`](crate::error::ErrorKind::IncompatibleSketch) if the
    /// sketches differ in precision, bitmap width or seed.
    pub fn symmetric_difference(&self, other: &HllSet) -> Result<HllSet, Error> {
        self.apply(other, BucketOp::SymmetricDifference)
    }

    /// Alias of [`symmetric_difference`](Self::symmetric_difference).
    pub fn xor(&self, other: &HllSet) -> Result<HllSet, Error> {
        self.symmetric_difference(other)
    }

    /// Unions `other` into this sketch in place, for streaming accumulation.
    ///
    /// On error this sketch is left untouched.
    pub fn merge(&mut self, other: &HllSet) -> Result<(), Error> {
        self.check_compatible(other, BucketOp::Union.name())?;
        combine_into(BucketOp::Union, self.buckets_mut(), other.buckets());
        Ok(())
    }

    /// Unions all given sketches.
    ///
    /// Returns `Ok(None)` for an empty input.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleSketch`](crate::error::ErrorKind::IncompatibleSketch) if any sketch
    /// is incompatible with the first one.
    pub fn union_all<'a, I>(sketches: I) -> Result<Option<HllSet>, Error>
    where
        I: IntoIterator<Item = &'a HllSet>,
    {
        let mut sketches = sketches.into_iter();
        let Some(first) = sketches.next() else {
            return Ok(None);
        };
        let mut result = first.clone();
        for sketch in sketches {
            result.merge(sketch)?;
        }
        Ok(Some(result))
    }

    fn apply(&self, other: &HllSet, op: BucketOp) -> Result<HllSet, Error> {
        self.check_compatible(other, op.name())?;
        Ok(self.combined(other, op))
    }

    /// Combines with an operand already known to be compatible.
    pub(super) fn combined(&self, other: &HllSet, op: BucketOp) -> HllSet {
        HllSet::from_parts(
            self.bucketizer(),
            combine(op, self.buckets(), other.buckets()),
        )
    }
}
