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

use std::fmt;
use std::hash::Hash;

use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;

use super::BitmapWidth;
use super::HllSetBuilder;
use super::estimator;
use crate::common::NumStdDev;
use crate::error::Error;
use crate::hash::Bucketizer;
use crate::hash::DEFAULT_SEED;
use crate::hash::Location;

/// A HyperLogLog set: `2^p` buckets, each a bitmap of observed trailing-zero run lengths.
///
/// Sketches only grow: [`add`](Self::add) sets one bit and nothing clears bits. Set algebra
/// ([`union`](Self::union), [`intersection`](Self::intersection),
/// [`complement`](Self::complement), [`symmetric_difference`](Self::symmetric_difference))
/// returns new, independently owned sketches.
#[derive(Clone, PartialEq, Eq)]
pub struct HllSet {
    bucketizer: Bucketizer,
    buckets: Box<[u64]>,
}

impl HllSet {
    /// Creates an empty sketch with `2^precision` buckets and the default seed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPrecision`](crate::error::ErrorKind::InvalidPrecision) if `precision`
    /// is outside `[MIN_PRECISION; MAX_PRECISION]`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hllset::hllset::HllSet;
    /// let sketch = HllSet::new(5).unwrap();
    /// assert_eq!(sketch.num_buckets(), 32);
    /// assert_eq!(sketch.count(), 0.0);
    /// assert!(HllSet::new(2).is_err());
    /// ```
    pub fn new(precision: u8) -> Result<Self, Error> {
        Self::with_seed(precision, DEFAULT_SEED)
    }

    /// Creates an empty sketch that hashes with `seed`.
    ///
    /// Sketches of the same data built with different seeds are "entangled": independent
    /// summaries expected to give close, but not identical, estimates.
    pub fn with_seed(precision: u8, seed: u32) -> Result<Self, Error> {
        Self::builder().precision(precision).seed(seed).build()
    }

    /// Returns a builder with the default configuration.
    pub fn builder() -> HllSetBuilder {
        HllSetBuilder::default()
    }

    pub(crate) fn from_bucketizer(bucketizer: Bucketizer) -> Self {
        Self {
            bucketizer,
            buckets: vec![0u64; bucketizer.num_buckets()].into_boxed_slice(),
        }
    }

    pub(crate) fn from_parts(bucketizer: Bucketizer, buckets: Box<[u64]>) -> Self {
        debug_assert_eq!(buckets.len(), bucketizer.num_buckets());
        Self {
            bucketizer,
            buckets,
        }
    }

    /// Adds an item to the sketch.
    ///
    /// Sets exactly one bit in exactly one bucket; adding the same item twice is a no-op.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hllset::hllset::HllSet;
    /// let mut sketch = HllSet::new(10).unwrap();
    /// sketch.add("apple");
    /// let once = sketch.clone();
    /// sketch.add("apple");
    /// assert_eq!(sketch, once);
    /// ```
    pub fn add<T: Hash>(&mut self, item: T) {
        let location = self.bucketizer.locate(&item);
        self.set(location);
    }

    #[inline]
    pub(crate) fn set(&mut self, location: Location) {
        self.buckets[location.bucket] |= location.bit();
    }

    /// Adds every item of a parallel iterator.
    ///
    /// Each rayon worker fills a private bucket array and the arrays are OR-ed together,
    /// so the result is identical to adding the items one by one in any order.
    pub fn par_extend<I>(&mut self, items: I)
    where
        I: IntoParallelIterator,
        I::Item: Hash,
    {
        let bucketizer = self.bucketizer;
        let num_buckets = bucketizer.num_buckets();
        let collected = items
            .into_par_iter()
            .fold(
                || vec![0u64; num_buckets],
                |mut buckets, item| {
                    let location = bucketizer.locate(&item);
                    buckets[location.bucket] |= location.bit();
                    buckets
                },
            )
            .reduce(
                || vec![0u64; num_buckets],
                |mut lhs, rhs| {
                    for (l, r) in lhs.iter_mut().zip(rhs) {
                        *l |= r;
                    }
                    lhs
                },
            );
        for (bucket, bits) in self.buckets.iter_mut().zip(collected) {
            *bucket |= bits;
        }
    }

    /// Returns the approximate number of distinct items summarized by this sketch.
    ///
    /// Works the same on sketches produced by set algebra, so `a.intersection(&b)?.count()`
    /// estimates `|A ∩ B|`. An empty sketch counts exactly `0.0`.
    pub fn count(&self) -> f64 {
        estimator::estimate(&self.buckets)
    }

    /// Expected relative standard error of [`count`](Self::count), `1.04 / sqrt(m)`.
    pub fn relative_error(&self) -> f64 {
        estimator::relative_error(self.num_buckets())
    }

    /// Returns the approximate lower error bound given the number of standard deviations.
    pub fn lower_bound(&self, num_std_dev: NumStdDev) -> f64 {
        let rse = num_std_dev.as_f64() * self.relative_error();
        (self.count() / (1.0 + rse)).max(0.0)
    }

    /// Returns the approximate upper error bound given the number of standard deviations.
    pub fn upper_bound(&self, num_std_dev: NumStdDev) -> f64 {
        let rse = num_std_dev.as_f64() * self.relative_error();
        let count = self.count();
        if count == 0.0 {
            0.0
        } else if rse >= 1.0 {
            f64::INFINITY
        } else {
            count / (1.0 - rse)
        }
    }

    /// Returns the hashing configuration of this sketch.
    pub fn bucketizer(&self) -> Bucketizer {
        self.bucketizer
    }

    /// Number of bucket addressing bits.
    pub fn precision(&self) -> u8 {
        self.bucketizer.precision()
    }

    /// Width of every bucket bitmap.
    pub fn bitmap_width(&self) -> BitmapWidth {
        self.bucketizer.width()
    }

    /// Seed of the hash family.
    pub fn seed(&self) -> u32 {
        self.bucketizer.seed()
    }

    /// Number of buckets, `2^precision`.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket bitmaps in bucket order.
    pub fn buckets(&self) -> &[u64] {
        &self.buckets
    }

    pub(crate) fn buckets_mut(&mut self) -> &mut [u64] {
        &mut self.buckets
    }

    /// Returns the bitmap of one bucket, or `None` if `index` is out of range.
    pub fn bucket(&self, index: usize) -> Option<u64> {
        self.buckets.get(index).copied()
    }

    /// Returns whether no bit is set.
    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(|&bucket| bucket == 0)
    }

    /// Number of buckets with at least one bit set.
    pub fn num_nonzero_buckets(&self) -> usize {
        self.buckets.iter().filter(|&&bucket| bucket != 0).count()
    }

    /// Total number of set bits over all buckets.
    pub fn num_bits_set(&self) -> u64 {
        self.buckets
            .iter()
            .map(|bucket| bucket.count_ones() as u64)
            .sum()
    }

    /// Checks if two sketches can be combined.
    ///
    /// Sketches are compatible if they have the same:
    /// - Precision
    /// - Bitmap width
    /// - Seed
    pub fn is_compatible(&self, other: &HllSet) -> bool {
        self.bucketizer == other.bucketizer
    }

    pub(crate) fn check_compatible(&self, other: &HllSet, operation: &str) -> Result<(), Error> {
        if self.is_compatible(other) {
            return Ok(());
        }
        Err(incompatible(&self.bucketizer, &other.bucketizer, operation))
    }
}

/// Builds the error for an `operation` between sketches with different bucketizers.
pub(crate) fn incompatible(left: &Bucketizer, right: &Bucketizer, operation: &str) -> Error {
    log::debug!("rejecting {operation}: {left:?} is incompatible with {right:?}");
    Error::incompatible(format!("cannot compute {operation} of incompatible sketches"))
        .with_context("left", describe(left))
        .with_context("right", describe(right))
}

fn describe(bucketizer: &Bucketizer) -> String {
    format!(
        "p={} w={} seed={}",
        bucketizer.precision(),
        bucketizer.width().bits(),
        bucketizer.seed()
    )
}

impl fmt::Debug for HllSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HllSet")
            .field("precision", &self.precision())
            .field("bitmap_width", &self.bitmap_width())
            .field("seed", &self.seed())
            .field("nonzero_buckets", &self.num_nonzero_buckets())
            .finish()
    }
}

impl<T: Hash> Extend<T> for HllSet {
    fn extend<I: IntoIterator<Item = T>>(&mut self, items: I) {
        for item in items {
            self.add(item);
        }
    }
}
