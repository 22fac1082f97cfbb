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
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use super::HllSet;
use super::sketch::incompatible;
use crate::error::Error;
use crate::hash::Bucketizer;

/// An [`HllSet`] that many threads can add to through a shared reference.
///
/// Every bucket is an [`AtomicU64`] and [`add`](Self::add) is a single `fetch_or`, so producers
/// never block each other. Because bits are only ever set, the final buckets do not depend on
/// how adds interleave.
///
/// # Examples
///
/// ```
/// # use hllset::hllset::{AtomicHllSet, HllSet};
/// let shared = AtomicHllSet::new(10).unwrap();
/// std::thread::scope(|s| {
///     for t in 0..4u32 {
///         let shared = &shared;
///         s.spawn(move || {
///             for i in 0..250u32 {
///                 shared.add(t * 250 + i);
///             }
///         });
///     }
/// });
///
/// let mut serial = HllSet::new(10).unwrap();
/// serial.extend(0..1000u32);
/// assert_eq!(shared.snapshot(), serial);
/// ```
pub struct AtomicHllSet {
    bucketizer: Bucketizer,
    buckets: Box<[AtomicU64]>,
}

impl AtomicHllSet {
    /// Creates an empty shared sketch with `2^precision` buckets and the default seed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPrecision`](crate::error::ErrorKind::InvalidPrecision) if `precision`
    /// is out of range.
    pub fn new(precision: u8) -> Result<Self, Error> {
        HllSet::new(precision).map(Self::from)
    }

    /// Adds an item. Safe to call from any number of threads at once.
    pub fn add<T: Hash>(&self, item: T) {
        let location = self.bucketizer.locate(&item);
        self.buckets[location.bucket].fetch_or(location.bit(), Ordering::Relaxed);
    }

    /// Unions `other` into this sketch.
    pub fn merge_from(&self, other: &HllSet) -> Result<(), Error> {
        if self.bucketizer != other.bucketizer() {
            return Err(incompatible(&self.bucketizer, &other.bucketizer(), "union"));
        }
        for (bucket, &bits) in self.buckets.iter().zip(other.buckets()) {
            if bits != 0 {
                bucket.fetch_or(bits, Ordering::Relaxed);
            }
        }
        Ok(())
    }

    /// Copies the current buckets into a plain [`HllSet`].
    ///
    /// Adds that race with the copy are either included or not, bucket by bucket.
    pub fn snapshot(&self) -> HllSet {
        let buckets = self
            .buckets
            .iter()
            .map(|bucket| bucket.load(Ordering::Relaxed))
            .collect();
        HllSet::from_parts(self.bucketizer, buckets)
    }

    /// Estimated cardinality of the current contents.
    pub fn count(&self) -> f64 {
        self.snapshot().count()
    }

    /// Returns the hashing configuration of this sketch.
    pub fn bucketizer(&self) -> Bucketizer {
        self.bucketizer
    }

    /// Converts into a plain [`HllSet`] without copying through atomics.
    pub fn into_hllset(self) -> HllSet {
        let buckets = Vec::from(self.buckets)
            .into_iter()
            .map(AtomicU64::into_inner)
            .collect();
        HllSet::from_parts(self.bucketizer, buckets)
    }
}

impl From<HllSet> for AtomicHllSet {
    fn from(sketch: HllSet) -> Self {
        let buckets = sketch.buckets().iter().map(|&b| AtomicU64::new(b)).collect();
        Self {
            bucketizer: sketch.bucketizer(),
            buckets,
        }
    }
}

impl fmt::Debug for AtomicHllSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomicHllSet")
            .field("bucketizer", &self.bucketizer)
            .finish_non_exhaustive()
    }
}
