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

//! Bit-vector HyperLogLog sets with set algebra.
//!
//! An [`HllSet`] keeps `2^p` buckets like a HyperLogLog sketch, but every bucket is a bitmap of
//! the trailing-zero run lengths observed in it instead of only the largest one. Because the
//! bitmaps keep more than the maximum, bucket-wise OR, AND, AND-NOT and XOR give sketches for
//! the union, intersection, difference and symmetric difference of the summarized sets, and
//! every such result can be counted with the usual harmonic-mean estimator.
//!
//! # Usage
//!
//! ```rust
//! use hllset::hllset::HllSet;
//!
//! let mut a = HllSet::new(12).unwrap();
//! let mut b = HllSet::new(12).unwrap();
//! for i in 0..1000u64 {
//!     a.add(i);
//! }
//! for i in 500..1500u64 {
//!     b.add(i);
//! }
//!
//! let union = a.union(&b).unwrap();
//! assert!((union.count() - 1500.0).abs() < 150.0);
//!
//! let jaccard = a.jaccard(&b).unwrap();
//! assert!(jaccard > 0.2 && jaccard < 0.5);
//! ```
//!
//! # Compatibility
//!
//! Two sketches can only be combined when they share precision, bitmap width and seed. Every
//! binary operation checks this first and fails with
//! [`IncompatibleSketch`](crate::error::ErrorKind::IncompatibleSketch) before touching a bucket.
//!
//! # Concurrency
//!
//! [`HllSet::add`] takes `&mut self`, so a sketch has a single writer at a time and algebra
//! reads (`&self`) never race with it. Producers that need to share one sketch use
//! [`AtomicHllSet`], whose buckets are updated with atomic `fetch_or`.

mod algebra;
mod builder;
mod concurrent;
mod estimator;
mod serialization;
mod similarity;
mod sketch;

pub use self::builder::HllSetBuilder;
pub use self::concurrent::AtomicHllSet;
pub use self::similarity::Overlap;
pub use self::sketch::HllSet;

/// Smallest supported precision.
pub const MIN_PRECISION: u8 = 4;
/// Largest supported precision.
pub const MAX_PRECISION: u8 = 18;
/// Precision used by [`HllSetBuilder`] unless configured otherwise.
pub const DEFAULT_PRECISION: u8 = 12;

/// Width of the per-bucket bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitmapWidth {
    /// 32-bit buckets; run lengths are capped at 31.
    W32,
    /// 64-bit buckets.
    #[default]
    W64,
}

impl BitmapWidth {
    /// Number of bits in one bucket.
    pub const fn bits(self) -> u8 {
        match self {
            BitmapWidth::W32 => 32,
            BitmapWidth::W64 => 64,
        }
    }

    /// Number of bytes one bucket takes in the serialized form.
    pub const fn bytes(self) -> usize {
        self.bits() as usize / 8
    }

    /// Parses a width from its bit count.
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            32 => Some(BitmapWidth::W32),
            64 => Some(BitmapWidth::W64),
            _ => None,
        }
    }
}
