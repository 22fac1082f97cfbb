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

//! Hashing and bucket addressing for HllSet sketches.
//!
//! Every item is hashed with MurmurHash3 x64/128 and the low 64 bits of the
//! result are split into a `p`-bit bucket index (the top bits) and a tail whose
//! trailing-zero run selects the bit to set inside that bucket.

use std::hash::Hash;

use crate::error::Error;
use crate::hllset::BitmapWidth;
use crate::hllset::MAX_PRECISION;
use crate::hllset::MIN_PRECISION;

/// The seed 9001 used by default is a prime number that was chosen very early on in
/// experimental testing.
///
/// Set operations are only meaningful between sketches that hash with the same seed. Sketches
/// of the same data built with different seeds are independent summaries of it.
pub const DEFAULT_SEED: u32 = 9001;

/// Computes the 16-bit fingerprint of a seed that is stored in serialized sketches.
pub fn compute_seed_hash(seed: u32) -> u16 {
    let (h1, _) = mur3::murmurhash3_x64_128(&seed.to_le_bytes(), 0);
    (h1 & 0xffff) as u16
}

/// Where a hashed item lands inside a sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    /// Bucket index in `[0, 2^p)`.
    pub bucket: usize,
    /// Trailing-zero run length of the hash tail, capped to fit the bitmap width.
    pub run_length: u8,
}

impl Location {
    /// The single bit this location sets in its bucket.
    #[inline]
    pub fn bit(&self) -> u64 {
        1u64 << self.run_length
    }
}

/// Maps items to `(bucket, run_length)` pairs for one hash configuration.
///
/// A `Bucketizer` is `Copy`; requesting a sibling with another seed is just
/// [`with_seed`](Self::with_seed), no shared state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bucketizer {
    precision: u8,
    width: BitmapWidth,
    seed: u32,
}

impl Bucketizer {
    /// Creates a bucketizer for `2^precision` buckets of `width` bits each.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPrecision`](crate::error::ErrorKind::InvalidPrecision) if
    /// `precision` is outside `[MIN_PRECISION; MAX_PRECISION]`.
    pub fn new(precision: u8, width: BitmapWidth, seed: u32) -> Result<Self, Error> {
        if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
            return Err(Error::invalid_precision(
                precision,
                MIN_PRECISION,
                MAX_PRECISION,
            ));
        }
        Ok(Self {
            precision,
            width,
            seed,
        })
    }

    /// Returns the same configuration hashing with another seed.
    pub fn with_seed(self, seed: u32) -> Self {
        Self { seed, ..self }
    }

    /// Number of bits used for bucket addressing.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Width of every bucket bitmap.
    pub fn width(&self) -> BitmapWidth {
        self.width
    }

    /// Seed of the hash family.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Number of buckets, `2^precision`.
    pub fn num_buckets(&self) -> usize {
        1 << self.precision
    }

    /// Largest run length this configuration can record.
    ///
    /// The tail holds `64 - p` bits, so a zero tail reports `64 - p`; the
    /// bitmap width caps it further at `width - 1`.
    pub fn max_run_length(&self) -> u8 {
        (64 - self.precision).min(self.width.bits() - 1)
    }

    /// Mask of every bit a bucket may legally hold.
    pub fn bucket_mask(&self) -> u64 {
        let top = self.max_run_length() as u32 + 1;
        if top >= 64 {
            u64::MAX
        } else {
            (1u64 << top) - 1
        }
    }

    /// Hashes `item` into 64 bits with this bucketizer's seed.
    pub fn hash<T: Hash + ?Sized>(&self, item: &T) -> u64 {
        let mut hasher = mur3::Hasher128::with_seed(self.seed);
        item.hash(&mut hasher);
        let (h1, _) = hasher.finish128();
        h1
    }

    /// Hashes `item` and returns where it lands.
    #[inline]
    pub fn locate<T: Hash + ?Sized>(&self, item: &T) -> Location {
        self.locate_hash(self.hash(item))
    }

    /// Splits an already computed 64-bit hash into bucket and run length.
    #[inline]
    pub fn locate_hash(&self, hash: u64) -> Location {
        let tail_bits = 64 - self.precision as u32;
        let bucket = (hash >> tail_bits) as usize;
        let tail = hash & ((1u64 << tail_bits) - 1);
        let run = if tail == 0 {
            tail_bits
        } else {
            tail.trailing_zeros()
        };
        Location {
            bucket,
            run_length: run.min(self.width.bits() as u32 - 1) as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn bucketizer(precision: u8, width: BitmapWidth) -> Bucketizer {
        Bucketizer::new(precision, width, DEFAULT_SEED).unwrap()
    }

    #[test]
    fn test_precision_range() {
        for precision in [0, 3, 19, 64] {
            let err = Bucketizer::new(precision, BitmapWidth::W64, DEFAULT_SEED).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidPrecision);
        }
        for precision in MIN_PRECISION..=MAX_PRECISION {
            assert!(Bucketizer::new(precision, BitmapWidth::W32, 1).is_ok());
        }
    }

    #[test]
    fn test_locate_hash_splits_top_bits() {
        let b = bucketizer(4, BitmapWidth::W64);

        let loc = b.locate_hash(0xF000_0000_0000_0008);
        assert_eq!(loc.bucket, 15);
        assert_eq!(loc.run_length, 3);
        assert_eq!(loc.bit(), 0b1000);

        let loc = b.locate_hash(0x0000_0000_0000_0001);
        assert_eq!(loc.bucket, 0);
        assert_eq!(loc.run_length, 0);
    }

    #[test]
    fn test_zero_tail_is_capped() {
        let hash = 0x1000_0000_0000_0000;

        let loc = bucketizer(4, BitmapWidth::W64).locate_hash(hash);
        assert_eq!(loc.bucket, 1);
        assert_eq!(loc.run_length, 60);

        let loc = bucketizer(4, BitmapWidth::W32).locate_hash(hash);
        assert_eq!(loc.run_length, 31);

        let loc = bucketizer(18, BitmapWidth::W64).locate_hash(0);
        assert_eq!(loc.bucket, 0);
        assert_eq!(loc.run_length, 46);
    }

    #[test]
    fn test_bucket_mask() {
        assert_eq!(bucketizer(4, BitmapWidth::W64).max_run_length(), 60);
        assert_eq!(bucketizer(4, BitmapWidth::W64).bucket_mask(), (1 << 61) - 1);
        assert_eq!(bucketizer(4, BitmapWidth::W32).max_run_length(), 31);
        assert_eq!(bucketizer(4, BitmapWidth::W32).bucket_mask(), u32::MAX as u64);
        assert_eq!(bucketizer(12, BitmapWidth::W64).bucket_mask(), (1 << 53) - 1);
    }

    #[test]
    fn test_locate_is_deterministic() {
        let b = bucketizer(10, BitmapWidth::W64);
        for i in 0..1000u64 {
            let loc = b.locate(&i);
            assert_eq!(loc, b.locate(&i));
            assert!(loc.bucket < b.num_buckets());
            assert!(loc.run_length <= b.max_run_length());
        }
    }

    #[test]
    fn test_seed_changes_hash_family() {
        let a = bucketizer(10, BitmapWidth::W64);
        let b = a.with_seed(42);
        assert_eq!(b.seed(), 42);
        assert_eq!(b.precision(), a.precision());

        let same = (0..1000u64).filter(|i| a.hash(i) == b.hash(i)).count();
        assert_eq!(same, 0);
    }

    #[test]
    fn test_borrowed_and_owned_strings_agree() {
        let b = bucketizer(12, BitmapWidth::W64);
        let owned = String::from("apple");
        assert_eq!(b.hash("apple"), b.hash(&owned));
        assert_eq!(b.locate(&"apple"), b.locate(owned.as_str()));
    }

    #[test]
    fn test_seed_hash_is_stable() {
        assert_eq!(compute_seed_hash(DEFAULT_SEED), 4436);
        assert_ne!(compute_seed_hash(1), compute_seed_hash(2));
    }
}
