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

//! Binary serialization of [`HllSet`].
//!
//! All integers are little-endian. The preamble is two 8-byte words:
//!
//! ```text
//! byte 0      preamble longs (2)
//! byte 1      serial version (1)
//! byte 2      family id (30)
//! byte 3      precision
//! byte 4      bitmap width in bits (32 or 64)
//! byte 5      flags
//! bytes 6-7   seed hash
//! bytes 8-11  seed
//! bytes 12-15 number of non-zero buckets
//! ```
//!
//! followed, unless the empty flag is set, by `2^precision` bitmaps of `width / 8` bytes each.

use super::BitmapWidth;
use super::HllSet;
use super::MAX_PRECISION;
use super::MIN_PRECISION;
use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::codec::family::Family;
use crate::error::Error;
use crate::hash::Bucketizer;
use crate::hash::compute_seed_hash;

const PREAMBLE_LONGS: u8 = 2;
const SERIAL_VERSION: u8 = 1;
const EMPTY_FLAG_MASK: u8 = 1 << 2;

impl HllSet {
    /// Serializes this sketch to bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// # use hllset::hllset::HllSet;
    /// let mut sketch = HllSet::new(8).unwrap();
    /// sketch.extend(0..100u32);
    ///
    /// let bytes = sketch.serialize();
    /// assert_eq!(bytes.len(), 16 + 256 * 8);
    /// assert_eq!(HllSet::deserialize(&bytes).unwrap(), sketch);
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        let is_empty = self.is_empty();
        let width = self.bitmap_width();
        let capacity = 8 * PREAMBLE_LONGS as usize
            + if is_empty {
                0
            } else {
                self.num_buckets() * width.bytes()
            };
        let mut bytes = SketchBytes::with_capacity(capacity);

        bytes.write_u8(PREAMBLE_LONGS);
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(Family::HLLSET.id);
        bytes.write_u8(self.precision());
        bytes.write_u8(width.bits());
        bytes.write_u8(if is_empty { EMPTY_FLAG_MASK } else { 0 });
        bytes.write_u16_le(compute_seed_hash(self.seed()));
        bytes.write_u32_le(self.seed());
        bytes.write_u32_le(self.num_nonzero_buckets() as u32);

        if !is_empty {
            match width {
                BitmapWidth::W32 => {
                    for &bucket in self.buckets() {
                        bytes.write_u32_le(bucket as u32);
                    }
                }
                BitmapWidth::W64 => {
                    for &bucket in self.buckets() {
                        bytes.write_u64_le(bucket);
                    }
                }
            }
        }

        bytes.into_bytes()
    }

    /// Deserializes a sketch from bytes produced by [`serialize`](Self::serialize).
    ///
    /// # Errors
    ///
    /// Returns [`InvalidData`](crate::error::ErrorKind::InvalidData) if the bytes are truncated,
    /// belong to another sketch family or version, carry an unsupported configuration, or hold
    /// bitmaps the configuration could never produce.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        deserialize_hllset(bytes)
            .inspect_err(|err| log::debug!("rejecting serialized HllSet: {err}"))
    }
}

fn deserialize_hllset(bytes: &[u8]) -> Result<HllSet, Error> {
    fn read_err(field: &'static str) -> impl FnOnce(std::io::Error) -> Error {
        move |err| Error::insufficient_data(field).set_source(err)
    }

    let mut cursor = SketchSlice::new(bytes);

    let preamble_longs = cursor.read_u8().map_err(read_err("preamble_longs"))?;
    let serial_version = cursor.read_u8().map_err(read_err("serial_version"))?;
    let family_id = cursor.read_u8().map_err(read_err("family_id"))?;
    let precision = cursor.read_u8().map_err(read_err("precision"))?;
    let width_bits = cursor.read_u8().map_err(read_err("width"))?;
    let flags = cursor.read_u8().map_err(read_err("flags"))?;
    let seed_hash = cursor.read_u16_le().map_err(read_err("seed_hash"))?;
    let seed = cursor.read_u32_le().map_err(read_err("seed"))?;
    let num_nonzero = cursor.read_u32_le().map_err(read_err("num_nonzero"))? as usize;

    Family::HLLSET.validate_id(family_id)?;
    if serial_version != SERIAL_VERSION {
        return Err(Error::unsupported_serial_version(
            SERIAL_VERSION,
            serial_version,
        ));
    }
    Family::HLLSET.validate_pre_longs(preamble_longs)?;

    if !(MIN_PRECISION..=MAX_PRECISION).contains(&precision) {
        return Err(Error::deserial(format!(
            "precision must be in [{MIN_PRECISION}; {MAX_PRECISION}], got {precision}"
        ))
        .with_context("precision", precision));
    }
    let Some(width) = BitmapWidth::from_bits(width_bits) else {
        return Err(
            Error::deserial(format!("unsupported bitmap width: {width_bits}"))
                .with_context("width", width_bits),
        );
    };
    let expected_seed_hash = compute_seed_hash(seed);
    if seed_hash != expected_seed_hash {
        return Err(Error::deserial(format!(
            "seed hash mismatch: expected {expected_seed_hash}, got {seed_hash}"
        ))
        .with_context("seed", seed));
    }

    let bucketizer = Bucketizer::new(precision, width, seed)?;
    let mut sketch = HllSet::from_bucketizer(bucketizer);

    if flags & EMPTY_FLAG_MASK != 0 {
        if num_nonzero != 0 {
            return Err(Error::deserial(format!(
                "empty sketch claims {num_nonzero} non-zero buckets"
            )));
        }
    } else {
        let mask = bucketizer.bucket_mask();
        for (index, bucket) in sketch.buckets_mut().iter_mut().enumerate() {
            let bits = match width {
                BitmapWidth::W32 => cursor.read_u32_le().map(u64::from),
                BitmapWidth::W64 => cursor.read_u64_le(),
            }
            .map_err(read_err("buckets"))?;
            if bits & !mask != 0 {
                return Err(Error::deserial(format!(
                    "bucket bitmap {bits:#x} exceeds mask {mask:#x}"
                ))
                .with_context("bucket", index));
            }
            *bucket = bits;
        }

        let actual = sketch.num_nonzero_buckets();
        if actual == 0 || actual != num_nonzero {
            return Err(Error::deserial(format!(
                "non-zero bucket count mismatch: expected {num_nonzero}, got {actual}"
            )));
        }
    }

    if cursor.remaining() != 0 {
        return Err(Error::deserial(format!(
            "{} trailing bytes after sketch",
            cursor.remaining()
        )));
    }

    Ok(sketch)
}
