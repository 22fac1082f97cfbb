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

use super::BitmapWidth;
use super::DEFAULT_PRECISION;
use super::HllSet;
use crate::error::Error;
use crate::hash::Bucketizer;
use crate::hash::DEFAULT_SEED;

/// Builder for creating [`HllSet`] instances.
///
/// # Examples
///
/// ```
/// # use hllset::hllset::{BitmapWidth, HllSet};
/// let sketch = HllSet::builder()
///     .precision(10)
///     .seed(42)
///     .bitmap_width(BitmapWidth::W32)
///     .build()
///     .unwrap();
/// assert_eq!(sketch.num_buckets(), 1024);
/// assert_eq!(sketch.seed(), 42);
/// ```
#[derive(Debug, Clone)]
pub struct HllSetBuilder {
    precision: u8,
    seed: u32,
    width: BitmapWidth,
}

impl Default for HllSetBuilder {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            seed: DEFAULT_SEED,
            width: BitmapWidth::default(),
        }
    }
}

impl HllSetBuilder {
    /// Sets the number of bucket addressing bits (default: 12).
    ///
    /// The range is checked by [`build`](Self::build).
    pub fn precision(mut self, precision: u8) -> Self {
        self.precision = precision;
        self
    }

    /// Sets a custom hash seed (default: 9001).
    ///
    /// **Important**: Sketches with different seeds cannot be combined.
    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the bucket bitmap width (default: [`BitmapWidth::W64`]).
    pub fn bitmap_width(mut self, width: BitmapWidth) -> Self {
        self.width = width;
        self
    }

    /// Builds an empty sketch.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPrecision`](crate::error::ErrorKind::InvalidPrecision) if the precision
    /// is outside `[MIN_PRECISION; MAX_PRECISION]`.
    pub fn build(self) -> Result<HllSet, Error> {
        let bucketizer = Bucketizer::new(self.precision, self.width, self.seed)?;
        Ok(HllSet::from_bucketizer(bucketizer))
    }
}
