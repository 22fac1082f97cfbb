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

//! Harmonic-mean cardinality estimator over bit-vector buckets.
//!
//! The register value of a bucket is the 1-based position of its highest set bit, which is the
//! longest trailing-zero run observed in it plus one, and `0` for an empty bucket. Taking only
//! that value makes the estimator exactly the classical HyperLogLog one:
//!
//! `E = alpha_m * m^2 / sum(2^-M_j)`
//!
//! with linear counting below `2.5 m` when empty buckets remain, and the hash-space correction
//! once `E` exceeds `2^64 / 30`.
//!
//! Past the linear-counting range the result is `max(E, m ln(m / max(V, 1)))`, `V` being the
//! number of empty buckets. Both terms only grow as bits are set, and the second one is never
//! below the last linear-counting value, so the estimate never decreases when an item is added.

/// Size of the 64-bit hash space.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// Register value of a bucket bitmap.
#[inline]
pub(crate) fn register_value(bucket: u64) -> u8 {
    (u64::BITS - bucket.leading_zeros()) as u8
}

/// Bias-correction constant for `num_buckets` registers.
pub(crate) fn alpha(num_buckets: usize) -> f64 {
    match num_buckets {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / num_buckets as f64),
    }
}

pub(crate) fn relative_error(num_buckets: usize) -> f64 {
    1.04 / (num_buckets as f64).sqrt()
}

/// Sum of inverse register powers and the number of empty buckets.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Registers {
    inv_pow_sum: f64,
    num_zeros: usize,
}

impl Registers {
    fn scan(buckets: &[u64]) -> Self {
        let mut inv_pow_sum = 0.0;
        let mut num_zeros = 0;
        for &bucket in buckets {
            let value = register_value(bucket);
            if value == 0 {
                num_zeros += 1;
            }
            inv_pow_sum += inv_pow2(value);
        }
        Self {
            inv_pow_sum,
            num_zeros,
        }
    }
}

/// Uncorrected HyperLogLog estimate.
fn raw_estimate(num_buckets: usize, registers: &Registers) -> f64 {
    let m = num_buckets as f64;
    alpha(num_buckets) * m * m / registers.inv_pow_sum
}

pub(crate) fn estimate(buckets: &[u64]) -> f64 {
    let num_buckets = buckets.len();
    let registers = Registers::scan(buckets);
    let raw = raw_estimate(num_buckets, &registers);
    let m = num_buckets as f64;

    if raw <= 2.5 * m && registers.num_zeros > 0 {
        return linear_counting(m, registers.num_zeros);
    }

    let floor = linear_counting(m, registers.num_zeros.max(1));
    large_range_corrected(raw).max(floor)
}

/// `m ln(m / V)`.
fn linear_counting(m: f64, num_zeros: usize) -> f64 {
    m * (m / num_zeros as f64).ln()
}

fn large_range_corrected(raw: f64) -> f64 {
    if raw > TWO_POW_64 / 30.0 {
        let fill = 1.0 - raw / TWO_POW_64;
        // Past the hash space the log is undefined; keep the raw value.
        if fill > 0.0 {
            return -TWO_POW_64 * fill.ln();
        }
    }
    raw
}

/// Compute 1 / 2^value (inverse power of 2)
#[inline]
fn inv_pow2(value: u8) -> f64 {
    if value == 0 {
        1.0
    } else if value <= 63 {
        1.0 / (1u64 << value) as f64
    } else {
        f64::exp2(-(value as f64))
    }
}
