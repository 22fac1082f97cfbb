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

//! # HllSet
//!
//! Probabilistic sets built on HyperLogLog. An [`HllSet`](hllset::HllSet) estimates how many
//! distinct items it has seen, and, unlike a plain HyperLogLog sketch, supports union,
//! intersection, difference and symmetric difference with other sketches, as well as Jaccard
//! similarity and conditional-probability comparisons, all without keeping the items.
//!
//! This library is divided into modules that constitute distinct groups of functionality.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

mod codec;

pub mod common;
pub mod error;
pub mod hash;
pub mod hllset;
