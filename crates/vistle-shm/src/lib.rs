// Copyright 2024 The Vistle Developers.
//
// Licensed under the GNU Lesser General Public License, Version 2.1 (the
// "License"); you may not use this file except in compliance with the
// License. You may obtain a copy of the License at
//
//     https://www.gnu.org/licenses/lgpl-2.1.html
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.

//! The process-group-wide store that names, allocates, and reference-counts
//! arrays and objects (§4.1). Every local module attaches to the same
//! store and resolves names to handles without copying array contents.

#[macro_use]
extern crate log;

pub mod error;
pub mod handle;
pub mod pool;
pub mod store;

pub use error::StoreError;
pub use handle::RawHandle;
pub use store::{Store, DEFAULT_CAPACITY_BYTES, STORE_ABI_VERSION};
