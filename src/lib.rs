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

//! Vistle's core data-exchange substrate.
//!
//! This crate is a thin facade over the sub-crates that actually do the
//! work, re-exported so a caller can depend on `vistle` alone rather than
//! wiring up every sub-crate by hand:
//!
//! - [`core`] — the typed, polymorphic object model: type tags, schemas,
//!   the `Object` handle and its construction state machine, and the
//!   grid/field payloads.
//! - [`shm`] — the shared-memory object store: attach/allocate/lookup with
//!   pool-allocated backing storage and refcounted handles.
//! - [`codec`] — pluggable payload compression codecs.
//! - [`archive`] — deep-copy serialization of an object graph into a
//!   directory of compressed payloads plus an inline record.
//! - [`file`] — the chunked on-disk `.vsld` file format built on top of
//!   `archive`.
//! - [`pipeline`] — the port-based protocol that moves objects between
//!   modules, generation-counter cache eviction, and the result cache.
//! - [`util`] — small shared utilities: byte-swapping, length-prefixed
//!   I/O, the restraint parser, and session-key plumbing.
//!
//! Each module here simply re-exports its sub-crate's public items; see
//! the sub-crate's own documentation for the full picture.

/// The typed, polymorphic object model. Re-exports `vistle_core`.
pub mod core {
    pub use vistle_core::*;
}

/// The shared-memory object store. Re-exports `vistle_shm`.
pub mod shm {
    pub use vistle_shm::*;
}

/// Pluggable payload compression codecs. Re-exports `vistle_codec`.
pub mod codec {
    pub use vistle_codec::*;
}

/// Deep-copy archive serialization. Re-exports `vistle_archive`.
pub mod archive {
    pub use vistle_archive::*;
}

/// The chunked on-disk file format. Re-exports `vistle_file`.
pub mod file {
    pub use vistle_file::*;
}

/// The pipeline protocol: ports, generation tracking, result cache,
/// module control surface. Re-exports `vistle_pipeline`.
pub mod pipeline {
    pub use vistle_pipeline::*;
}

/// Shared utilities. Re-exports `vistle_util`.
pub mod util {
    pub use vistle_util::*;
}
