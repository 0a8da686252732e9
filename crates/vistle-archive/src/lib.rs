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

//! Deep-copy archive serialization (§4.4, §4.5).
//!
//! An archive is a [`Directory`] of compressed array/sub-object payloads
//! plus one root [`ObjectRecord`] naming, for the object at the root, its
//! type tag, metadata, attributes, and the names of everything it
//! references. [`DeepArchiveSaver`] builds the directory and root record
//! from a live `Object`; [`DeepArchiveLoader`] reconstructs the graph from
//! them, deduplicating shared arrays and sub-objects exactly as the saver
//! deduplicated them on the way out.
//!
//! This crate never talks to the shared-memory store or the on-disk
//! chunked file format directly; it only defines the deep-copy transform.
//! See `vistle-shm` for storage and `vistle-file` for the wire format that
//! carries an encoded directory between processes.

#[macro_use]
extern crate log;

pub mod directory;
pub mod error;
pub mod load;
pub mod record;
pub mod save;

pub use directory::{Directory, DirectoryEntry};
pub use error::ArchiveError;
pub use load::{DeepArchiveLoader, Renaming};
pub use record::{decode_record, encode_record, ObjectRecord};
pub use save::DeepArchiveSaver;
