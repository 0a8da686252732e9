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

//! The chunked on-disk `.vsld` file format: one file per rank, made of
//! `Archive` chunks (deduplicated array/sub-object payloads), `PortObject`
//! chunks (one per published object per port/timestep/block), and a
//! trailing `Directory` chunk indexing where each `Archive` chunk landed.
//!
//! Built on top of `vistle-archive`'s deep-copy record format; this crate
//! only adds the chunk framing, the per-rank file naming convention, and
//! the read-side restraint/reorder/renumber options a cache-style module
//! exposes to its users.

#[macro_use]
extern crate log;

pub mod chunk;
pub mod error;
pub mod reader;
pub mod writer;

pub use chunk::{ChunkFooter, ChunkHeader, ChunkType, PortObjectHeader, FORMAT_VERSION};
pub use error::FileFormatError;
pub use reader::{read_rank, PortObjectRecord, ReadOptions};
pub use writer::{rank_file_path, ChunkedFileWriter};
