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

//! Pluggable payload compression (§4.7). Every mode presents the same
//! opaque `compress`/`decompress` pair; callers pick a mode per field, not
//! per codec implementation detail.

#[macro_use]
extern crate log;

pub mod codec;
pub mod error;
pub mod lz4;
pub mod mode;
pub mod snappy;
#[cfg(feature = "zfp")]
pub mod zfp;
pub mod zstd_codec;

pub use codec::{compress, decompress, Codec, SpeedHint};
pub use error::CodecError;
pub use mode::{CompressionMode, ZfpMode};
