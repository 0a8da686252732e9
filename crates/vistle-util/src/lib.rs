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

//! Small utilities shared by the rest of the Vistle core: endian
//! byte-swapping, length-prefixed I/O helpers, the restraint (range/value
//! set) parser used to filter timesteps and blocks, and session-key
//! plumbing for the out-of-scope authentication layer.

pub mod byteswap;
pub mod io;
pub mod restraint;
pub mod session;

pub use byteswap::ByteSwap;
pub use restraint::{Restraint, RestraintParseError};
pub use session::{SessionKey, SessionKeyError};
