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

//! The typed, polymorphic object model shared by every Vistle module:
//! type tags, the per-type schemas, the `Object` handle and its
//! construction state machine, and the grid/field payloads themselves.
//!
//! Nothing here talks to the shared-memory store, the archive, or the
//! wire format — this crate only defines what an object *is*. See
//! `vistle-shm` for storage, `vistle-archive` for serialization.

#[macro_use]
extern crate log;

pub mod array;
pub mod attributes;
pub mod error;
pub mod grids;
pub mod metadata;
pub mod name;
pub mod object;
pub mod registry;
pub mod schema;
pub mod types;

pub use array::{Array, Pod};
pub use attributes::Attributes;
pub use error::FatalError;
pub use metadata::{Metadata, ALL_TIMESTEPS};
pub use name::{Name, NameGenerator};
pub use object::{InvalidTransition, Kind, Object, State, VecField};
pub use types::{CacheMode, CellType, ElementType, Mapping, TypeTag};
