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

//! The pipeline protocol (§4.3–§4.4, §6): ports that carry objects
//! between modules with per-policy delivery, the generation-counter
//! admission rule that backs cache-keyed reception, a result cache for
//! memoizing expensive per-object derivations, and the scheduler-facing
//! module control surface.
//!
//! This crate only deals in live `Object` handles and in-process
//! synchronization; see `vistle-shm` for where those handles live and
//! `vistle-archive`/`vistle-file` for moving them across process or disk
//! boundaries.

#[macro_use]
extern crate log;

pub mod cache;
pub mod error;
pub mod generation;
pub mod message;
pub mod module;
pub mod port;

pub use cache::{CacheToken, ResultCache};
pub use error::ProtocolError;
pub use generation::{Admission, GenerationTracker};
pub use message::{ModuleControl, PipelineMessage, ReductionPolicy, SchedulingPolicy};
pub use module::{Delivery, Module};
pub use port::{Port, PortItem, PortPolicy};
