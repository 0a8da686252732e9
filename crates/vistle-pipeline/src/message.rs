//! The module control surface (§6): the messages a scheduler drives a
//! module with, and the scheduling/reduction policies a module declares.

use vistle_core::Object;

/// A message the scheduler or another module delivers to a module
/// (§6 `handleMessage`).
#[derive(Clone, Debug)]
pub enum PipelineMessage {
    /// An object arrived on `port`, outside the normal blocking `read`
    /// path (e.g. delivered while the module is between `compute` calls).
    AddObject { port: String, object: Object },
    /// A parameter was changed by the user or by a connected module.
    ParameterUpdate { name: String, value: String },
    /// The scheduler is asking the module to abort its current
    /// read/compute cycle (§4.3 cancellation).
    CancelExecute,
    /// A connection to `port` was added.
    ConnectionAdd { port: String },
    /// A connection to `port` was removed.
    ConnectionRemove { port: String },
}

/// How a scheduler should invoke a module's `compute` across the
/// distributed block/rank space (§5).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SchedulingPolicy {
    /// `compute` runs once regardless of block/rank count.
    Single,
    /// `compute` runs once per block, all ranks in lockstep.
    Gang,
    /// `compute` runs once per block, ranks need not stay in lockstep.
    LazyGang,
    /// The scheduler does not invoke `compute` for this module at all
    /// (e.g. a module that only reacts to messages).
    Ignore,
}

/// When a module's `reduce` should be invoked relative to `compute` calls
/// across blocks (§5).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReductionPolicy {
    /// `reduce` is never called.
    Never,
    /// `reduce` is called once per timestep, after every block's
    /// `compute` for that timestep has run.
    PerTimestep,
    /// `reduce` is called once, after every block and timestep has run.
    OverAll,
}

/// The scheduler-facing surface every module implements (§6). The core's
/// only obligation is to invoke these in the order the scheduling and
/// reduction policies promise; everything else is the implementation's.
pub trait ModuleControl {
    /// Runs once before the first `compute` of an execution. Returning
    /// `false` aborts the execution before any `compute` call.
    fn prepare(&mut self) -> bool;

    /// Runs once per scheduled unit of work (per `SchedulingPolicy`).
    /// Returning `false` signals failure for this unit; the scheduler
    /// decides whether that aborts the whole execution.
    fn compute(&mut self) -> bool;

    /// Runs per `ReductionPolicy`. `timestep` is `None` for an
    /// `OverAll` reduction and `Some(t)` for a `PerTimestep` one.
    fn reduce(&mut self, timestep: Option<i32>) -> bool;

    /// A parameter named `name` changed; re-reads it and reacts.
    fn change_parameter(&mut self, name: &str) -> bool;

    /// Delivers a message outside the normal port-read path.
    fn handle_message(&mut self, message: &PipelineMessage) -> bool;
}
