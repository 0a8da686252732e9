//! The per-object metadata record (§3): block, timestep, generation counter,
//! creator, transform, real time.

use cgmath::Matrix4;

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// Sentinel `timestep` value meaning "applies to all timesteps".
pub const ALL_TIMESTEPS: i32 = -1;

/// Per-object metadata. Immutable once the owning object is finalized
/// (§3 invariants).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Metadata {
    /// Partition identifier.
    pub block: i32,
    /// Timestep index, or [`ALL_TIMESTEPS`].
    pub timestep: i32,
    /// Total number of timesteps in the producing execution.
    pub num_timesteps: i32,
    /// Total number of blocks in the producing execution.
    pub num_blocks: i32,
    /// Generation of the producing run; non-decreasing along one
    /// producer's output sequence.
    pub execution_counter: i32,
    /// Refinement step inside one generation.
    pub iteration: i32,
    /// Id of the producing module.
    pub creator: i32,
    /// Object-space to world-space transform.
    #[cfg_attr(feature = "serialize", serde(with = "transform_serde"))]
    pub transform: Matrix4<f32>,
    /// Wall-clock time associated with this object, in seconds.
    pub real_time: f64,
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            block: -1,
            timestep: ALL_TIMESTEPS,
            num_timesteps: -1,
            num_blocks: -1,
            execution_counter: 0,
            iteration: -1,
            creator: 0,
            transform: Matrix4::from_scale(1.0),
            real_time: 0.0,
        }
    }
}

impl Metadata {
    /// Whether this metadata's `timestep` is the "all timesteps" sentinel.
    pub fn is_all_timesteps(&self) -> bool {
        self.timestep == ALL_TIMESTEPS
    }

    /// The generation-eviction ordering key used by the pipeline protocol
    /// (§4.3): `(execution_counter, iteration)`, compared lexicographically.
    pub fn generation(&self) -> (i32, i32) {
        (self.execution_counter, self.iteration)
    }
}

#[cfg(feature = "serialize")]
mod transform_serde {
    use cgmath::Matrix4;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(m: &Matrix4<f32>, s: S) -> Result<S::Ok, S::Error> {
        let arr: [[f32; 4]; 4] = (*m).into();
        arr.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Matrix4<f32>, D::Error> {
        let arr = <[[f32; 4]; 4]>::deserialize(d)?;
        Ok(Matrix4::from(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_timesteps() {
        let m = Metadata::default();
        assert!(m.is_all_timesteps());
    }

    #[test]
    fn generation_orders_by_counter_then_iteration() {
        let mut a = Metadata { execution_counter: 5, iteration: 0, ..Metadata::default() };
        let mut b = Metadata { execution_counter: 5, iteration: 1, ..Metadata::default() };
        assert!(a.generation() < b.generation());
        a.execution_counter = 6;
        b.iteration = 100;
        assert!(a.generation() > b.generation());
    }
}
