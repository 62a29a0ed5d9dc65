//! Environment interface.
use super::{Act, Info, Obs, Step};
use crate::record::Record;
use anyhow::Result;

/// Environment interface for reinforcement learning.
pub trait Env {
    /// Configuration used to build the environment.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information attached to each step.
    type Info: Info;

    /// Builds the environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Applies an action and returns the resulting transition.
    ///
    /// The second return value is a record with environment-specific
    /// information, possibly empty.
    fn step(&mut self, act: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized;

    /// Applies an action, resetting the environment when the episode ends.
    ///
    /// When a reset happens, the initial observation of the next episode is
    /// stored in [`Step::init_obs`].
    fn step_with_reset(&mut self, act: &Self::Act) -> (Step<Self>, Record)
    where
        Self: Sized;
}
