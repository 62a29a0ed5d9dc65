//! Agent interface.
use super::{Env, Policy, ReplayBufferBase};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// A trainable policy.
pub trait Agent<E: Env, R: ReplayBufferBase>: Policy<E> {
    /// Switches the agent into training mode.
    fn train(&mut self);

    /// Switches the agent into evaluation mode.
    ///
    /// In evaluation mode agents act greedily and apply no exploration
    /// noise.
    fn eval(&mut self);

    /// True while the agent is in training mode.
    fn is_train(&self) -> bool;

    /// Performs a single optimization step on a batch sampled from `buffer`
    /// and returns training diagnostics.
    fn opt(&mut self, buffer: &mut R) -> Result<Record>;

    /// Saves all parameters of the agent into a single checkpoint file.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Loads parameters saved by [`Agent::save_params`].
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
