//! Core interfaces.
mod agent;
mod batch;
mod env;
mod policy;
mod replay_buffer;
mod step;

pub use agent::Agent;
pub use batch::TransitionBatch;
pub use env::Env;
pub use policy::{Configurable, Policy};
pub use replay_buffer::{ExperienceBufferBase, ReplayBufferBase};
pub use step::{Step, StepProcessor};

use std::fmt::Debug;

/// Observation of an environment.
pub trait Obs: Clone + Debug {}

/// Action of an environment.
pub trait Act: Clone + Debug {}

/// Information attached to each environment step.
///
/// The unit type can be used when no extra information is needed.
pub trait Info {}

impl Info for () {}
