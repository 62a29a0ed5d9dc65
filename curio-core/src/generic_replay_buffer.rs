//! A generic implementation of [`ReplayBufferBase`](crate::ReplayBufferBase).
mod base;
mod batch;
mod config;
mod step_proc;

pub use base::SimpleReplayBuffer;
pub use batch::{BatchBase, GenericTransitionBatch};
pub use config::SimpleReplayBufferConfig;
pub use step_proc::{SimpleStepProcessor, SimpleStepProcessorConfig};
