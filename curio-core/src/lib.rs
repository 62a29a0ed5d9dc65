#![warn(missing_docs)]
//! Core components for curiosity-driven reinforcement learning.
//!
//! This crate provides the abstractions shared by all agents:
//!
//! * [`Env`], [`Policy`] and [`Agent`] interfaces,
//! * [`ReplayBufferBase`] and a generic implementation in
//!   [`generic_replay_buffer`],
//! * a frame skip/stack preprocessor for visual observations in
//!   [`frame_stack`],
//! * [`Trainer`] and [`Sampler`] implementing the interaction loop,
//! * [`record`] types used to report scalars during training.
pub mod error;
pub mod frame_stack;
pub mod generic_replay_buffer;
pub mod record;

mod base;
pub use base::{
    Act, Agent, Configurable, Env, ExperienceBufferBase, Info, Obs, Policy, ReplayBufferBase,
    Step, StepProcessor, TransitionBatch,
};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod trainer;
pub use trainer::{Sampler, Trainer, TrainerConfig};
