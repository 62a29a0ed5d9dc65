//! DDPG agent.
mod actor;
mod base;
mod config;
mod noise;

pub use actor::{Actor, ActorConfig};
pub use base::Ddpg;
pub use config::{DdpgConfig, SyncMode};
pub use noise::{OuNoise, OuNoiseConfig};
