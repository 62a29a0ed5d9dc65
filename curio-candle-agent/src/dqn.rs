//! DQN agent, optionally with double Q-learning and a curiosity module.
mod base;
mod config;
mod explorer;
mod model;

pub use base::Dqn;
pub use config::DqnConfig;
pub use explorer::EpsilonGreedy;
pub use model::{QNetwork, QNetworkConfig};
