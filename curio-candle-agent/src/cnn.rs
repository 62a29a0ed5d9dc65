//! Convolutional networks for visual observations.
mod base;
mod config;

pub use base::Cnn;
pub use config::CnnConfig;
