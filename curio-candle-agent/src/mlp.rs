//! Multilayer perceptrons.
mod base;
mod config;
mod mlp2;

pub use base::Mlp;
pub use config::MlpConfig;
pub use mlp2::Mlp2;
