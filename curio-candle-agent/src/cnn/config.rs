//! Configuration of [`Cnn`](super::Cnn).
use crate::util::OutDim;
use serde::{Deserialize, Serialize};

/// Configuration of [`Cnn`](super::Cnn).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CnnConfig {
    /// Number of input channels, i.e. stacked frames times frame channels.
    pub n_stack: i64,

    /// Output dimension.
    pub out_dim: i64,

    /// Skips the fully connected layers when true, leaving the flattened
    /// convolutional features as output.
    pub skip_linear: bool,
}

impl CnnConfig {
    /// Creates a configuration.
    pub fn new(n_stack: i64, out_dim: i64) -> Self {
        Self {
            n_stack,
            out_dim,
            skip_linear: false,
        }
    }

    /// Sets whether the fully connected layers are skipped.
    pub fn skip_linear(mut self, v: bool) -> Self {
        self.skip_linear = v;
        self
    }
}

impl OutDim for CnnConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, out_dim: i64) {
        self.out_dim = out_dim;
    }
}
