//! Configuration of [`Mlp`](super::Mlp) and [`Mlp2`](super::Mlp2).
use crate::util::OutDim;
use serde::{Deserialize, Serialize};

/// Configuration of [`Mlp`](super::Mlp) and [`Mlp2`](super::Mlp2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MlpConfig {
    /// Input dimension.
    pub in_dim: i64,

    /// Widths of the hidden layers.
    pub units: Vec<i64>,

    /// Output dimension.
    pub out_dim: i64,

    /// Applies ReLU to the output layer when true.
    pub activation_out: bool,
}

impl MlpConfig {
    /// Creates a configuration with ReLU hidden layers and a linear output.
    pub fn new(in_dim: i64, units: Vec<i64>, out_dim: i64) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            activation_out: false,
        }
    }
}

impl OutDim for MlpConfig {
    fn get_out_dim(&self) -> i64 {
        self.out_dim
    }

    fn set_out_dim(&mut self, out_dim: i64) {
        self.out_dim = out_dim;
    }
}
