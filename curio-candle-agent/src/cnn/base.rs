//! A convolutional network for 84x84 visual observations.
use super::CnnConfig;
use crate::model::SubModel1;
use anyhow::Result;
use candle_core::{DType::F32, Device, Tensor};
use candle_nn::{
    conv::Conv2dConfig,
    conv2d_no_bias, linear,
    sequential::{seq, Sequential},
    Module, VarBuilder,
};

/// A convolutional network over stacked 84x84 frames.
///
/// Input is `[batch, n_stack, 84, 84]` in `u8`; the network casts to `f32`
/// and scales to `[0, 1]` before the convolutions. With `skip_linear` the
/// output is the flattened convolutional feature vector of dimension 3136,
/// which is useful as a curiosity encoder.
pub struct Cnn {
    device: Device,
    seq: Sequential,
}

impl Cnn {
    fn stride(s: usize) -> Conv2dConfig {
        Conv2dConfig {
            stride: s,
            ..Default::default()
        }
    }

    fn create_net(vb: &VarBuilder, config: &CnnConfig) -> Result<Sequential> {
        let mut seq = seq()
            .add_fn(|xs| xs.to_dtype(F32)? / 255.0)
            .add(conv2d_no_bias(
                config.n_stack as _,
                32,
                8,
                Self::stride(4),
                vb.pp("c1"),
            )?)
            .add_fn(|xs| xs.relu())
            .add(conv2d_no_bias(32, 64, 4, Self::stride(2), vb.pp("c2"))?)
            .add_fn(|xs| xs.relu())
            .add(conv2d_no_bias(64, 64, 3, Self::stride(1), vb.pp("c3"))?)
            .add_fn(|xs| xs.relu()?.flatten_from(1));

        if !config.skip_linear {
            seq = seq
                .add(linear(3136, 512, vb.pp("l1"))?)
                .add_fn(|xs| xs.relu())
                .add(linear(512, config.out_dim as _, vb.pp("l2"))?);
        }

        Ok(seq)
    }
}

impl SubModel1 for Cnn {
    type Config = CnnConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn build(vb: VarBuilder, config: Self::Config) -> Self {
        let device = vb.device().clone();
        let seq = Self::create_net(&vb, &config).unwrap();
        Self { device, seq }
    }

    fn forward(&self, input: &Self::Input) -> Self::Output {
        self.seq
            .forward(&input.to_device(&self.device).unwrap())
            .unwrap()
    }
}
