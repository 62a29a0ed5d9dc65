//! A multilayer perceptron with two heads.
use super::MlpConfig;
use crate::model::SubModel1;
use anyhow::Result;
use candle_core::{DType::F32, Device, Tensor};
use candle_nn::{
    linear,
    sequential::{seq, Sequential},
    Linear, Module, VarBuilder,
};

const LOG_STD_MIN: f64 = -20.0;
const LOG_STD_MAX: f64 = 2.0;

/// A multilayer perceptron with a mean head and a standard deviation head.
///
/// Used as a Gaussian policy network: `forward` returns `(mean, std)` where
/// `std` is the exponential of the clamped log standard deviation head.
pub struct Mlp2 {
    device: Device,
    seq: Sequential,
    head_mean: Linear,
    head_lstd: Linear,
}

impl Mlp2 {
    fn create_net(vb: &VarBuilder, config: &MlpConfig) -> Result<(Sequential, Linear, Linear)> {
        let mut seq = seq().add_fn(|xs| xs.flatten_from(1)?.to_dtype(F32));
        let mut in_dim = config.in_dim as usize;

        for (i, &units) in config.units.iter().enumerate() {
            seq = seq
                .add(linear(in_dim, units as usize, vb.pp(format!("l{}", i)))?)
                .add_fn(|xs| xs.relu());
            in_dim = units as usize;
        }

        let head_mean = linear(in_dim, config.out_dim as usize, vb.pp("mean"))?;
        let head_lstd = linear(in_dim, config.out_dim as usize, vb.pp("lstd"))?;

        Ok((seq, head_mean, head_lstd))
    }
}

impl SubModel1 for Mlp2 {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = (Tensor, Tensor);

    fn build(vb: VarBuilder, config: Self::Config) -> Self {
        let device = vb.device().clone();
        let (seq, head_mean, head_lstd) = Self::create_net(&vb, &config).unwrap();
        Self {
            device,
            seq,
            head_mean,
            head_lstd,
        }
    }

    fn forward(&self, input: &Self::Input) -> Self::Output {
        let x = self
            .seq
            .forward(&input.to_device(&self.device).unwrap())
            .unwrap();
        let mean = self.head_mean.forward(&x).unwrap();
        let std = self
            .head_lstd
            .forward(&x)
            .unwrap()
            .clamp(LOG_STD_MIN, LOG_STD_MAX)
            .unwrap()
            .exp()
            .unwrap();
        (mean, std)
    }
}
