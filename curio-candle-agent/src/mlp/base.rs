//! A plain multilayer perceptron.
use super::MlpConfig;
use crate::model::{SubModel1, SubModel2};
use anyhow::Result;
use candle_core::{DType::F32, Device, Tensor};
use candle_nn::{
    linear,
    sequential::{seq, Sequential},
    Module, VarBuilder,
};

/// A multilayer perceptron with ReLU activations.
///
/// Inputs are flattened to two dimensions and cast to `f32`, so integer
/// observations can be fed directly. As a [`SubModel2`] the two inputs are
/// concatenated along the feature dimension, which is the usual critic
/// input `(observation, action)`.
pub struct Mlp {
    device: Device,
    seq: Sequential,
}

impl Mlp {
    fn create_seq(vb: &VarBuilder, config: &MlpConfig, in_dim: i64) -> Result<Sequential> {
        let mut seq = seq().add_fn(|xs| xs.flatten_from(1)?.to_dtype(F32));
        let mut in_dim = in_dim as usize;

        for (i, &units) in config.units.iter().enumerate() {
            seq = seq
                .add(linear(in_dim, units as usize, vb.pp(format!("l{}", i)))?)
                .add_fn(|xs| xs.relu());
            in_dim = units as usize;
        }

        seq = seq.add(linear(
            in_dim,
            config.out_dim as usize,
            vb.pp(format!("l{}", config.units.len())),
        )?);

        if config.activation_out {
            seq = seq.add_fn(|xs| xs.relu());
        }

        Ok(seq)
    }
}

impl SubModel1 for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn build(vb: VarBuilder, config: Self::Config) -> Self {
        let device = vb.device().clone();
        let seq = Self::create_seq(&vb, &config, config.in_dim).unwrap();
        Self { device, seq }
    }

    fn forward(&self, input: &Self::Input) -> Self::Output {
        self.seq
            .forward(&input.to_device(&self.device).unwrap())
            .unwrap()
    }
}

impl SubModel2 for Mlp {
    type Config = MlpConfig;
    type Input1 = Tensor;
    type Input2 = Tensor;
    type Output = Tensor;

    fn build(vb: VarBuilder, config: Self::Config) -> Self {
        let device = vb.device().clone();
        let seq = Self::create_seq(&vb, &config, config.in_dim).unwrap();
        Self { device, seq }
    }

    fn forward(&self, input1: &Self::Input1, input2: &Self::Input2) -> Self::Output {
        let input1 = input1
            .to_device(&self.device)
            .unwrap()
            .flatten_from(1)
            .unwrap()
            .to_dtype(F32)
            .unwrap();
        let input2 = input2
            .to_device(&self.device)
            .unwrap()
            .flatten_from(1)
            .unwrap()
            .to_dtype(F32)
            .unwrap();
        let input = Tensor::cat(&[&input1, &input2], 1).unwrap();
        self.seq.forward(&input).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::DType;
    use candle_nn::VarMap;

    #[test]
    fn forward_accepts_u8_input() {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let mlp: Mlp = SubModel1::build(vb, MlpConfig::new(4, vec![8], 3));

        let x = Tensor::zeros((2, 4), DType::U8, &Device::Cpu).unwrap();
        let y = SubModel1::forward(&mlp, &x);
        assert_eq!(y.dims(), [2, 3]);
    }
}
