//! Intrinsic curiosity module.
use super::{CuriosityConfig, CuriosityOutput};
use crate::{
    mlp::{Mlp, MlpConfig},
    model::SubModel1,
    util::OutDim,
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, Var, D};
use candle_nn::{encoding::one_hot, loss, VarBuilder, VarMap};
use serde::{de::DeserializeOwned, Serialize};

/// Intrinsic curiosity module.
///
/// A shared encoder maps observations to features. The forward model
/// predicts the next feature vector from the current features and a one-hot
/// action; the inverse model predicts the action from consecutive features.
/// The intrinsic reward is the scaled squared error of the forward model,
/// computed on detached features so reward magnitudes carry no gradient.
pub struct Icm<M>
where
    M: SubModel1<Input = Tensor, Output = Tensor>,
    M::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    varmap: VarMap,
    encoder: M,
    forward_model: Mlp,
    inverse_model: Mlp,
    n_actions: i64,
    eta: f64,
}

impl<M> Icm<M>
where
    M: SubModel1<Input = Tensor, Output = Tensor>,
    M::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Builds the module.
    pub fn build(config: CuriosityConfig<M::Config>, device: Device) -> Result<Self> {
        let mut encoder_config = config
            .encoder_config
            .context("encoder_config is not set.")?;
        encoder_config.set_out_dim(config.feat_dim);

        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let encoder = M::build(vb.pp("enc"), encoder_config);
        let forward_model = <Mlp as SubModel1>::build(
            vb.pp("fwd"),
            MlpConfig::new(
                config.feat_dim + config.n_actions,
                config.hidden_units.clone(),
                config.feat_dim,
            ),
        );
        let inverse_model = <Mlp as SubModel1>::build(
            vb.pp("inv"),
            MlpConfig::new(2 * config.feat_dim, config.hidden_units, config.n_actions),
        );

        Ok(Self {
            varmap,
            encoder,
            forward_model,
            inverse_model,
            n_actions: config.n_actions,
            eta: config.eta,
        })
    }

    /// Computes the intrinsic reward and both model losses.
    pub fn forward(
        &self,
        obs: &Tensor,
        next_obs: &Tensor,
        act: &Tensor,
    ) -> Result<CuriosityOutput> {
        let phi = self.encoder.forward(obs);
        let phi_next = self.encoder.forward(next_obs);

        let act_ix = act.squeeze(1)?;
        let act_one_hot = one_hot(act_ix.clone(), self.n_actions as usize, 1f32, 0f32)?;

        let pred_phi_next = self
            .forward_model
            .forward(&Tensor::cat(&[&phi, &act_one_hot], 1)?);

        // reward from detached features; the loss stays on the live graph
        let intrinsic_reward = ((pred_phi_next.detach() - phi_next.detach())?
            .sqr()?
            .sum(D::Minus1)?
            * (0.5 * self.eta))?;
        let loss_forward = loss::mse(&pred_phi_next, &phi_next)?;

        let logits = self
            .inverse_model
            .forward(&Tensor::cat(&[&phi, &phi_next], 1)?);
        let loss_inverse = loss::cross_entropy(&logits, &act_ix.to_dtype(DType::U32)?)?;

        Ok(CuriosityOutput {
            intrinsic_reward,
            loss_forward,
            loss_inverse: Some(loss_inverse),
        })
    }

    /// All variables of the encoder and both models.
    pub fn trainable_vars(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }

    /// Variable maps saved into checkpoints.
    pub fn named_varmaps(&self) -> Vec<(&'static str, &VarMap)> {
        vec![("model_a", &self.varmap)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curiosity::CuriosityKind;

    fn icm() -> Icm<Mlp> {
        let config = CuriosityConfig::default()
            .kind(CuriosityKind::Icm)
            .encoder_config(MlpConfig::new(6, vec![16], 0))
            .feat_dim(8)
            .hidden_units(vec![16])
            .n_actions(3);
        Icm::build(config, Device::Cpu).unwrap()
    }

    #[test]
    fn intrinsic_reward_is_non_negative() {
        let icm = icm();
        let obs = Tensor::randn(0f32, 1f32, (5, 6), &Device::Cpu).unwrap();
        let next_obs = Tensor::randn(0f32, 1f32, (5, 6), &Device::Cpu).unwrap();
        let act = Tensor::from_slice(&[0i64, 1, 2, 1, 0], (5, 1), &Device::Cpu).unwrap();

        let out = icm.forward(&obs, &next_obs, &act).unwrap();
        assert_eq!(out.intrinsic_reward.dims(), [5]);
        for r in out.intrinsic_reward.to_vec1::<f32>().unwrap() {
            assert!(r >= 0.0);
        }
        assert!(out.loss_inverse.is_some());
    }

    #[test]
    fn reward_carries_no_gradient() {
        let icm = icm();
        let obs = Tensor::randn(0f32, 1f32, (2, 6), &Device::Cpu).unwrap();
        let next_obs = Tensor::randn(0f32, 1f32, (2, 6), &Device::Cpu).unwrap();
        let act = Tensor::from_slice(&[0i64, 1], (2, 1), &Device::Cpu).unwrap();

        let out = icm.forward(&obs, &next_obs, &act).unwrap();
        let grads = out
            .intrinsic_reward
            .sum_all()
            .unwrap()
            .backward()
            .unwrap();
        for var in icm.trainable_vars() {
            assert!(grads.get(&var).is_none());
        }
    }

    #[test]
    fn forward_loss_reaches_the_encoder() {
        let icm = icm();
        let obs = Tensor::randn(0f32, 1f32, (2, 6), &Device::Cpu).unwrap();
        let next_obs = Tensor::randn(0f32, 1f32, (2, 6), &Device::Cpu).unwrap();
        let act = Tensor::from_slice(&[0i64, 1], (2, 1), &Device::Cpu).unwrap();

        let out = icm.forward(&obs, &next_obs, &act).unwrap();
        let grads = out.loss_forward.backward().unwrap();
        let touched = icm
            .trainable_vars()
            .iter()
            .filter(|v| grads.get(v).is_some())
            .count();
        assert!(touched > 0);
    }
}
