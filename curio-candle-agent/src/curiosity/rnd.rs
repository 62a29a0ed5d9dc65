//! Random network distillation.
use super::{CuriosityConfig, CuriosityOutput};
use crate::{model::SubModel1, util::OutDim};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, Var, D};
use candle_nn::{loss, VarBuilder, VarMap};
use serde::{de::DeserializeOwned, Serialize};

/// Random network distillation.
///
/// A trainable predictor chases a frozen, randomly initialized target
/// network on the observations after each transition. The target's
/// variables live in their own variable map and are never handed to an
/// optimizer; its output is detached, so only the predictor learns.
pub struct Rnd<M>
where
    M: SubModel1<Input = Tensor, Output = Tensor>,
    M::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    varmap: VarMap,
    varmap_tgt: VarMap,
    predictor: M,
    target: M,
    eta: f64,
}

impl<M> Rnd<M>
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
        let predictor = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            M::build(vb.pp("pred"), encoder_config.clone())
        };

        let varmap_tgt = VarMap::new();
        let target = {
            let vb = VarBuilder::from_varmap(&varmap_tgt, DType::F32, &device);
            M::build(vb.pp("tgt"), encoder_config)
        };

        Ok(Self {
            varmap,
            varmap_tgt,
            predictor,
            target,
            eta: config.eta,
        })
    }

    /// Computes the intrinsic reward and the predictor loss.
    pub fn forward(&self, next_obs: &Tensor) -> Result<CuriosityOutput> {
        let target = self.target.forward(next_obs).detach();
        let pred = self.predictor.forward(next_obs);

        let intrinsic_reward =
            ((pred.detach() - &target)?.sqr()?.sum(D::Minus1)? * (0.5 * self.eta))?;
        let loss_forward = loss::mse(&pred, &target)?;

        Ok(CuriosityOutput {
            intrinsic_reward,
            loss_forward,
            loss_inverse: None,
        })
    }

    /// The predictor's variables; the target stays frozen.
    pub fn trainable_vars(&self) -> Vec<Var> {
        self.varmap.all_vars()
    }

    /// Variable maps saved into checkpoints.
    ///
    /// The frozen target is saved as well, so a resumed run distills the
    /// same random network.
    pub fn named_varmaps(&self) -> Vec<(&'static str, &VarMap)> {
        vec![("model_a", &self.varmap), ("model_a_tgt", &self.varmap_tgt)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curiosity::CuriosityKind;
    use crate::mlp::{Mlp, MlpConfig};

    fn rnd() -> Rnd<Mlp> {
        let config = CuriosityConfig::default()
            .kind(CuriosityKind::Rnd)
            .encoder_config(MlpConfig::new(6, vec![16], 0))
            .feat_dim(8);
        Rnd::build(config, Device::Cpu).unwrap()
    }

    #[test]
    fn target_is_excluded_from_trainable_vars() {
        let rnd = rnd();
        let n_pred = rnd.varmap.all_vars().len();
        let n_tgt = rnd.varmap_tgt.all_vars().len();
        assert!(n_tgt > 0);
        assert_eq!(rnd.trainable_vars().len(), n_pred);
    }

    #[test]
    fn loss_never_reaches_the_target() {
        let rnd = rnd();
        let next_obs = Tensor::randn(0f32, 1f32, (3, 6), &Device::Cpu).unwrap();
        let out = rnd.forward(&next_obs).unwrap();
        let grads = out.loss_forward.backward().unwrap();
        for var in rnd.varmap_tgt.all_vars() {
            assert!(grads.get(&var).is_none());
        }
        let touched = rnd
            .trainable_vars()
            .iter()
            .filter(|v| grads.get(v).is_some())
            .count();
        assert!(touched > 0);
    }

    #[test]
    fn intrinsic_reward_is_non_negative() {
        let rnd = rnd();
        let next_obs = Tensor::randn(0f32, 1f32, (4, 6), &Device::Cpu).unwrap();
        let out = rnd.forward(&next_obs).unwrap();
        for r in out.intrinsic_reward.to_vec1::<f32>().unwrap() {
            assert!(r >= 0.0);
        }
        assert!(out.loss_inverse.is_none());
    }
}
