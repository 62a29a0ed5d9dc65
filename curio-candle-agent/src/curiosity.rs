//! Curiosity modules producing intrinsic rewards.
//!
//! A curiosity module observes the transitions of a training batch and
//! yields a non-negative intrinsic reward per transition together with its
//! own training losses. The module's trainable variables are updated by the
//! same optimizer as the agent's value network.
mod config;
mod icm;
mod rnd;

pub use config::{CuriosityConfig, CuriosityKind};
pub use icm::Icm;
pub use rnd::Rnd;

use crate::model::SubModel1;
use crate::util::OutDim;
use anyhow::Result;
use candle_core::{Device, Tensor, Var};
use candle_nn::VarMap;
use serde::{de::DeserializeOwned, Serialize};

/// Intrinsic reward and training losses of one batch.
pub struct CuriosityOutput {
    /// Intrinsic reward per transition, detached from the graph.
    pub intrinsic_reward: Tensor,

    /// Prediction loss of the forward model, on the live graph.
    pub loss_forward: Tensor,

    /// Loss of the inverse model, only produced by ICM.
    pub loss_inverse: Option<Tensor>,
}

/// A curiosity module, chosen at construction time.
pub enum Curiosity<M>
where
    M: SubModel1<Input = Tensor, Output = Tensor>,
    M::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Intrinsic curiosity module with forward and inverse models.
    Icm(Icm<M>),

    /// Random network distillation.
    Rnd(Rnd<M>),
}

impl<M> Curiosity<M>
where
    M: SubModel1<Input = Tensor, Output = Tensor>,
    M::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Builds the module of the configured kind.
    pub fn build(config: CuriosityConfig<M::Config>, device: Device) -> Result<Self> {
        match config.kind {
            CuriosityKind::Icm => Ok(Self::Icm(Icm::build(config, device)?)),
            CuriosityKind::Rnd => Ok(Self::Rnd(Rnd::build(config, device)?)),
        }
    }

    /// Computes the intrinsic reward and losses for a batch of transitions.
    ///
    /// `act` is a `[batch, 1]` tensor of `i64` action indices.
    pub fn forward(&self, obs: &Tensor, next_obs: &Tensor, act: &Tensor) -> Result<CuriosityOutput> {
        match self {
            Self::Icm(icm) => icm.forward(obs, next_obs, act),
            Self::Rnd(rnd) => rnd.forward(next_obs),
        }
    }

    /// The variables updated by the shared optimizer.
    ///
    /// For RND this excludes the frozen target network.
    pub fn trainable_vars(&self) -> Vec<Var> {
        match self {
            Self::Icm(icm) => icm.trainable_vars(),
            Self::Rnd(rnd) => rnd.trainable_vars(),
        }
    }

    /// The named variable maps saved into checkpoints.
    pub fn named_varmaps(&self) -> Vec<(&'static str, &VarMap)> {
        match self {
            Self::Icm(icm) => icm.named_varmaps(),
            Self::Rnd(rnd) => rnd.named_varmaps(),
        }
    }
}
