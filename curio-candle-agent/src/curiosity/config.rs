//! Configuration of curiosity modules.
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// The kind of curiosity module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CuriosityKind {
    /// Intrinsic curiosity module.
    Icm,

    /// Random network distillation.
    Rnd,
}

/// Configuration of [`Curiosity`](super::Curiosity).
///
/// `M` is the configuration type of the encoder network. Reward shaping
/// coefficients live here as well since they are only meaningful when a
/// curiosity module is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CuriosityConfig<M> {
    /// Which curiosity module to build.
    pub kind: CuriosityKind,

    /// Configuration of the encoder (ICM) or predictor/target (RND).
    pub encoder_config: Option<M>,

    /// Dimension of the encoded feature vector.
    pub feat_dim: i64,

    /// Hidden layer widths of the forward and inverse heads (ICM).
    pub hidden_units: Vec<i64>,

    /// Number of discrete actions (ICM).
    pub n_actions: i64,

    /// Scale of the intrinsic reward, `r_i = eta / 2 * ||error||^2`.
    pub eta: f64,

    /// Weight of the forward loss; the inverse loss is weighted `1 - beta`.
    pub beta: f64,

    /// Weight of the RL loss in the combined objective.
    pub lamb: f64,

    /// Weight of the extrinsic reward in the shaped reward.
    pub extrinsic_coeff: f64,

    /// Weight of the intrinsic reward in the shaped reward.
    pub intrinsic_coeff: f64,
}

impl<M> Default for CuriosityConfig<M> {
    fn default() -> Self {
        Self {
            kind: CuriosityKind::Icm,
            encoder_config: None,
            feat_dim: 256,
            hidden_units: vec![256],
            n_actions: 0,
            eta: 0.01,
            beta: 0.2,
            lamb: 1.0,
            extrinsic_coeff: 1.0,
            intrinsic_coeff: 0.01,
        }
    }
}

impl<M> CuriosityConfig<M>
where
    M: DeserializeOwned + Serialize,
{
    /// Sets the kind of the module.
    pub fn kind(mut self, v: CuriosityKind) -> Self {
        self.kind = v;
        self
    }

    /// Sets the encoder configuration.
    pub fn encoder_config(mut self, v: M) -> Self {
        self.encoder_config = Some(v);
        self
    }

    /// Sets the feature dimension.
    pub fn feat_dim(mut self, v: i64) -> Self {
        self.feat_dim = v;
        self
    }

    /// Sets the hidden layer widths of the heads.
    pub fn hidden_units(mut self, v: Vec<i64>) -> Self {
        self.hidden_units = v;
        self
    }

    /// Sets the number of discrete actions.
    pub fn n_actions(mut self, v: i64) -> Self {
        self.n_actions = v;
        self
    }

    /// Sets the intrinsic reward scale.
    pub fn eta(mut self, v: f64) -> Self {
        self.eta = v;
        self
    }

    /// Sets the forward loss weight.
    pub fn beta(mut self, v: f64) -> Self {
        self.beta = v;
        self
    }

    /// Sets the RL loss weight.
    pub fn lamb(mut self, v: f64) -> Self {
        self.lamb = v;
        self
    }

    /// Sets the extrinsic reward coefficient.
    pub fn extrinsic_coeff(mut self, v: f64) -> Self {
        self.extrinsic_coeff = v;
        self
    }

    /// Sets the intrinsic reward coefficient.
    pub fn intrinsic_coeff(mut self, v: f64) -> Self {
        self.intrinsic_coeff = v;
        self
    }

    /// Constructs [`CuriosityConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CuriosityConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
