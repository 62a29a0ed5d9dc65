//! Entropy coefficient of SAC.
use crate::opt::{Optimizer, OptimizerConfig};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{Init, VarMap};
use serde::{Deserialize, Serialize};

/// How the entropy coefficient `alpha` is handled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntCoefMode {
    /// A fixed value of `alpha`.
    Fix(f64),

    /// `log(alpha)` is learned against a target entropy.
    Auto {
        /// Target entropy, usually the negated action dimension.
        target: f64,

        /// Learning rate of the coefficient's optimizer.
        lr: f64,
    },
}

/// The entropy coefficient of SAC.
///
/// `alpha` is parameterized as `exp(log_alpha)` and therefore positive by
/// construction. In [`EntCoefMode::Auto`] the coefficient chases the target
/// entropy with its own optimizer.
pub struct EntCoef {
    varmap: VarMap,
    log_alpha: Tensor,
    target: Option<f64>,
    opt: Option<Optimizer>,
}

impl EntCoef {
    /// Builds the coefficient.
    pub fn build(mode: EntCoefMode, device: &Device) -> Result<Self> {
        let varmap = VarMap::new();
        let (init, target, lr) = match mode {
            EntCoefMode::Fix(alpha) => (alpha.ln(), None, None),
            EntCoefMode::Auto { target, lr } => (0.0, Some(target), Some(lr)),
        };
        let log_alpha = varmap.get(&[1], "log_alpha", Init::Const(init), DType::F32, device)?;
        let opt = match lr {
            Some(lr) => Some(OptimizerConfig::Adam { lr }.build(varmap.all_vars())?),
            None => None,
        };

        Ok(Self {
            varmap,
            log_alpha,
            target,
            opt,
        })
    }

    /// The current value of `alpha`, detached from the graph.
    pub fn alpha(&self) -> Result<Tensor> {
        Ok(self.log_alpha.detach().exp()?)
    }

    /// Updates `log_alpha` against the log probabilities of a batch.
    ///
    /// Minimizes `-mean(log_alpha * (logp + target))`, pushing the policy
    /// entropy towards the target. No-op in fixed mode.
    pub fn update(&mut self, logp: &Tensor) -> Result<()> {
        if let (Some(target), Some(opt)) = (&self.target, &mut self.opt) {
            let loss = {
                let lhs = (logp + *target)?.detach();
                self.log_alpha.broadcast_mul(&lhs)?.mean_all()?.neg()?
            };
            opt.backward_step(&loss)?;
        }
        Ok(())
    }

    /// The variable map holding `log_alpha`.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_stays_positive_under_updates() {
        let mut ent_coef = EntCoef::build(
            EntCoefMode::Auto {
                target: -2.0,
                lr: 0.1,
            },
            &Device::Cpu,
        )
        .unwrap();

        // drive log_alpha hard in both directions
        for logp in [-50.0f32, 50.0] {
            for _ in 0..100 {
                let logp = Tensor::from_slice(&[logp], (1,), &Device::Cpu).unwrap();
                ent_coef.update(&logp).unwrap();
            }
            let alpha = ent_coef.alpha().unwrap().to_vec1::<f32>().unwrap()[0];
            assert!(alpha > 0.0);
        }
    }

    #[test]
    fn fixed_mode_keeps_alpha_constant() {
        let mut ent_coef = EntCoef::build(EntCoefMode::Fix(0.2), &Device::Cpu).unwrap();
        let logp = Tensor::from_slice(&[-3.0f32], (1,), &Device::Cpu).unwrap();
        ent_coef.update(&logp).unwrap();
        let alpha = ent_coef.alpha().unwrap().to_vec1::<f32>().unwrap()[0];
        assert!((alpha - 0.2).abs() < 1e-6);
    }
}
