//! Ornstein-Uhlenbeck action noise.
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use serde::{Deserialize, Serialize};

/// Configuration of [`OuNoise`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct OuNoiseConfig {
    /// Mean of the process.
    pub mu: f64,

    /// Mean reversion rate.
    pub theta: f64,

    /// Scale of the Gaussian increments.
    pub sigma: f64,
}

impl Default for OuNoiseConfig {
    fn default() -> Self {
        Self {
            mu: 0.0,
            theta: 1e-3,
            sigma: 2e-3,
        }
    }
}

/// Ornstein-Uhlenbeck process for temporally correlated exploration noise.
///
/// `x(t+1) = x(t) + theta * (mu - x(t)) + sigma * N(0, 1)`
pub struct OuNoise {
    mu: f64,
    theta: f64,
    sigma: f64,
    x: Tensor,
}

impl OuNoise {
    /// Builds the process with a zero initial state of shape `[1, dim]`.
    pub fn build(config: OuNoiseConfig, dim: usize, device: &Device) -> Result<Self> {
        let x = Tensor::zeros((1, dim), DType::F32, device)?;
        Ok(Self {
            mu: config.mu,
            theta: config.theta,
            sigma: config.sigma,
            x,
        })
    }

    /// Resets the state to zero.
    pub fn reset(&mut self) -> Result<()> {
        self.x = self.x.zeros_like()?;
        Ok(())
    }

    /// Advances the process one step and returns the new state.
    pub fn sample(&mut self) -> Result<Tensor> {
        let dx = (self.x.affine(-self.theta, self.theta * self.mu)?
            + (self.x.randn_like(0.0, 1.0)? * self.sigma)?)?;
        self.x = (&self.x + dx)?;
        Ok(self.x.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // with sigma = 0 the process decays deterministically towards mu
    #[test]
    fn mean_reversion_without_diffusion() {
        let config = OuNoiseConfig {
            mu: 1.0,
            theta: 0.5,
            sigma: 0.0,
        };
        let mut noise = OuNoise::build(config, 2, &Device::Cpu).unwrap();

        let x1 = noise.sample().unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(x1, vec![vec![0.5, 0.5]]);
        let x2 = noise.sample().unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(x2, vec![vec![0.75, 0.75]]);

        noise.reset().unwrap();
        let x3 = noise.sample().unwrap().to_vec2::<f32>().unwrap();
        assert_eq!(x3, vec![vec![0.5, 0.5]]);
    }
}
