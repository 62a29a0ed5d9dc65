//! Exploration strategy of DQN.
use candle_core::{DType, Tensor, D};
use rand::{rngs::SmallRng, Rng};
use serde::{Deserialize, Serialize};

/// Epsilon-greedy exploration with a linear decay schedule.
///
/// Epsilon decays linearly from `eps_start` to `eps_final` over
/// `final_step` calls of [`EpsilonGreedy::action`]. [`EpsilonGreedy::set_eps`]
/// overrides the schedule with a constant value, e.g. to disable random
/// exploration once intrinsic rewards drive exploration instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    n_calls: usize,
    eps_start: f64,
    eps_final: f64,
    final_step: usize,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            n_calls: 0,
            eps_start: 1.0,
            eps_final: 0.1,
            final_step: 100_000,
        }
    }
}

impl EpsilonGreedy {
    /// Creates a schedule.
    pub fn new(eps_start: f64, eps_final: f64, final_step: usize) -> Self {
        Self {
            n_calls: 0,
            eps_start,
            eps_final,
            final_step,
        }
    }

    /// The current value of epsilon.
    pub fn eps(&self) -> f64 {
        let fraction = (self.n_calls as f64 / self.final_step as f64).min(1.0);
        self.eps_start - (self.eps_start - self.eps_final) * fraction
    }

    /// Overrides the schedule with a constant epsilon.
    pub fn set_eps(&mut self, eps: f64) {
        self.eps_start = eps;
        self.eps_final = eps;
    }

    /// Selects an action index for a batch of one observation.
    ///
    /// `q` has shape `[1, n_actions]`; the result has shape `[1, 1]` and
    /// dtype `i64`. Advances the decay schedule by one call.
    pub fn action(&mut self, q: &Tensor, rng: &mut SmallRng) -> Tensor {
        let eps = self.eps();
        self.n_calls += 1;

        if rng.gen::<f64>() < eps {
            let n_actions = q.dims()[1];
            let a = rng.gen_range(0..n_actions) as i64;
            Tensor::from_slice(&[a], (1, 1), q.device()).unwrap()
        } else {
            q.argmax(D::Minus1)
                .unwrap()
                .to_dtype(DType::I64)
                .unwrap()
                .unsqueeze(1)
                .unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;
    use rand::SeedableRng;

    fn q_values() -> Tensor {
        Tensor::from_slice(&[0.1f32, 0.9, 0.2], (1, 3), &Device::Cpu).unwrap()
    }

    #[test]
    fn decays_linearly_to_the_final_value() {
        let mut explorer = EpsilonGreedy::new(1.0, 0.1, 10);
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(explorer.eps(), 1.0);
        for _ in 0..5 {
            explorer.action(&q_values(), &mut rng);
        }
        assert!((explorer.eps() - 0.55).abs() < 1e-9);
        for _ in 0..20 {
            explorer.action(&q_values(), &mut rng);
        }
        assert_eq!(explorer.eps(), 0.1);
    }

    #[test]
    fn zero_eps_is_always_greedy() {
        let mut explorer = EpsilonGreedy::default();
        explorer.set_eps(0.0);
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..20 {
            let a = explorer.action(&q_values(), &mut rng);
            assert_eq!(a.to_vec2::<i64>().unwrap(), vec![vec![1]]);
        }
    }

    #[test]
    fn full_eps_stays_in_action_range() {
        let mut explorer = EpsilonGreedy::new(1.0, 1.0, 1);
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..50 {
            let a = explorer.action(&q_values(), &mut rng).to_vec2::<i64>().unwrap()[0][0];
            assert!((0..3).contains(&a));
        }
    }
}
