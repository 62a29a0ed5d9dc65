//! Transition of an environment step and its postprocessing.
use super::Env;

/// A transition produced by a single environment step.
pub struct Step<E: Env> {
    /// Action applied at this step.
    pub act: E::Act,

    /// Observation after the step.
    pub obs: E::Obs,

    /// Reward of this step.
    pub reward: f32,

    /// True when the episode ended by reaching a terminal state.
    pub is_terminated: bool,

    /// True when the episode was cut off, e.g. by a step limit.
    pub is_truncated: bool,

    /// Environment-specific information.
    pub info: E::Info,

    /// Initial observation of the next episode.
    ///
    /// Set by [`Env::step_with_reset`] when the episode ended during this
    /// step, otherwise `None`.
    pub init_obs: Option<E::Obs>,
}

impl<E: Env> Step<E> {
    /// Creates a [`Step`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        act: E::Act,
        obs: E::Obs,
        reward: f32,
        is_terminated: bool,
        is_truncated: bool,
        info: E::Info,
        init_obs: Option<E::Obs>,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
            init_obs,
        }
    }

    /// True when the episode ended at this step for either reason.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}

/// Converts a [`Step`] into an item that a replay buffer accepts.
///
/// Implementations keep the observation of the previous step in order to
/// produce full transitions `(o_t, a_t, o_t+1, r_t, ...)`.
pub trait StepProcessor<E: Env> {
    /// Configuration of the processor.
    type Config: Clone;

    /// The item pushed into the replay buffer.
    type Output;

    /// Builds the processor.
    fn build(config: &Self::Config) -> Self;

    /// Resets the processor with the initial observation of an episode.
    fn reset(&mut self, init_obs: E::Obs);

    /// Converts a step into a replay buffer item.
    fn process(&mut self, step: Step<E>) -> Self::Output;
}
