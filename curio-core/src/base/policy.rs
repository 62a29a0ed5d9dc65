//! Policy interface.
use super::Env;

/// A policy maps an observation to an action.
pub trait Policy<E: Env> {
    /// Samples an action for the given observation.
    fn sample(&mut self, obs: &E::Obs) -> E::Act;
}

/// Builds a component from its configuration.
pub trait Configurable {
    /// Configuration of the component.
    type Config: Clone;

    /// Builds the component.
    fn build(config: Self::Config) -> Self;
}
