//! Interfaces of neural networks used by agents.
use candle_nn::VarBuilder;

/// A network taking a single input.
///
/// Agents access their function approximators only through this trait, so
/// any architecture can be plugged in.
pub trait SubModel1 {
    /// Configuration of the network.
    type Config;

    /// Input of the network.
    type Input;

    /// Output of the network.
    type Output;

    /// Builds the network, creating its variables under `vb`.
    fn build(vb: VarBuilder, config: Self::Config) -> Self;

    /// Performs a forward pass.
    fn forward(&self, input: &Self::Input) -> Self::Output;
}

/// A network taking two inputs, typically an observation and an action.
pub trait SubModel2 {
    /// Configuration of the network.
    type Config;

    /// First input of the network.
    type Input1;

    /// Second input of the network.
    type Input2;

    /// Output of the network.
    type Output;

    /// Builds the network, creating its variables under `vb`.
    fn build(vb: VarBuilder, config: Self::Config) -> Self;

    /// Performs a forward pass.
    fn forward(&self, input1: &Self::Input1, input2: &Self::Input2) -> Self::Output;
}
