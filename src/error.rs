//! Errors raised while configuring a network.

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An activation function name that is not one of `none`, `relu` or
    /// `tanh`.
    #[error("unknown activation function `{0}`")]
    UnknownActivator(String),
    /// A nonlinear neuron was requested without an activation function.
    #[error("a nonlinear neuron needs an activation function other than Linear")]
    MissingActivator,
    #[error("layer widths must be positive")]
    ZeroWidth,
    #[error("a network needs at least one layer")]
    EmptyLayerSizes,
    #[error("initialization range must be finite and positive, got {0}")]
    InvalidInitScale(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
