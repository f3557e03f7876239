//! Activation function types.

use crate::engine::Value;
use crate::error::{Error, Result};

use std::fmt;
use std::str::FromStr;

/// [Activation function](https://en.wikipedia.org/wiki/Activation_function)
/// types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activator {
    /// No activation; the neuron outputs its weighted sum.
    Linear,
    /// Rectified Linear Unit
    ReLU,
    /// Hyperbolic tan function
    TanH,
}

impl Activator {
    /// Applies the activation function to the preactivation node `z`.
    ///
    /// The returned node records `z` as its predecessor, so gradients flow
    /// back through the activation on the next backward pass. `Linear`
    /// returns `z` itself.
    pub fn apply(&self, z: &Value) -> Value {
        match *self {
            Activator::Linear => z.clone(),
            Activator::ReLU => z.relu(),
            Activator::TanH => z.tanh(),
        }
    }
}

impl Default for Activator {
    fn default() -> Self {
        Activator::ReLU
    }
}

impl fmt::Display for Activator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Activator::Linear => "Linear",
            Activator::ReLU => "ReLU",
            Activator::TanH => "TanH",
        };
        f.write_str(name)
    }
}

impl FromStr for Activator {
    type Err = Error;

    /// Parses an activation function by name, ignoring case.
    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" | "linear" => Ok(Activator::Linear),
            "relu" => Ok(Activator::ReLU),
            "tanh" => Ok(Activator::TanH),
            _ => Err(Error::UnknownActivator(name.to_string())),
        }
    }
}
