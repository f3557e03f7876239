//! A [Feedforward neural network]
//! (https://en.wikipedia.org/wiki/Feedforward_neural_network) built from
//! scalar autograd nodes.
//!
//! # Example
//!
//! Let's build a small network and take one gradient step on it:
//!
//! ```
//! # use neurograd::engine::values;
//! # use neurograd::feed_forward::*;
//! # use neurograd::module::Module;
//! // Three inputs, two hidden ReLU layers of four neurons, one linear output.
//! let network = Network::new(3, &[4, 4, 1]).unwrap();
//! assert_eq!(network.num_params(), 41);
//!
//! // The last layer has one neuron, so the output is a single node.
//! let output = network.call(&values(&[2.0, 3.0, -1.0]));
//! let prediction = output.single().unwrap();
//!
//! // Backpropagate a squared error and nudge every parameter downhill.
//! let loss = (prediction - 1.0).pow(2.0);
//! network.zero_grad();
//! loss.backward();
//! for p in network.parameters() {
//!     p.set_data(p.data() - 0.01 * p.grad());
//! }
//! ```

use crate::engine::Value;
use crate::error::{Error, Result};
use crate::layer::Layer;
use crate::module::Module;
use crate::neuron::Options;

pub use crate::activator::Activator;
pub use crate::layer::Output;

use itertools::Itertools;
use rand::Rng;
use std::fmt;
use std::iter;

/// A Feedforward neural network
///
/// Every layer but the last applies its activation function; the last layer
/// is a linear readout.
#[derive(Debug)]
pub struct Network {
    layers: Vec<Layer>,
}

impl Network {
    /// Creates a new, untrained neural network of ReLU hidden layers.
    ///
    /// Arguments:
    ///  * `nin` - the number of inputs to the network.
    ///  * `layer_sizes` - the number of neurons in each layer. Must not be
    ///                    empty.
    pub fn new(nin: usize, layer_sizes: &[usize]) -> Result<Self> {
        Network::build(
            nin,
            layer_sizes,
            &Options::default(),
            &mut rand::thread_rng(),
        )
    }

    /// Creates a new neural network, drawing parameters from `rng` layer by
    /// layer.
    ///
    /// The activation function and initialization range of `options` apply
    /// to the hidden layers; its `nonlin` flag is overridden so that only the
    /// last layer is linear.
    pub fn build<R>(
        nin: usize,
        layer_sizes: &[usize],
        options: &Options,
        rng: &mut R,
    ) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if layer_sizes.is_empty() {
            return Err(Error::EmptyLayerSizes);
        }
        let last = layer_sizes.len() - 1;
        let mut layers = Vec::with_capacity(layer_sizes.len());
        let sizes = iter::once(nin).chain(layer_sizes.iter().cloned());
        for (i, (inputs, outputs)) in sizes.tuple_windows().enumerate() {
            let options = options.nonlin(i != last);
            layers.push(Layer::build(inputs, outputs, &options, &mut *rng)?);
        }
        let network = Network { layers };
        debug!(
            "built network {} -> {:?} with {} parameters",
            nin,
            layer_sizes,
            network.num_params()
        );
        Ok(network)
    }

    /// Returns the size of the input layer to the network.
    pub fn input_len(&self) -> usize {
        self.layers[0].input_len()
    }

    /// Returns the size of the output layer from the network.
    pub fn output_len(&self) -> usize {
        self.layers[self.layers.len() - 1].output_len()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Feeds the provided `inputs` through the network, returning the output
    /// layer.
    ///
    /// A layer's output is fed to the next layer as a sequence, even when
    /// it is a single node.
    pub fn call(&self, inputs: &[Value]) -> Output {
        trace!(
            "feeding {} inputs through {} layers",
            inputs.len(),
            self.layers.len()
        );
        let mut output = Output::Many(inputs.to_vec());
        for layer in &self.layers {
            output = layer.call(output.as_slice());
        }
        output
    }
}

impl Module for Network {
    fn parameters(&self) -> Vec<Value> {
        self.layers.iter().flat_map(|l| l.parameters()).collect()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MLP of [{}]", self.layers.iter().join(", "))
    }
}
