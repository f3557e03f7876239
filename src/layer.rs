use crate::engine::Value;
use crate::error::{Error, Result};
use crate::module::Module;
use crate::neuron::{Neuron, Options};

use itertools::Itertools;
use rand::Rng;
use std::fmt;
use std::slice;

/// The result of feeding inputs through a layer.
///
/// A layer with a single neuron yields that neuron's node directly, so a
/// network ending in one neuron produces one node rather than a singleton
/// list.
#[derive(Clone, Debug)]
pub enum Output {
    Single(Value),
    Many(Vec<Value>),
}

impl Output {
    /// Views the output as a sequence; a single node becomes a one-element
    /// slice.
    pub fn as_slice(&self) -> &[Value] {
        match self {
            Output::Single(value) => slice::from_ref(value),
            Output::Many(values) => values.as_slice(),
        }
    }

    pub fn into_vec(self) -> Vec<Value> {
        match self {
            Output::Single(value) => vec![value],
            Output::Many(values) => values,
        }
    }

    /// Returns the node of a single-neuron output.
    pub fn single(&self) -> Option<&Value> {
        match self {
            Output::Single(value) => Some(value),
            Output::Many(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

/// A fully connected layer: every neuron sees the same inputs.
#[derive(Debug)]
pub struct Layer {
    neurons: Vec<Neuron>,
}

impl Layer {
    /// Initializes a new, untrained layer.
    ///
    /// Arguments:
    ///
    ///  * `nin` - the number of inputs to this layer.
    ///  * `nout` - the number of neurons, and so outputs, of this layer.
    ///  * `nonlin` - whether the neurons apply the default ReLU activation.
    pub fn new(nin: usize, nout: usize, nonlin: bool) -> Result<Self> {
        Layer::build(
            nin,
            nout,
            &Options::default().nonlin(nonlin),
            &mut rand::thread_rng(),
        )
    }

    /// Initializes a new layer, building every neuron with the same
    /// `options` in order from `rng`.
    pub fn build<R>(nin: usize, nout: usize, options: &Options, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if nout == 0 {
            return Err(Error::ZeroWidth);
        }
        let mut neurons = Vec::with_capacity(nout);
        for _ in 0..nout {
            neurons.push(Neuron::build(nin, options, &mut *rng)?);
        }
        Ok(Layer { neurons })
    }

    /// Feeds `inputs` through every neuron, in construction order.
    pub fn call(&self, inputs: &[Value]) -> Output {
        let mut outputs: Vec<Value> = self.neurons.iter().map(|n| n.call(inputs)).collect();
        if outputs.len() == 1 {
            Output::Single(outputs.remove(0))
        } else {
            Output::Many(outputs)
        }
    }

    /// Returns the number of inputs to this layer.
    pub fn input_len(&self) -> usize {
        self.neurons[0].input_len()
    }

    /// Returns the number of outputs from this layer.
    pub fn output_len(&self) -> usize {
        self.neurons.len()
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }
}

impl Module for Layer {
    fn parameters(&self) -> Vec<Value> {
        self.neurons.iter().flat_map(|n| n.parameters()).collect()
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Layer of [{}]", self.neurons.iter().join(", "))
    }
}
