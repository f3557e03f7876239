use crate::activator::Activator;
use crate::engine::Value;
use crate::error::{Error, Result};
use crate::module::Module;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use std::fmt;

/// Construction options for neurons, shared by every neuron of a layer.
///
/// The defaults are:
///
/// * A nonlinear neuron.
/// * A ReLU activation function.
/// * Weights and bias drawn uniformly from `[-1, 1]`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    nonlin: bool,
    activator: Activator,
    init_scale: f64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            nonlin: true,
            activator: Activator::default(),
            init_scale: 1.0,
        }
    }
}

impl Options {
    /// Sets whether the neuron applies its activation function.
    pub fn nonlin(mut self, nonlin: bool) -> Self {
        self.nonlin = nonlin;
        self
    }

    /// Sets the activation function used when `nonlin` is set.
    pub fn activator(mut self, activator: Activator) -> Self {
        self.activator = activator;
        self
    }

    /// Sets the half-width of the range parameters are drawn from.
    pub fn init_scale(mut self, scale: f64) -> Self {
        self.init_scale = scale;
        self
    }

    /// Resolves the activation function a neuron built with these options
    /// will use, rejecting inconsistent options.
    fn resolve(&self) -> Result<Activator> {
        // The sampler divides the range width `2 * init_scale` by a number
        // just below one, so leave headroom above the width.
        if !(4.0 * self.init_scale).is_finite() || self.init_scale <= 0.0 {
            return Err(Error::InvalidInitScale(self.init_scale));
        }
        match (self.nonlin, self.activator) {
            (false, _) => Ok(Activator::Linear),
            (true, Activator::Linear) => Err(Error::MissingActivator),
            (true, activator) => Ok(activator),
        }
    }
}

/// A single neuron: a weighted sum of its inputs plus a bias, optionally
/// passed through an activation function.
///
/// The weight and bias nodes are created once and live as long as the
/// neuron; every evaluation builds a fresh graph on top of them.
#[derive(Debug)]
pub struct Neuron {
    weights: Vec<Value>,
    bias: Value,
    nonlin: bool,
    activator: Activator,
}

impl Neuron {
    /// Initializes a new, untrained ReLU neuron (or a linear one if `nonlin`
    /// is false) with `nin` inputs.
    pub fn new(nin: usize, nonlin: bool) -> Result<Self> {
        Neuron::build(
            nin,
            &Options::default().nonlin(nonlin),
            &mut rand::thread_rng(),
        )
    }

    /// Initializes a new neuron with `nin` inputs, drawing every weight and
    /// then the bias from `rng`.
    pub fn build<R>(nin: usize, options: &Options, rng: &mut R) -> Result<Self>
    where
        R: Rng + ?Sized,
    {
        if nin == 0 {
            return Err(Error::ZeroWidth);
        }
        let activator = options.resolve()?;
        let range = Uniform::new_inclusive(-options.init_scale, options.init_scale);
        let weights = (0..nin)
            .map(|_| Value::new(range.sample(&mut *rng)))
            .collect();
        let bias = Value::new(range.sample(&mut *rng));
        Ok(Neuron {
            weights,
            bias,
            nonlin: options.nonlin,
            activator,
        })
    }

    /// Feeds `inputs` through the neuron.
    ///
    /// The sum starts from the bias and adds `weights[i] * inputs[i]` in
    /// index order. Weights and inputs are paired up to the shorter of the
    /// two: missing inputs contribute nothing and extra inputs are ignored.
    pub fn call(&self, inputs: &[Value]) -> Value {
        let z = self
            .weights
            .iter()
            .zip(inputs)
            .fold(self.bias.clone(), |z, (w, x)| z + w * x);
        if self.nonlin {
            self.activator.apply(&z)
        } else {
            z
        }
    }

    /// Returns the number of inputs to this neuron.
    pub fn input_len(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[Value] {
        &self.weights
    }

    pub fn bias(&self) -> &Value {
        &self.bias
    }

    pub fn nonlin(&self) -> bool {
        self.nonlin
    }

    pub fn activator(&self) -> Activator {
        self.activator
    }
}

impl Module for Neuron {
    fn parameters(&self) -> Vec<Value> {
        let mut params = self.weights.clone();
        params.push(self.bias.clone());
        params
    }
}

impl fmt::Display for Neuron {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}Neuron({})", self.activator, self.input_len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::values;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn parameters_are_weights_then_bias() {
        let n = Neuron::new(4, true).unwrap();
        let params = n.parameters();
        assert_eq!(params.len(), 5);
        for (p, w) in params.iter().zip(n.weights()) {
            assert!(p.ptr_eq(w));
        }
        assert!(params[4].ptr_eq(n.bias()));
        assert_eq!(n.num_params(), 5);
    }

    #[test]
    fn parameters_are_stable() {
        let n = Neuron::new(3, false).unwrap();
        let first = n.parameters();
        let second = n.parameters();
        for (a, b) in first.iter().zip(&second) {
            assert!(a.ptr_eq(b));
        }
    }

    #[test]
    fn initialized_within_range() {
        let options = Options::default().init_scale(0.5);
        let n = Neuron::build(64, &options, &mut rng()).unwrap();
        for p in n.parameters() {
            assert!(p.data() >= -0.5 && p.data() <= 0.5);
            assert_eq!(p.grad(), 0.0);
        }
    }

    #[test]
    fn parameters_are_not_shared() {
        let a = Neuron::build(2, &Options::default(), &mut rng()).unwrap();
        let b = Neuron::build(2, &Options::default(), &mut rng()).unwrap();
        for p in a.parameters() {
            assert!(b.parameters().iter().all(|q| !p.ptr_eq(q)));
        }
    }

    #[test]
    fn linear_output_is_exact_sum() {
        let n = Neuron::build(3, &Options::default().nonlin(false), &mut rng()).unwrap();
        let x = values(&[0.3, -1.2, 2.5]);
        let w = n.weights();
        let expected = n.bias().data()
            + w[0].data() * x[0].data()
            + w[1].data() * x[1].data()
            + w[2].data() * x[2].data();
        assert_eq!(n.call(&x).data(), expected);
    }

    #[test]
    fn relu_output() {
        let n = Neuron::build(2, &Options::default(), &mut rng()).unwrap();
        let x = values(&[1.0, -1.0]);
        let z = n.bias().data() + n.weights()[0].data() * 1.0 + n.weights()[1].data() * -1.0;
        assert_eq!(n.call(&x).data(), z.max(0.0));

        // Force the preactivation negative, then positive.
        n.bias().set_data(-10.0);
        assert_eq!(n.call(&x).data(), 0.0);
        n.bias().set_data(10.0);
        assert!(n.call(&x).data() > 0.0);
    }

    #[test]
    fn tanh_output() {
        let options = Options::default().activator(Activator::TanH);
        let n = Neuron::build(1, &options, &mut rng()).unwrap();
        assert_eq!(n.activator(), Activator::TanH);
        let x = values(&[0.8]);
        let z = n.bias().data() + n.weights()[0].data() * 0.8;
        assert_eq!(n.call(&x).data(), z.tanh());
    }

    #[test]
    fn activator_resolved_from_flag() {
        let linear = Neuron::new(2, false).unwrap();
        assert!(!linear.nonlin());
        assert_eq!(linear.activator(), Activator::Linear);
        let relu = Neuron::new(2, true).unwrap();
        assert!(relu.nonlin());
        assert_eq!(relu.activator(), Activator::ReLU);
    }

    #[test]
    fn truncating_pairing() {
        let n = Neuron::build(3, &Options::default().nonlin(false), &mut rng()).unwrap();
        let w: Vec<f64> = n.weights().iter().map(Value::data).collect();
        let b = n.bias().data();

        let short = n.call(&values(&[2.0]));
        assert_eq!(short.data(), b + w[0] * 2.0);

        let long = n.call(&values(&[2.0, 3.0, 4.0, 100.0]));
        assert_eq!(long.data(), b + w[0] * 2.0 + w[1] * 3.0 + w[2] * 4.0);

        assert!(n.call(&[]).ptr_eq(n.bias()));
    }

    #[test]
    fn gradients_reach_parameters() {
        let n = Neuron::build(2, &Options::default().nonlin(false), &mut rng()).unwrap();
        let x = values(&[3.0, -2.0]);
        n.call(&x).backward();
        assert_eq!(n.weights()[0].grad(), 3.0);
        assert_eq!(n.weights()[1].grad(), -2.0);
        assert_eq!(n.bias().grad(), 1.0);
        assert_eq!(x[0].grad(), n.weights()[0].data());

        n.zero_grad();
        for p in n.parameters() {
            assert_eq!(p.grad(), 0.0);
        }
    }

    #[test]
    fn invalid_options() {
        let missing = Options::default().activator(Activator::Linear);
        assert_eq!(
            Neuron::build(2, &missing, &mut rng()).unwrap_err(),
            Error::MissingActivator
        );
        // A linear neuron ignores the activator.
        assert!(Neuron::build(2, &missing.nonlin(false), &mut rng()).is_ok());

        let scale = Options::default().init_scale(0.0);
        assert_eq!(
            Neuron::build(2, &scale, &mut rng()).unwrap_err(),
            Error::InvalidInitScale(0.0)
        );
        assert_eq!(Neuron::new(0, true).unwrap_err(), Error::ZeroWidth);
    }

    #[test]
    fn init_scale_too_wide() {
        for &scale in &[f64::MAX, f64::MAX / 2.0, f64::INFINITY, -f64::INFINITY] {
            let options = Options::default().init_scale(scale);
            assert_eq!(
                Neuron::build(2, &options, &mut rng()).unwrap_err(),
                Error::InvalidInitScale(scale)
            );
        }
        let nan = Options::default().init_scale(f64::NAN);
        match Neuron::build(2, &nan, &mut rng()) {
            Err(Error::InvalidInitScale(s)) => assert!(s.is_nan()),
            other => panic!("expected InvalidInitScale, got {:?}", other),
        }
        let wide = Options::default().init_scale(f64::MAX / 8.0);
        let n = Neuron::build(2, &wide, &mut rng()).unwrap();
        assert!(n.parameters().iter().all(|p| p.data().is_finite()));
    }

    #[test]
    fn options_from_json() {
        let options: Options =
            serde_json::from_str(r#"{"activator": "TanH", "init_scale": 0.1}"#).unwrap();
        assert_eq!(
            options,
            Options::default()
                .activator(Activator::TanH)
                .init_scale(0.1)
        );
    }

    #[test]
    fn display() {
        assert_eq!(Neuron::new(3, true).unwrap().to_string(), "ReLUNeuron(3)");
        assert_eq!(Neuron::new(2, false).unwrap().to_string(), "LinearNeuron(2)");
    }
}
