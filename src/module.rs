//! The capability shared by every network component.

use crate::engine::Value;

/// A component that may own trainable parameters.
///
/// Both methods have defaults: a component with no trainable state only
/// needs an empty `impl`.
pub trait Module {
    /// Returns the trainable leaf nodes, in a stable order.
    fn parameters(&self) -> Vec<Value> {
        Vec::new()
    }

    /// Resets the gradient of every parameter to zero. Values are untouched.
    fn zero_grad(&self) {
        for p in self.parameters() {
            p.zero_grad();
        }
    }

    /// Returns the number of trainable parameters.
    fn num_params(&self) -> usize {
        self.parameters().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stateless;

    impl Module for Stateless {}

    struct Pair(Value, Value);

    impl Module for Pair {
        fn parameters(&self) -> Vec<Value> {
            vec![self.0.clone(), self.1.clone()]
        }
    }

    #[test]
    fn default_has_no_parameters() {
        assert!(Stateless.parameters().is_empty());
        assert_eq!(Stateless.num_params(), 0);
        Stateless.zero_grad();
    }

    #[test]
    fn zero_grad_resets_every_parameter() {
        let pair = Pair(Value::new(1.0), Value::new(-2.0));
        pair.0.set_grad(0.5);
        pair.1.set_grad(-3.0);
        pair.zero_grad();
        assert_eq!(pair.0.grad(), 0.0);
        assert_eq!(pair.1.grad(), 0.0);
        assert_eq!(pair.0.data(), 1.0);
        assert_eq!(pair.1.data(), -2.0);
    }
}
