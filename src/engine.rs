//! A scalar reverse-mode autograd node.
//!
//! `Value` is the node contract the network modules are built on: a number,
//! an accumulated gradient, and handles to the nodes that produced it. The
//! arithmetic operators build the graph; `backward` walks it.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;

/// The operation that produced a node, used to route gradients back.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Op {
    Leaf,
    Add,
    Mul,
    Pow(f64),
    ReLU,
    TanH,
}

#[derive(Debug)]
struct Node {
    data: f64,
    grad: f64,
    op: Op,
    prev: Vec<Value>,
}

// Frees a dropped node's predecessors with a worklist instead of recursion,
// so long chains do not exhaust the stack.
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.prev);
        while let Some(Value(rc)) = pending.pop() {
            if let Ok(cell) = Rc::try_unwrap(rc) {
                pending.append(&mut cell.into_inner().prev);
            }
        }
    }
}

/// A shared handle to a scalar node in a computation graph.
///
/// Cloning a `Value` clones the handle, not the node: both handles observe
/// the same data and gradient.
#[derive(Clone)]
pub struct Value(Rc<RefCell<Node>>);

impl Value {
    /// Creates a new leaf node holding `data`, with a zero gradient.
    pub fn new(data: f64) -> Self {
        Value::from_op(data, Op::Leaf, Vec::new())
    }

    fn from_op(data: f64, op: Op, prev: Vec<Value>) -> Self {
        Value(Rc::new(RefCell::new(Node {
            data,
            grad: 0.0,
            op,
            prev,
        })))
    }

    pub fn data(&self) -> f64 {
        self.0.borrow().data
    }

    /// Overwrites the value of this node. Used by optimizers on leaves.
    pub fn set_data(&self, data: f64) {
        self.0.borrow_mut().data = data;
    }

    pub fn grad(&self) -> f64 {
        self.0.borrow().grad
    }

    pub fn set_grad(&self, grad: f64) {
        self.0.borrow_mut().grad = grad;
    }

    pub fn zero_grad(&self) {
        self.set_grad(0.0);
    }

    /// Returns handles to the nodes this node was computed from.
    pub fn predecessors(&self) -> Vec<Value> {
        self.0.borrow().prev.clone()
    }

    /// Returns true if both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Rectified linear unit: `max(0, x)`.
    pub fn relu(&self) -> Value {
        let data = self.data();
        let out = if data > 0.0 { data } else { 0.0 };
        Value::from_op(out, Op::ReLU, vec![self.clone()])
    }

    /// Hyperbolic tangent.
    pub fn tanh(&self) -> Value {
        Value::from_op(self.data().tanh(), Op::TanH, vec![self.clone()])
    }

    /// Raises this node to a constant power.
    pub fn pow(&self, exponent: f64) -> Value {
        Value::from_op(
            self.data().powf(exponent),
            Op::Pow(exponent),
            vec![self.clone()],
        )
    }

    /// Backpropagates from this node, accumulating `d self / d node` into
    /// the gradient of every node reachable from it.
    ///
    /// The gradient of this node is reset to 1.0; gradients of the other
    /// nodes are added to, so call `zero_grad` on the leaves between passes.
    pub fn backward(&self) {
        let order = self.topological_order();
        self.set_grad(1.0);
        for node in order.iter().rev() {
            node.propagate();
        }
    }

    /// Pushes this node's gradient into its predecessors.
    fn propagate(&self) {
        let (op, data, grad, prev) = {
            let node = self.0.borrow();
            (node.op, node.data, node.grad, node.prev.clone())
        };
        match op {
            Op::Leaf => {}
            Op::Add => {
                for p in &prev {
                    p.accumulate(grad);
                }
            }
            Op::Mul => {
                let (a, b) = (prev[0].data(), prev[1].data());
                prev[0].accumulate(b * grad);
                prev[1].accumulate(a * grad);
            }
            Op::Pow(exponent) => {
                let x = prev[0].data();
                prev[0].accumulate(exponent * x.powf(exponent - 1.0) * grad);
            }
            Op::ReLU => {
                if data > 0.0 {
                    prev[0].accumulate(grad);
                }
            }
            Op::TanH => prev[0].accumulate((1.0 - data * data) * grad),
        }
    }

    fn accumulate(&self, delta: f64) {
        self.0.borrow_mut().grad += delta;
    }

    fn id(&self) -> *const RefCell<Node> {
        Rc::as_ptr(&self.0)
    }

    /// Returns every node reachable from this one, each after all of its
    /// predecessors. Iterative so deep graphs do not exhaust the stack.
    fn topological_order(&self) -> Vec<Value> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![(self.clone(), false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
                continue;
            }
            if !visited.insert(node.id()) {
                continue;
            }
            stack.push((node.clone(), true));
            for p in node.0.borrow().prev.iter() {
                if !visited.contains(&p.id()) {
                    stack.push((p.clone(), false));
                }
            }
        }
        order
    }
}

impl From<f64> for Value {
    fn from(data: f64) -> Self {
        Value::new(data)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let node = self.0.borrow();
        write!(f, "Value(data={}, grad={})", node.data, node.grad)
    }
}

/// Wraps each number in a fresh leaf node.
pub fn values(data: &[f64]) -> Vec<Value> {
    data.iter().map(|&x| Value::new(x)).collect()
}

fn add(a: &Value, b: &Value) -> Value {
    Value::from_op(a.data() + b.data(), Op::Add, vec![a.clone(), b.clone()])
}

fn mul(a: &Value, b: &Value) -> Value {
    Value::from_op(a.data() * b.data(), Op::Mul, vec![a.clone(), b.clone()])
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $f:ident) => {
        impl<'a, 'b> $trait<&'b Value> for &'a Value {
            type Output = Value;
            fn $method(self, rhs: &'b Value) -> Value {
                $f(self, rhs)
            }
        }

        impl<'b> $trait<&'b Value> for Value {
            type Output = Value;
            fn $method(self, rhs: &'b Value) -> Value {
                $f(&self, rhs)
            }
        }

        impl<'a> $trait<Value> for &'a Value {
            type Output = Value;
            fn $method(self, rhs: Value) -> Value {
                $f(self, &rhs)
            }
        }

        impl $trait<Value> for Value {
            type Output = Value;
            fn $method(self, rhs: Value) -> Value {
                $f(&self, &rhs)
            }
        }

        impl<'a> $trait<f64> for &'a Value {
            type Output = Value;
            fn $method(self, rhs: f64) -> Value {
                $f(self, &Value::new(rhs))
            }
        }

        impl $trait<f64> for Value {
            type Output = Value;
            fn $method(self, rhs: f64) -> Value {
                $f(&self, &Value::new(rhs))
            }
        }

        impl<'b> $trait<&'b Value> for f64 {
            type Output = Value;
            fn $method(self, rhs: &'b Value) -> Value {
                $f(&Value::new(self), rhs)
            }
        }

        impl $trait<Value> for f64 {
            type Output = Value;
            fn $method(self, rhs: Value) -> Value {
                $f(&Value::new(self), &rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, add);
impl_binary_op!(Mul, mul, mul);

impl<'a> Neg for &'a Value {
    type Output = Value;
    fn neg(self) -> Value {
        self * -1.0
    }
}

impl Neg for Value {
    type Output = Value;
    fn neg(self) -> Value {
        &self * -1.0
    }
}

impl<'a, 'b> Sub<&'b Value> for &'a Value {
    type Output = Value;
    fn sub(self, rhs: &'b Value) -> Value {
        self + &(-rhs)
    }
}

impl Sub<Value> for Value {
    type Output = Value;
    fn sub(self, rhs: Value) -> Value {
        &self - &rhs
    }
}

impl<'a> Sub<f64> for &'a Value {
    type Output = Value;
    fn sub(self, rhs: f64) -> Value {
        self + -rhs
    }
}

impl Sub<f64> for Value {
    type Output = Value;
    fn sub(self, rhs: f64) -> Value {
        &self + -rhs
    }
}
