extern crate itertools;
#[macro_use]
extern crate log;
extern crate rand;
#[macro_use]
extern crate serde_derive;
extern crate thiserror;

pub mod activator;
pub mod engine;
pub mod error;
pub mod feed_forward;
pub mod layer;
pub mod module;
pub mod neuron;

pub use engine::Value;
pub use error::{Error, Result};
pub use feed_forward::Network;
pub use module::Module;
