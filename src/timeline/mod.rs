//! Timeline module - typing simulation and frame-to-content resolution.

mod generator;
mod resolver;

pub use generator::*;
pub use resolver::*;
