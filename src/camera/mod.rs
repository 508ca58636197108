//! Camera module - spring-damper pan and shrink-only zoom.

mod controller;

pub use controller::*;
