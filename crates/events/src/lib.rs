//! Event system for College Compass
//!
//! State changes in the store are published here so views can react
//! without polling.

mod bus;
mod types;

pub use bus::EventBus;
pub use types::*;
