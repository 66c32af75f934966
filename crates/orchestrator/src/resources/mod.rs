//! RAII resource guards for automatic cleanup.
//!
//! - [`InFlightGuard`] - Lowers a query's in-flight flag on every exit path

mod in_flight;

pub use in_flight::InFlightGuard;
