//! Domain model for College Compass
//!
//! Colleges returned by a search, the user's saved selection and the
//! comparison analysis produced over it.

pub mod domain;
pub mod error;

pub use domain::college::College;
pub use domain::comparison::{ComparisonAnalysis, ComparisonEntry};
pub use domain::selection::{SavedSelection, MIN_COMPARE};
pub use error::CoreError;
