mod health;
pub mod sse;
pub mod view;

pub use health::*;
pub use view::*;
