pub mod controller;
pub mod decode;
pub mod error;
pub mod prompts;
pub mod query;
pub mod resources;
pub mod store;

pub use controller::{SearchForm, ViewController};
pub use decode::{ResponseDecoders, SchemaDecoder};
pub use error::{QueryError, QueryKind, Result};
pub use query::{PendingCompare, PendingSearch, QueryOrchestrator};
pub use resources::InFlightGuard;
pub use store::{StateStore, StoreSnapshot};
