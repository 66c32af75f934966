//! Gemini client for College Compass
//!
//! Schema-constrained JSON generation through the Gemini
//! `generateContent` endpoint.
//!
//! # Architecture
//!
//! - **ResponseSchema**: the output shape sent with each request, also
//!   convertible to standard JSON Schema for local validation
//! - **CompletionProvider**: the `generate(prompt, schema) -> text` seam the
//!   orchestrator depends on
//! - **GeminiClient**: the HTTP implementation of that seam

pub mod client;
pub mod error;
pub mod provider;
pub mod schema;
pub mod types;

pub use client::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use error::{GeminiError, GeminiResult};
pub use provider::CompletionProvider;
pub use schema::{ResponseSchema, SchemaType};
