//! Validating decoder for completion output
//!
//! Completion text is untrusted. It is trimmed, parsed as JSON, checked
//! against the JSON Schema equivalent of the declared response schema and
//! only then deserialized, so a missing or mistyped field can never produce
//! a partially populated value.

use std::collections::HashSet;

use compass_core::{College, ComparisonAnalysis};
use gemini::ResponseSchema;
use jsonschema::Validator;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::error::{QueryError, Result};
use crate::prompts::QuerySchemas;

/// Schema violations quoted in an InvalidFormat error
const MAX_REPORTED_VIOLATIONS: usize = 3;

/// A response schema together with its compiled validator
pub struct SchemaDecoder {
    schema: ResponseSchema,
    validator: Validator,
}

impl SchemaDecoder {
    pub fn new(schema: ResponseSchema) -> Result<Self> {
        let validator = jsonschema::validator_for(&schema.to_json_schema())
            .map_err(|e| QueryError::Schema(e.to_string()))?;

        Ok(Self { schema, validator })
    }

    /// Schema sent to the completion service
    pub fn schema(&self) -> &ResponseSchema {
        &self.schema
    }

    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyResponse);
        }

        let value: Value = serde_json::from_str(trimmed)
            .map_err(|e| QueryError::invalid_format(format!("not valid JSON: {}", e)))?;

        let violations: Vec<String> = self
            .validator
            .iter_errors(&value)
            .take(MAX_REPORTED_VIOLATIONS)
            .map(|e| e.to_string())
            .collect();
        if !violations.is_empty() {
            return Err(QueryError::invalid_format(format!(
                "schema mismatch: {}",
                violations.join("; ")
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| QueryError::invalid_format(format!("unexpected shape: {}", e)))
    }
}

/// Decoders for the two query kinds, compiled once per orchestrator
pub struct ResponseDecoders {
    pub search: SchemaDecoder,
    pub compare: SchemaDecoder,
}

impl ResponseDecoders {
    pub fn new() -> Result<Self> {
        Ok(Self {
            search: SchemaDecoder::new(QuerySchemas::search())?,
            compare: SchemaDecoder::new(QuerySchemas::compare())?,
        })
    }

    /// Decode a search response into a college list.
    ///
    /// Every college must hold valid values. Repeated names keep the first
    /// occurrence, since the name is the key within a result set.
    pub fn colleges(&self, text: &str) -> Result<Vec<College>> {
        let colleges: Vec<College> = self.search.decode(text)?;

        for college in &colleges {
            college
                .validate()
                .map_err(|e| QueryError::invalid_format(e.to_string()))?;
        }

        let mut seen = HashSet::new();
        let total = colleges.len();
        let unique: Vec<College> = colleges
            .into_iter()
            .filter(|c| seen.insert(c.name.clone()))
            .collect();

        if unique.len() < total {
            warn!(
                "Dropped {} duplicate college name(s) from search response",
                total - unique.len()
            );
        }

        Ok(unique)
    }

    pub fn comparison(&self, text: &str) -> Result<ComparisonAnalysis> {
        self.compare.decode(text)
    }
}
