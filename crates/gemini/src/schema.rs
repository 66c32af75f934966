//! Response schema descriptors
//!
//! Gemini accepts an OpenAPI-style subset of JSON Schema as
//! `generationConfig.responseSchema`. The same descriptor converts to
//! standard JSON Schema so callers can validate what comes back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Value type of a schema node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl SchemaType {
    /// Type keyword used by standard JSON Schema
    pub fn json_schema_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

/// A node of the declared output schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ResponseSchema>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, ResponseSchema>,
    /// Declaration order of `properties`, which Gemini uses for output order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_ordering: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ResponseSchema {
    fn of(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            items: None,
            properties: BTreeMap::new(),
            property_ordering: Vec::new(),
            required: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::of(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::of(SchemaType::Number)
    }

    pub fn integer() -> Self {
        Self::of(SchemaType::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(SchemaType::Boolean)
    }

    pub fn object() -> Self {
        Self::of(SchemaType::Object)
    }

    pub fn array(items: ResponseSchema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::of(SchemaType::Array)
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an optional property.
    pub fn property(mut self, name: impl Into<String>, schema: ResponseSchema) -> Self {
        let name = name.into();
        if !self.property_ordering.contains(&name) {
            self.property_ordering.push(name.clone());
        }
        self.properties.insert(name, schema);
        self
    }

    /// Add a property the response must contain.
    pub fn required_property(self, name: impl Into<String>, schema: ResponseSchema) -> Self {
        let name = name.into();
        let mut this = self.property(name.clone(), schema);
        if !this.required.contains(&name) {
            this.required.push(name);
        }
        this
    }

    /// Standard JSON Schema equivalent, for validating returned documents.
    pub fn to_json_schema(&self) -> Value {
        let mut node = Map::new();
        node.insert(
            "type".to_string(),
            Value::String(self.schema_type.json_schema_name().to_string()),
        );

        if let Some(ref description) = self.description {
            node.insert("description".to_string(), Value::String(description.clone()));
        }

        if let Some(ref items) = self.items {
            node.insert("items".to_string(), items.to_json_schema());
        }

        if !self.properties.is_empty() {
            let properties: Map<String, Value> = self
                .properties
                .iter()
                .map(|(name, schema)| (name.clone(), schema.to_json_schema()))
                .collect();
            node.insert("properties".to_string(), Value::Object(properties));
        }

        if !self.required.is_empty() {
            node.insert("required".to_string(), json!(self.required));
        }

        Value::Object(node)
    }
}
