//! Wire types for the ToolCall resource.
//!
//! [`ProjectedToolCall`] is what crosses the wire to clients. The internal
//! record carrying `tenant`, `idempotencyKey`, `phase`, and `internal` lives
//! in [`crate::domain::ToolCallRecord`] and is never serialized directly to
//! a client.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::status::Status;

/// The client-visible projection of a ToolCall.
///
/// Omits `tenant`, `idempotencyKey`, `phase`, and `internal` per the
/// client-visible-projection invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedToolCall {
    pub toolname: String,
    pub id: String,
    /// RFC 3339 timestamp after which the record is eligible for deletion.
    pub expiration: String,
    pub etag: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sampling_request: Option<SamplingRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elicitation_request: Option<ElicitationRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// A request for the client's LLM to produce a completion the tool consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A prompt asking the client for structured user input before the tool
/// can proceed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElicitationRequest {
    pub message: String,
    pub requested_schema: ElicitationSchema,
}

/// An object schema describing the fields an elicitation response must carry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElicitationSchema {
    pub properties: BTreeMap<String, PrimitiveSchemaDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// A closed union of primitive JSON schema shapes.
///
/// Implemented as a tagged variant keyed on `type`, with the `enum` field
/// overriding `type` to select [`PrimitiveSchemaDefinition::Enum`]. Unknown
/// `type` tags are rejected by the custom deserializer.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveSchemaDefinition {
    String {
        title: Option<String>,
        description: Option<String>,
    },
    Number {
        title: Option<String>,
        description: Option<String>,
    },
    Integer {
        title: Option<String>,
        description: Option<String>,
    },
    Boolean {
        title: Option<String>,
        description: Option<String>,
    },
    Enum {
        title: Option<String>,
        description: Option<String>,
        values: Vec<String>,
    },
}

impl Serialize for PrimitiveSchemaDefinition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let (type_tag, title, description, values) = match self {
            Self::String { title, description } => ("string", title, description, None),
            Self::Number { title, description } => ("number", title, description, None),
            Self::Integer { title, description } => ("integer", title, description, None),
            Self::Boolean { title, description } => ("boolean", title, description, None),
            Self::Enum {
                title,
                description,
                values,
            } => ("string", title, description, Some(values)),
        };

        let mut len = 1;
        if title.is_some() {
            len += 1;
        }
        if description.is_some() {
            len += 1;
        }
        if values.is_some() {
            len += 1;
        }

        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("type", type_tag)?;
        if let Some(t) = title {
            map.serialize_entry("title", t)?;
        }
        if let Some(d) = description {
            map.serialize_entry("description", d)?;
        }
        if let Some(v) = values {
            map.serialize_entry("enum", v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PrimitiveSchemaDefinition {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(rename = "type")]
            type_tag: String,
            title: Option<String>,
            description: Option<String>,
            #[serde(default)]
            r#enum: Option<Vec<String>>,
        }

        let raw = Raw::deserialize(deserializer)?;
        if let Some(values) = raw.r#enum {
            return Ok(Self::Enum {
                title: raw.title,
                description: raw.description,
                values,
            });
        }

        match raw.type_tag.as_str() {
            "string" => Ok(Self::String {
                title: raw.title,
                description: raw.description,
            }),
            "number" => Ok(Self::Number {
                title: raw.title,
                description: raw.description,
            }),
            "integer" => Ok(Self::Integer {
                title: raw.title,
                description: raw.description,
            }),
            "boolean" => Ok(Self::Boolean {
                title: raw.title,
                description: raw.description,
            }),
            other => Err(serde::de::Error::custom(format!(
                "unknown primitive schema type tag: {other}"
            ))),
        }
    }
}

/// Body of a `POST .../advance` request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceRequest {
    pub action: AdvanceAction,
    #[serde(default)]
    pub content: Option<Value>,
}

/// The client's disposition on an elicitation or sampling request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvanceAction {
    Accept,
    Decline,
}
