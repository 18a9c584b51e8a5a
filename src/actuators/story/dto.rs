use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::service::{self, CoercibleResult};

/// Body of `POST /api/create-story`. Absent and `null` fields deserialize to
/// `None` and are rejected by [`CreateStoryRequest::validate`].
#[derive(Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStoryRequest {
    #[serde(default)]
    pub llm_endpoint: Option<Box<str>>,
    #[serde(default)]
    pub model: Option<Box<str>>,
    #[serde(default)]
    pub api_key: Option<Box<str>>,
    #[serde(default)]
    pub requirement: Option<Box<str>>,
}

impl fmt::Debug for CreateStoryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateStoryRequest")
            .field("llm_endpoint", &self.llm_endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("requirement", &self.requirement)
            .finish()
    }
}

/// A request whose fields are all present and trimmed.
pub struct StoryRequest<'a> {
    pub llm_endpoint: &'a str,
    pub model: &'a str,
    pub api_key: &'a str,
    pub requirement: &'a str,
}

fn required<'a>(value: &'a Option<Box<str>>, message: &str) -> service::Result<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(service::Error::BadRequest(message.into())),
    }
}

impl CreateStoryRequest {
    /// Parses a request body. Only a JSON object is accepted; serde would
    /// otherwise also take an array of the fields in declaration order.
    pub fn from_json(body: &[u8]) -> service::Result<Self> {
        match serde_json::from_slice::<Value>(body).into_service_result()? {
            object @ Value::Object(_) => serde_json::from_value(object).into_service_result(),
            other => Err(anyhow::anyhow!("expected a JSON object, got {}", kind(&other)).into()),
        }
    }

    /// Checks fields in declaration order; the first missing one wins.
    pub fn validate(&self) -> service::Result<StoryRequest<'_>> {
        Ok(StoryRequest {
            llm_endpoint: required(&self.llm_endpoint, "LLM Endpoint is required")?,
            model: required(&self.model, "Model is required")?,
            api_key: required(&self.api_key, "API Key is required")?,
            requirement: required(&self.requirement, "Requirement is required")?,
        })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateStoryResponse {
    pub story: String,
}
