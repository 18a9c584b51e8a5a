use std::time::Duration;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const ROLE_USER: &str = "user";

pub const TEMPERATURE: f64 = 0.7;

/// Hard ceiling for one chat-completion round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Response parsing failed: {0}")]
    ParseFailed(#[from] serde_json::Error),

    #[error("Error response from API ({status}): {message}")]
    ErrorResponse { status: StatusCode, message: Box<str> },
}

#[derive(Debug, Serialize, PartialEq)]
pub struct OpenAIRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<OpenAIMessage<'a>>,
    pub temperature: f64,
}

impl<'a> OpenAIRequest<'a> {
    pub fn single_user_message(model: &'a str, content: &'a str) -> Self {
        Self {
            model,
            messages: vec![OpenAIMessage {
                role: ROLE_USER,
                content,
            }],
            temperature: TEMPERATURE,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
pub struct OpenAIMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// Error payload in the `{"error": {"message": ...}}` form most compatible
/// backends use.
#[derive(Debug, Deserialize)]
struct OpenAIError {
    error: OpenAIErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorDetail {
    message: String,
}

/// The reply shapes recognized from an OpenAI-compatible endpoint, in
/// matching order.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmReply {
    ChatChoice(String),
    DirectContent(String),
    PlainString(String),
    Unrecognized(Value),
}

impl LlmReply {
    pub fn classify(value: Value) -> Self {
        if let Some(content) = value
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
        {
            return Self::ChatChoice(content.to_owned());
        }

        if let Some(content) = value
            .get("content")
            .and_then(Value::as_str)
            .filter(|content| !content.is_empty())
        {
            return Self::DirectContent(content.to_owned());
        }

        match value {
            Value::String(text) => Self::PlainString(text),
            other => Self::Unrecognized(other),
        }
    }

    pub fn into_text(self) -> Result<String, ApiError> {
        match self {
            Self::ChatChoice(text) | Self::DirectContent(text) | Self::PlainString(text) => Ok(text),
            Self::Unrecognized(value) => Ok(serde_json::to_string_pretty(&value)?),
        }
    }
}

pub fn build_client() -> Result<reqwest::Client, ApiError> {
    build_client_with_timeout(REQUEST_TIMEOUT)
}

/// Builds an outbound client bounded by `timeout`, with idle connections
/// dropped so every call dials afresh.
pub fn build_client_with_timeout(timeout: Duration) -> Result<reqwest::Client, ApiError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(0)
        .build()?)
}

pub async fn openai_request(
    client: &reqwest::Client,
    infer_url: &str,
    api_key: &str,
    request: &OpenAIRequest<'_>,
) -> Result<LlmReply, ApiError> {
    let response = client
        .post(infer_url)
        .header(http::header::CONTENT_TYPE, "application/json")
        .bearer_auth(api_key)
        .json(request)
        .send()
        .await?;

    let status = response.status();
    let response_text = response.text().await?;

    if !status.is_success() {
        let message = serde_json::from_str::<OpenAIError>(&response_text)
            .map(|error| error.error.message)
            .unwrap_or_else(|_| format!("HTTP error! status: {}", status.as_u16()));
        return Err(ApiError::ErrorResponse {
            status,
            message: message.into(),
        });
    }

    let value: Value = serde_json::from_str(&response_text)?;
    Ok(LlmReply::classify(value))
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    mod classify {
        use super::*;

        #[test]
        fn prefers_first_chat_choice() {
            let reply = LlmReply::classify(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "first"}},
                    {"message": {"role": "assistant", "content": "second"}}
                ],
                "content": "ignored"
            }));
            assert_eq!(reply, LlmReply::ChatChoice("first".into()));
        }

        #[test]
        fn falls_back_to_top_level_content() {
            let reply = LlmReply::classify(json!({"choices": [], "content": "ALT TEXT"}));
            assert_eq!(reply, LlmReply::DirectContent("ALT TEXT".into()));
        }

        #[test]
        fn choice_without_string_content_is_skipped() {
            let reply = LlmReply::classify(json!({
                "choices": [{"message": {"content": null}}],
                "content": "from content"
            }));
            assert_eq!(reply, LlmReply::DirectContent("from content".into()));
        }

        #[test]
        fn empty_top_level_content_is_unrecognized() {
            let reply = LlmReply::classify(json!({"content": ""}));
            assert!(matches!(reply, LlmReply::Unrecognized(_)));
            assert_eq!(reply.into_text().unwrap(), "{\n  \"content\": \"\"\n}");
        }

        #[test]
        fn empty_chat_choice_content_is_kept() {
            let reply = LlmReply::classify(json!({
                "choices": [{"message": {"content": ""}}],
                "content": "unused"
            }));
            assert_eq!(reply, LlmReply::ChatChoice(String::new()));
        }

        #[test]
        fn accepts_bare_string() {
            let reply = LlmReply::classify(json!("PLAIN"));
            assert_eq!(reply, LlmReply::PlainString("PLAIN".into()));
        }

        #[test]
        fn pretty_prints_anything_else_in_original_order() {
            let reply = LlmReply::classify(json!({"zeta": 1, "alpha": [true]}));
            assert!(matches!(reply, LlmReply::Unrecognized(_)));
            assert_eq!(
                reply.into_text().unwrap(),
                "{\n  \"zeta\": 1,\n  \"alpha\": [\n    true\n  ]\n}"
            );
        }

        #[test]
        fn fallback_keeps_non_ascii_text() {
            let reply = LlmReply::classify(json!({"titre": "Créer un récit"}));
            assert_eq!(reply.into_text().unwrap(), "{\n  \"titre\": \"Créer un récit\"\n}");
        }

        #[test]
        fn non_object_values_are_unrecognized() {
            assert_eq!(LlmReply::classify(json!(42)).into_text().unwrap(), "42");
            assert_eq!(LlmReply::classify(json!(null)).into_text().unwrap(), "null");
        }
    }

    #[test]
    fn request_body_has_one_user_message() {
        let body = serde_json::to_value(OpenAIRequest::single_user_message("gpt-4o", "hello")).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "messages": [{"role": "user", "content": "hello"}],
                "temperature": 0.7
            })
        );
    }

    #[tokio::test]
    async fn sends_bearer_key_and_json_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("content-type", "application/json")
                    .header("authorization", "Bearer sk-test")
                    .json_body(json!({
                        "model": "m",
                        "messages": [{"role": "user", "content": "c"}],
                        "temperature": 0.7
                    }));
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(json!({"choices": [{"message": {"content": "done"}}]}));
            })
            .await;

        let client = build_client().unwrap();
        let reply = openai_request(
            &client,
            &server.url("/v1/chat/completions"),
            "sk-test",
            &OpenAIRequest::single_user_message("m", "c"),
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(reply, LlmReply::ChatChoice("done".into()));
    }

    #[tokio::test]
    async fn error_message_is_extracted_from_json_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(429)
                    .json_body(json!({"error": {"message": "slow down", "type": "rate_limit"}}));
            })
            .await;

        let client = build_client().unwrap();
        let error = openai_request(&client, &server.url("/"), "k", &OpenAIRequest::single_user_message("m", "c"))
            .await
            .unwrap_err();

        match error {
            ApiError::ErrorResponse { status, message } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert_eq!(message.as_ref(), "slow down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_without_message_is_synthesized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(502).json_body(json!({"error": "just a string"}));
            })
            .await;

        let client = build_client().unwrap();
        let error = openai_request(&client, &server.url("/"), "k", &OpenAIRequest::single_user_message("m", "c"))
            .await
            .unwrap_err();

        match error {
            ApiError::ErrorResponse { status, message } => {
                assert_eq!(status, StatusCode::BAD_GATEWAY);
                assert_eq!(message.as_ref(), "HTTP error! status: 502");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_reply_exceeds_client_timeout() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200)
                    .delay(Duration::from_secs(5))
                    .json_body(json!("late"));
            })
            .await;

        let client = build_client_with_timeout(Duration::from_millis(200)).unwrap();
        let error = openai_request(&client, &server.url("/"), "k", &OpenAIRequest::single_user_message("m", "c"))
            .await
            .unwrap_err();

        match error {
            ApiError::RequestFailed(error) => assert!(error.is_timeout(), "{error:?}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_parse_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let client = build_client().unwrap();
        let error = openai_request(&client, &server.url("/"), "k", &OpenAIRequest::single_user_message("m", "c"))
            .await
            .unwrap_err();

        assert!(matches!(error, ApiError::ParseFailed(_)));
    }
}
