pub mod openai;

pub use openai::{ApiError, LlmReply, OpenAIRequest, build_client};

/// Sends `prompt` as the sole user message and flattens whatever shape the
/// endpoint answers with into plain text.
pub async fn complete_text(
    client: &reqwest::Client,
    infer_url: &str,
    api_key: &str,
    model: &str,
    prompt: &str,
) -> Result<String, ApiError> {
    let request = OpenAIRequest::single_user_message(model, prompt);
    openai::openai_request(client, infer_url, api_key, &request)
        .await?
        .into_text()
}
