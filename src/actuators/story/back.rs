use std::net::SocketAddr;

use super::dto::{CreateStoryRequest, CreateStoryResponse};
use crate::{
    config::back_shared::{HOST, PORT, STATIC_DIR},
    infer, prompts, service,
};

mod handlers;

pub use handlers::{AppState, build_router};

/// Turns one requirement into a story through the caller's LLM endpoint.
pub async fn create_story(
    client: &reqwest::Client,
    request: &CreateStoryRequest,
) -> service::Result<CreateStoryResponse> {
    let request = request.validate()?;

    tracing::info!(
        endpoint = %endpoint_host(request.llm_endpoint),
        model = request.model,
        "Creating story",
    );

    let prompt = prompts::user_story(request.requirement);
    tracing::debug!(%prompt, "Constructed prompt");

    let story = infer::complete_text(
        client,
        request.llm_endpoint,
        request.api_key,
        request.model,
        &prompt,
    )
    .await?;

    Ok(CreateStoryResponse { story })
}

/// Host part of the endpoint for logging; paths and query strings may carry
/// credentials of their own.
fn endpoint_host(endpoint: &str) -> Box<str> {
    reqwest::Url::parse(endpoint)
        .ok()
        .and_then(|url| url.host_str().map(Into::into))
        .unwrap_or_else(|| "<unparsed>".into())
}

pub async fn serve() -> anyhow::Result<()> {
    let client = infer::build_client()?;
    let router = build_router(AppState::new(client), &STATIC_DIR);

    let addr = SocketAddr::from((*HOST, *PORT));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router.into_make_service()).await?;
    Ok(())
}
