use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    storysmith::config::validate();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&*storysmith::config::back_shared::LOG_FILTER))
        .init();

    storysmith::actuators::story::back::serve().await
}
