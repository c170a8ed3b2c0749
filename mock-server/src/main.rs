use knack_mock::Credentials;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let defaults = Credentials::default();
    let credentials = Credentials {
        application_id: std::env::var("KNACK_APPLICATION_ID").unwrap_or(defaults.application_id),
        api_key: std::env::var("KNACK_API_KEY").unwrap_or(defaults.api_key),
        token: std::env::var("KNACK_TOKEN").unwrap_or(defaults.token),
    };

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!(%addr, application_id = %credentials.application_id, "mock Knack API listening");
    knack_mock::run(listener, credentials).await
}
