use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alert_service::{app, config::Config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alert_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenv::dotenv().ok();
    let config = Config::from_env().context("Failed to load configuration")?;

    info!("Starting CoastGuard alert service");

    // Missing credentials are reported per request, not fatal at startup
    if config.provider_credentials().is_none() {
        warn!("Twilio credentials not configured. SMS functionality will not work.");
    }
    if config.recipients_raw().is_none() {
        warn!("USER_PHONE_NUMBERS not configured. SOS requests will be rejected.");
    }
    if config.geocode_api_key().is_none() {
        info!("No geocoding key; alerts will carry raw coordinates");
    }

    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", config.port)
        .parse()
        .context("Invalid listen address")?;

    let state = AppState::from_config(config).context("Failed to build HTTP client")?;
    let app = app(state);

    info!("HTTP server listening on {}", addr);
    info!("SMS endpoint: http://{}/api/send-sms", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .await
        .context("Failed to start HTTP server")?;

    info!("Shutting down...");
    Ok(())
}
