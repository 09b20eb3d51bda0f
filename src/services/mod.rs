pub mod geocode;
pub mod messaging;
pub mod twilio;
pub mod weather;

use std::time::Duration;

pub use geocode::GeocodeResolver;
pub use messaging::{MessagingProvider, ProviderError, ProviderReceipt};
pub use twilio::TwilioClient;
pub use weather::WeatherService;

const USER_AGENT: &str = concat!("coastguard-alert-service/", env!("CARGO_PKG_VERSION"));

/// Build the process-wide HTTP client shared by every upstream integration
pub fn http_client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(15))
        .build()
}

/// Flatten an error and its sources into one line for logs and per-recipient details
pub(crate) fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {}", cause));
        source = cause.source();
    }
    message
}
