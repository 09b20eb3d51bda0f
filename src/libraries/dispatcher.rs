use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::recipients::looks_like_e164;
use crate::{
    config::ProviderCredentials,
    models::{AggregateOutcome, DispatchResult},
    services::MessagingProvider,
};

/// Fans one alert body out to every recipient at once
#[derive(Clone)]
pub struct AlertDispatcher {
    provider: Arc<dyn MessagingProvider>,
}

impl AlertDispatcher {
    pub fn new(provider: Arc<dyn MessagingProvider>) -> Self {
        Self { provider }
    }

    /// Send `body` to each recipient concurrently and wait for all of them.
    ///
    /// A failure for one recipient (rejected number, provider outage, even a
    /// panicking send task) is recorded in that recipient's result and never
    /// cancels the others.
    pub async fn dispatch(
        &self,
        credentials: &ProviderCredentials,
        body: &str,
        recipients: &[String],
    ) -> AggregateOutcome {
        info!("Sending SMS to {} contact(s)", recipients.len());

        let credentials = Arc::new(credentials.clone());
        let body: Arc<str> = Arc::from(body);

        let sends = recipients.iter().map(|recipient| {
            if !looks_like_e164(recipient) {
                warn!("Recipient {} does not look like an E.164 number", recipient);
            }

            let provider = self.provider.clone();
            let credentials = credentials.clone();
            let body = body.clone();
            let recipient = recipient.clone();

            let task = tokio::spawn({
                let recipient = recipient.clone();
                async move { send_one(provider.as_ref(), &credentials, &recipient, &body).await }
            });

            async move {
                match task.await {
                    Ok(result) => result,
                    Err(e) => {
                        error!("Send task for {} did not complete: {}", recipient, e);
                        DispatchResult::failed(recipient, format!("send task failed: {}", e))
                    }
                }
            }
        });

        let results = join_all(sends).await;
        let outcome = AggregateOutcome::from_results(results);

        info!(
            "Results: {} sent, {} failed",
            outcome.sent_count, outcome.failed_count
        );

        outcome
    }
}

async fn send_one(
    provider: &dyn MessagingProvider,
    credentials: &ProviderCredentials,
    recipient: &str,
    body: &str,
) -> DispatchResult {
    match provider.send(credentials, recipient, body).await {
        Ok(receipt) => {
            info!("SMS sent to {}: {}", recipient, receipt.message_id);
            DispatchResult::sent(recipient, receipt.message_id)
        }
        Err(e) => {
            warn!("Failed to send to {}: {}", recipient, e);
            DispatchResult::failed(recipient, e.to_string())
        }
    }
}
