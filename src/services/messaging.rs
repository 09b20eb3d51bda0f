use async_trait::async_trait;

use crate::config::ProviderCredentials;

/// Provider acknowledgement for one accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReceipt {
    pub message_id: String,
}

/// A single send failed at the provider. Contained to that recipient.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    #[error("{0}")]
    Rejected(String),

    #[error("provider request failed: {0}")]
    Transport(String),
}

/// Outbound SMS transport.
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    async fn send(
        &self,
        credentials: &ProviderCredentials,
        to: &str,
        body: &str,
    ) -> Result<ProviderReceipt, ProviderError>;
}
