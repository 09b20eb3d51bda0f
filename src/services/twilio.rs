use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error_chain;
use super::messaging::{MessagingProvider, ProviderError, ProviderReceipt};
use crate::config::ProviderCredentials;

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SmsRequest<'a> {
    body: &'a str,
    from: &'a str,
    to: &'a str,
}

#[derive(Debug, Deserialize)]
struct SmsResponse {
    sid: String,
}

/// Twilio's error document, returned alongside any non-2xx status
#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    #[serde(default)]
    code: Option<u32>,
    message: String,
}

/// Twilio Programmable Messaging over its REST API
#[derive(Debug, Clone)]
pub struct TwilioClient {
    http: reqwest::Client,
    api_base: String,
}

impl TwilioClient {
    pub fn new(http: reqwest::Client, api_base: impl Into<String>) -> Self {
        let api_base: String = api_base.into();
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn messages_url(&self, account_sid: &str) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, account_sid
        )
    }
}

#[async_trait]
impl MessagingProvider for TwilioClient {
    async fn send(
        &self,
        credentials: &ProviderCredentials,
        to: &str,
        body: &str,
    ) -> Result<ProviderReceipt, ProviderError> {
        let response = self
            .http
            .post(self.messages_url(&credentials.account_sid))
            .basic_auth(&credentials.account_sid, Some(&credentials.auth_token))
            .form(&SmsRequest {
                body,
                from: &credentials.from_number,
                to,
            })
            .send()
            .await
            .map_err(|e| ProviderError::Transport(error_chain(&e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<TwilioErrorResponse>().await {
                Ok(TwilioErrorResponse {
                    code: Some(code),
                    message,
                }) => format!("{} (code {})", message, code),
                Ok(TwilioErrorResponse { message, .. }) => message,
                Err(_) => format!("Twilio returned HTTP {}", status),
            };
            return Err(ProviderError::Rejected(detail));
        }

        let accepted: SmsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(format!("Failed to parse Twilio response: {}", e)))?;

        debug!("Twilio accepted message {} for {}", accepted.sid, to);

        Ok(ProviderReceipt {
            message_id: accepted.sid,
        })
    }
}
