use serde::{Deserialize, Serialize};

/// Outcome of sending one composed message to one recipient.
///
/// Serialized with the names the browser client already reads
/// (`phoneNumber`, `sid`, `error`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    #[serde(rename = "phoneNumber")]
    pub recipient: String,
    pub success: bool,
    #[serde(rename = "sid", skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl DispatchResult {
    pub fn sent(recipient: impl Into<String>, provider_message_id: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            success: true,
            provider_message_id: Some(provider_message_id.into()),
            error_detail: None,
        }
    }

    pub fn failed(recipient: impl Into<String>, error_detail: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            success: false,
            provider_message_id: None,
            error_detail: Some(error_detail.into()),
        }
    }
}

/// Tally of a whole dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOutcome {
    pub total_recipients: usize,
    pub sent_count: usize,
    pub failed_count: usize,
    pub per_recipient_results: Vec<DispatchResult>,
    /// At least one recipient was reached.
    pub overall_success: bool,
}

impl AggregateOutcome {
    pub fn from_results(per_recipient_results: Vec<DispatchResult>) -> Self {
        let total_recipients = per_recipient_results.len();
        let sent_count = per_recipient_results.iter().filter(|r| r.success).count();

        Self {
            total_recipients,
            sent_count,
            failed_count: total_recipients - sent_count,
            per_recipient_results,
            overall_success: sent_count > 0,
        }
    }
}
