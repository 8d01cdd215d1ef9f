use async_trait::async_trait;
use tracing::info;

use summit_ports::error::NotifyError;
use summit_ports::outbound::EscalationNotifier;
use summit_ports::types::{EscalationEmail, NotifyResult};

/// Log-only notifier for deployments without an outbound mail relay.
/// Delivery is the line in the log; the engine treats it as sent.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EscalationNotifier for LoggingNotifier {
    async fn send_escalation_email(
        &self,
        email: &EscalationEmail,
    ) -> Result<NotifyResult, NotifyError> {
        if email.recipient.is_empty() {
            return Err(NotifyError::InvalidRecipient);
        }
        info!(
            recipient = %email.recipient,
            recipient_name = %email.recipient_name,
            reason = %email.reason,
            summary = %email.incident_summary,
            "escalation email"
        );
        Ok(NotifyResult::default())
    }
}
