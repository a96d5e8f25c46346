use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::NotifierConfig;
use crate::domain::order::{Notifier, NotifyError};

/// A confirmation accepted for delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentConfirmation {
    pub recipient: String,
    pub order_id: i64,
    pub sender: String,
    pub sent_at: DateTime<Utc>,
}

/// Email notifier that validates the recipient and records accepted
/// confirmations in an in-process outbox.
pub struct EmailNotifier {
    sender: String,
    blocked_domains: Vec<String>,
    outbox: Mutex<Vec<SentConfirmation>>,
}

impl EmailNotifier {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            blocked_domains: Vec::new(),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn from_config(config: &NotifierConfig) -> Self {
        let mut notifier = Self::new(config.sender.clone());
        for domain in &config.blocked_domains {
            notifier = notifier.blocking_domain(domain);
        }
        notifier
    }

    pub fn blocking_domain(mut self, domain: &str) -> Self {
        self.blocked_domains.push(domain.to_ascii_lowercase());
        self
    }

    pub fn sent(&self) -> Vec<SentConfirmation> {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn recipient_domain(address: &str) -> Result<&str, NotifyError> {
        match address.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
                Ok(domain)
            }
            _ => Err(NotifyError::InvalidRecipient(address.to_string())),
        }
    }
}

impl Notifier for EmailNotifier {
    fn send_order_confirmation(&self, customer_email: &str, order_id: i64) -> Result<(), NotifyError> {
        let domain = Self::recipient_domain(customer_email)?;

        if self
            .blocked_domains
            .iter()
            .any(|blocked| domain.eq_ignore_ascii_case(blocked))
        {
            return Err(NotifyError::Rejected {
                recipient: customer_email.to_string(),
                reason: format!("domain {} is blocked", domain),
            });
        }

        let confirmation = SentConfirmation {
            recipient: customer_email.to_string(),
            order_id,
            sender: self.sender.clone(),
            sent_at: Utc::now(),
        };

        tracing::info!(
            recipient = %confirmation.recipient,
            order_id = confirmation.order_id,
            sender = %confirmation.sender,
            "📧 Order confirmation sent"
        );

        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(confirmation);
        Ok(())
    }
}
