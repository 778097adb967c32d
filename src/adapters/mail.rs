use crate::config::{MailBackend, MailConfig};
use crate::domain::model::EmailMessage;
use crate::domain::ports::Notifier;
use crate::utils::error::{RaffleError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody {
    sender: BrevoAddress,
    to: Vec<BrevoAddress>,
    subject: String,
    text_content: String,
}

/// Sends transactional mail through the Brevo HTTP API.
pub struct BrevoNotifier {
    client: Client,
    api_url: String,
    api_key: String,
    sender_email: String,
    sender_name: Option<String>,
}

impl BrevoNotifier {
    pub fn new(config: &MailConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| RaffleError::MissingConfigError {
                field: "mail.api_key".to_string(),
            })?
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            sender_email: config.sender_email.clone(),
            sender_name: config.sender_name.clone(),
        })
    }
}

#[async_trait]
impl Notifier for BrevoNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        let body = BrevoSendEmailBody {
            sender: BrevoAddress {
                email: self.sender_email.clone(),
                name: self.sender_name.clone(),
            },
            to: vec![BrevoAddress {
                email: message.to_email.clone(),
                name: message.to_name.clone(),
            }],
            subject: message.subject.clone(),
            text_content: message.text_body.clone(),
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| RaffleError::NotificationFailure {
                message: format!("Brevo request failed: {e}"),
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(to = %message.to_email, "📧 Email accepted by Brevo");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(RaffleError::NotificationFailure {
            message: format!("Brevo send failed (status={}): {text}", status.as_u16()),
        })
    }
}

/// Writes every message to the log. Used for local runs and demos.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        tracing::info!(
            to = %message.to_email,
            subject = %message.subject,
            "📧 Email (log backend)\n{}",
            message.text_body
        );
        Ok(())
    }
}

pub fn build_notifier(config: &MailConfig) -> Result<Arc<dyn Notifier>> {
    match config.backend {
        MailBackend::Brevo => Ok(Arc::new(BrevoNotifier::new(config)?)),
        MailBackend::Log => Ok(Arc::new(LogNotifier)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brevo_requires_api_key() {
        let config = MailConfig {
            backend: MailBackend::Brevo,
            api_key: Some("   ".to_string()),
            ..MailConfig::default()
        };
        let err = BrevoNotifier::new(&config).err().unwrap();
        assert!(matches!(err, RaffleError::MissingConfigError { .. }));
    }

    #[test]
    fn test_body_uses_camel_case() {
        let body = BrevoSendEmailBody {
            sender: BrevoAddress {
                email: "noreply@example.com".to_string(),
                name: None,
            },
            to: vec![BrevoAddress {
                email: "ana@example.com".to_string(),
                name: Some("Ana".to_string()),
            }],
            subject: "Hi".to_string(),
            text_content: "Body".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["textContent"], "Body");
        assert!(json["sender"].get("name").is_none());
        assert_eq!(json["to"][0]["name"], "Ana");
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        let message = EmailMessage {
            to_email: "ana@example.com".to_string(),
            to_name: None,
            subject: "Hi".to_string(),
            text_body: "Body".to_string(),
        };
        assert!(LogNotifier.send(&message).await.is_ok());
    }
}
