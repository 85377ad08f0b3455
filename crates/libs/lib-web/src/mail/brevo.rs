//! Brevo transactional email API (`POST /v3/smtp/email`).

use std::time::Duration;

use async_trait::async_trait;
use lib_core::MailConfig;
use serde::Serialize;
use tracing::{debug, warn};

use super::{MailError, MailMessage, Mailer};

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody {
    sender: BrevoEmailAddress,
    to: Vec<BrevoEmailAddress>,
    subject: String,
    html_content: String,
    text_content: String,
}

pub struct BrevoMailer {
    client: reqwest::Client,
    api_key: String,
    sender_email: String,
    sender_name: String,
    endpoint: String,
}

impl BrevoMailer {
    pub fn new(api_key: String, config: &MailConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            sender_email: config.sender_email.clone(),
            sender_name: config.sender_name.clone(),
            endpoint: BREVO_SEND_URL.to_string(),
        })
    }

    fn body(&self, message: &MailMessage) -> BrevoSendEmailBody {
        BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: self.sender_email.clone(),
                name: Some(self.sender_name.clone()),
            },
            to: vec![BrevoEmailAddress {
                email: message.to_email.clone(),
                name: message.to_name.clone(),
            }],
            subject: message.subject.clone(),
            html_content: message.html.clone(),
            text_content: message.text.clone(),
        }
    }
}

#[async_trait]
impl Mailer for BrevoMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        debug!(to = %message.to_email, subject = %message.subject, "[MAIL] Sending via Brevo");

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .header("Accept", "application/json")
            .json(&self.body(message))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MailError::Timeout
                } else {
                    MailError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "[MAIL] Brevo rejected message");
        Err(MailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_uses_camel_case() {
        let config = MailConfig {
            brevo_api_key: Some("key".to_string()),
            sender_email: "no-reply@example.com".to_string(),
            sender_name: "Exchange".to_string(),
            timeout_secs: 5,
        };
        let mailer = BrevoMailer::new("key".to_string(), &config).unwrap();
        let message = super::super::password_changed_email("ama@example.com", "Ama");

        let json = serde_json::to_value(mailer.body(&message)).unwrap();
        assert_eq!(json["sender"]["email"], "no-reply@example.com");
        assert_eq!(json["to"][0]["name"], "Ama");
        assert!(json["htmlContent"].as_str().unwrap().contains("password"));
        assert!(json.get("textContent").is_some());
    }
}
