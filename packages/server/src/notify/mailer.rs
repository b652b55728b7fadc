use async_trait::async_trait;
use serde::Serialize;

use crate::config::MailConfig;

/// A rendered outbound message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail relay rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("mail is misconfigured: {0}")]
    Config(String),
}

/// Outbound message transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> Result<(), MailError>;
}

/// Posts messages as JSON to an HTTP mail relay.
pub struct HttpRelayMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl HttpRelayMailer {
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        if config.endpoint.trim().is_empty() {
            return Err(MailError::Config("mail.endpoint is empty".into()));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpRelayMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        let mut request = self.client.post(&self.endpoint).json(email);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Logs messages instead of sending them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            bytes = email.html.len(),
            "Mail delivery disabled, message not sent"
        );
        Ok(())
    }
}
