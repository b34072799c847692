//! Plain mail relay used by flows where nobody is signed in

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use models::EmailMessage;
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{RemoteError, Result};
use crate::http::read_json;

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// POSTs `{to, subject, html}` to the relay endpoint. Never carries a user session.
#[derive(Debug, Clone)]
pub struct HttpEmailSender {
    http: Client,
    endpoint: Url,
    anon_key: Option<String>,
}

impl HttpEmailSender {
    pub fn new(endpoint: Url, anon_key: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(crate::config::DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| RemoteError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint,
            anon_key,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.email_url()?, Some(config.anon_key.clone()))
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        debug!("Sending unauthenticated email to {}", message.to);

        let mut builder = self.http.post(self.endpoint.clone()).json(message);
        if let Some(key) = &self.anon_key {
            builder = builder.header("apikey", key);
        }

        let response = builder.send().await?;
        read_json(response).await?;
        Ok(())
    }
}

/// Collects messages instead of sending them.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<EmailMessage>>,
    failure: Mutex<Option<RemoteError>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, error: RemoteError) {
        *lock(&self.failure) = Some(error);
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl EmailSender for MemoryMailer {
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if let Some(err) = lock(&self.failure).clone() {
            return Err(err);
        }
        lock(&self.sent).push(message.clone());
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
