use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{RemoteError, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the backend project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    pub url: String,
    pub anon_key: String,
    /// Endpoint for unauthenticated mail. Defaults to the
    /// `send-unauthenticated-email` function of the project.
    #[serde(default)]
    pub email_endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            email_endpoint: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Loads config from env vars (a `.env` file is honoured):
    /// - `SUPABASE_URL` (required)
    /// - `SUPABASE_ANON_KEY` (required)
    /// - `HELLO_KEYS_EMAIL_ENDPOINT` (optional)
    /// - `HELLO_KEYS_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| RemoteError::Config("SUPABASE_URL is not set".to_string()))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| RemoteError::Config("SUPABASE_ANON_KEY is not set".to_string()))?;
        let email_endpoint = std::env::var("HELLO_KEYS_EMAIL_ENDPOINT").ok();
        let timeout_secs = std::env::var("HELLO_KEYS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Ok(Self {
            url,
            anon_key,
            email_endpoint,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> Result<Url> {
        validate_base_url(&self.url)
    }

    pub fn email_url(&self) -> Result<Url> {
        match &self.email_endpoint {
            Some(endpoint) => parse_checked(endpoint),
            None => self
                .base_url()?
                .join("functions/v1/send-unauthenticated-email")
                .map_err(|e| RemoteError::Config(format!("Invalid email endpoint: {e}"))),
        }
    }
}

/// Parses the project URL. `https` is accepted for any host, plain `http`
/// only for local development hosts. The returned URL always ends with `/`
/// so relative joins keep the full path.
pub fn validate_base_url(base_url: &str) -> Result<Url> {
    let mut url = parse_checked(base_url)?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

fn parse_checked(base_url: &str) -> Result<Url> {
    let url = Url::parse(base_url)
        .map_err(|e| RemoteError::Config(format!("Invalid backend URL {base_url}: {e}")))?;

    let host = url
        .host_str()
        .ok_or_else(|| RemoteError::Config(format!("Backend URL {base_url} is missing a host")))?;

    let is_local = host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1" || host == "[::1]";

    match url.scheme() {
        "https" => {}
        "http" if is_local => {}
        "http" => {
            return Err(RemoteError::Config(format!(
                "Refusing plain http for non-local host '{host}'"
            )))
        }
        other => {
            return Err(RemoteError::Config(format!(
                "Unsupported scheme '{other}' for backend URL"
            )))
        }
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_url_gets_trailing_slash() {
        let url = validate_base_url("https://abc.supabase.co").unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/");
        assert_eq!(
            url.join("rest/v1/settings").unwrap().as_str(),
            "https://abc.supabase.co/rest/v1/settings"
        );
    }

    #[test]
    fn test_plain_http_only_for_local_hosts() {
        assert!(validate_base_url("http://localhost:54321").is_ok());
        assert!(validate_base_url("http://127.0.0.1:54321").is_ok());
        assert!(matches!(
            validate_base_url("http://example.com"),
            Err(RemoteError::Config(_))
        ));
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn test_email_url_defaults_to_project_function() {
        let config = ClientConfig::new("https://abc.supabase.co", "anon");
        assert_eq!(
            config.email_url().unwrap().as_str(),
            "https://abc.supabase.co/functions/v1/send-unauthenticated-email"
        );

        let mut config = config;
        config.email_endpoint = Some("https://mail.hellokeys.fr/send".to_string());
        assert_eq!(config.email_url().unwrap().as_str(), "https://mail.hellokeys.fr/send");
    }

    #[test]
    fn test_timeout_defaults_when_missing_from_json() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"url": "https://abc.supabase.co", "anon_key": "k"}"#).unwrap();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.email_endpoint, None);
    }
}
