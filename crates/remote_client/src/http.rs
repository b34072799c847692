//! HTTP implementation of `RemoteClient` for a Supabase project

use std::time::Duration;

use async_trait::async_trait;
use models::Identity;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::client::{FunctionRequest, RemoteClient};
use crate::config::ClientConfig;
use crate::error::{RemoteError, Result};
use crate::query::{Operation, TableQuery};

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

#[derive(Debug, Clone)]
struct Session {
    access_token: String,
    user: Option<Identity>,
}

/// `RemoteClient` over the project's REST, functions and auth endpoints.
#[derive(Debug)]
pub struct SupabaseClient {
    http: Client,
    base_url: Url,
    anon_key: String,
    session: RwLock<Option<Session>>,
}

impl SupabaseClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "apikey",
            HeaderValue::from_str(&config.anon_key)
                .map_err(|e| RemoteError::Config(format!("Invalid anon key: {e}")))?,
        );

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RemoteError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            anon_key: config.anon_key.clone(),
            session: RwLock::new(None),
        })
    }

    /// Reuses an access token obtained elsewhere (e.g. a stored session).
    pub async fn set_access_token(&self, access_token: impl Into<String>) {
        *self.session.write().await = Some(Session {
            access_token: access_token.into(),
            user: None,
        });
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Identity> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        debug!("Signing in {}", email);

        let response = self
            .http
            .post(url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        let body = read_json(response).await?;
        let token: TokenResponse = serde_json::from_value(body)?;

        *self.session.write().await = Some(Session {
            access_token: token.access_token,
            user: Some(token.user.clone()),
        });

        Ok(token.user)
    }

    pub async fn sign_out(&self) {
        *self.session.write().await = None;
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| RemoteError::Config(format!("Invalid endpoint {path}: {e}")))
    }

    async fn bearer(&self) -> String {
        match self.session.read().await.as_ref() {
            Some(session) => format!("Bearer {}", session.access_token),
            None => format!("Bearer {}", self.anon_key),
        }
    }
}

#[async_trait]
impl RemoteClient for SupabaseClient {
    async fn invoke(&self, function: &str, request: FunctionRequest) -> Result<Value> {
        let mut url = self.endpoint(&format!("functions/v1/{function}"))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }

        debug!("Invoking function {}", function);

        let mut builder = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer().await);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        read_json(response).await.inspect_err(|e| {
            warn!("Function {} failed: {}", function, e);
        })
    }

    async fn query(&self, query: TableQuery) -> Result<Value> {
        let mut url = self.endpoint(&format!("rest/v1/{}", query.table))?;
        let pairs = query.to_query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let (method, body, prefer) = match &query.operation {
            Operation::Select => (Method::GET, None, None),
            Operation::Insert(row) => (Method::POST, Some(row), Some("return=representation")),
            Operation::Upsert { row, .. } => (
                Method::POST,
                Some(row),
                Some("resolution=merge-duplicates,return=representation"),
            ),
        };

        debug!("{} {}", method, query.table);

        let mut builder = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, self.bearer().await);
        if let Some(prefer) = prefer {
            builder = builder.header("Prefer", prefer);
        }
        if query.single {
            builder = builder.header(ACCEPT, SINGLE_OBJECT);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        read_json(response).await
    }

    async fn current_identity(&self) -> Result<Option<Identity>> {
        let session = self.session.read().await.clone();
        let Some(session) = session else {
            return Ok(None);
        };
        if let Some(user) = session.user {
            return Ok(Some(user));
        }

        let response = self
            .http
            .get(self.endpoint("auth/v1/user")?)
            .header(AUTHORIZATION, format!("Bearer {}", session.access_token))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            debug!("Access token rejected, treating as signed out");
            return Ok(None);
        }

        let user: Identity = serde_json::from_value(read_json(response).await?)?;

        if let Some(current) = self.session.write().await.as_mut() {
            if current.access_token == session.access_token {
                current.user = Some(user.clone());
            }
        }

        Ok(Some(user))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: Identity,
}

/// Error payloads differ between REST (`message`, `code`), functions
/// (`error`) and auth (`msg`, `error_description`).
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<Value>,
    msg: Option<String>,
    error_description: Option<String>,
    code: Option<Value>,
}

impl ErrorBody {
    fn message(&self) -> Option<String> {
        let from_error = self.error.as_ref().and_then(|e| match e {
            Value::String(s) => Some(s.clone()),
            Value::Object(obj) => obj.get("message").and_then(|m| m.as_str()).map(str::to_string),
            _ => None,
        });

        self.message
            .clone()
            .or(from_error)
            .or_else(|| self.error_description.clone())
            .or_else(|| self.msg.clone())
    }

    fn code(&self) -> Option<String> {
        match &self.code {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Splits a response into payload or error. An empty success body is `null`.
pub(crate) async fn read_json(response: Response) -> Result<Value> {
    let status = response.status();
    let text = response.text().await?;

    if status.is_success() {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        return Ok(serde_json::from_str(&text)?);
    }

    let parsed: ErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = parsed.message().unwrap_or_else(|| {
        if text.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        } else {
            text.clone()
        }
    });

    Err(RemoteError::Server {
        status: Some(status.as_u16()),
        code: parsed.code(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_supabase_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SupabaseClient>();
    }

    #[test]
    fn test_error_body_prefers_message_then_error() {
        let body: ErrorBody = serde_json::from_value(json!({
            "code": "PGRST116",
            "message": "JSON object requested, multiple (or no) rows returned",
        }))
        .unwrap();
        assert_eq!(body.code().as_deref(), Some("PGRST116"));
        assert!(body.message().unwrap().starts_with("JSON object"));

        let body: ErrorBody = serde_json::from_value(json!({"error": "No rooms found for user"})).unwrap();
        assert_eq!(body.message().as_deref(), Some("No rooms found for user"));

        let body: ErrorBody =
            serde_json::from_value(json!({"error": {"message": "Stripe unavailable"}})).unwrap();
        assert_eq!(body.message().as_deref(), Some("Stripe unavailable"));

        let body: ErrorBody =
            serde_json::from_value(json!({"error_description": "Invalid login credentials"})).unwrap();
        assert_eq!(body.message().as_deref(), Some("Invalid login credentials"));
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let config = ClientConfig::new("http://example.com", "anon");
        assert!(matches!(SupabaseClient::new(&config), Err(RemoteError::Config(_))));
    }
}
