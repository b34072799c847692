use async_trait::async_trait;
use models::Identity;
use serde_json::Value;

use crate::error::Result;
use crate::query::TableQuery;

/// Body and query string of a server-side function call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionRequest {
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
}

impl FunctionRequest {
    pub fn new(body: Value) -> Self {
        Self {
            body: Some(body),
            query: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Handle to the backend: named functions, table rows and the signed-in user.
///
/// Built once at startup and shared as `Arc<dyn RemoteClient>`; every
/// domain access function borrows it.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Invokes a named server-side function and returns its JSON payload.
    async fn invoke(&self, function: &str, request: FunctionRequest) -> Result<Value>;

    /// Runs one row operation. Returns an array, or an object for `single()` queries.
    async fn query(&self, query: TableQuery) -> Result<Value>;

    /// The signed-in user, `None` when there is no session.
    async fn current_identity(&self) -> Result<Option<Identity>>;
}
