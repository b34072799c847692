//! Remote client: the single handle to the Hello Keys backend
//!
//! - **RemoteClient**: trait with the three capabilities the application uses
//!   (function invocation, table rows, current identity)
//! - **SupabaseClient**: HTTP implementation against a Supabase project
//! - **MemoryClient**: in-process implementation for offline runs and tests
//! - **EmailSender**: the unauthenticated mail relay, kept outside the client
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use remote_client::{ClientConfig, FunctionRequest, RemoteClient, SupabaseClient};
//!
//! # async fn example() -> Result<(), remote_client::RemoteError> {
//! let config = ClientConfig::from_env()?;
//! let client: Arc<dyn RemoteClient> = Arc::new(SupabaseClient::new(&config)?);
//! let forecast = client.invoke("ecowatt", FunctionRequest::empty()).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod mail;
pub mod memory;
pub mod query;

pub use client::{FunctionRequest, RemoteClient};
pub use config::{validate_base_url, ClientConfig};
pub use error::{RemoteError, Result, NO_ROWS_CODE};
pub use http::SupabaseClient;
pub use mail::{EmailSender, HttpEmailSender, MemoryMailer};
pub use memory::{MemoryClient, RecordedCall};
pub use query::{Operation, Order, TableQuery};
