use std::sync::Arc;

use domain_access::settings;
use remote_client::RemoteClient;
use tokio::sync::OnceCell;

/// App version shown in the footer. Read from the settings store on first
/// access and cached; falls back to `1.0.0.0` without reporting an error.
pub struct AppVersion {
    client: Arc<dyn RemoteClient>,
    value: OnceCell<String>,
}

impl AppVersion {
    pub fn new(client: Arc<dyn RemoteClient>) -> Self {
        Self {
            client,
            value: OnceCell::new(),
        }
    }

    pub async fn get(&self) -> &str {
        self.value
            .get_or_init(|| settings::app_version(self.client.as_ref()))
            .await
    }
}
