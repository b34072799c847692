//! Key-value reads from the `settings` table

use models::{Setting, SettingKey};
use remote_client::{RemoteClient, RemoteError, TableQuery};
use serde_json::Value;
use tracing::debug;

use crate::error::{decode, remote_failure, Result};
use crate::tables::SETTINGS;

const CONTEXT: &str = "Erreur lors du chargement des paramètres";

/// Shown when the app version cannot be read.
pub const FALLBACK_APP_VERSION: &str = "1.0.0.0";

/// Value of `key`; `None` when the row is missing or its value is blank.
pub async fn fetch_setting(client: &dyn RemoteClient, key: SettingKey) -> Result<Option<String>> {
    match read_setting(client, key).await {
        Ok(row) => row.map(|row| decode::<Setting>(CONTEXT, row)).transpose().map(non_blank),
        Err(err) => Err(remote_failure(CONTEXT, &[], err)),
    }
}

async fn read_setting(
    client: &dyn RemoteClient,
    key: SettingKey,
) -> std::result::Result<Option<Value>, RemoteError> {
    let query = TableQuery::select(SETTINGS).eq("key", key.as_str()).single();
    match client.query(query).await {
        Ok(row) => Ok(Some(row)),
        Err(err) if err.is_no_rows() => Ok(None),
        Err(err) => Err(err),
    }
}

/// Strings are returned as stored; structured values as their JSON text.
fn non_blank(setting: Option<Setting>) -> Option<String> {
    let text = match setting?.value? {
        Value::Null => return None,
        Value::String(text) => text,
        other => other.to_string(),
    };
    Some(text).filter(|v| !v.trim().is_empty())
}

pub async fn email_template(client: &dyn RemoteClient) -> Result<Option<String>> {
    fetch_setting(client, SettingKey::EmailTemplate).await
}

pub async fn contact_info(client: &dyn RemoteClient) -> Result<Option<String>> {
    fetch_setting(client, SettingKey::ContactInfo).await
}

pub async fn cguv_version(client: &dyn RemoteClient) -> Result<Option<String>> {
    fetch_setting(client, SettingKey::CguvVersion).await
}

pub async fn migration_notice(client: &dyn RemoteClient) -> Result<Option<String>> {
    fetch_setting(client, SettingKey::MigrationNotice).await
}

pub async fn faq_content(client: &dyn RemoteClient) -> Result<Option<String>> {
    fetch_setting(client, SettingKey::FaqContent).await
}

/// App version for display. Never fails: any error or empty value yields
/// `FALLBACK_APP_VERSION`.
pub async fn app_version(client: &dyn RemoteClient) -> String {
    let version = match read_setting(client, SettingKey::AppVersion).await {
        Ok(row) => non_blank(row.and_then(|row| serde_json::from_value(row).ok())),
        Err(err) => {
            debug!("App version unavailable ({})", err);
            None
        }
    };

    version.unwrap_or_else(|| {
        debug!("Using fallback app version {}", FALLBACK_APP_VERSION);
        FALLBACK_APP_VERSION.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use remote_client::{MemoryClient, RemoteError};
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_setting_by_key() {
        let client = MemoryClient::new();
        client.seed(
            SETTINGS,
            vec![
                json!({"key": "cguv_version", "value": "2026-03"}),
                json!({"key": "faq_content", "value": "   "}),
            ],
        );

        assert_eq!(cguv_version(&client).await.unwrap().as_deref(), Some("2026-03"));
        assert_eq!(faq_content(&client).await.unwrap(), None);
        assert_eq!(migration_notice(&client).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_structured_setting_is_returned_as_json() {
        let client = MemoryClient::new();
        client.seed(
            SETTINGS,
            vec![json!({"key": "contact_info", "value": {"phone": "+33 1 23 45 67 89"}})],
        );

        let raw = contact_info(&client).await.unwrap().unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["phone"], "+33 1 23 45 67 89");
    }

    #[tokio::test]
    async fn test_app_version_from_settings() {
        let client = MemoryClient::new();
        client.seed(SETTINGS, vec![json!({"key": "app_version", "value": "2.4.1.0"})]);
        assert_eq!(app_version(&client).await, "2.4.1.0");
    }

    #[tokio::test]
    async fn test_app_version_falls_back_silently() {
        let missing = MemoryClient::new();
        assert_eq!(app_version(&missing).await, FALLBACK_APP_VERSION);

        let empty = MemoryClient::new();
        empty.seed(SETTINGS, vec![json!({"key": "app_version", "value": null})]);
        assert_eq!(app_version(&empty).await, FALLBACK_APP_VERSION);

        let failing = MemoryClient::new();
        failing.fail_table(SETTINGS, RemoteError::Transport("offline".to_string()));
        assert_eq!(app_version(&failing).await, "1.0.0.0");
    }

    #[tokio::test]
    async fn test_other_settings_do_not_swallow_errors() {
        let client = MemoryClient::new();
        client.fail_table(SETTINGS, RemoteError::server("JWT expired"));
        let err = email_template(&client).await.unwrap_err();
        assert_eq!(err.to_string(), "JWT expired");
    }
}
