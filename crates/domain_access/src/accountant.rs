use models::{AccountantRequest, NewAccountantRequest};
use remote_client::{RemoteClient, TableQuery};
use serde_json::json;

use crate::error::{decode, remote_failure, Result};
use crate::require_identity;
use crate::tables::ACCOUNTANT_REQUESTS;

const CREATE_CONTEXT: &str = "Erreur lors de l'envoi de la demande d'expert-comptable";
const FETCH_CONTEXT: &str = "Erreur lors du chargement de la demande d'expert-comptable";

pub async fn create_request(
    client: &dyn RemoteClient,
    request: &NewAccountantRequest,
) -> Result<AccountantRequest> {
    let identity = require_identity(client).await?;

    let row = json!({
        "user_id": identity.id,
        "status": "pending",
        "message": request.message,
    });

    let created = client
        .query(TableQuery::insert(ACCOUNTANT_REQUESTS, row).single())
        .await
        .map_err(|e| remote_failure(CREATE_CONTEXT, &[], e))?;

    decode(CREATE_CONTEXT, created)
}

/// Most recent request of `user_id`, if any.
pub async fn latest_request(
    client: &dyn RemoteClient,
    user_id: &str,
) -> Result<Option<AccountantRequest>> {
    let query = TableQuery::select(ACCOUNTANT_REQUESTS)
        .eq("user_id", user_id)
        .order_desc("created_at")
        .limit(1)
        .single();

    match client.query(query).await {
        Ok(row) => decode(FETCH_CONTEXT, row).map(Some),
        Err(err) if err.is_no_rows() => Ok(None),
        Err(err) => Err(remote_failure(FETCH_CONTEXT, &[], err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccessError;
    use models::AccountantRequestStatus;
    use remote_client::MemoryClient;

    #[tokio::test]
    async fn test_create_request_is_pending_for_current_user() {
        let client = MemoryClient::signed_in("user-9");

        let created = create_request(
            &client,
            &NewAccountantRequest {
                message: Some("Déclaration LMNP 2025".to_string()),
            },
        )
        .await
        .unwrap();

        assert_eq!(created.user_id, "user-9");
        assert_eq!(created.status, AccountantRequestStatus::Pending);
        assert_eq!(created.message.as_deref(), Some("Déclaration LMNP 2025"));
    }

    #[tokio::test]
    async fn test_create_request_unauthenticated() {
        let client = MemoryClient::new();
        let err = create_request(&client, &NewAccountantRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err, AccessError::Unauthenticated);
        assert_eq!(client.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_latest_request() {
        let client = MemoryClient::new();
        assert_eq!(latest_request(&client, "user-9").await.unwrap(), None);

        client.seed(
            ACCOUNTANT_REQUESTS,
            vec![
                json!({"id": "a1", "user_id": "user-9", "status": "rejected", "created_at": "2025-11-02T08:00:00Z"}),
                json!({"id": "a2", "user_id": "user-9", "status": "accepted", "created_at": "2026-02-10T08:00:00Z"}),
            ],
        );

        let latest = latest_request(&client, "user-9").await.unwrap().unwrap();
        assert_eq!(latest.id, "a2");
        assert_eq!(latest.status, AccountantRequestStatus::Accepted);
    }
}
