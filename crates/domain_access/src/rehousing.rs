use models::{NewRehousingNote, RehousingNote};
use remote_client::{RemoteClient, TableQuery};
use serde_json::Value;

use crate::error::{decode, encode, remote_failure, Result};
use crate::require_identity;
use crate::tables::REHOUSING_NOTES;

const CREATE_CONTEXT: &str = "Erreur lors de la création de la note de relogement";
const LIST_CONTEXT: &str = "Erreur lors de la récupération des notes de relogement";

/// Stores a note for the signed-in user. Notes are never updated afterwards.
pub async fn create_note(client: &dyn RemoteClient, note: &NewRehousingNote) -> Result<RehousingNote> {
    let identity = require_identity(client).await?;

    let mut row = encode(note)?;
    if let Value::Object(map) = &mut row {
        map.insert("user_id".to_string(), Value::String(identity.id));
    }

    let created = client
        .query(TableQuery::insert(REHOUSING_NOTES, row).single())
        .await
        .map_err(|e| remote_failure(CREATE_CONTEXT, &[], e))?;

    decode(CREATE_CONTEXT, created)
}

/// Notes of `user_id`, newest first.
pub async fn list_notes(client: &dyn RemoteClient, user_id: &str) -> Result<Vec<RehousingNote>> {
    let rows = client
        .query(
            TableQuery::select(REHOUSING_NOTES)
                .eq("user_id", user_id)
                .order_desc("created_at"),
        )
        .await
        .map_err(|e| remote_failure(LIST_CONTEXT, &[], e))?;

    decode(LIST_CONTEXT, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccessError;
    use models::RehousingNoteType;
    use remote_client::{MemoryClient, RemoteError};
    use serde_json::json;

    fn note() -> NewRehousingNote {
        NewRehousingNote {
            note_type: RehousingNoteType::Rehousing,
            amount_received: 640.0,
            amount_to_transfer: 520.0,
            comment: Some("Dégât des eaux, relogement 3 nuits".to_string()),
            recipient_name: "Hôtel du Port".to_string(),
            recipient_iban: "FR7630006000011234567890189".to_string(),
            recipient_bic: None,
        }
    }

    #[tokio::test]
    async fn test_create_note_requires_identity_before_any_call() {
        let client = MemoryClient::new();

        let err = create_note(&client, &note()).await.unwrap_err();
        assert_eq!(err, AccessError::Unauthenticated);
        assert_eq!(client.network_calls(), 0);
    }

    #[tokio::test]
    async fn test_create_note_attaches_user_id() {
        let client = MemoryClient::signed_in("user-7");

        let created = create_note(&client, &note()).await.unwrap();
        assert_eq!(created.user_id, "user-7");
        assert_eq!(created.recipient_name, "Hôtel du Port");
        assert_eq!(client.rows(REHOUSING_NOTES).len(), 1);
    }

    #[tokio::test]
    async fn test_list_notes_newest_first() {
        let client = MemoryClient::new();
        let row = |id: &str, user: &str, created_at: &str| {
            json!({
                "id": id,
                "user_id": user,
                "note_type": "compensation",
                "amount_received": 100.0,
                "amount_to_transfer": 80.0,
                "recipient_name": "Jean Dupont",
                "recipient_iban": "FR7612345",
                "created_at": created_at,
            })
        };
        client.seed(
            REHOUSING_NOTES,
            vec![
                row("n1", "user-7", "2026-03-01T10:00:00Z"),
                row("n2", "user-8", "2026-04-01T10:00:00Z"),
                row("n3", "user-7", "2026-05-01T10:00:00Z"),
            ],
        );

        let notes = list_notes(&client, "user-7").await.unwrap();
        let ids: Vec<&str> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n3", "n1"]);
        assert_eq!(notes[0].note_type, RehousingNoteType::Compensation);
    }

    #[tokio::test]
    async fn test_list_notes_transport_error_is_wrapped() {
        let client = MemoryClient::new();
        client.fail_table(REHOUSING_NOTES, RemoteError::Transport("timed out".to_string()));

        let err = list_notes(&client, "user-7").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Erreur lors de la récupération des notes de relogement: Transport error: timed out"
        );
    }
}
