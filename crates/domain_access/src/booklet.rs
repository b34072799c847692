use models::DigitalBooklet;
use remote_client::{RemoteClient, TableQuery};
use serde_json::{json, Value};

use crate::error::{decode, remote_failure, Result};
use crate::require_identity;
use crate::tables::DIGITAL_BOOKLETS;

const SAVE_CONTEXT: &str = "Erreur lors de l'enregistrement du livret d'accueil";
const FETCH_CONTEXT: &str = "Erreur lors du chargement du livret d'accueil";

/// Saves the signed-in user's booklet. Upserted on `user_id`, so saving
/// again replaces the content instead of adding a second booklet.
pub async fn save_booklet(client: &dyn RemoteClient, content: Value) -> Result<DigitalBooklet> {
    let identity = require_identity(client).await?;

    let row = json!({
        "user_id": identity.id,
        "content": content,
    });

    let saved = client
        .query(TableQuery::upsert(DIGITAL_BOOKLETS, row, "user_id").single())
        .await
        .map_err(|e| remote_failure(SAVE_CONTEXT, &[], e))?;

    decode(SAVE_CONTEXT, saved)
}

/// The booklet of `user_id`, `None` if it was never saved.
pub async fn fetch_booklet(client: &dyn RemoteClient, user_id: &str) -> Result<Option<DigitalBooklet>> {
    match client
        .query(TableQuery::select(DIGITAL_BOOKLETS).eq("user_id", user_id).single())
        .await
    {
        Ok(row) => decode(FETCH_CONTEXT, row).map(Some),
        Err(err) if err.is_no_rows() => Ok(None),
        Err(err) => Err(remote_failure(FETCH_CONTEXT, &[], err)),
    }
}
