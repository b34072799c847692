use models::DelegatedInvoiceViewer;
use remote_client::{RemoteClient, TableQuery};
use serde_json::json;

use crate::error::{decode, remote_failure, AccessError, Result};
use crate::require_identity;
use crate::tables::DELEGATED_INVOICE_VIEWERS;

const LIST_CONTEXT: &str = "Erreur lors du chargement des accès aux factures";
const ADD_CONTEXT: &str = "Erreur lors de l'ajout d'un accès aux factures";

pub async fn list_viewers(
    client: &dyn RemoteClient,
    owner_id: &str,
) -> Result<Vec<DelegatedInvoiceViewer>> {
    let rows = client
        .query(
            TableQuery::select(DELEGATED_INVOICE_VIEWERS)
                .eq("owner_id", owner_id)
                .order_asc("created_at"),
        )
        .await
        .map_err(|e| remote_failure(LIST_CONTEXT, &[], e))?;

    decode(LIST_CONTEXT, rows)
}

/// Lets `viewer_email` see the signed-in owner's invoices.
pub async fn add_viewer(client: &dyn RemoteClient, viewer_email: &str) -> Result<DelegatedInvoiceViewer> {
    let email = viewer_email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AccessError::InvalidInput(format!(
            "adresse email invalide: {viewer_email}"
        )));
    }

    let identity = require_identity(client).await?;

    let row = json!({
        "owner_id": identity.id,
        "viewer_email": email,
    });

    let created = client
        .query(TableQuery::insert(DELEGATED_INVOICE_VIEWERS, row).single())
        .await
        .map_err(|e| remote_failure(ADD_CONTEXT, &[], e))?;

    decode(ADD_CONTEXT, created)
}
