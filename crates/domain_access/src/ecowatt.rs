use models::EcowattForecast;
use remote_client::{FunctionRequest, RemoteClient};

use crate::error::{decode, remote_failure, Result};
use crate::functions::ECOWATT;

const CONTEXT: &str = "Erreur lors de la récupération des données Ecowatt";

/// Electrical grid status for the coming days.
pub async fn fetch_forecast(client: &dyn RemoteClient) -> Result<EcowattForecast> {
    let payload = client
        .invoke(ECOWATT, FunctionRequest::empty())
        .await
        .map_err(|e| remote_failure(CONTEXT, &[], e))?;

    decode(CONTEXT, payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AccessError;
    use models::EcowattLevel;
    use remote_client::{MemoryClient, RemoteError};
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_forecast() {
        let client = MemoryClient::new();
        client.respond(
            ECOWATT,
            json!({"signals": [
                {"day": "2026-01-16", "level": 2, "message": "Système électrique tendu"},
                {"day": "2026-01-15", "level": 1, "message": "Pas d'alerte"},
            ]}),
        );

        let forecast = fetch_forecast(&client).await.unwrap();
        assert_eq!(forecast.signals.len(), 2);
        assert_eq!(forecast.earliest().unwrap().level, EcowattLevel::Green);
    }

    #[tokio::test]
    async fn test_fetch_forecast_error() {
        let client = MemoryClient::new();
        client.fail(ECOWATT, RemoteError::Transport("dns error".to_string()));

        let err = fetch_forecast(&client).await.unwrap_err();
        assert!(err.to_string().starts_with(CONTEXT));
    }

    #[tokio::test]
    async fn test_unrelated_object_is_invalid_response() {
        let client = MemoryClient::new();
        client.respond(ECOWATT, json!({"error": "RTE token expired"}));

        let err = fetch_forecast(&client).await.unwrap_err();
        assert!(matches!(err, AccessError::InvalidResponse(_)));
    }
}
