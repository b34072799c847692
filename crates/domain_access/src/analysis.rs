//! Server-computed analyses. Nothing here is persisted.

use models::{BilanInput, CompSetAnalysis, PricePositionAnalysis};
use remote_client::{FunctionRequest, RemoteClient};
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{
    decode, encode, remote_failure, AccessError, Result, BILAN_ANALYSIS_ERRORS,
    COMPETITIVE_ANALYSIS_ERRORS,
};
use crate::functions::{COMP_SET_ANALYZER, GENERATE_BILAN_ANALYSIS, PRICE_POSITION_ANALYZER};

const BILAN_CONTEXT: &str = "Erreur lors de la génération de l'analyse du bilan";
const COMP_SET_CONTEXT: &str = "Erreur lors de l'analyse de votre jeu concurrentiel";
const PRICE_POSITION_CONTEXT: &str = "Erreur lors de l'analyse du positionnement tarifaire";

/// Sends the yearly rollup to the summarizer and returns its free-text analysis.
pub async fn generate_bilan_analysis(client: &dyn RemoteClient, input: &BilanInput) -> Result<String> {
    let body = encode(input)?;

    let payload = client
        .invoke(GENERATE_BILAN_ANALYSIS, FunctionRequest::new(body))
        .await
        .map_err(|e| remote_failure(BILAN_CONTEXT, BILAN_ANALYSIS_ERRORS, e))?;

    match payload.get("analysis") {
        Some(Value::String(analysis)) => Ok(analysis.clone()),
        _ => {
            warn!("{}: analysis missing or not a string", BILAN_CONTEXT);
            Err(AccessError::InvalidResponse(
                "l'analyse reçue n'est pas un texte".to_string(),
            ))
        }
    }
}

/// Review score of the user's listings against the local competition.
pub async fn analyze_comp_set(client: &dyn RemoteClient) -> Result<CompSetAnalysis> {
    let payload = client
        .invoke(COMP_SET_ANALYZER, FunctionRequest::new(json!({})))
        .await
        .map_err(|e| remote_failure(COMP_SET_CONTEXT, COMPETITIVE_ANALYSIS_ERRORS, e))?;

    decode(COMP_SET_CONTEXT, payload)
}

/// Average nightly price of the user's listings against the local competition.
pub async fn analyze_price_position(client: &dyn RemoteClient) -> Result<PricePositionAnalysis> {
    let payload = client
        .invoke(PRICE_POSITION_ANALYZER, FunctionRequest::new(json!({})))
        .await
        .map_err(|e| remote_failure(PRICE_POSITION_CONTEXT, COMPETITIVE_ANALYSIS_ERRORS, e))?;

    decode(PRICE_POSITION_CONTEXT, payload)
}
