use models::{Review, ReviewSynthesis};
use remote_client::{FunctionRequest, RemoteClient};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{decode, remote_failure, Result};
use crate::functions::{REVIEW_ANALYZER, REVYOOS_PROXY};

const REVIEWS_CONTEXT: &str = "Erreur lors de la récupération des avis";
const SYNTHESIS_CONTEXT: &str = "Erreur lors de l'analyse des avis";

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReviewsPayload {
    Wrapped { reviews: Vec<Review> },
    List(Vec<Review>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SynthesisPayload {
    Wrapped { synthesis: ReviewSynthesis },
    Direct(ReviewSynthesis),
}

fn selected(holding_ids: Option<&[String]>) -> Option<&[String]> {
    holding_ids.filter(|ids| !ids.is_empty())
}

/// Reviews aggregated for the given holdings. No holding, no call.
pub async fn fetch_reviews(
    client: &dyn RemoteClient,
    holding_ids: Option<&[String]>,
) -> Result<Vec<Review>> {
    let Some(ids) = selected(holding_ids) else {
        debug!("No holding selected, skipping review fetch");
        return Ok(Vec::new());
    };

    let payload = client
        .invoke(REVYOOS_PROXY, FunctionRequest::new(json!({ "holdingIds": ids })))
        .await
        .map_err(|e| remote_failure(REVIEWS_CONTEXT, &[], e))?;

    if payload.is_null() {
        return Ok(Vec::new());
    }

    Ok(match decode::<ReviewsPayload>(REVIEWS_CONTEXT, payload)? {
        ReviewsPayload::Wrapped { reviews } => reviews,
        ReviewsPayload::List(reviews) => reviews,
    })
}

/// AI synthesis of the reviews of the given holdings. No holding, trivial result.
pub async fn fetch_review_synthesis(
    client: &dyn RemoteClient,
    holding_ids: Option<&[String]>,
) -> Result<ReviewSynthesis> {
    let Some(ids) = selected(holding_ids) else {
        debug!("No holding selected, skipping review synthesis");
        return Ok(ReviewSynthesis::default());
    };

    let payload = client
        .invoke(REVIEW_ANALYZER, FunctionRequest::new(json!({ "holdingIds": ids })))
        .await
        .map_err(|e| remote_failure(SYNTHESIS_CONTEXT, &[], e))?;

    if payload == Value::Null {
        return Ok(ReviewSynthesis::default());
    }

    Ok(match decode::<SynthesisPayload>(SYNTHESIS_CONTEXT, payload)? {
        SynthesisPayload::Wrapped { synthesis } => synthesis,
        SynthesisPayload::Direct(synthesis) => synthesis,
    })
}
