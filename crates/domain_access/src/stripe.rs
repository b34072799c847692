use models::StripePaymentIntent;
use remote_client::{FunctionRequest, RemoteClient};
use serde::Deserialize;
use tracing::debug;

use crate::error::{decode, remote_failure, AccessError, Result, STRIPE_ERRORS};
use crate::functions::STRIPE_PROXY;

const CONTEXT: &str = "Erreur lors de la récupération des paiements Stripe";

pub const DEFAULT_PAYMENT_LIMIT: usize = 100;
const PAYMENT_INTENT_PREFIX: &str = "pi_";

/// How a search term is sent to the Stripe proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentLookup {
    /// The term is a payment intent identifier.
    ById(String),
    /// Recent payments, filtered locally by the term if there is one.
    Recent { limit: usize, term: Option<String> },
}

impl PaymentLookup {
    pub fn from_search(search: Option<&str>, limit: usize) -> Self {
        match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) if term.starts_with(PAYMENT_INTENT_PREFIX) => PaymentLookup::ById(term.to_string()),
            term => PaymentLookup::Recent {
                limit,
                term: term.map(str::to_string),
            },
        }
    }

    fn request(&self) -> FunctionRequest {
        match self {
            PaymentLookup::ById(id) => FunctionRequest::empty().with_query("id", id),
            PaymentLookup::Recent { limit, .. } => FunctionRequest::empty().with_query("limit", limit),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StripePayload {
    List { data: Vec<StripePaymentIntent> },
    Many(Vec<StripePaymentIntent>),
    Single(StripePaymentIntent),
}

impl StripePayload {
    fn into_vec(self) -> Vec<StripePaymentIntent> {
        match self {
            StripePayload::List { data } | StripePayload::Many(data) => data,
            StripePayload::Single(intent) => vec![intent],
        }
    }
}

fn matches_term(intent: &StripePaymentIntent, term: &str) -> bool {
    let term = term.to_lowercase();
    let contains = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&term));
    contains(Some(intent.id.as_str())) || contains(intent.description.as_deref()) || contains(intent.customer.as_deref())
}

/// Payments matching `search`: a `pi_…` term is looked up by identifier,
/// anything else lists the latest `limit` payments.
pub async fn fetch_payments(
    client: &dyn RemoteClient,
    search: Option<&str>,
    limit: usize,
) -> Result<Vec<StripePaymentIntent>> {
    let lookup = PaymentLookup::from_search(search, limit);
    debug!("Stripe lookup {:?}", lookup);

    let payload = client
        .invoke(STRIPE_PROXY, lookup.request())
        .await
        .map_err(|e| remote_failure(CONTEXT, STRIPE_ERRORS, e))?;

    let payments = decode::<StripePayload>(CONTEXT, payload)?.into_vec();

    Ok(match lookup {
        PaymentLookup::Recent { term: Some(term), .. } => payments
            .into_iter()
            .filter(|p| matches_term(p, &term))
            .collect(),
        _ => payments,
    })
}

pub async fn fetch_payment(client: &dyn RemoteClient, payment_id: &str) -> Result<StripePaymentIntent> {
    let payload = client
        .invoke(STRIPE_PROXY, PaymentLookup::ById(payment_id.to_string()).request())
        .await
        .map_err(|e| remote_failure(CONTEXT, STRIPE_ERRORS, e))?;

    decode::<StripePayload>(CONTEXT, payload)?
        .into_vec()
        .into_iter()
        .next()
        .ok_or_else(|| AccessError::InvalidResponse(format!("payment {payment_id} missing from response")))
}
