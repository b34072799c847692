//! Hooks wired to domain access functions

use std::sync::Arc;

use domain_access::{ecowatt, reviews, stripe};
use models::{EcowattForecast, Review, StripePaymentIntent};
use remote_client::RemoteClient;

use crate::derived::Derived;

pub type EcowattHook = Derived<EcowattForecast>;

pub fn ecowatt_hook(client: Arc<dyn RemoteClient>) -> EcowattHook {
    Derived::new(move || {
        let client = client.clone();
        async move { ecowatt::fetch_forecast(client.as_ref()).await }
    })
}

pub fn reviews_hook(client: Arc<dyn RemoteClient>, holding_ids: Vec<String>) -> Derived<Vec<Review>> {
    let holding_ids = Arc::new(holding_ids);
    Derived::new(move || {
        let client = client.clone();
        let holding_ids = holding_ids.clone();
        async move { reviews::fetch_reviews(client.as_ref(), Some(holding_ids.as_slice())).await }
    })
}

pub fn payments_hook(
    client: Arc<dyn RemoteClient>,
    search: Option<String>,
    limit: usize,
) -> Derived<Vec<StripePaymentIntent>> {
    Derived::new(move || {
        let client = client.clone();
        let search = search.clone();
        async move { stripe::fetch_payments(client.as_ref(), search.as_deref(), limit).await }
    })
}
