//! Domain access functions
//!
//! One function per business capability, each wrapping exactly one remote
//! call through a borrowed `RemoteClient` and normalizing its error into an
//! `AccessError` whose `Display` is ready to show to the user.

pub mod accountant;
pub mod analysis;
pub mod booklet;
pub mod ecowatt;
pub mod email;
pub mod error;
pub mod invoice_viewers;
pub mod rehousing;
pub mod reviews;
pub mod settings;
pub mod stripe;

pub use error::{map_error, AccessError, ErrorRule, Result};

use models::Identity;
use remote_client::RemoteClient;

/// Server-side functions invoked by this crate.
pub mod functions {
    pub const ECOWATT: &str = "ecowatt";
    pub const GENERATE_BILAN_ANALYSIS: &str = "generate-bilan-analysis";
    pub const COMP_SET_ANALYZER: &str = "comp-set-analyzer";
    pub const PRICE_POSITION_ANALYZER: &str = "price-position-analyzer";
    pub const REVYOOS_PROXY: &str = "revyoos-proxy";
    pub const REVIEW_ANALYZER: &str = "review-analyzer";
    pub const STRIPE_PROXY: &str = "stripe-proxy";
}

/// Tables read or written by this crate.
pub mod tables {
    pub const ACCOUNTANT_REQUESTS: &str = "accountant_requests";
    pub const DIGITAL_BOOKLETS: &str = "digital_booklets";
    pub const REHOUSING_NOTES: &str = "rehousing_notes";
    pub const DELEGATED_INVOICE_VIEWERS: &str = "delegated_invoice_viewers";
    pub const SETTINGS: &str = "settings";
}

/// Resolves the signed-in user before a user-scoped write.
pub(crate) async fn require_identity(client: &dyn RemoteClient) -> Result<Identity> {
    match client.current_identity().await {
        Ok(Some(identity)) => Ok(identity),
        Ok(None) => Err(AccessError::Unauthenticated),
        Err(err) => Err(error::remote_failure(
            "Impossible de vérifier la session",
            &[],
            err,
        )),
    }
}
