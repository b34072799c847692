use remote_client::RemoteError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

pub type Result<T> = std::result::Result<T, AccessError>;

/// Errors raised by the domain access functions. `Display` is the message
/// shown to the user.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccessError {
    #[error("Utilisateur non authentifié")]
    Unauthenticated,

    /// The backend supplied a message; it is shown as is.
    #[error("{message}")]
    Remote {
        message: String,
        code: Option<String>,
    },

    /// No server message was available; the original error is embedded.
    #[error("{context}: {detail}")]
    Wrapped {
        context: &'static str,
        detail: String,
    },

    /// A known upstream failure translated through an error table.
    #[error("{0}")]
    Mapped(&'static str),

    #[error("Réponse invalide du serveur: {0}")]
    InvalidResponse(String),

    #[error("Données invalides: {0}")]
    InvalidInput(String),
}

impl AccessError {
    pub fn from_remote(context: &'static str, err: RemoteError) -> Self {
        match err.server_message() {
            Some(message) => AccessError::Remote {
                message: message.to_string(),
                code: err.code().map(str::to_string),
            },
            None => AccessError::Wrapped {
                context,
                detail: err.to_string(),
            },
        }
    }
}

/// One entry of an upstream-error translation table. `code` is matched
/// against the structured error code when the backend sends one, `trigger`
/// against the message text otherwise (case-sensitive substring).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorRule {
    pub code: Option<&'static str>,
    pub trigger: &'static str,
    pub message: &'static str,
}

pub const COMPETITIVE_ANALYSIS_ERRORS: &[ErrorRule] = &[
    ErrorRule {
        code: Some("NO_ROOMS_FOUND"),
        trigger: "No rooms found",
        message: "Impossible de localiser votre logement principal. Vérifiez qu'au moins un logement est rattaché à votre compte.",
    },
    ErrorRule {
        code: Some("USER_CITY_NOT_FOUND"),
        trigger: "User city not found",
        message: "La ville de votre logement principal est introuvable. Complétez son adresse pour lancer l'analyse.",
    },
];

pub const BILAN_ANALYSIS_ERRORS: &[ErrorRule] = &[ErrorRule {
    code: Some("RATE_LIMITED"),
    trigger: "Rate limit",
    message: "Le service d'analyse est momentanément saturé. Réessayez dans quelques minutes.",
}];

pub const STRIPE_ERRORS: &[ErrorRule] = &[ErrorRule {
    code: Some("resource_missing"),
    trigger: "No such payment_intent",
    message: "Aucun paiement ne correspond à cet identifiant.",
}];

/// Looks `err` up in `rules`: structured codes first, then message substrings.
pub fn map_error(rules: &[ErrorRule], err: &RemoteError) -> Option<&'static str> {
    if let Some(code) = err.code() {
        if let Some(rule) = rules.iter().find(|r| r.code == Some(code)) {
            return Some(rule.message);
        }
    }

    let text = err.to_string();
    rules
        .iter()
        .find(|r| text.contains(r.trigger))
        .map(|r| r.message)
}

/// Logs the failure and converts it for the caller.
pub(crate) fn remote_failure(
    context: &'static str,
    rules: &[ErrorRule],
    err: RemoteError,
) -> AccessError {
    warn!("{}: {}", context, err);
    match map_error(rules, &err) {
        Some(message) => AccessError::Mapped(message),
        None => AccessError::from_remote(context, err),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(context: &'static str, payload: Value) -> Result<T> {
    serde_json::from_value(payload).map_err(|e| {
        warn!("{}: unexpected payload: {}", context, e);
        AccessError::InvalidResponse(e.to_string())
    })
}

pub(crate) fn encode<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| AccessError::InvalidInput(e.to_string()))
}
