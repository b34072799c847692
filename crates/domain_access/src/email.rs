use models::EmailMessage;
use remote_client::EmailSender;

use crate::error::{remote_failure, AccessError, Result};

const CONTEXT: &str = "Erreur lors de l'envoi de l'email";

/// Sends mail through the relay used before anyone is signed in
/// (password reset, owner invitations). Bypasses the authenticated client.
pub async fn send_unauthenticated_email(
    sender: &dyn EmailSender,
    to: &str,
    subject: &str,
    html: &str,
) -> Result<()> {
    let to = to.trim();
    if to.is_empty() {
        return Err(AccessError::InvalidInput("destinataire manquant".to_string()));
    }

    let message = EmailMessage {
        to: to.to_string(),
        subject: subject.to_string(),
        html: html.to_string(),
    };

    sender
        .send(&message)
        .await
        .map_err(|e| remote_failure(CONTEXT, &[], e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use remote_client::{MemoryMailer, RemoteError};

    #[tokio::test]
    async fn test_sends_message() {
        let mailer = MemoryMailer::new();
        send_unauthenticated_email(&mailer, " invite@example.com ", "Invitation", "<p>Rejoignez Hello Keys</p>")
            .await
            .unwrap();

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "invite@example.com");
        assert_eq!(sent[0].subject, "Invitation");
    }

    #[tokio::test]
    async fn test_relay_failure_is_raised() {
        let mailer = MemoryMailer::new();
        mailer.fail_with(RemoteError::server("Resend API key missing"));

        let err = send_unauthenticated_email(&mailer, "invite@example.com", "Invitation", "")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Resend API key missing");
        assert!(mailer.sent().is_empty());
    }
}
