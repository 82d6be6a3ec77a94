//! Outbox payloads for account emails and their plain-text rendering.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{MailMessage, OutboxEvent, PASSWORD_RESET_EMAIL, VERIFICATION_EMAIL};

/// Payload shared by both account emails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMail {
    pub email: String,
    pub name: String,
    pub link: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("unknown event kind: {0}")]
    UnknownKind(String),
    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}

fn event(kind: &str, key: String, mail: &AccountMail) -> OutboxEvent {
    OutboxEvent {
        id: Uuid::now_v7(),
        kind: kind.to_owned(),
        payload: serde_json::json!({
            "email": mail.email,
            "name": mail.name,
            "link": mail.link,
        }),
        idempotency_key: key,
    }
}

/// Verification email for a new account. One per user.
pub fn verification_email(user_id: Uuid, mail: &AccountMail) -> OutboxEvent {
    event(
        VERIFICATION_EMAIL,
        format!("{VERIFICATION_EMAIL}:{user_id}"),
        mail,
    )
}

/// Reset email for one reset token. A user may request several.
pub fn password_reset_email(token: &str, mail: &AccountMail) -> OutboxEvent {
    event(
        PASSWORD_RESET_EMAIL,
        format!("{PASSWORD_RESET_EMAIL}:{token}"),
        mail,
    )
}

/// Render the message to send for an outbox event.
pub fn render(kind: &str, payload: &serde_json::Value) -> Result<MailMessage, RenderError> {
    let (subject, intro, action) = match kind {
        VERIFICATION_EMAIL => (
            "Verify your email",
            "Thanks for signing up.",
            "Confirm your email address within the next hour:",
        ),
        PASSWORD_RESET_EMAIL => (
            "Reset your password",
            "We received a request to reset your password.",
            "Choose a new password within the next 20 minutes:",
        ),
        other => return Err(RenderError::UnknownKind(other.to_owned())),
    };
    let mail: AccountMail = serde_json::from_value(payload.clone())?;
    Ok(MailMessage {
        to: mail.email,
        subject: subject.to_owned(),
        body: format!(
            "Hi {},\n\n{intro}\n{action}\n\n{}\n\nIf this wasn't you, ignore this email.\n",
            mail.name, mail.link
        ),
    })
}
