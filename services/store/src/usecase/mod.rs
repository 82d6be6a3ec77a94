pub mod account;
pub mod admin;
pub mod order;
pub mod outbox;
pub mod password;
pub mod profile;

use uuid::Uuid;

use crate::error::StoreError;

/// The signed-in user may only act on their own `{user_id}` routes.
pub fn ensure_self(actor: Uuid, user_id: Uuid) -> Result<(), StoreError> {
    if actor == user_id {
        Ok(())
    } else {
        Err(StoreError::Forbidden)
    }
}

/// `Some` with the trimmed value, or `None` when absent or blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
