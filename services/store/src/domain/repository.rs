#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use cakeorder_domain::order::OrderStatus;
use cakeorder_domain::pagination::PageRequest;
use cakeorder_domain::user::UserRole;

use crate::domain::types::{
    ChargeRequest, ImageUpload, MailMessage, Order, OutboxEvent, PaymentRef, PendingOutboxEvent,
    Photo, User,
};
use crate::error::StoreError;

/// Repository for store accounts.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Lookup by normalized (trimmed, lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_verify_token(&self, token: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user and its verification email event atomically.
    ///
    /// Returns `UserAlreadyExists` when the email is taken, including when a
    /// concurrent signup wins the unique index.
    async fn create_with_outbox(&self, user: &User, event: &OutboxEvent)
    -> Result<(), StoreError>;

    async fn increment_login_count(&self, id: Uuid) -> Result<(), StoreError>;

    /// Store a reset token and its expiry with the reset email event atomically.
    async fn set_reset_token_with_outbox(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        event: &OutboxEvent,
    ) -> Result<(), StoreError>;

    /// Replace the password hash and clear any reset token and expiry.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError>;

    /// Replace the password hash and clear the reset token, only while `token`
    /// is still the stored, unexpired reset token. Returns `false` when it was
    /// consumed, replaced or expired since it was read.
    async fn reset_password(
        &self,
        id: Uuid,
        token: &str,
        password_hash: &str,
    ) -> Result<bool, StoreError>;

    /// Set `email_verified` and clear the verification token.
    async fn mark_email_verified(&self, id: Uuid) -> Result<(), StoreError>;

    /// Apply the provided fields. Returns `None` when the user does not exist.
    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<&str>,
        photo: Option<&Photo>,
    ) -> Result<Option<User>, StoreError>;

    async fn update_role(&self, id: Uuid, role: UserRole) -> Result<Option<User>, StoreError>;

    /// Oldest accounts first.
    async fn list(&self, page: PageRequest) -> Result<Vec<User>, StoreError>;
}

/// Repository for orders and the product stock they consume.
pub trait OrderRepository: Send + Sync {
    /// Insert the order with its items and move `stock`/`sold` for every line
    /// item in one transaction.
    async fn create_with_stock(&self, order: &Order) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    /// Newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError>;

    /// Newest first.
    async fn list(&self, page: PageRequest) -> Result<Vec<Order>, StoreError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, StoreError>;
}

/// Outbox table access for the relay.
pub trait OutboxRepository: Send + Sync {
    /// Unprocessed, unfailed events with `next_attempt_at <= now`, oldest first.
    async fn fetch_due(&self, limit: u64) -> Result<Vec<PendingOutboxEvent>, StoreError>;

    async fn mark_processed(&self, id: Uuid) -> Result<(), StoreError>;

    async fn schedule_retry(
        &self,
        id: Uuid,
        attempts: i32,
        error: &str,
        next_attempt_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    async fn mark_failed(&self, id: Uuid, attempts: i32, error: &str) -> Result<(), StoreError>;
}

/// Port for the payment provider.
pub trait PaymentGateway: Send + Sync {
    /// Create a charge. Provider errors map to `PaymentFailed`.
    async fn charge(&self, request: &ChargeRequest) -> Result<PaymentRef, StoreError>;
}

/// Port for hosted image storage.
pub trait ImageStore: Send + Sync {
    async fn upload(&self, image: &ImageUpload, folder: &str) -> Result<Photo, StoreError>;

    async fn destroy(&self, public_id: &str) -> Result<(), StoreError>;
}

/// Port for outgoing email.
pub trait MailSender: Send + Sync {
    async fn send(&self, message: &MailMessage) -> anyhow::Result<()>;
}
