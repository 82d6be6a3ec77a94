use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cakeorder_domain::order::OrderStatus;
use cakeorder_domain::user::UserRole;

/// Stored account, including the secrets that never leave the service.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub photo: Option<Photo>,
    pub reset_password_token: Option<String>,
    pub reset_password_expires: Option<DateTime<Utc>>,
    pub verify_token: Option<String>,
    pub email_verified: bool,
    pub login_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hosted profile photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub public_id: String,
    pub secure_url: String,
}

/// Image bytes received from a multipart upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: bytes::Bytes,
}

/// Shipping address snapshot stored with the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub address: String,
    pub city: String,
    pub phone_no: String,
    pub postal_code: String,
    pub state: String,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// Payment provider reference recorded on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRef {
    pub id: String,
    pub receipt: String,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_info: ShippingInfo,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub payment: PaymentRef,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Charge sent to the payment provider. `amount` is in minor currency units.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: ShippingInfo,
}

/// Outbox event for async delivery (verification and reset emails).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub idempotency_key: String,
}

/// Outbox event picked up by the relay.
#[derive(Debug, Clone)]
pub struct PendingOutboxEvent {
    pub id: Uuid,
    pub kind: String,
    pub payload: serde_json::Value,
    pub attempts: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Minimum password length for signup, reset and change.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Largest price or total a `numeric(12, 2)` column holds: 9999999999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(
    MAX_AMOUNT_MINOR as u32,
    (MAX_AMOUNT_MINOR >> 32) as u32,
    0,
    false,
    2,
);

const MAX_AMOUNT_MINOR: u64 = 999_999_999_999;

/// Password reset token length in characters.
pub const RESET_TOKEN_LEN: usize = 40;

/// Password reset token time-to-live in seconds.
pub const RESET_TOKEN_TTL_SECS: i64 = 20 * 60;

/// Email verification token time-to-live in seconds.
pub const VERIFY_TOKEN_TTL_SECS: u64 = 60 * 60;

pub const VERIFICATION_EMAIL: &str = "verification_email";
pub const PASSWORD_RESET_EMAIL: &str = "password_reset_email";
