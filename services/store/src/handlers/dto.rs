//! Response bodies. Users are snake_case; orders use the camelCase shape the
//! storefront sends at checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use cakeorder_core::serde::to_rfc3339_ms;
use cakeorder_domain::order::OrderStatus;
use cakeorder_domain::user::UserRole;

use crate::domain::types::{Order, OrderItem, PaymentRef, Photo, ShippingInfo, User};

/// Public view of a user. Never carries hashes or tokens.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub photo: Option<Photo>,
    pub email_verified: bool,
    pub login_count: i32,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            photo: user.photo,
            email_verified: user.email_verified,
            login_count: user.login_count,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub shipping_info: ShippingInfo,
    pub order_items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub payment_info: PaymentRef,
    pub order_status: OrderStatus,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            shipping_info: order.shipping_info,
            order_items: order.items,
            total_amount: order.total_amount,
            payment_info: order.payment,
            order_status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub success: bool,
    pub user: UserResponse,
}

impl From<User> for UserEnvelope {
    fn from(user: User) -> Self {
        Self {
            success: true,
            user: user.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UsersEnvelope {
    pub success: bool,
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
pub struct OrderEnvelope {
    pub success: bool,
    pub order: OrderResponse,
}

impl From<Order> for OrderEnvelope {
    fn from(order: Order) -> Self {
        Self {
            success: true,
            order: order.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrdersEnvelope {
    pub success: bool,
    pub orders: Vec<OrderResponse>,
}

impl From<Vec<Order>> for OrdersEnvelope {
    fn from(orders: Vec<Order>) -> Self {
        Self {
            success: true,
            orders: orders.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    pub fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}
