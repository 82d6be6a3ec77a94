use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use cakeorder_auth_types::session::Session;

use crate::domain::types::{OrderItem, ShippingInfo};
use crate::error::StoreError;
use crate::handlers::dto::{OrderEnvelope, OrdersEnvelope};
use crate::state::AppState;
use crate::usecase::order::{
    CreateOrderInput, CreateOrderUseCase, GetOrderUseCase, ListOrdersUseCase,
};

// ── POST /order/create/{user_id} ──────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub shipping_info: Option<ShippingInfo>,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
    pub total_amount: Option<Decimal>,
}

pub async fn create_order(
    State(state): State<AppState>,
    session: Session,
    Path(user_id): Path<Uuid>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, StoreError> {
    let usecase = CreateOrderUseCase {
        orders: state.order_repo(),
        payments: state.payment_gateway(),
        currency: state.razorpay.currency.clone(),
    };
    let order = usecase
        .execute(CreateOrderInput {
            actor: session.user_id,
            user_id,
            shipping_info: body.shipping_info,
            items: body.order_items,
            total_amount: body.total_amount,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(OrderEnvelope::from(order))))
}

// ── GET /order/{user_id}/orders ───────────────────────────────────────────────

pub async fn list_orders(
    State(state): State<AppState>,
    session: Session,
    Path(user_id): Path<Uuid>,
) -> Result<Json<OrdersEnvelope>, StoreError> {
    let usecase = ListOrdersUseCase {
        orders: state.order_repo(),
    };
    let orders = usecase.execute(session.user_id, user_id).await?;
    Ok(Json(orders.into()))
}

// ── GET /order/{user_id}/orders/{order_id} ────────────────────────────────────

pub async fn get_order(
    State(state): State<AppState>,
    session: Session,
    Path((user_id, order_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<OrderEnvelope>, StoreError> {
    let usecase = GetOrderUseCase {
        orders: state.order_repo(),
    };
    let order = usecase.execute(session.user_id, user_id, order_id).await?;
    Ok(Json(order.into()))
}
