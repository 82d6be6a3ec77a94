use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use uuid::Uuid;

use cakeorder_auth_types::session::Session;
use cakeorder_domain::order::OrderStatus;
use cakeorder_domain::pagination::PageRequest;
use cakeorder_domain::user::UserRole;

use crate::error::StoreError;
use crate::handlers::dto::{OrderEnvelope, OrdersEnvelope, UserEnvelope, UsersEnvelope};
use crate::state::AppState;
use crate::usecase::admin::{
    ListAllOrdersUseCase, ListUsersUseCase, UpdateOrderStatusInput, UpdateOrderStatusUseCase,
    UpdateRoleInput, UpdateRoleUseCase,
};

// ── GET /auth/admin/dashboard/{admin_id}/users ────────────────────────────────

pub async fn list_users(
    State(state): State<AppState>,
    session: Session,
    Path(admin_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<UsersEnvelope>, StoreError> {
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase.execute(session.user_id, admin_id, page).await?;
    Ok(Json(UsersEnvelope {
        success: true,
        users: users.into_iter().map(Into::into).collect(),
    }))
}

// ── PUT /auth/admin/dashboard/{admin_id}/users/{user_id}/update/role ──────────

#[derive(Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Option<UserRole>,
}

pub async fn update_role(
    State(state): State<AppState>,
    session: Session,
    Path((admin_id, user_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateRoleRequest>,
) -> Result<Json<UserEnvelope>, StoreError> {
    let usecase = UpdateRoleUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(UpdateRoleInput {
            actor: session.user_id,
            admin_id,
            user_id,
            role: body.role,
        })
        .await?;
    Ok(Json(user.into()))
}

// ── GET /order/admin/{admin_id}/orders ────────────────────────────────────────

pub async fn list_all_orders(
    State(state): State<AppState>,
    session: Session,
    Path(admin_id): Path<Uuid>,
    Query(page): Query<PageRequest>,
) -> Result<Json<OrdersEnvelope>, StoreError> {
    let usecase = ListAllOrdersUseCase {
        users: state.user_repo(),
        orders: state.order_repo(),
    };
    let orders = usecase.execute(session.user_id, admin_id, page).await?;
    Ok(Json(orders.into()))
}

// ── PUT /order/admin/{admin_id}/orders/{order_id}/status ──────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub order_status: Option<OrderStatus>,
}

pub async fn update_order_status(
    State(state): State<AppState>,
    session: Session,
    Path((admin_id, order_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderEnvelope>, StoreError> {
    let usecase = UpdateOrderStatusUseCase {
        users: state.user_repo(),
        orders: state.order_repo(),
    };
    let order = usecase
        .execute(UpdateOrderStatusInput {
            actor: session.user_id,
            admin_id,
            order_id,
            status: body.order_status,
        })
        .await?;
    Ok(Json(order.into()))
}
