use axum::{
    Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{get, post, put},
};

use cakeorder_core::health::healthz;
use cakeorder_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    admin::{list_all_orders, list_users, update_order_status, update_role},
    auth::{
        get_user_from_token, recover_password, reset_password, signin, signout, signup,
        verify_email,
    },
    order::{create_order, get_order, list_orders},
    user::{update_password, update_profile},
};
use crate::state::AppState;

/// Upper bound for a profile update request (photo included).
const PROFILE_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Ready once the database answers.
async fn readyz(State(state): State<AppState>) -> StatusCode {
    match state.db.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/getuserfromtoken", get(get_user_from_token))
        .route("/signout", get(signout))
        .route("/verify/email", post(verify_email))
        .route("/recover/password", post(recover_password))
        .route("/resetPassword/password", post(reset_password))
        .route(
            "/user/update/{user_id}",
            put(update_profile).layer(DefaultBodyLimit::max(PROFILE_BODY_LIMIT)),
        )
        .route("/user/update/password/{user_id}", put(update_password))
        .route("/admin/dashboard/{admin_id}/users", get(list_users))
        .route(
            "/admin/dashboard/{admin_id}/users/{user_id}/update/role",
            put(update_role),
        )
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/create/{user_id}", post(create_order))
        .route("/{user_id}/orders", get(list_orders))
        .route("/{user_id}/orders/{order_id}", get(get_order))
        .route("/admin/{admin_id}/orders", get(list_all_orders))
        .route(
            "/admin/{admin_id}/orders/{order_id}/status",
            put(update_order_status),
        )
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/api/v1/auth", auth_routes())
        .nest("/api/v1/order", order_routes())
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
