use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use cakeorder_auth_types::cookie::CookieSettings;
use cakeorder_auth_types::session::SessionSecret;

use crate::config::{CloudinaryConfig, RazorpayConfig};
use crate::infra::db::{DbOrderRepository, DbOutboxRepository, DbUserRepository};
use crate::infra::images::CloudinaryStore;
use crate::infra::payment::RazorpayGateway;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub http: reqwest::Client,
    pub jwt_secret: String,
    pub email_verify_secret: String,
    pub domain_url: String,
    pub cookie: CookieSettings,
    pub cloudinary: CloudinaryConfig,
    pub razorpay: RazorpayConfig,
}

impl FromRef<AppState> for SessionSecret {
    fn from_ref(state: &AppState) -> Self {
        SessionSecret(state.jwt_secret.clone())
    }
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn order_repo(&self) -> DbOrderRepository {
        DbOrderRepository {
            db: self.db.clone(),
        }
    }

    pub fn outbox_repo(&self) -> DbOutboxRepository {
        DbOutboxRepository {
            db: self.db.clone(),
        }
    }

    pub fn image_store(&self) -> CloudinaryStore {
        CloudinaryStore {
            client: self.http.clone(),
            config: self.cloudinary.clone(),
        }
    }

    pub fn payment_gateway(&self) -> RazorpayGateway {
        RazorpayGateway {
            client: self.http.clone(),
            config: self.razorpay.clone(),
        }
    }
}
