use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Store service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("please provide all required fields")]
    MissingFields,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("password must be at least 4 characters long")]
    PasswordTooShort,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid or expired verification token")]
    InvalidVerifyToken,
    #[error("user not found")]
    UserNotFound,
    #[error("invalid reset password link")]
    InvalidResetLink,
    #[error("reset password link has expired")]
    ResetTokenExpired,
    #[error("reset password token is invalid")]
    ResetTokenInvalid,
    #[error("old password is incorrect")]
    WrongPassword,
    #[error("forbidden")]
    Forbidden,
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error("invalid order: {0}")]
    InvalidOrder(String),
    #[error("order not found")]
    OrderNotFound,
    #[error("payment failed")]
    PaymentFailed,
    #[error("order failed, amount will be refunded")]
    OrderFailed,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingFields => "MISSING_FIELDS",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::PasswordTooShort => "PASSWORD_TOO_SHORT",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidVerifyToken => "INVALID_VERIFY_TOKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::InvalidResetLink => "INVALID_RESET_LINK",
            Self::ResetTokenExpired => "RESET_TOKEN_EXPIRED",
            Self::ResetTokenInvalid => "RESET_TOKEN_INVALID",
            Self::WrongPassword => "WRONG_PASSWORD",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidUpload(_) => "INVALID_UPLOAD",
            Self::InvalidOrder(_) => "INVALID_ORDER",
            Self::OrderNotFound => "ORDER_NOT_FOUND",
            Self::PaymentFailed => "PAYMENT_FAILED",
            Self::OrderFailed => "ORDER_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::MissingFields
            | Self::MissingField(_)
            | Self::PasswordTooShort
            | Self::InvalidCredentials
            | Self::InvalidVerifyToken
            | Self::InvalidResetLink
            | Self::ResetTokenExpired
            | Self::ResetTokenInvalid
            | Self::WrongPassword
            | Self::InvalidUpload(_)
            | Self::InvalidOrder(_) => StatusCode::BAD_REQUEST,
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::UserNotFound | Self::OrderNotFound => StatusCode::NOT_FOUND,
            Self::PaymentFailed => StatusCode::BAD_GATEWAY,
            Self::OrderFailed | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        // TraceLayer already records every response status. Only the anyhow
        // chain of internal errors is worth logging here.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
