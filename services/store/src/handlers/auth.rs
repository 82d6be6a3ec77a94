use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use cakeorder_auth_types::cookie::{clear_session_cookie, set_session_cookie};
use cakeorder_auth_types::session::Session;

use crate::error::StoreError;
use crate::handlers::dto::{MessageResponse, UserEnvelope, UserResponse};
use crate::state::AppState;
use crate::usecase::account::{
    GetUserUseCase, SigninInput, SigninUseCase, SignupInput, SignupUseCase, VerifyEmailUseCase,
};
use crate::usecase::password::{RecoverPasswordUseCase, ResetPasswordInput, ResetPasswordUseCase};

// ── POST /auth/signup ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, StoreError> {
    let usecase = SignupUseCase {
        users: state.user_repo(),
        verify_secret: state.email_verify_secret.clone(),
        domain_url: state.domain_url.clone(),
    };
    let user = usecase
        .execute(SignupInput {
            name: body.name,
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(UserEnvelope::from(user))))
}

// ── POST /auth/signin ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Serialize)]
pub struct SigninResponse {
    pub success: bool,
    pub user: UserResponse,
    pub sign_in: String,
}

pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<SigninRequest>,
) -> Result<impl IntoResponse, StoreError> {
    let usecase = SigninUseCase {
        users: state.user_repo(),
        jwt_secret: state.jwt_secret.clone(),
    };
    let out = usecase
        .execute(SigninInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    let jar = set_session_cookie(jar, out.token.clone(), &state.cookie);
    let body = SigninResponse {
        success: true,
        user: out.user.into(),
        sign_in: out.token,
    };
    Ok((jar, Json(body)))
}

// ── GET /auth/getuserfromtoken ────────────────────────────────────────────────

pub async fn get_user_from_token(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<UserEnvelope>, StoreError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(session.user_id).await?;
    Ok(Json(user.into()))
}

// ── GET /auth/signout ─────────────────────────────────────────────────────────

pub async fn signout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (StatusCode::NO_CONTENT, clear_session_cookie(jar, &state.cookie))
}

// ── POST /auth/verify/email ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyEmailRequest {
    pub token: Option<String>,
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(body): Json<VerifyEmailRequest>,
) -> Result<Json<MessageResponse>, StoreError> {
    let usecase = VerifyEmailUseCase {
        users: state.user_repo(),
        verify_secret: state.email_verify_secret.clone(),
    };
    usecase.execute(body.token).await?;
    Ok(Json(MessageResponse::ok("email verified")))
}

// ── POST /auth/recover/password ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RecoverPasswordRequest {
    pub email: Option<String>,
}

pub async fn recover_password(
    State(state): State<AppState>,
    Json(body): Json<RecoverPasswordRequest>,
) -> Result<Json<MessageResponse>, StoreError> {
    let usecase = RecoverPasswordUseCase {
        users: state.user_repo(),
        domain_url: state.domain_url.clone(),
    };
    usecase.execute(body.email).await?;
    Ok(Json(MessageResponse::ok(
        "check your email to reset your password",
    )))
}

// ── POST /auth/resetPassword/password ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
    pub id: Option<String>,
    pub reset_password_token: Option<String>,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, StoreError> {
    let usecase = ResetPasswordUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(ResetPasswordInput {
            id: body.id,
            reset_password_token: body.reset_password_token,
            password: body.password,
        })
        .await?;
    Ok(Json(MessageResponse::ok("password has been reset")))
}
