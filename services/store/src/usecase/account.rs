use anyhow::{Context as _, anyhow};
use chrono::Utc;
use uuid::Uuid;

use cakeorder_auth_types::token::issue_session_token;
use cakeorder_domain::user::UserRole;

use crate::auth::password::{hash_password, is_long_enough, verify_password};
use crate::auth::verify_token::{issue_verify_token, is_valid_verify_token};
use crate::domain::mail::{AccountMail, verification_email};
use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::StoreError;
use crate::usecase::non_blank;

/// Emails are compared and stored trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// ── Signup ───────────────────────────────────────────────────────────────────

pub struct SignupInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct SignupUseCase<U: UserRepository> {
    pub users: U,
    pub verify_secret: String,
    pub domain_url: String,
}

impl<U: UserRepository> SignupUseCase<U> {
    pub async fn execute(&self, input: SignupInput) -> Result<User, StoreError> {
        let (Some(name), Some(email), Some(password)) = (
            non_blank(input.name),
            non_blank(input.email),
            input.password.filter(|p| !p.trim().is_empty()),
        ) else {
            return Err(StoreError::MissingFields);
        };
        if !is_long_enough(&password) {
            return Err(StoreError::PasswordTooShort);
        }

        let email = normalize_email(&email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(StoreError::UserAlreadyExists);
        }

        let verify_token =
            issue_verify_token(&self.verify_secret).context("sign verification token")?;
        let password_hash =
            hash_password(&password).map_err(|e| anyhow!("hash password: {e}"))?;

        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            name,
            email,
            password_hash,
            role: UserRole::User,
            photo: None,
            reset_password_token: None,
            reset_password_expires: None,
            verify_token: Some(verify_token.clone()),
            email_verified: false,
            login_count: 0,
            created_at: now,
            updated_at: now,
        };

        let event = verification_email(
            user.id,
            &AccountMail {
                email: user.email.clone(),
                name: user.name.clone(),
                link: format!("{}/account/verify-email?token={verify_token}", self.domain_url),
            },
        );
        self.users.create_with_outbox(&user, &event).await?;

        tracing::info!(user_id = %user.id, "user signed up");
        Ok(user)
    }
}

// ── Signin ───────────────────────────────────────────────────────────────────

pub struct SigninInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub struct SigninOutput {
    pub user: User,
    pub token: String,
    pub token_exp: u64,
}

pub struct SigninUseCase<U: UserRepository> {
    pub users: U,
    pub jwt_secret: String,
}

impl<U: UserRepository> SigninUseCase<U> {
    pub async fn execute(&self, input: SigninInput) -> Result<SigninOutput, StoreError> {
        let (Some(email), Some(password)) = (non_blank(input.email), input.password) else {
            return Err(StoreError::MissingFields);
        };

        // Unknown email and wrong password are indistinguishable to the caller.
        let mut user = self
            .users
            .find_by_email(&normalize_email(&email))
            .await?
            .ok_or(StoreError::InvalidCredentials)?;
        let matches = verify_password(&password, &user.password_hash)
            .map_err(|e| anyhow!("verify password hash for {}: {e}", user.id))?;
        if !matches {
            return Err(StoreError::InvalidCredentials);
        }

        self.users.increment_login_count(user.id).await?;
        user.login_count += 1;

        let (token, token_exp) = issue_session_token(user.id, user.role.as_u8(), &self.jwt_secret)
            .context("sign session token")?;

        Ok(SigninOutput {
            user,
            token,
            token_exp,
        })
    }
}

// ── Verify email ─────────────────────────────────────────────────────────────

pub struct VerifyEmailUseCase<U: UserRepository> {
    pub users: U,
    pub verify_secret: String,
}

impl<U: UserRepository> VerifyEmailUseCase<U> {
    pub async fn execute(&self, token: Option<String>) -> Result<(), StoreError> {
        let token = non_blank(token).ok_or(StoreError::MissingField("token"))?;
        if !is_valid_verify_token(&token, &self.verify_secret) {
            return Err(StoreError::InvalidVerifyToken);
        }
        let user = self
            .users
            .find_by_verify_token(&token)
            .await?
            .ok_or(StoreError::InvalidVerifyToken)?;
        self.users.mark_email_verified(user.id).await
    }
}

// ── Current user ─────────────────────────────────────────────────────────────

pub struct GetUserUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetUserUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, StoreError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(StoreError::UserNotFound)
    }
}
