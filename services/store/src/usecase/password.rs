use anyhow::anyhow;
use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use crate::auth::password::{hash_password, is_long_enough, verify_password};
use crate::domain::mail::{AccountMail, password_reset_email};
use crate::domain::repository::UserRepository;
use crate::domain::types::{RESET_TOKEN_LEN, RESET_TOKEN_TTL_SECS, User};
use crate::error::StoreError;
use crate::usecase::account::normalize_email;
use crate::usecase::{ensure_self, non_blank};

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub fn generate_reset_token() -> String {
    let mut rng = rand::rng();
    (0..RESET_TOKEN_LEN)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

fn hash(password: &str) -> Result<String, StoreError> {
    Ok(hash_password(password).map_err(|e| anyhow!("hash password: {e}"))?)
}

// ── Recover ──────────────────────────────────────────────────────────────────

pub struct RecoverPasswordUseCase<U: UserRepository> {
    pub users: U,
    pub domain_url: String,
}

impl<U: UserRepository> RecoverPasswordUseCase<U> {
    pub async fn execute(&self, email: Option<String>) -> Result<(), StoreError> {
        let email = non_blank(email).ok_or(StoreError::MissingField("email"))?;
        let user = self
            .users
            .find_by_email(&normalize_email(&email))
            .await?
            .ok_or(StoreError::UserNotFound)?;

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::seconds(RESET_TOKEN_TTL_SECS);
        let event = password_reset_email(
            &token,
            &AccountMail {
                email: user.email.clone(),
                name: user.name.clone(),
                link: format!(
                    "{}/account/reset-password?id={}&reset_password_token={token}",
                    self.domain_url, user.id
                ),
            },
        );

        self.users
            .set_reset_token_with_outbox(user.id, &token, expires_at, &event)
            .await
    }
}

// ── Reset ────────────────────────────────────────────────────────────────────

pub struct ResetPasswordInput {
    pub id: Option<String>,
    pub reset_password_token: Option<String>,
    pub password: Option<String>,
}

pub struct ResetPasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ResetPasswordUseCase<U> {
    pub async fn execute(&self, input: ResetPasswordInput) -> Result<(), StoreError> {
        let id = input
            .id
            .as_deref()
            .and_then(|id| id.trim().parse::<Uuid>().ok())
            .ok_or(StoreError::InvalidResetLink)?;
        let token = non_blank(input.reset_password_token).ok_or(StoreError::InvalidResetLink)?;

        let user = self
            .users
            .find_by_id(id)
            .await?
            .ok_or(StoreError::ResetTokenExpired)?;
        match user.reset_password_expires {
            Some(expires) if expires > Utc::now() => {}
            _ => return Err(StoreError::ResetTokenExpired),
        }
        if user.reset_password_token.as_deref() != Some(token.as_str()) {
            return Err(StoreError::ResetTokenInvalid);
        }

        let password = input.password.unwrap_or_default();
        if !is_long_enough(&password) {
            return Err(StoreError::PasswordTooShort);
        }

        // The token is consumed by the update itself; a concurrent reset or a
        // fresh recover between the read and here leaves it unmatched.
        if !self
            .users
            .reset_password(user.id, &token, &hash(&password)?)
            .await?
        {
            return Err(StoreError::ResetTokenInvalid);
        }
        tracing::info!(user_id = %user.id, "password reset");
        Ok(())
    }
}

// ── Change ───────────────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub actor: Uuid,
    pub user_id: Uuid,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

pub struct ChangePasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ChangePasswordUseCase<U> {
    pub async fn execute(&self, input: ChangePasswordInput) -> Result<User, StoreError> {
        ensure_self(input.actor, input.user_id)?;
        let (Some(old_password), Some(new_password)) = (input.old_password, input.new_password)
        else {
            return Err(StoreError::MissingFields);
        };

        let mut user = self
            .users
            .find_by_id(input.user_id)
            .await?
            .ok_or(StoreError::UserNotFound)?;
        let matches = verify_password(&old_password, &user.password_hash)
            .map_err(|e| anyhow!("verify password hash for {}: {e}", user.id))?;
        if !matches {
            return Err(StoreError::WrongPassword);
        }
        if !is_long_enough(&new_password) {
            return Err(StoreError::PasswordTooShort);
        }

        user.password_hash = hash(&new_password)?;
        self.users.update_password(user.id, &user.password_hash).await?;
        user.reset_password_token = None;
        user.reset_password_expires = None;
        user.updated_at = Utc::now();
        Ok(user)
    }
}
