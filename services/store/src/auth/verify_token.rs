//! Email verification JWTs, signed with their own secret so a leaked session
//! secret cannot mint them.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cakeorder_auth_types::token::now_secs;

use crate::domain::types::VERIFY_TOKEN_TTL_SECS;

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyClaims {
    /// Random id so two tokens issued in the same second differ.
    pub jti: String,
    pub exp: u64,
}

pub fn issue_verify_token(secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = VerifyClaims {
        jti: Uuid::new_v4().to_string(),
        exp: now_secs() + VERIFY_TOKEN_TTL_SECS,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// `true` when the token is correctly signed and not expired.
pub fn is_valid_verify_token(token: &str, secret: &str) -> bool {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp"]);
    decode::<VerifyClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .is_ok()
}
