use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use abi::errors::{Error, Result};
use abi::model::User;

mod auth_handlers;

pub use auth_handlers::*;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 20;

/// token lifetime, seven days like the session cookie it replaces
const EXPIRES: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub,
            exp: now + EXPIRES,
            iat: now,
        }
    }
}

pub fn gen_token(jwt_secret: &str, user_id: &str) -> Result<String> {
    let claims = Claims::new(user_id.to_string());
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(Error::internal)
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct OnboardRequest {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub native_language: Option<String>,
    pub location: Option<String>,
    pub avatar: Option<String>,
}

/// field presence, password length, then email shape; first failure wins
pub(crate) fn validate_signup(req: &SignupRequest) -> Result<()> {
    if req.email.is_empty() || req.password.is_empty() || req.full_name.is_empty() {
        return Err(Error::validation("all fields are required for signup"));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation("password must be at least 6 characters"));
    }
    if !is_valid_email(&req.email) {
        return Err(Error::validation("invalid email format"));
    }
    Ok(())
}

/// same shape the original form validation accepts: something without
/// whitespace or '@' on both sides, and a dot in the domain
pub(crate) fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return false;
    }
    if domain.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// lowercase + trim, then check length and charset; normalization is
/// idempotent so re-onboarding with an already-stored name is a no-op
pub(crate) fn normalize_username(raw: &str) -> Result<String> {
    let username = raw.trim().to_lowercase();
    if username.is_empty() {
        return Err(Error::validation("username is required"));
    }
    if username.chars().count() < MIN_USERNAME_LEN || username.chars().count() > MAX_USERNAME_LEN {
        return Err(Error::validation(
            "username must be between 3 and 20 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(Error::validation(
            "username can only contain letters (a-z), numbers (0-9), and underscores (_)",
        ));
    }
    Ok(username)
}
