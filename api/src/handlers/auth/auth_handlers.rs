use axum::extract::State;
use axum::Json;
use nanoid::nanoid;
use rand::Rng;
use tracing::warn;

use abi::errors::{Error, Result};
use abi::model::{OnboardProfile, User};

use crate::api_utils::custom_extract::{AuthorizedUser, JsonExtractor};
use crate::AppState;

use super::{
    gen_token, normalize_username, validate_signup, AuthResponse, LoginRequest, OnboardRequest,
    SignupRequest,
};

pub async fn signup(
    State(state): State<AppState>,
    JsonExtractor(req): JsonExtractor<SignupRequest>,
) -> Result<Json<AuthResponse>> {
    validate_signup(&req)?;

    if state.db.user.get_user_by_email(&req.email).await?.is_some() {
        return Err(Error::conflict(
            "email already exists, please use a different one",
        ));
    }

    let salt = utils::generate_salt();
    let password = utils::hash_password(req.password.as_bytes(), &salt)?;

    let idx = rand::thread_rng().gen_range(1..=100);
    let user = state
        .db
        .user
        .create_user(User {
            id: nanoid!(),
            email: req.email,
            password,
            salt,
            full_name: req.full_name,
            avatar: format!("https://avatar.iran.liara.run/public/{idx}.png"),
            ..Default::default()
        })
        .await?;

    // best-effort: the profile is committed, a chat sync failure only logs
    if let Err(e) = state
        .chat
        .upsert_user(&user.id, &user.full_name, &user.avatar)
        .await
    {
        warn!("chat identity sync failed for {}: {}", user.id, e);
    }

    let token = gen_token(&state.jwt_secret, &user.id)?;
    Ok(Json(AuthResponse { user, token }))
}

pub async fn login(
    State(state): State<AppState>,
    JsonExtractor(req): JsonExtractor<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(Error::validation("all fields are required"));
    }

    let user = state
        .db
        .user
        .verify_pwd(&req.email, &req.password)
        .await?
        .ok_or_else(|| Error::unauthenticated("invalid email or password"))?;

    let token = gen_token(&state.jwt_secret, &user.id)?;
    Ok(Json(AuthResponse { user, token }))
}

/// the caller's own full profile, resolved from the verified token
pub async fn get_me(
    State(state): State<AppState>,
    AuthorizedUser(user_id): AuthorizedUser,
) -> Result<Json<User>> {
    let user = state
        .db
        .user
        .get_user_by_id(&user_id)
        .await?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(Json(user))
}

pub async fn onboard(
    State(state): State<AppState>,
    AuthorizedUser(user_id): AuthorizedUser,
    JsonExtractor(req): JsonExtractor<OnboardRequest>,
) -> Result<Json<User>> {
    let username = normalize_username(req.username.as_deref().unwrap_or(""))?;

    if state.db.user.username_taken(&username, &user_id).await? {
        return Err(Error::conflict(
            "username is already taken, please choose another one",
        ));
    }

    let mut missing = Vec::new();
    if req.full_name.as_deref().unwrap_or("").is_empty() {
        missing.push("full_name");
    }
    if req.bio.as_deref().unwrap_or("").is_empty() {
        missing.push("bio");
    }
    if req.native_language.as_deref().unwrap_or("").is_empty() {
        missing.push("native_language");
    }
    if req.location.as_deref().unwrap_or("").is_empty() {
        missing.push("location");
    }
    if !missing.is_empty() {
        return Err(Error::validation(format!(
            "full name, bio, native language, and location are required; missing: {}",
            missing.join(", ")
        )));
    }

    let user = state
        .db
        .user
        .onboard(
            &user_id,
            OnboardProfile {
                username,
                full_name: req.full_name.unwrap_or_default(),
                bio: req.bio.unwrap_or_default(),
                native_language: req.native_language.unwrap_or_default(),
                location: req.location.unwrap_or_default(),
                avatar: req.avatar,
            },
        )
        .await?;

    if let Err(e) = state
        .chat
        .upsert_user(&user.id, &user.full_name, &user.avatar)
        .await
    {
        warn!("chat identity sync failed for {}: {}", user.id, e);
    }

    Ok(Json(user))
}
