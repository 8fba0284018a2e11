use argon2::{Argon2, PasswordHash, PasswordVerifier};
use async_trait::async_trait;
use sqlx::PgPool;

use abi::errors::{Error, Result};
use abi::model::{OnboardProfile, User, UserPublic};

use crate::postgres::is_unique_violation;
use crate::user::UserRepo;

const PUBLIC_FIELDS: &str =
    "id, full_name, username, avatar, native_language, location, bio, is_onboarded";

const SEARCH_LIMIT: i64 = 30;
const RECOMMEND_LIMIT: i64 = 20;

#[derive(Debug)]
pub struct PostgresUser {
    pool: PgPool,
}

impl PostgresUser {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepo for PostgresUser {
    async fn create_user(&self, user: User) -> Result<User> {
        let now = chrono::Utc::now().timestamp_millis();
        let result = sqlx::query_as(
            "INSERT INTO users
                (id, email, password, salt, full_name, username, bio,
                 native_language, location, avatar, is_onboarded, create_time, update_time)
             VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, FALSE, $11, $11)
             RETURNING *",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.salt)
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(&user.bio)
        .bind(&user.native_language)
        .bind(&user.location)
        .bind(&user.avatar)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "users_email_key") {
                Error::conflict("email already exists, please use a different one")
            } else {
                e.into()
            }
        })?;
        Ok(result)
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn verify_pwd(&self, email: &str, password: &str) -> Result<Option<User>> {
        let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        let Some(mut user) = user else {
            return Ok(None);
        };

        let parsed_hash = PasswordHash::new(&user.password)
            .map_err(|e| Error::internal_with_details(e.to_string()))?;
        let is_valid = Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok();
        user.password = String::new();
        if !is_valid {
            return Ok(None);
        }
        Ok(Some(user))
    }

    async fn username_taken(&self, username: &str, exclude_id: &str) -> Result<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT id FROM users WHERE username = $1 AND id <> $2")
                .bind(username)
                .bind(exclude_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn onboard(&self, id: &str, profile: OnboardProfile) -> Result<User> {
        let user = sqlx::query_as(
            "UPDATE users SET
                username = $2,
                full_name = $3,
                bio = $4,
                native_language = $5,
                location = $6,
                avatar = COALESCE($7, avatar),
                is_onboarded = TRUE,
                update_time = $8
             WHERE id = $1
             RETURNING *",
        )
        .bind(id)
        .bind(&profile.username)
        .bind(&profile.full_name)
        .bind(&profile.bio)
        .bind(&profile.native_language)
        .bind(&profile.location)
        .bind(&profile.avatar)
        .bind(chrono::Utc::now().timestamp_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "users_username_key") {
                Error::conflict("username is already taken, please choose another one")
            } else {
                e.into()
            }
        })?
        .ok_or_else(|| Error::not_found("user not found"))?;
        Ok(user)
    }

    async fn search_users(&self, user_id: &str, keyword: &str) -> Result<Vec<UserPublic>> {
        let keyword = keyword.trim();
        // an empty keyword is a valid query with an empty result, not an error
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        let users = sqlx::query_as(&format!(
            "SELECT {PUBLIC_FIELDS}
             FROM users u
             WHERE u.id <> $1
               AND u.is_onboarded
               AND (u.full_name ILIKE $2 OR u.username ILIKE $2)
               AND NOT EXISTS
                   (SELECT 1 FROM friends f WHERE f.user_id = $1 AND f.friend_id = u.id)
             LIMIT $3"
        ))
        .bind(user_id)
        .bind(like_pattern(keyword))
        .bind(SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn get_recommended_users(&self, user_id: &str) -> Result<Vec<UserPublic>> {
        let users = sqlx::query_as(&format!(
            "SELECT {PUBLIC_FIELDS}
             FROM users u
             WHERE u.id <> $1
               AND u.is_onboarded
               AND NOT EXISTS
                   (SELECT 1 FROM friends f WHERE f.user_id = $1 AND f.friend_id = u.id)
             ORDER BY RANDOM()
             LIMIT $2"
        ))
        .bind(user_id)
        .bind(RECOMMEND_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }
}

/// substring pattern with LIKE metacharacters escaped
fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("%{}%", escaped)
}
