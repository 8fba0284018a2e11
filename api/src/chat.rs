use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;

use abi::config::ChatConfig;
use abi::errors::{Error, Result};

/// client for the hosted chat/video provider; identity upserts are a
/// best-effort side effect, token issuance backs the /chat/token route
#[derive(Debug)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Serialize)]
struct ChatTokenClaims<'a> {
    user_id: &'a str,
    iat: i64,
}

impl ChatClient {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    /// mirror a local profile into the provider's user directory
    pub async fn upsert_user(&self, id: &str, name: &str, avatar: &str) -> Result<()> {
        let body = serde_json::json!({
            "users": { id: { "id": id, "name": name, "image": avatar } }
        });
        self.http
            .post(format!("{}/users", self.base_url))
            .query(&[("api_key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// sign a provider token for the given user
    pub fn issue_token(&self, user_id: &str) -> Result<String> {
        let claims = ChatTokenClaims {
            user_id,
            iat: chrono::Utc::now().timestamp(),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.api_secret.as_bytes()),
        )
        .map_err(|e| Error::dependency(e.to_string()))
    }
}
