use axum::extract::State;
use axum::Json;
use serde::Serialize;

use abi::errors::Result;

use crate::api_utils::custom_extract::AuthorizedUser;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ChatTokenResponse {
    pub token: String,
}

/// signed token for the hosted chat provider; the only route where a
/// provider failure surfaces to the caller
pub async fn get_chat_token(
    State(state): State<AppState>,
    AuthorizedUser(user_id): AuthorizedUser,
) -> Result<Json<ChatTokenResponse>> {
    let token = state.chat.issue_token(&user_id)?;
    Ok(Json(ChatTokenResponse { token }))
}
