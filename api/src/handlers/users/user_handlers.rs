use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use abi::errors::Result;
use abi::model::UserPublic;

use crate::api_utils::custom_extract::AuthorizedUser;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub keyword: String,
}

pub async fn search_users(
    State(state): State<AppState>,
    AuthorizedUser(user_id): AuthorizedUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<UserPublic>>> {
    let users = state.db.user.search_users(&user_id, &params.keyword).await?;
    Ok(Json(users))
}

pub async fn get_recommended_users(
    State(state): State<AppState>,
    AuthorizedUser(user_id): AuthorizedUser,
) -> Result<Json<Vec<UserPublic>>> {
    let users = state.db.user.get_recommended_users(&user_id).await?;
    Ok(Json(users))
}

pub async fn get_my_friends(
    State(state): State<AppState>,
    AuthorizedUser(user_id): AuthorizedUser,
) -> Result<Json<Vec<UserPublic>>> {
    let friends = state.db.friend.get_friend_list(&user_id).await?;
    Ok(Json(friends))
}
