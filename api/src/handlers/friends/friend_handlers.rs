use axum::extract::State;
use axum::Json;
use serde::Serialize;

use abi::errors::Result;
use abi::model::{FriendRequest, FriendRequestWithUser};

use crate::api_utils::custom_extract::{AuthorizedUser, PathExtractor};
use crate::AppState;

/// incoming pending requests plus the caller's sent requests that were
/// accepted; the latter feed "someone accepted you" notifications
#[derive(Debug, Serialize)]
pub struct FriendRequestsResponse {
    pub incoming: Vec<FriendRequestWithUser>,
    pub accepted_by_others: Vec<FriendRequestWithUser>,
}

pub async fn send_friend_request(
    State(state): State<AppState>,
    AuthorizedUser(user_id): AuthorizedUser,
    PathExtractor(recipient_id): PathExtractor<String>,
) -> Result<Json<FriendRequest>> {
    let request = state
        .db
        .friend
        .create_friend_request(&user_id, &recipient_id)
        .await?;
    Ok(Json(request))
}

pub async fn accept_friend_request(
    State(state): State<AppState>,
    AuthorizedUser(user_id): AuthorizedUser,
    PathExtractor(request_id): PathExtractor<String>,
) -> Result<Json<FriendRequest>> {
    let request = state
        .db
        .friend
        .accept_friend_request(&user_id, &request_id)
        .await?;
    Ok(Json(request))
}

pub async fn get_friend_requests(
    State(state): State<AppState>,
    AuthorizedUser(user_id): AuthorizedUser,
) -> Result<Json<FriendRequestsResponse>> {
    let incoming = state.db.friend.get_incoming_requests(&user_id).await?;
    let accepted_by_others = state.db.friend.get_accepted_requests(&user_id).await?;
    Ok(Json(FriendRequestsResponse {
        incoming,
        accepted_by_others,
    }))
}

pub async fn get_outgoing_friend_requests(
    State(state): State<AppState>,
    AuthorizedUser(user_id): AuthorizedUser,
) -> Result<Json<Vec<FriendRequestWithUser>>> {
    let outgoing = state.db.friend.get_outgoing_requests(&user_id).await?;
    Ok(Json(outgoing))
}
