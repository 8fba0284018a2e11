use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::auth::{get_me, login, onboard, signup};
use crate::handlers::chat::get_chat_token;
use crate::handlers::friends::{
    accept_friend_request, get_friend_requests, get_outgoing_friend_requests, send_friend_request,
};
use crate::handlers::users::{get_my_friends, get_recommended_users, search_users};
use crate::AppState;

pub(crate) fn app_routes(state: AppState) -> Router {
    Router::new()
        .nest("/auth", auth_routes(state.clone()))
        .nest("/user", user_routes(state.clone()))
        .nest("/friend", friend_routes(state.clone()))
        .nest("/chat", chat_routes(state))
}

fn auth_routes(state: AppState) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/onboard", post(onboard))
        .route("/me", get(get_me))
        .with_state(state)
}

fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_recommended_users))
        .route("/search", get(search_users))
        .route("/friends", get(get_my_friends))
        .with_state(state)
}

fn friend_routes(state: AppState) -> Router {
    Router::new()
        .route("/request/:id", post(send_friend_request))
        .route("/request/:id/accept", put(accept_friend_request))
        .route("/requests", get(get_friend_requests))
        .route("/requests/outgoing", get(get_outgoing_friend_requests))
        .with_state(state)
}

fn chat_routes(state: AppState) -> Router {
    Router::new()
        .route("/token", get(get_chat_token))
        .with_state(state)
}
