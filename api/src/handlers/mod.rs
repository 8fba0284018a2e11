pub mod auth;
pub mod chat;
pub mod friends;
pub mod users;
