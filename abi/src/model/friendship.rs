use serde::{Deserialize, Serialize};

use super::UserPublic;

/// reachable states of a friend request; accepted is terminal,
/// there is no rejected or cancelled state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "friend_request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FriendRequestStatus {
    Pending,
    Accepted,
}

impl FriendRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendRequestStatus::Pending => "pending",
            FriendRequestStatus::Accepted => "accepted",
        }
    }
}

/// directed friend-request record; at most one per unordered pair,
/// enforced by the unique `pair_key` column
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FriendRequest {
    pub id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub status: FriendRequestStatus,
    pub create_time: i64,
    pub update_time: i64,
}

/// a friend request expanded with the counterpart party's public profile:
/// the sender for incoming lists, the recipient for outgoing/accepted lists
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FriendRequestWithUser {
    pub request_id: String,
    pub status: FriendRequestStatus,
    pub create_time: i64,
    #[sqlx(flatten)]
    pub user: UserPublic,
}

/// normalized sorted-pair key; direction-independent so a single unique
/// index covers requests in both directions
pub fn pair_key(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}:{}", a, b)
    } else {
        format!("{}:{}", b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_direction_independent() {
        assert_eq!(pair_key("alice", "bob"), pair_key("bob", "alice"));
        assert_eq!(pair_key("alice", "bob"), "alice:bob");
    }

    #[test]
    fn pair_key_of_self_is_degenerate() {
        assert_eq!(pair_key("alice", "alice"), "alice:alice");
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&FriendRequestStatus::Pending).unwrap();
        assert_eq!(json, "\"pending\"");
        assert_eq!(FriendRequestStatus::Accepted.as_str(), "accepted");
    }
}
