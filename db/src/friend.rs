use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Result;
use abi::model::{FriendRequest, FriendRequestWithUser, UserPublic};

#[async_trait]
pub trait FriendRepo: Send + Sync + Debug {
    /// NoRelation -> Pending; rejects self-requests, missing recipients,
    /// existing friendships and duplicate requests in either direction
    async fn create_friend_request(
        &self,
        sender_id: &str,
        recipient_id: &str,
    ) -> Result<FriendRequest>;

    /// Pending -> Accepted (terminal); only the recipient may accept, and a
    /// repeated accept is a Conflict, not a silent no-op
    async fn accept_friend_request(
        &self,
        accepter_id: &str,
        request_id: &str,
    ) -> Result<FriendRequest>;

    /// the caller's friend-set expanded to public profiles, insertion order
    async fn get_friend_list(&self, user_id: &str) -> Result<Vec<UserPublic>>;

    /// pending requests addressed to the caller, with the sender's profile
    async fn get_incoming_requests(&self, user_id: &str) -> Result<Vec<FriendRequestWithUser>>;

    /// requests the caller sent that were accepted, with the recipient's
    /// profile; consumed as "someone accepted you" notifications
    async fn get_accepted_requests(&self, user_id: &str) -> Result<Vec<FriendRequestWithUser>>;

    /// pending requests the caller sent, with the recipient's profile
    async fn get_outgoing_requests(&self, user_id: &str) -> Result<Vec<FriendRequestWithUser>>;
}
