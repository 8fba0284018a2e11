use async_trait::async_trait;
use nanoid::nanoid;
use sqlx::PgPool;
use tracing::debug;

use abi::errors::{Error, Result};
use abi::model::{
    pair_key, FriendRequest, FriendRequestStatus, FriendRequestWithUser, UserPublic,
};

use crate::friend::FriendRepo;
use crate::postgres::is_unique_violation;

const WITH_USER_FIELDS: &str = "fr.id AS request_id, fr.status, fr.create_time, \
     u.id, u.full_name, u.username, u.avatar, u.native_language, u.location, u.bio, u.is_onboarded";

#[derive(Debug)]
pub struct PostgresFriend {
    pool: PgPool,
}

impl PostgresFriend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn recipient_exists(&self, recipient_id: &str) -> Result<bool> {
        let row: Option<(String,)> = sqlx::query_as("SELECT id FROM users WHERE id = $1")
            .bind(recipient_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn are_friends(&self, user_id: &str, friend_id: &str) -> Result<bool> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT user_id FROM friends WHERE user_id = $1 AND friend_id = $2")
                .bind(user_id)
                .bind(friend_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }

    async fn insert_pending(
        &self,
        sender_id: &str,
        recipient_id: &str,
        key: &str,
    ) -> Result<FriendRequest> {
        let now = chrono::Utc::now().timestamp_millis();
        let request = sqlx::query_as(
            "INSERT INTO friend_requests
                (id, sender_id, recipient_id, status, pair_key, create_time, update_time)
             VALUES ($1, $2, $3, 'pending', $4, $5, $5)
             RETURNING *",
        )
        .bind(nanoid!())
        .bind(sender_id)
        .bind(recipient_id)
        .bind(key)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // a concurrent send for the same pair lost the race on pair_key
            if is_unique_violation(&e, "friend_requests_pair_key_key") {
                Error::conflict("a friend request already exists between you and this user")
            } else {
                e.into()
            }
        })?;
        Ok(request)
    }
}

#[async_trait]
impl FriendRepo for PostgresFriend {
    async fn create_friend_request(
        &self,
        sender_id: &str,
        recipient_id: &str,
    ) -> Result<FriendRequest> {
        if sender_id == recipient_id {
            return Err(Error::conflict(
                "you can't send a friend request to yourself",
            ));
        }

        if !self.recipient_exists(recipient_id).await? {
            return Err(Error::not_found("recipient not found"));
        }

        if self.are_friends(recipient_id, sender_id).await? {
            return Err(Error::conflict("you are already friends with this user"));
        }

        // pre-check for an outstanding record in either direction, so the
        // caller gets a message that tells the directions apart
        let key = pair_key(sender_id, recipient_id);
        let existing: Option<FriendRequest> =
            sqlx::query_as("SELECT * FROM friend_requests WHERE pair_key = $1")
                .bind(&key)
                .fetch_optional(&self.pool)
                .await?;
        if let Some(existing) = existing {
            let msg = if existing.sender_id == sender_id {
                "you have already sent a friend request to this user"
            } else if existing.recipient_id == sender_id {
                "this user has already sent you a friend request"
            } else {
                "a friend request already exists between you and this user"
            };
            return Err(Error::conflict(msg));
        }

        debug!("create friend request: {} -> {}", sender_id, recipient_id);
        self.insert_pending(sender_id, recipient_id, &key).await
    }

    async fn accept_friend_request(
        &self,
        accepter_id: &str,
        request_id: &str,
    ) -> Result<FriendRequest> {
        let now = chrono::Utc::now().timestamp_millis();
        let mut transaction = self.pool.begin().await?;

        let request: FriendRequest =
            sqlx::query_as("SELECT * FROM friend_requests WHERE id = $1 FOR UPDATE")
                .bind(request_id)
                .fetch_optional(&mut *transaction)
                .await?
                .ok_or_else(|| Error::not_found("friend request not found"))?;

        if request.recipient_id != accepter_id {
            return Err(Error::unauthorized(
                "you are not authorized to accept this request",
            ));
        }

        if request.status == FriendRequestStatus::Accepted {
            return Err(Error::conflict("friend request has already been accepted"));
        }

        let request: FriendRequest = sqlx::query_as(
            "UPDATE friend_requests
             SET status = 'accepted', update_time = $2
             WHERE id = $1
             RETURNING *",
        )
        .bind(request_id)
        .bind(now)
        .fetch_one(&mut *transaction)
        .await?;

        // symmetric additive updates; set-union semantics make a retry safe
        sqlx::query(
            "INSERT INTO friends (user_id, friend_id, create_time)
             VALUES ($1, $2, $3), ($2, $1, $3)
             ON CONFLICT (user_id, friend_id) DO NOTHING",
        )
        .bind(&request.sender_id)
        .bind(&request.recipient_id)
        .bind(now)
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;
        Ok(request)
    }

    async fn get_friend_list(&self, user_id: &str) -> Result<Vec<UserPublic>> {
        let list = sqlx::query_as(
            "SELECT u.id, u.full_name, u.username, u.avatar, u.native_language,
                    u.location, u.bio, u.is_onboarded
             FROM friends f
             JOIN users u ON u.id = f.friend_id
             WHERE f.user_id = $1
             ORDER BY f.create_time",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(list)
    }

    async fn get_incoming_requests(&self, user_id: &str) -> Result<Vec<FriendRequestWithUser>> {
        let list = sqlx::query_as(&format!(
            "SELECT {WITH_USER_FIELDS}
             FROM friend_requests fr
             JOIN users u ON u.id = fr.sender_id
             WHERE fr.recipient_id = $1 AND fr.status = 'pending'
             ORDER BY fr.create_time DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(list)
    }

    async fn get_accepted_requests(&self, user_id: &str) -> Result<Vec<FriendRequestWithUser>> {
        let list = sqlx::query_as(&format!(
            "SELECT {WITH_USER_FIELDS}
             FROM friend_requests fr
             JOIN users u ON u.id = fr.recipient_id
             WHERE fr.sender_id = $1 AND fr.status = 'accepted'
             ORDER BY fr.update_time DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(list)
    }

    async fn get_outgoing_requests(&self, user_id: &str) -> Result<Vec<FriendRequestWithUser>> {
        let list = sqlx::query_as(&format!(
            "SELECT {WITH_USER_FIELDS}
             FROM friend_requests fr
             JOIN users u ON u.id = fr.recipient_id
             WHERE fr.sender_id = $1 AND fr.status = 'pending'
             ORDER BY fr.create_time DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use nanoid::nanoid;
    use utils::TestDb;

    use abi::model::{OnboardProfile, User};

    use crate::postgres::PostgresUser;
    use crate::user::UserRepo;

    use super::*;

    fn test_db() -> TestDb {
        TestDb::new("localhost", 5432, "postgres", "postgres", "./migrations")
    }

    async fn seed_onboarded(repo: &PostgresUser, email: &str, username: &str, name: &str) -> User {
        let salt = utils::generate_salt();
        let password = utils::hash_password(b"hunter42", &salt).unwrap();
        let user = repo
            .create_user(User {
                id: nanoid!(),
                email: email.to_string(),
                password,
                salt,
                full_name: name.to_string(),
                avatar: "https://avatar.iran.liara.run/public/2.png".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        repo.onboard(
            &user.id,
            OnboardProfile {
                username: username.to_string(),
                full_name: name.to_string(),
                bio: "hello".to_string(),
                native_language: "english".to_string(),
                location: "porto".to_string(),
                avatar: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    #[ignore = "requires a running postgres at localhost:5432"]
    async fn duplicate_requests_conflict_in_both_directions() {
        let tdb = test_db();
        let pool = tdb.pool().await;
        let users = PostgresUser::new(pool.clone());
        let friends = PostgresFriend::new(pool);

        let a = seed_onboarded(&users, "a@example.com", "user_a", "A").await;
        let b = seed_onboarded(&users, "b@example.com", "user_b", "B").await;

        friends.create_friend_request(&a.id, &b.id).await.unwrap();

        let err = friends
            .create_friend_request(&a.id, &b.id)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("already sent a friend request"));

        let err = friends
            .create_friend_request(&b.id, &a.id)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("already sent you"));
    }

    #[tokio::test]
    #[ignore = "requires a running postgres at localhost:5432"]
    async fn losing_the_pair_key_race_is_a_generic_conflict() {
        let tdb = test_db();
        let pool = tdb.pool().await;
        let users = PostgresUser::new(pool.clone());
        let friends = PostgresFriend::new(pool.clone());

        let a = seed_onboarded(&users, "a@example.com", "user_a", "A").await;
        let b = seed_onboarded(&users, "b@example.com", "user_b", "B").await;

        // a competing send lands between the pair-level pre-check and the
        // insert; directionality can no longer be attributed at that point
        let key = pair_key(&a.id, &b.id);
        sqlx::query(
            "INSERT INTO friend_requests
                (id, sender_id, recipient_id, status, pair_key, create_time, update_time)
             VALUES ($1, $2, $3, 'pending', $4, $5, $5)",
        )
        .bind(nanoid!())
        .bind(&b.id)
        .bind(&a.id)
        .bind(&key)
        .bind(chrono::Utc::now().timestamp_millis())
        .execute(&pool)
        .await
        .unwrap();

        let err = friends.insert_pending(&a.id, &b.id, &key).await.unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("already exists between"));
    }

    #[tokio::test]
    #[ignore = "requires a running postgres at localhost:5432"]
    async fn self_request_always_fails() {
        let tdb = test_db();
        let pool = tdb.pool().await;
        let users = PostgresUser::new(pool.clone());
        let friends = PostgresFriend::new(pool);

        let a = seed_onboarded(&users, "a@example.com", "user_a", "A").await;
        let err = friends
            .create_friend_request(&a.id, &a.id)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    #[ignore = "requires a running postgres at localhost:5432"]
    async fn request_to_unknown_recipient_is_not_found() {
        let tdb = test_db();
        let pool = tdb.pool().await;
        let users = PostgresUser::new(pool.clone());
        let friends = PostgresFriend::new(pool);

        let a = seed_onboarded(&users, "a@example.com", "user_a", "A").await;
        let err = friends
            .create_friend_request(&a.id, "missing-user")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    #[ignore = "requires a running postgres at localhost:5432"]
    async fn accept_is_guarded_and_symmetric() {
        let tdb = test_db();
        let pool = tdb.pool().await;
        let users = PostgresUser::new(pool.clone());
        let friends = PostgresFriend::new(pool);

        let a = seed_onboarded(&users, "a@example.com", "user_a", "A").await;
        let b = seed_onboarded(&users, "b@example.com", "user_b", "B").await;
        let c = seed_onboarded(&users, "c@example.com", "user_c", "C").await;

        let request = friends.create_friend_request(&a.id, &b.id).await.unwrap();

        // only the recipient may accept
        let err = friends
            .accept_friend_request(&c.id, &request.id)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());

        // unknown request id
        let err = friends
            .accept_friend_request(&b.id, "missing-request")
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let accepted = friends
            .accept_friend_request(&b.id, &request.id)
            .await
            .unwrap();
        assert_eq!(accepted.status, FriendRequestStatus::Accepted);

        // both friend-sets contain each other
        let a_friends = friends.get_friend_list(&a.id).await.unwrap();
        let b_friends = friends.get_friend_list(&b.id).await.unwrap();
        assert!(a_friends.iter().any(|u| u.id == b.id));
        assert!(b_friends.iter().any(|u| u.id == a.id));

        // repeated accept is an explicit conflict, not a silent no-op
        let err = friends
            .accept_friend_request(&b.id, &request.id)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    #[ignore = "requires a running postgres at localhost:5432"]
    async fn request_between_existing_friends_is_rejected() {
        let tdb = test_db();
        let pool = tdb.pool().await;
        let users = PostgresUser::new(pool.clone());
        let friends = PostgresFriend::new(pool);

        let a = seed_onboarded(&users, "a@example.com", "user_a", "A").await;
        let b = seed_onboarded(&users, "b@example.com", "user_b", "B").await;

        let request = friends.create_friend_request(&a.id, &b.id).await.unwrap();
        friends
            .accept_friend_request(&b.id, &request.id)
            .await
            .unwrap();

        // requests never get deleted, so the pair-level pre-check fires first;
        // either way the result is a conflict
        let err = friends
            .create_friend_request(&b.id, &a.id)
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    #[ignore = "requires a running postgres at localhost:5432"]
    async fn request_lifecycle_feeds_the_right_lists() {
        let tdb = test_db();
        let pool = tdb.pool().await;
        let users = PostgresUser::new(pool.clone());
        let friends = PostgresFriend::new(pool);

        let a = seed_onboarded(&users, "a@example.com", "user_a", "A").await;
        let b = seed_onboarded(&users, "b@example.com", "user_b", "B").await;
        let c = seed_onboarded(&users, "c@example.com", "user_c", "C").await;

        let request = friends.create_friend_request(&a.id, &b.id).await.unwrap();

        // B sees it incoming, A sees it outgoing, C sees nothing
        let incoming = friends.get_incoming_requests(&b.id).await.unwrap();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].user.id, a.id);
        assert_eq!(incoming[0].status, FriendRequestStatus::Pending);

        let outgoing = friends.get_outgoing_requests(&a.id).await.unwrap();
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing[0].user.id, b.id);

        assert!(friends.get_incoming_requests(&c.id).await.unwrap().is_empty());

        friends
            .accept_friend_request(&b.id, &request.id)
            .await
            .unwrap();

        // pending views drain, A gets the "accepted you" notification
        assert!(friends.get_incoming_requests(&b.id).await.unwrap().is_empty());
        assert!(friends.get_outgoing_requests(&a.id).await.unwrap().is_empty());
        let accepted = friends.get_accepted_requests(&a.id).await.unwrap();
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].user.id, b.id);
    }

    #[tokio::test]
    #[ignore = "requires a running postgres at localhost:5432"]
    async fn discovery_excludes_current_friends() {
        let tdb = test_db();
        let pool = tdb.pool().await;
        let users = PostgresUser::new(pool.clone());
        let friends = PostgresFriend::new(pool);

        let a = seed_onboarded(&users, "a@example.com", "user_a", "Ann A").await;
        let b = seed_onboarded(&users, "b@example.com", "user_b", "Ann B").await;
        let c = seed_onboarded(&users, "c@example.com", "user_c", "Ann C").await;

        let request = friends.create_friend_request(&a.id, &b.id).await.unwrap();
        friends
            .accept_friend_request(&b.id, &request.id)
            .await
            .unwrap();

        let results = users.search_users(&a.id, "ann").await.unwrap();
        let ids: Vec<_> = results.iter().map(|u| u.id.as_str()).collect();
        assert!(!ids.contains(&b.id.as_str()));
        assert!(ids.contains(&c.id.as_str()));

        let recommended = users.get_recommended_users(&a.id).await.unwrap();
        let ids: Vec<_> = recommended.iter().map(|u| u.id.as_str()).collect();
        assert!(!ids.contains(&b.id.as_str()));
        assert!(!ids.contains(&a.id.as_str()));
        assert!(ids.contains(&c.id.as_str()));
    }
}
