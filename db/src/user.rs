use std::fmt::Debug;

use async_trait::async_trait;

use abi::errors::Result;
use abi::model::{OnboardProfile, User, UserPublic};

#[async_trait]
pub trait UserRepo: Send + Sync + Debug {
    /// create user; a duplicate email maps to a Conflict error
    async fn create_user(&self, user: User) -> Result<User>;

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// check the credential pair; `None` for unknown email or wrong password
    async fn verify_pwd(&self, email: &str, password: &str) -> Result<Option<User>>;

    /// is the (normalized) username held by a user other than `exclude_id`
    async fn username_taken(&self, username: &str, exclude_id: &str) -> Result<bool>;

    /// apply the onboarding/profile-update mutation and set the onboarded flag
    async fn onboard(&self, id: &str, profile: OnboardProfile) -> Result<User>;

    /// case-insensitive substring search over display name and username,
    /// excluding the caller and their friends; capped at 30
    async fn search_users(&self, user_id: &str, keyword: &str) -> Result<Vec<UserPublic>>;

    /// random sample of up to 20 onboarded users the caller is not friends with
    async fn get_recommended_users(&self, user_id: &str) -> Result<Vec<UserPublic>>;
}
