use serde::{Deserialize, Serialize};

/// full user record as stored; password and salt never serialize
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip)]
    pub password: String,
    #[serde(skip)]
    pub salt: String,
    pub full_name: String,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub native_language: Option<String>,
    pub location: Option<String>,
    pub avatar: String,
    pub is_onboarded: bool,
    pub create_time: i64,
    pub update_time: i64,
}

/// the public field subset every discovery/list operation projects;
/// no email, no password, no relationship lists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserPublic {
    pub id: String,
    pub full_name: String,
    pub username: Option<String>,
    pub avatar: String,
    pub native_language: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub is_onboarded: bool,
}

impl From<User> for UserPublic {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            username: user.username,
            avatar: user.avatar,
            native_language: user.native_language,
            location: user.location,
            bio: user.bio,
            is_onboarded: user.is_onboarded,
        }
    }
}

/// profile fields applied by the onboarding/profile-update mutation;
/// username arrives already normalized
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OnboardProfile {
    pub username: String,
    pub full_name: String,
    pub bio: String,
    pub native_language: String,
    pub location: String,
    pub avatar: Option<String>,
}
