mod friend;
mod postgres;
mod user;

pub use friend::FriendRepo;
pub use user::UserRepo;

use sqlx::postgres::PgPoolOptions;

use abi::config::Config;
use abi::errors::Result;

use crate::postgres::{PostgresFriend, PostgresUser};

/// storage access for the whole application: the user directory and the
/// relationship store, both backed by the same postgres pool
#[derive(Debug)]
pub struct DbRepo {
    pub user: Box<dyn UserRepo>,
    pub friend: Box<dyn FriendRepo>,
}

impl DbRepo {
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db.max_connections)
            .connect(&config.db.url())
            .await?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: sqlx::PgPool) -> Self {
        Self {
            user: Box::new(PostgresUser::new(pool.clone())),
            friend: Box::new(PostgresFriend::new(pool)),
        }
    }
}
