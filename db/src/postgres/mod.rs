mod friend;
mod user;

pub(crate) use friend::PostgresFriend;
pub(crate) use user::PostgresUser;

/// did the error come from the named unique constraint
fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    matches!(
        err,
        sqlx::Error::Database(e) if e.is_unique_violation() && e.constraint() == Some(constraint)
    )
}
