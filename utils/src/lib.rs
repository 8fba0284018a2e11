use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher};

use abi::errors::{Error, Result};

pub mod sqlx_tester;

pub use sqlx_tester::TestDb;

pub fn generate_salt() -> String {
    SaltString::generate(&mut OsRng).to_string()
}

pub fn hash_password(password: &[u8], salt: &str) -> Result<String> {
    let salt = SaltString::from_b64(salt)
        .map_err(|e| Error::internal_with_details(e.to_string()))?;
    let hash = Argon2::default()
        .hash_password(password, &salt)
        .map_err(|e| Error::internal_with_details(e.to_string()))?;
    Ok(hash.to_string())
}
