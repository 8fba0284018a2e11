use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, Validation};

use abi::errors::Error;

use crate::handlers::auth::Claims;
use crate::AppState;

const AUTHORIZATION_HEADER: &str = "Authorization";
const BEARER: &str = "Bearer";

/// resolved caller identity; every protected route takes this extractor, the
/// caller id always comes from the verified token, never from the request
pub struct AuthorizedUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthorizedUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let Some(header) = parts.headers.get(AUTHORIZATION_HEADER) else {
            return Err(Error::unauthenticated("no token provided"));
        };
        let header = header.to_str().unwrap_or("");
        if !header.starts_with(BEARER) {
            return Err(Error::unauthenticated("no token provided"));
        }
        let token = header.split_whitespace().nth(1).unwrap_or("");

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(app_state.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| Error::unauthenticated("invalid token"))?;

        Ok(AuthorizedUser(data.claims.sub))
    }
}
