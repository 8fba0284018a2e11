use axum::async_trait;
use axum::extract::path::ErrorKind;
use axum::extract::rejection::PathRejection;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use abi::errors::Error;

/// axum::extract::Path with rejections converted into the unified error type
pub struct PathExtractor<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathExtractor<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match axum::extract::Path::<T>::from_request_parts(parts, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => {
                let err = match rejection {
                    PathRejection::FailedToDeserializePathParams(inner) => {
                        let kind = inner.into_kind();
                        match &kind {
                            ErrorKind::UnsupportedType { .. } => {
                                // programmer error, not a caller problem
                                Error::internal_with_details(kind.to_string())
                            }
                            _ => Error::path_parsing(kind.to_string()),
                        }
                    }
                    PathRejection::MissingPathParams(inner) => {
                        Error::path_parsing(inner.to_string())
                    }
                    _ => Error::path_parsing(format!("unhandled path rejection: {rejection}")),
                };
                Err(err)
            }
        }
    }
}
