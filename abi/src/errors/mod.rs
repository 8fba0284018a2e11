use std::error::Error as StdError;
use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Serialize)]
pub enum ErrorKind {
    /// malformed or missing input
    Validation,
    /// no credential or an invalid one
    Unauthenticated,
    /// authenticated but not permitted
    Unauthorized,
    /// duplicate email/username/relationship, self-request, already accepted
    Conflict,
    NotFound,
    /// best-effort external collaborator failed
    Dependency,
    BodyParsing,
    PathParsing,
    ConfigRead,
    ConfigParse,
    Db,
    Internal,
}

/// unified error for every crate in the workspace; user-facing errors carry a
/// stable message in `details`, the source is kept for logs only
#[derive(Debug, Serialize)]
pub struct Error {
    kind: ErrorKind,
    details: Option<String>,
    #[serde(skip)]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    #[inline]
    pub fn new(
        kind: ErrorKind,
        details: impl Into<String>,
        source: impl StdError + 'static + Send + Sync,
    ) -> Self {
        Self {
            kind,
            details: Some(details.into()),
            source: Some(Box::new(source)),
        }
    }

    #[inline]
    pub fn with_details(kind: ErrorKind, details: impl Into<String>) -> Self {
        Self {
            kind,
            details: Some(details.into()),
            source: None,
        }
    }

    #[inline]
    pub fn validation(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Validation, details)
    }

    #[inline]
    pub fn unauthenticated(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Unauthenticated, details)
    }

    #[inline]
    pub fn unauthorized(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Unauthorized, details)
    }

    #[inline]
    pub fn conflict(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Conflict, details)
    }

    #[inline]
    pub fn not_found(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::NotFound, details)
    }

    #[inline]
    pub fn dependency(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Dependency, details)
    }

    #[inline]
    pub fn body_parsing(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::BodyParsing, details)
    }

    #[inline]
    pub fn path_parsing(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::PathParsing, details)
    }

    #[inline]
    pub fn config_read(source: impl StdError + 'static + Send + Sync) -> Self {
        Self::new(ErrorKind::ConfigRead, "failed to read config file", source)
    }

    #[inline]
    pub fn internal(source: impl StdError + 'static + Send + Sync) -> Self {
        Self::new(ErrorKind::Internal, source.to_string(), source)
    }

    #[inline]
    pub fn internal_with_details(details: impl Into<String>) -> Self {
        Self::with_details(ErrorKind::Internal, details)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self.kind, ErrorKind::Conflict)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::NotFound)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.kind, ErrorKind::Unauthorized)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{:?}: {}", self.kind, details),
            None => write!(f, "{:?}", self.kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn StdError + 'static))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::BodyParsing => StatusCode::BAD_REQUEST,
            ErrorKind::PathParsing => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Dependency => StatusCode::BAD_GATEWAY,
            ErrorKind::ConfigRead | ErrorKind::ConfigParse => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Db | ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        error!("http request error: {:?}", self);

        // unexpected failures collapse to a generic message, nothing leaks
        let body = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            Json(serde_json::json!({ "message": "internal server error" }))
        } else {
            let msg = self.details.unwrap_or_else(|| format!("{:?}", self.kind));
            Json(serde_json::json!({ "message": msg }))
        };
        (status_code, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        Self::new(ErrorKind::Db, value.to_string(), value)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::new(ErrorKind::Internal, value.to_string(), value)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Self {
        Self::new(ErrorKind::ConfigParse, value.to_string(), value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::new(ErrorKind::Internal, value.to_string(), value)
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Self::new(ErrorKind::Dependency, value.to_string(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_stable_message() {
        let err = Error::conflict("you are already friends with this user");
        assert_eq!(
            err.to_string(),
            "Conflict: you are already friends with this user"
        );
        assert!(err.is_conflict());
    }

    #[test]
    fn kind_predicates() {
        assert!(Error::not_found("friend request not found").is_not_found());
        assert!(Error::unauthorized("not your request").is_unauthorized());
        assert!(!Error::validation("bad input").is_conflict());
    }
}
