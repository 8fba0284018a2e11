mod auth;
mod json_extractor;
mod path_extractor;

pub use auth::AuthorizedUser;
pub use json_extractor::JsonExtractor;
pub use path_extractor::PathExtractor;
