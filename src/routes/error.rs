use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use log::error;

/// Failures no handler recovers from. They all become a bare `500`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),

    #[error("failed to hash password: {0}")]
    Hash(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        error!("{}", self);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}
