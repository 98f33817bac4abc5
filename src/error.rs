use crate::{config::ConfigError, response::UploadResult};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("only POST allowed")]
    MethodNotAllowed,
    #[error("missing filename or file content")]
    RequestBodyInvalid,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(UploadResult::failure(self.to_string()))).into_response()
    }
}
