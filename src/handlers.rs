use crate::{
    config::{ConfigError, RepoConfig},
    error::Error,
    github::GithubClient,
    response::UploadResult,
};
use axum::{
    body::Bytes,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Shared by every request, read-only after startup.
pub struct RelayState {
    pub repo: Result<RepoConfig, ConfigError>,
    pub github: GithubClient,
}

struct UploadRequest {
    filename: String,
    content: String,
}

impl UploadRequest {
    fn parse(body: &[u8]) -> Result<Self, Error> {
        let value: Value = serde_json::from_slice(body).map_err(|_| Error::RequestBodyInvalid)?;

        let field = |name: &str| value.get(name).and_then(Value::as_str);
        let filename = field("filename").ok_or(Error::RequestBodyInvalid)?;
        let content = field("content").ok_or(Error::RequestBodyInvalid)?;

        let filename = sanitize_filename(filename).ok_or(Error::RequestBodyInvalid)?;

        Ok(Self {
            filename: filename.to_owned(),
            content: content.to_owned(),
        })
    }
}

pub async fn upload(
    method: Method,
    Extension(state): Extension<Arc<RelayState>>,
    body: Bytes,
) -> Result<Response, Error> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }
    if method != Method::POST {
        return Err(Error::MethodNotAllowed);
    }

    let repo = state.repo.as_ref().map_err(ConfigError::clone)?;
    let request = UploadRequest::parse(&body)?;

    debug!(
        "Relaying {} ({} base64 bytes) to {}/{}",
        request.filename,
        request.content.len(),
        repo.account,
        repo.repository
    );

    let result = UploadResult::from(
        state
            .github
            .put_file(repo, &request.filename, &request.content)
            .await,
    );

    if let Some(url) = &result.image_url {
        info!("Uploaded {} to {url}", request.filename);
    }

    Ok(Json(result).into_response())
}

const SEPARATORS: &[char] = &['/', '\\'];

/// Keeps only the last path segment, `None` when nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<&str> {
    let base = name
        .trim_end_matches(SEPARATORS)
        .rsplit(SEPARATORS)
        .next()
        .unwrap_or_default();

    match base {
        "" | "." | ".." => None,
        base => Some(base),
    }
}
