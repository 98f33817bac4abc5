use crate::config::RepoConfig;
use anyhow::{anyhow, Context};
use reqwest::{header::ACCEPT, Client, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use std::{error::Error as StdError, time::Duration};
use tracing::{debug, warn};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const ACCEPT_V3: &str = "application/vnd.github.v3+json";

/// What came back from the contents endpoint, reduced to what the relay reports.
#[derive(Debug)]
pub enum UploadOutcome {
    Created {
        url: String,
    },
    /// 200/201 without `content.download_url`.
    CreatedWithoutUrl {
        raw: Option<Value>,
    },
    Rejected {
        status: u16,
        detail: Option<String>,
        raw: Option<Value>,
    },
    Transport {
        detail: String,
    },
}

#[derive(Serialize)]
struct CommitRequest<'a> {
    message: String,
    content: &'a str,
    branch: &'a str,
}

#[derive(Clone)]
pub struct GithubClient {
    http: Client,
    api_base: Url,
}

impl GithubClient {
    pub fn new(api_base: &str, timeout: Duration) -> anyhow::Result<Self> {
        let api_base = Url::parse(api_base).context("Invalid GitHub API URL")?;
        if api_base.cannot_be_a_base() {
            return Err(anyhow!("GitHub API URL {api_base} cannot be used as a base"));
        }

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("Could not build HTTP client")?;

        Ok(Self { http, api_base })
    }

    /// `<base>/repos/{account}/{repository}/contents/{targetDirectory}/{file_name}`,
    /// one percent-encoded segment per path component.
    pub fn contents_url(&self, repo: &RepoConfig, file_name: &str) -> Url {
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend([
                    "repos",
                    repo.account.as_str(),
                    repo.repository.as_str(),
                    "contents",
                ])
                .extend(repo.target_directory.split('/').filter(|s| !s.is_empty()))
                .push(file_name);
        }
        url
    }

    pub async fn put_file(&self, repo: &RepoConfig, file_name: &str, content: &str) -> UploadOutcome {
        let url = self.contents_url(repo, file_name);
        let body = CommitRequest {
            message: format!("Upload image {file_name}"),
            content,
            branch: &repo.branch,
        };

        debug!("PUT {url}");

        let response = match self
            .http
            .put(url)
            .bearer_auth(&repo.access_token)
            .header(ACCEPT, ACCEPT_V3)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => return transport_failure(&err),
        };

        let status = response.status();
        let raw = match response.bytes().await {
            Ok(bytes) => serde_json::from_slice::<Value>(&bytes).ok(),
            Err(err) => return transport_failure(&err),
        };

        if status == StatusCode::OK || status == StatusCode::CREATED {
            let url = raw
                .as_ref()
                .and_then(|raw| raw.pointer("/content/download_url"))
                .and_then(Value::as_str)
                .filter(|url| !url.is_empty())
                .map(str::to_owned);

            match url {
                Some(url) => UploadOutcome::Created { url },
                None => {
                    warn!("GitHub accepted {file_name} but returned no download_url");
                    UploadOutcome::CreatedWithoutUrl { raw }
                }
            }
        } else {
            let detail = raw
                .as_ref()
                .and_then(|raw| raw.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned);

            warn!("GitHub rejected {file_name} with {status}: {detail:?}");
            UploadOutcome::Rejected {
                status: status.as_u16(),
                detail,
                raw,
            }
        }
    }
}

fn transport_failure(err: &reqwest::Error) -> UploadOutcome {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }

    warn!("GitHub request failed: {detail}");
    UploadOutcome::Transport { detail }
}
