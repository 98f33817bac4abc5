use envconfig::Envconfig;
use serde::Deserialize;
use std::{fmt, io, path::Path};
use thiserror::Error;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "LISTEN_ADDRESS", default = "0.0.0.0:8989")]
    pub listen_address: String,

    #[envconfig(from = "CONFIG_PATH", default = "./config.json")]
    pub config_path: String,

    #[envconfig(from = "GITHUB_API_URL", default = "https://api.github.com")]
    pub github_api_url: String,

    #[envconfig(from = "UPSTREAM_TIMEOUT_SECS", default = "30")]
    pub upstream_timeout_secs: u64,
}

/// Target repository and credentials, read once from the JSON config file.
#[derive(Clone)]
pub struct RepoConfig {
    pub account: String,
    pub repository: String,
    pub access_token: String,
    pub branch: String,
    pub target_directory: String,
}

#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("config.json not found, make sure the relay is configured")]
    Missing,
    #[error("could not read config.json: {0}")]
    Unreadable(String),
    #[error("failed to parse config.json, check the JSON format")]
    InvalidJson(String),
    #[error("config.json is missing required GitHub settings ({})", .0.join(", "))]
    Incomplete(Vec<&'static str>),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRepoConfig {
    github_user: Option<String>,
    github_repo: Option<String>,
    github_token: Option<String>,
    github_branch: Option<String>,
    image_path: Option<String>,
}

impl RepoConfig {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let buf = match tokio::fs::read(path.as_ref()).await {
            Ok(buf) => buf,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Err(ConfigError::Missing),
            Err(err) => return Err(ConfigError::Unreadable(err.to_string())),
        };

        Self::from_slice(&buf)
    }

    pub fn from_slice(buf: &[u8]) -> Result<Self, ConfigError> {
        let raw: RawRepoConfig =
            serde_json::from_slice(buf).map_err(|err| ConfigError::InvalidJson(err.to_string()))?;

        let mut missing = Vec::new();
        let mut require = |value: Option<String>, key: &'static str| match value {
            Some(value) if !value.is_empty() => value,
            _ => {
                missing.push(key);
                String::new()
            }
        };

        let config = Self {
            account: require(raw.github_user, "githubUser"),
            repository: require(raw.github_repo, "githubRepo"),
            access_token: require(raw.github_token, "githubToken"),
            branch: require(raw.github_branch, "githubBranch"),
            target_directory: require(raw.image_path, "imagePath"),
        };

        if missing.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Incomplete(missing))
        }
    }
}

// Keeps the access token out of logs.
impl fmt::Debug for RepoConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoConfig")
            .field("account", &self.account)
            .field("repository", &self.repository)
            .field("access_token", &"<redacted>")
            .field("branch", &self.branch)
            .field("target_directory", &self.target_directory)
            .finish()
    }
}
