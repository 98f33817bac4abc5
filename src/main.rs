mod config;
mod error;
mod github;
mod handlers;
mod response;

use crate::config::{Config, RepoConfig};
use crate::github::GithubClient;
use crate::handlers::RelayState;
use anyhow::Context;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    routing::any,
    Extension, Router,
};
use envconfig::Envconfig;
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::init_from_env().context("Failed to load config")?;

    let repo = RepoConfig::load(&config.config_path).await;
    match &repo {
        Ok(repo) => info!(
            "Uploading to {}/{} on branch {} under {}",
            repo.account, repo.repository, repo.branch, repo.target_directory
        ),
        Err(err) => error!(
            "Repository config {} is unusable, every upload will be refused: {err:?}",
            config.config_path
        ),
    }

    let github = GithubClient::new(
        &config.github_api_url,
        Duration::from_secs(config.upstream_timeout_secs),
    )?;

    let app = app(RelayState { repo, github });

    info!("Listening on {}", config.listen_address);

    axum::Server::bind(
        &config
            .listen_address
            .parse()
            .context("Invalid listen address")?,
    )
    .serve(app.into_make_service())
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

fn app(state: RelayState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .route("/", any(handlers::upload))
        .layer(Extension(Arc::new(state)))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Could not listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
