//! preview-authd
//!
//! Polls a GitLab project for open merge requests and keeps one Dex OIDC
//! client (`mr-<iid>`) registered per open merge request, deleting it once
//! the merge request is closed or merged. Runs until Ctrl-C.

mod config;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use preview_auth_core::{Monitor, Reconciler};
use preview_auth_dex::DexRegistry;
use preview_auth_gitlab::GitLabClient;
use tracing::{error, info, Level};

use crate::config::{Cli, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; the environment may already be set.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    preview_auth_core::init_tracing(cli.json, level);

    let settings = Settings::from_cli(&cli).context("invalid configuration")?;
    log_banner(&settings);

    let source =
        GitLabClient::new(settings.gitlab.clone()).context("failed to set up GitLab client")?;
    let registry =
        DexRegistry::connect_lazy(&settings.dex).context("failed to set up Dex channel")?;

    let reconciler = Reconciler::new(
        Arc::new(source),
        Arc::new(registry),
        settings.redirect.clone(),
    );
    let monitor = Monitor::new(reconciler, settings.interval)
        .with_seed_from_registry(settings.seed_from_registry);

    let known = monitor.run_until(shutdown_signal()).await;
    info!(
        event = "daemon.stopped",
        open = known.len(),
        "stopping preview-authd"
    );
    Ok(())
}

fn log_banner(settings: &Settings) {
    info!(
        event = "daemon.starting",
        version = env!("CARGO_PKG_VERSION"),
        gitlab_url = %settings.gitlab.base_url,
        project = %settings.gitlab.project,
        dex_host = %settings.dex.host,
        interval_secs = settings.interval.as_secs(),
        redirect_template = settings.redirect.as_str(),
        seed_from_registry = settings.seed_from_registry,
        "starting preview-authd"
    );
    if let Some(path) = &settings.gitlab.ca_cert_path {
        info!(path = %path.display(), "GitLab CA certificate configured");
    }
    if let Some(path) = &settings.dex.ca_cert_path {
        info!(path = %path.display(), "Dex CA certificate configured");
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(event = "daemon.interrupted", "received Ctrl-C"),
        Err(e) => {
            // No handler: run until killed.
            error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    }
}
