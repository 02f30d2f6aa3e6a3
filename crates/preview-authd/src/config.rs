//! Command-line and environment configuration
//!
//! Every setting can be given as a flag or through the environment variable
//! named next to it. Required keys are checked together so a single run
//! reports everything that is missing.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use preview_auth_core::{RedirectTemplate, RedirectTemplateError, DEFAULT_REDIRECT_TEMPLATE};
use preview_auth_dex::DexConfig;
use preview_auth_gitlab::GitLabConfig;
use thiserror::Error;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "preview-authd")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Registers a Dex OIDC client for every open GitLab merge request",
    long_about = None
)]
pub struct Cli {
    /// GitLab access token with `read_api` scope
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    pub gitlab_token: Option<String>,

    /// GitLab instance URL
    #[arg(long, env = "GITLAB_URL")]
    pub gitlab_url: Option<String>,

    /// Numeric project id or `group/project` path
    #[arg(long, env = "GITLAB_PROJECT_ID")]
    pub gitlab_project_id: Option<String>,

    /// PEM CA bundle for the GitLab instance
    #[arg(long, env = "GITLAB_CERT_PATH")]
    pub gitlab_cert_path: Option<PathBuf>,

    /// Dex gRPC API address (`host:port`)
    #[arg(long, env = "DEX_HOST")]
    pub dex_host: Option<String>,

    /// PEM CA bundle for the Dex gRPC API
    #[arg(long, env = "DEX_CERT_PATH")]
    pub dex_cert_path: Option<PathBuf>,

    /// Seconds between polls
    #[arg(long, env = "CHECK_INTERVAL", default_value_t = 30)]
    pub check_interval: u64,

    /// Redirect URI for new clients; `{id}` is replaced with the MR iid
    #[arg(long, env = "PREVIEW_REDIRECT_TEMPLATE", default_value = DEFAULT_REDIRECT_TEMPLATE)]
    pub redirect_template: String,

    /// Adopt existing `mr-<n>` clients from Dex at startup
    ///
    /// The environment value accepts `1`/`0`, `yes`/`no`, `on`/`off` as well
    /// as `true`/`false`.
    #[arg(
        long,
        env = "SEED_FROM_REGISTRY",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub seed_from_registry: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error(transparent)]
    RedirectTemplate(#[from] RedirectTemplateError),

    #[error("CHECK_INTERVAL must be at least 1 second")]
    ZeroInterval,
}

/// Validated daemon settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub gitlab: GitLabConfig,
    pub dex: DexConfig,
    pub interval: Duration,
    pub redirect: RedirectTemplate,
    pub seed_from_registry: bool,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let token = present(&cli.gitlab_token);
        let url = present(&cli.gitlab_url);
        let project = present(&cli.gitlab_project_id);
        let dex_host = present(&cli.dex_host);

        let missing: Vec<&'static str> = [
            ("GITLAB_TOKEN", token.is_none()),
            ("GITLAB_URL", url.is_none()),
            ("GITLAB_PROJECT_ID", project.is_none()),
            ("DEX_HOST", dex_host.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        let (Some(token), Some(url), Some(project), Some(dex_host)) =
            (token, url, project, dex_host)
        else {
            return Err(ConfigError::Missing(missing));
        };

        if cli.check_interval == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        let redirect = RedirectTemplate::new(cli.redirect_template.clone())?;

        let mut gitlab = GitLabConfig::new(url, token, project);
        if let Some(path) = &cli.gitlab_cert_path {
            gitlab = gitlab.with_ca_cert(path);
        }
        let mut dex = DexConfig::new(dex_host);
        if let Some(path) = &cli.dex_cert_path {
            dex = dex.with_ca_cert(path);
        }

        Ok(Settings {
            gitlab,
            dex,
            interval: Duration::from_secs(cli.check_interval),
            redirect,
            seed_from_registry: cli.seed_from_registry,
        })
    }
}

// Blank values count as unset.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
