//! GitLab REST client
//!
//! Lists the open merge requests of one project through
//! `GET /api/v4/projects/:id/merge_requests?state=opened`, following the
//! `X-Next-Page` header until every page has been read.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use preview_auth_core::{MergeRequest, MergeRequestSource, SourceResult};
use reqwest::{Certificate, Url};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::GitLabError;
use crate::Result;

/// Page size requested from GitLab (its maximum).
pub const DEFAULT_PER_PAGE: u32 = 100;

const NEXT_PAGE_HEADER: &str = "x-next-page";
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// GitLab connection settings
#[derive(Clone)]
pub struct GitLabConfig {
    /// Instance URL, e.g. `https://gitlab.com`
    pub base_url: String,
    /// Personal or project access token
    pub token: String,
    /// Numeric project id or `group/project` path
    pub project: String,
    /// PEM bundle trusted in addition to the system roots
    pub ca_cert_path: Option<PathBuf>,
    pub per_page: u32,
}

impl GitLabConfig {
    pub fn new(base_url: &str, token: &str, project: &str) -> Self {
        GitLabConfig {
            base_url: base_url.to_string(),
            token: token.to_string(),
            project: project.to_string(),
            ca_cert_path: None,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }
}

impl fmt::Debug for GitLabConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitLabConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("project", &self.project)
            .field("ca_cert_path", &self.ca_cert_path)
            .field("per_page", &self.per_page)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct ApiMergeRequest {
    iid: u64,
    title: String,
}

/// GitLab merge-request lister
pub struct GitLabClient {
    config: GitLabConfig,
    merge_requests_url: Url,
    http_client: reqwest::Client,
}

impl GitLabClient {
    /// Build the HTTP client. Reads the CA certificate if one is configured.
    pub fn new(config: GitLabConfig) -> Result<Self> {
        let merge_requests_url = merge_requests_url(&config.base_url, &config.project)?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("preview-auth-gitlab/", env!("CARGO_PKG_VERSION")));
        if let Some(path) = &config.ca_cert_path {
            let pem = std::fs::read(path).map_err(|source| GitLabError::Certificate {
                path: path.display().to_string(),
                source,
            })?;
            builder = builder.add_root_certificate(Certificate::from_pem(&pem)?);
            info!(path = %path.display(), "using custom GitLab CA certificate");
        }

        Ok(GitLabClient {
            config,
            merge_requests_url,
            http_client: builder.build()?,
        })
    }

    pub fn config(&self) -> &GitLabConfig {
        &self.config
    }

    /// Fetch every open merge request across all pages.
    pub async fn list_open_merge_requests(&self) -> Result<Vec<MergeRequest>> {
        let mut merge_requests = Vec::new();
        let mut page: u32 = 1;

        loop {
            let response = self
                .http_client
                .get(self.merge_requests_url.clone())
                .header(TOKEN_HEADER, &self.config.token)
                .query(&[("state", "opened")])
                .query(&[("per_page", self.config.per_page), ("page", page)])
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GitLabError::Api {
                    status: status.as_u16(),
                    message: api_message(&body, status),
                });
            }

            let next_page = next_page(response.headers());
            let batch: Vec<ApiMergeRequest> = response.json().await?;
            debug!(page, count = batch.len(), "fetched merge request page");
            merge_requests.extend(
                batch
                    .into_iter()
                    .map(|mr| MergeRequest::new(mr.iid, mr.title)),
            );

            // A next page that does not move forward would loop forever.
            match next_page {
                Some(next) if next > page => page = next,
                _ => break,
            }
        }

        Ok(merge_requests)
    }
}

#[async_trait]
impl MergeRequestSource for GitLabClient {
    async fn list_open(&self) -> SourceResult<Vec<MergeRequest>> {
        Ok(self.list_open_merge_requests().await?)
    }
}

/// `{base}/api/v4/projects/{project}/merge_requests`, with the project path
/// percent-encoded as a single segment (`group/project` -> `group%2Fproject`).
fn merge_requests_url(base_url: &str, project: &str) -> Result<Url> {
    let mut url = Url::parse(base_url.trim_end_matches('/'))
        .map_err(|e| GitLabError::InvalidUrl(format!("{base_url}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| GitLabError::InvalidUrl(base_url.to_string()))?
        .pop_if_empty()
        .extend(["api", "v4", "projects", project, "merge_requests"]);
    Ok(url)
}

fn next_page(headers: &reqwest::header::HeaderMap) -> Option<u32> {
    headers
        .get(NEXT_PAGE_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse().ok())
}

/// GitLab error bodies look like `{"message": ...}` or `{"error": "..."}`.
fn api_message(body: &str, status: reqwest::StatusCode) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        match value.get("message").or_else(|| value.get("error"))? {
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    });
    match parsed {
        Some(message) => message,
        None if body.trim().is_empty() => status.to_string(),
        None => body.trim().to_string(),
    }
}
