//! Merge requests, OIDC client records, and the derivations between them.
//!
//! Every client is named from its merge request id alone (`mr-<iid>`), so the
//! registry can be matched against the open merge requests without keeping
//! any mapping of our own.

use std::collections::BTreeSet;
use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Prefix of every client id owned by this service.
pub const CLIENT_ID_PREFIX: &str = "mr-";

/// Placeholder substituted with the merge request id in redirect templates.
pub const REDIRECT_PLACEHOLDER: &str = "{id}";

/// Redirect template used when none is configured.
pub const DEFAULT_REDIRECT_TEMPLATE: &str = "https://mr-{id}.preview.example.com/callback";

/// Bytes of entropy in a generated client secret.
pub const SECRET_BYTES: usize = 32;

/// Project-scoped merge request number (GitLab `iid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergeRequestId(pub u64);

impl fmt::Display for MergeRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "!{}", self.0)
    }
}

impl From<u64> for MergeRequestId {
    fn from(value: u64) -> Self {
        MergeRequestId(value)
    }
}

/// One open merge request as reported by the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRequest {
    pub id: MergeRequestId,
    pub title: String,
}

impl MergeRequest {
    pub fn new(id: impl Into<MergeRequestId>, title: impl Into<String>) -> Self {
        MergeRequest {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Merge requests believed to have a registered client.
pub type KnownSet = BTreeSet<MergeRequestId>;

/// Render a set as `!1, !2, !3` for log lines.
pub fn format_ids<'a>(ids: impl IntoIterator<Item = &'a MergeRequestId>) -> String {
    ids.into_iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Derive the registry client id for a merge request.
pub fn client_id_for(id: MergeRequestId) -> String {
    format!("{}{}", CLIENT_ID_PREFIX, id.0)
}

/// Inverse of [`client_id_for`]. Returns `None` for ids this service does not own.
pub fn parse_client_id(client_id: &str) -> Option<MergeRequestId> {
    let digits = client_id.strip_prefix(CLIENT_ID_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok().map(MergeRequestId)
}

/// Generate a client secret: 32 random bytes from the OS, base64url without padding.
pub fn generate_client_secret() -> String {
    let mut bytes = [0u8; SECRET_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Invalid redirect template
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("redirect template {template:?} must contain the {{id}} placeholder")]
pub struct RedirectTemplateError {
    pub template: String,
}

/// Redirect URI template parameterised only by the merge request id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTemplate(String);

impl RedirectTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, RedirectTemplateError> {
        let template = template.into();
        if !template.contains(REDIRECT_PLACEHOLDER) {
            return Err(RedirectTemplateError { template });
        }
        Ok(RedirectTemplate(template))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn render(&self, id: MergeRequestId) -> String {
        self.0.replace(REDIRECT_PLACEHOLDER, &id.0.to_string())
    }
}

impl Default for RedirectTemplate {
    fn default() -> Self {
        RedirectTemplate(DEFAULT_REDIRECT_TEMPLATE.to_string())
    }
}

/// OIDC client as stored in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: String,
    pub secret: String,
    pub redirect_uris: Vec<String>,
    pub trusted_peers: Vec<String>,
    pub public: bool,
    pub name: String,
    pub logo_url: String,
}

impl ClientRecord {
    /// Build the create payload for a merge request, with a fresh secret.
    pub fn for_merge_request(mr: &MergeRequest, redirect: &RedirectTemplate) -> Self {
        ClientRecord {
            id: client_id_for(mr.id),
            secret: generate_client_secret(),
            redirect_uris: vec![redirect.render(mr.id)],
            trusted_peers: Vec::new(),
            public: false,
            name: format!("MR {} - {}", mr.id, mr.title),
            logo_url: String::new(),
        }
    }

    /// The merge request this client belongs to, if it follows our naming.
    pub fn merge_request_id(&self) -> Option<MergeRequestId> {
        parse_client_id(&self.id)
    }
}
