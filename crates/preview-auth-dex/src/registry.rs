//! Dex client registry over gRPC
//!
//! The channel is created lazily: nothing is dialed until the first call, so
//! an unreachable Dex shows up as a failed registry call inside a cycle
//! rather than as a startup failure.

use std::path::PathBuf;

use async_trait::async_trait;
use preview_auth_core::{ClientRecord, ClientRegistry, RegistryError, RegistryResult};
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tracing::{debug, info};

use crate::error::DexError;
use crate::pb::api::dex_client::DexClient;
use crate::pb::api::{Client, ClientInfo, CreateClientReq, DeleteClientReq, ListClientReq};
use crate::Result;

/// Dex connection settings
#[derive(Debug, Clone)]
pub struct DexConfig {
    /// `host:port` of the Dex gRPC API; `https://` is assumed without a scheme
    pub host: String,
    /// PEM bundle used instead of the system roots
    pub ca_cert_path: Option<PathBuf>,
}

impl DexConfig {
    pub fn new(host: &str) -> Self {
        DexConfig {
            host: host.to_string(),
            ca_cert_path: None,
        }
    }

    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    /// Endpoint URI. Plain `host:port` becomes `https://host:port`.
    pub fn uri(&self) -> String {
        if self.host.contains("://") {
            self.host.clone()
        } else {
            format!("https://{}", self.host)
        }
    }

    /// Build the endpoint, with TLS for `https` URIs.
    ///
    /// An explicit `http://` scheme opts out of TLS.
    pub fn endpoint(&self) -> Result<Endpoint> {
        let uri = self.uri();
        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| DexError::InvalidEndpoint(format!("{uri}: {e}")))?;

        if !uri.starts_with("https://") {
            return Ok(endpoint);
        }

        let tls = match &self.ca_cert_path {
            Some(path) => {
                let pem = std::fs::read(path).map_err(|source| DexError::Certificate {
                    path: path.display().to_string(),
                    source,
                })?;
                info!(path = %path.display(), "using custom Dex CA certificate");
                ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pem))
            }
            None => ClientTlsConfig::new().with_native_roots(),
        };
        Ok(endpoint.tls_config(tls)?)
    }
}

/// [`ClientRegistry`] backed by the Dex gRPC API.
#[derive(Debug, Clone)]
pub struct DexRegistry {
    client: DexClient<Channel>,
}

impl DexRegistry {
    /// Prepare a channel to Dex without connecting.
    pub fn connect_lazy(config: &DexConfig) -> Result<Self> {
        let channel = config.endpoint()?.connect_lazy();
        debug!(uri = %config.uri(), "prepared lazy Dex channel");
        Ok(Self::from_channel(channel))
    }

    pub fn from_channel(channel: Channel) -> Self {
        DexRegistry {
            client: DexClient::new(channel),
        }
    }
}

#[async_trait]
impl ClientRegistry for DexRegistry {
    async fn list_clients(&self) -> RegistryResult<Vec<ClientRecord>> {
        let response = self
            .client
            .clone()
            .list_clients(ListClientReq {})
            .await
            .map_err(DexError::from)?;
        Ok(response
            .into_inner()
            .clients
            .into_iter()
            .map(ClientRecord::from)
            .collect())
    }

    async fn create_client(&self, client: ClientRecord) -> RegistryResult<ClientRecord> {
        let id = client.id.clone();
        let response = self
            .client
            .clone()
            .create_client(CreateClientReq {
                client: Some(Client::from(client)),
            })
            .await
            .map_err(DexError::from)?
            .into_inner();

        if response.already_exists {
            return Err(RegistryError::AlreadyExists(id));
        }
        response.client.map(ClientRecord::from).ok_or_else(|| {
            RegistryError::InvalidResponse(format!("create of {id} returned no client"))
        })
    }

    async fn delete_client(&self, id: &str) -> RegistryResult<()> {
        let response = self
            .client
            .clone()
            .delete_client(DeleteClientReq { id: id.to_string() })
            .await
            .map_err(DexError::from)?
            .into_inner();

        if response.not_found {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

impl From<ClientRecord> for Client {
    fn from(record: ClientRecord) -> Self {
        Client {
            id: record.id,
            secret: record.secret,
            redirect_uris: record.redirect_uris,
            trusted_peers: record.trusted_peers,
            public: record.public,
            name: record.name,
            logo_url: record.logo_url,
        }
    }
}

impl From<Client> for ClientRecord {
    fn from(client: Client) -> Self {
        ClientRecord {
            id: client.id,
            secret: client.secret,
            redirect_uris: client.redirect_uris,
            trusted_peers: client.trusted_peers,
            public: client.public,
            name: client.name,
            logo_url: client.logo_url,
        }
    }
}

// Listings never carry secrets.
impl From<ClientInfo> for ClientRecord {
    fn from(info: ClientInfo) -> Self {
        ClientRecord {
            id: info.id,
            secret: String::new(),
            redirect_uris: info.redirect_uris,
            trusted_peers: info.trusted_peers,
            public: info.public,
            name: info.name,
            logo_url: info.logo_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preview_auth_core::{MergeRequest, RedirectTemplate};

    #[test]
    fn test_uri_defaults_to_https() {
        assert_eq!(
            DexConfig::new("dex.internal:5557").uri(),
            "https://dex.internal:5557"
        );
        assert_eq!(
            DexConfig::new("http://127.0.0.1:5557").uri(),
            "http://127.0.0.1:5557"
        );
    }

    #[test]
    fn test_plaintext_endpoint_builds() {
        assert!(DexConfig::new("http://127.0.0.1:5557").endpoint().is_ok());
    }

    #[test]
    fn test_missing_ca_certificate_is_an_error() {
        let config = DexConfig::new("dex.internal:5557").with_ca_cert("/nonexistent/dex-ca.pem");
        assert!(matches!(
            config.endpoint(),
            Err(DexError::Certificate { .. })
        ));
    }

    #[test]
    fn test_invalid_host_is_rejected() {
        let config = DexConfig::new("http://bad host:5557");
        assert!(matches!(
            config.endpoint(),
            Err(DexError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_client_conversion_is_lossless() {
        let record = ClientRecord::for_merge_request(
            &MergeRequest::new(7, "fix bug"),
            &RedirectTemplate::default(),
        );
        let wire = Client::from(record.clone());
        assert_eq!(wire.id, "mr-7");
        assert_eq!(wire.name, "MR !7 - fix bug");
        assert!(!wire.public);
        assert_eq!(ClientRecord::from(wire), record);
    }

    #[test]
    fn test_client_info_has_empty_secret() {
        let record = ClientRecord::from(ClientInfo {
            id: "mr-3".into(),
            redirect_uris: vec!["https://mr-3.preview.example.com/callback".into()],
            trusted_peers: vec![],
            public: false,
            name: "MR !3 - x".into(),
            logo_url: String::new(),
        });
        assert_eq!(record.id, "mr-3");
        assert!(record.secret.is_empty());
    }
}
