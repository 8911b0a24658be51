use std::{collections::HashMap, time::Duration};

use relay_common::models::{Network, NetworkParams, ProtocolChain};
use serde::{Deserialize, Serialize};

/// Static selection of the protocol deployment an adapter works against.
///
/// Deserializable so hosts can embed it in their own configuration files:
///
/// ```toml
/// protocol = "maya"
/// network = "stagenet"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub protocol: ProtocolChain,
    pub network: Network,
}

impl AdapterConfig {
    pub fn new(protocol: ProtocolChain, network: Network) -> Self {
        Self { protocol, network }
    }
}

impl From<AdapterConfig> for NetworkParams {
    fn from(value: AdapterConfig) -> Self {
        NetworkParams::new(value.protocol, value.network)
    }
}

/// Public node endpoint serving inbound addresses and mimir for a deployment.
pub fn default_endpoint(params: &NetworkParams) -> &'static str {
    match (params.protocol, params.network) {
        (ProtocolChain::THORChain, Network::Mainnet) => "https://thornode.ninerealms.com",
        (ProtocolChain::THORChain, Network::Stagenet) => "https://stagenet-thornode.ninerealms.com",
        (ProtocolChain::Maya, Network::Mainnet) => "https://mayanode.mayachain.info",
        (ProtocolChain::Maya, Network::Stagenet) => "https://stagenet.mayanode.mayachain.info",
    }
}

#[derive(Debug, Clone)]
pub struct HttpClientOptions {
    /// Optional client id sent with every request
    pub auth_key: Option<String>,
    /// Per request timeout (default: 10s)
    pub timeout: Duration,
    /// Node endpoints overriding [`default_endpoint`]
    pub endpoints: HashMap<NetworkParams, String>,
}

impl Default for HttpClientOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClientOptions {
    pub fn new() -> Self {
        Self { auth_key: None, timeout: Duration::from_secs(10), endpoints: HashMap::new() }
    }

    pub fn with_auth_key(mut self, auth_key: Option<String>) -> Self {
        self.auth_key = auth_key;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use `url` instead of the public node for the given deployment.
    pub fn with_endpoint(mut self, params: NetworkParams, url: impl Into<String>) -> Self {
        self.endpoints.insert(params, url.into());
        self
    }

    pub fn endpoint(&self, params: &NetworkParams) -> &str {
        self.endpoints
            .get(params)
            .map(String::as_str)
            .unwrap_or_else(|| default_endpoint(params))
    }
}
